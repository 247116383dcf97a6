use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "comply", version, about = "Compliance-label taxonomy validator and migrator")]
pub struct Cli {
    #[arg(long, global = true, help = "Output machine-readable JSON")]
    pub json: bool,
    #[arg(
        long,
        global = true,
        default_value = ".",
        help = "Root directory to scan when no path argument is given"
    )]
    pub root: PathBuf,
    #[arg(long, global = true, help = "Explicit config file (.comply.toml)")]
    pub config: Option<PathBuf>,
    #[arg(
        long,
        global = true,
        help = "Additional excluded path substring (repeatable)"
    )]
    pub exclude: Vec<String>,
    #[arg(
        long,
        global = true,
        help = "Additional code extension for the allow-list (repeatable)"
    )]
    pub ext: Vec<String>,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Read-only compliance gate over the tree or a single file.
    Validate {
        path: Option<PathBuf>,
        #[arg(long, help = "Print a pass/fail line per file")]
        verbose: bool,
        #[arg(long, help = "Write the JSON report artifact to this path")]
        report: Option<PathBuf>,
    },
    /// Insert missing required labels in canonical form.
    Fix {
        path: Option<PathBuf>,
        #[arg(
            long,
            default_value_t = 3,
            value_parser = clap::value_parser!(u8).range(0..=3),
            help = "Assurance level for inserted labels"
        )]
        level: u8,
        #[arg(long, help = "Write a .bak copy before mutating each file")]
        backup: bool,
        #[arg(long, help = "Print a line per fixed file")]
        verbose: bool,
        #[arg(long, help = "Write the JSON report artifact to this path")]
        report: Option<PathBuf>,
    },
    /// Per-category label occurrence counts.
    Stats { path: Option<PathBuf> },
    Taxonomy {
        #[command(subcommand)]
        command: TaxonomyCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum TaxonomyCommands {
    List,
    Required {
        #[arg(long, value_enum)]
        component: ComponentType,
    },
    Recommended {
        #[arg(long, value_enum)]
        component: ComponentType,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ComponentType {
    Bitcoin,
    Web5,
    Ml,
    Ui,
    Api,
    Core,
    Dao,
    Default,
}

impl ComponentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentType::Bitcoin => "bitcoin",
            ComponentType::Web5 => "web5",
            ComponentType::Ml => "ml",
            ComponentType::Ui => "ui",
            ComponentType::Api => "api",
            ComponentType::Core => "core",
            ComponentType::Dao => "dao",
            ComponentType::Default => "default",
        }
    }
}
