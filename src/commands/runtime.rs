use crate::cli::{Cli, Commands, TaxonomyCommands};
use crate::domain::models::{ConfigFile, JsonOut};
use crate::services::audit::audit;
use crate::services::extract::Ruleset;
use crate::services::output::print_out;
use crate::services::report;
use crate::services::scanner::{self, ScanOptions};
use crate::services::taxonomy::Taxonomy;
use std::path::Path;

struct ScanMode<'a> {
    path: Option<&'a Path>,
    fix: bool,
    level: u8,
    backup: bool,
    verbose: bool,
    report_path: Option<&'a Path>,
}

pub fn handle_commands(
    cli: &Cli,
    taxonomy: &Taxonomy,
    rules: &Ruleset,
    config: &ConfigFile,
) -> anyhow::Result<i32> {
    match &cli.command {
        Commands::Validate {
            path,
            verbose,
            report,
        } => run_scan(
            cli,
            taxonomy,
            rules,
            config,
            ScanMode {
                path: path.as_deref(),
                fix: false,
                level: 3,
                backup: false,
                verbose: *verbose,
                report_path: report.as_deref(),
            },
        ),
        Commands::Fix {
            path,
            level,
            backup,
            verbose,
            report,
        } => run_scan(
            cli,
            taxonomy,
            rules,
            config,
            ScanMode {
                path: path.as_deref(),
                fix: true,
                level: *level,
                backup: *backup,
                verbose: *verbose,
                report_path: report.as_deref(),
            },
        ),
        Commands::Stats { path } => run_stats(cli, taxonomy, rules, config, path.as_deref()),
        Commands::Taxonomy { command } => handle_taxonomy(cli, taxonomy, command),
    }
}

fn run_scan(
    cli: &Cli,
    taxonomy: &Taxonomy,
    rules: &Ruleset,
    config: &ConfigFile,
    mode: ScanMode,
) -> anyhow::Result<i32> {
    let opts = scan_options(cli, config, mode.path, mode.fix, mode.level, mode.backup);
    let scanner::ScanResult { aggregate, records } = scanner::run(taxonomy, rules, &opts)?;
    if mode.fix {
        audit(
            "fix_run",
            serde_json::json!({
                "root": opts.root.display().to_string(),
                "auto_fixed": aggregate.auto_fixed,
                "total_files": aggregate.total_files,
            }),
        );
    }
    let rep = report::build_report(&aggregate, records);
    if let Some(path) = mode.report_path {
        report::write_artifact(path, &rep)?;
    }
    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&JsonOut {
                ok: true,
                data: &rep
            })?
        );
    } else {
        if mode.verbose {
            for record in &rep.files {
                println!("{}", report::verbose_line(record));
            }
        }
        report::print_summary(&aggregate, mode.fix);
    }
    Ok(report::exit_code(mode.fix, &aggregate))
}

fn run_stats(
    cli: &Cli,
    taxonomy: &Taxonomy,
    rules: &Ruleset,
    config: &ConfigFile,
    path: Option<&Path>,
) -> anyhow::Result<i32> {
    let opts = scan_options(cli, config, path, false, 3, false);
    let result = scanner::run(taxonomy, rules, &opts)?;
    let counts = report::category_counts(&result.aggregate);
    print_out(cli.json, &counts, |c| format!("{}\t{}", c.category, c.count))?;
    Ok(report::exit_code(false, &result.aggregate))
}

fn handle_taxonomy(
    cli: &Cli,
    taxonomy: &Taxonomy,
    command: &TaxonomyCommands,
) -> anyhow::Result<i32> {
    match command {
        TaxonomyCommands::List => {
            let rows = taxonomy.rows();
            print_out(cli.json, &rows, |r| {
                format!(
                    "{}\t{}\trequired: {}\trecommended: {}",
                    r.code,
                    r.name,
                    r.required_for.join(", "),
                    r.recommended_for.join(", ")
                )
            })?;
        }
        TaxonomyCommands::Required { component } => {
            let codes: Vec<String> = taxonomy
                .required_for(*component)
                .iter()
                .map(|c| c.to_string())
                .collect();
            print_out(cli.json, &codes, |c| c.clone())?;
        }
        TaxonomyCommands::Recommended { component } => {
            let codes: Vec<String> = taxonomy
                .recommended_for(*component)
                .iter()
                .map(|c| c.to_string())
                .collect();
            print_out(cli.json, &codes, |c| c.clone())?;
        }
    }
    Ok(0)
}

/// Scope selection: a path argument that names a file means single-file
/// mode; a directory overrides the global `--root`; otherwise the root tree
/// is scanned. CLI `--exclude`/`--ext` extend the configured lists.
fn scan_options(
    cli: &Cli,
    config: &ConfigFile,
    path: Option<&Path>,
    fix: bool,
    default_level: u8,
    backup: bool,
) -> ScanOptions {
    let (root, single_file) = match path {
        Some(p) if p.is_file() => (cli.root.clone(), Some(p.to_path_buf())),
        Some(p) => (p.to_path_buf(), None),
        None => (cli.root.clone(), None),
    };
    let mut exclude = config.scan.exclude.clone();
    exclude.extend(cli.exclude.iter().cloned());
    let mut code_extensions = config.scan.code_extensions.clone();
    code_extensions.extend(
        cli.ext
            .iter()
            .map(|e| e.trim_start_matches('.').to_ascii_lowercase()),
    );
    ScanOptions {
        root,
        single_file,
        fix,
        default_level,
        backup,
        exclude,
        code_extensions,
        doc_extensions: config.scan.doc_extensions.clone(),
    }
}
