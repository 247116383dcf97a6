use clap::Parser;

mod cli;
mod commands;
mod domain;
mod services;

use domain::models::ComplyError;
use services::output::print_error;

fn main() {
    let args = cli::Cli::parse();
    match run(&args) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            print_error(args.json, &err);
            std::process::exit(2);
        }
    }
}

fn run(args: &cli::Cli) -> anyhow::Result<i32> {
    let taxonomy = services::taxonomy::Taxonomy::load()?;
    let rules = services::extract::Ruleset::new()
        .map_err(|e| ComplyError::Config(format!("invalid pattern table: {}", e)))?;
    let config = services::config::load_config(args.config.as_deref(), &args.root)?;
    commands::handle_commands(args, &taxonomy, &rules, &config)
}
