//! Arbor CLI Binary
//!
//! Command-line interface for the arbor in-memory virtual file system.

use anyhow::Context;
use arbor::config::ConfigLoader;
use arbor::logging::init_logging;
use arbor::tooling::cli::{Cli, CliContext};
use clap::Parser;
use std::process;

fn main() {
    let cli = Cli::parse();

    let context = match startup(&cli) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("Error initializing arbor: {:#}", e);
            process::exit(1);
        }
    };

    match context.execute(&cli.command) {
        Ok(output) => {
            println!("{}", output);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

fn startup(cli: &Cli) -> anyhow::Result<CliContext> {
    let mut config = ConfigLoader::load(cli.config.as_deref()).context("loading configuration")?;
    cli.apply_logging_overrides(&mut config.logging);
    init_logging(Some(&config.logging)).context("initializing logging")?;

    config.loader.scripts.extend(cli.scripts.iter().cloned());
    CliContext::from_config(config).context("loading startup scripts")
}
