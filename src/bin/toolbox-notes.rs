//! Toolbox Notes CLI Binary
//!
//! Command-line interface for reading and editing subreddit usernotes.

use clap::Parser;
use std::process;
use toolbox_notes::config::ConfigLoader;
use toolbox_notes::logging::init_logging;
use toolbox_notes::tooling::cli::{Cli, CliContext};

fn main() {
    let cli = Cli::parse();

    let config = match ConfigLoader::load(cli.config.as_deref()) {
        Ok(config) => cli.apply_overrides(config),
        Err(e) => {
            eprintln!("Error loading configuration: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = init_logging(Some(&config.logging)) {
        eprintln!("Warning: failed to initialize logging: {}", e);
    }

    let context = match CliContext::new(&cli, config) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("Error initializing page store: {}", e);
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
