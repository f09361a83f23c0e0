//! Command implementations.

pub mod analyze;
pub mod features;

use std::process::ExitCode;

use prism_analysis::{Analyzer, Configured};
use prism_config::{ConfigOverrides, PrismConfig};
use tracing::debug;

use crate::cli::{Cli, Command};
use crate::error::{CliError, Result};
use crate::logger;

/// Load the configuration, set up logging and run the selected command.
pub async fn execute(cli: Cli) -> anyhow::Result<ExitCode> {
    let overrides = overrides_for(&cli.command);
    let config = PrismConfig::load(cli.config.as_deref(), &overrides).map_err(CliError::from)?;

    let default_level = config
        .log_level
        .as_deref()
        .map_or_else(|| "info".to_string(), str::to_ascii_lowercase);
    logger::init_logger_with_default(cli.verbose, cli.quiet, cli.no_color, &default_level);
    debug!(root = %config.root.display(), "configuration loaded");

    match cli.command {
        Command::Analyze(args) => analyze::execute(&config, &args, cli.quiet).await,
        Command::Features(args) => features::execute(&config, &args).await,
    }
}

fn overrides_for(command: &Command) -> ConfigOverrides {
    match command {
        Command::Analyze(args) => ConfigOverrides {
            root: args.root.clone(),
            entrypoints: args.urls.clone(),
            external_packages: args.external_packages.then_some(true),
            ..Default::default()
        },
        Command::Features(args) => ConfigOverrides {
            root: args.root.clone(),
            external_packages: args.external_packages.then_some(true),
            ..Default::default()
        },
    }
}

/// An analyzer over the configured package root.
pub fn analyzer(config: &PrismConfig) -> Result<Analyzer<Configured>> {
    if !config.root.is_dir() {
        return Err(CliError::RootNotFound(config.root.clone()));
    }
    Ok(Analyzer::new()
        .excluded_dirs(config.exclude.iter().cloned())
        .max_file_size(config.max_file_size)
        .root(&config.root))
}
