//! prism - static analysis for web components.

use std::process::ExitCode;

use clap::Parser;
use prism_cli::{cli, commands, error, ui};

#[tokio::main]
async fn main() -> miette::Result<ExitCode> {
    let args = cli::Cli::parse();
    ui::init_colors(args.no_color);

    commands::execute(args).await.map_err(error::to_miette)
}
