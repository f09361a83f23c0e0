//! Command-line interface definition.
//!
//! - `prism analyze` - Report warnings for a package or a set of documents
//! - `prism features` - List the features one document sees

mod commands;
pub mod enums;

use std::path::PathBuf;

use clap::Parser;

pub use commands::{AnalyzeArgs, Command, FeaturesArgs};
pub use enums::OutputFormat;

/// Prism - static analysis for web components
#[derive(Parser, Debug)]
#[command(
    name = "prism",
    version,
    about = "Static analysis for web components",
    long_about = "Prism reads HTML, JavaScript and CSS sources, finds the custom elements,\n\
                  Polymer behaviors and mixins they declare, links them across imports and\n\
                  reports what it could not make sense of."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Path to a prism.json config file
    ///
    /// Defaults to ./prism.json when it exists.
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}
