use std::path::PathBuf;

use clap::{Args, Subcommand};
use prism_analysis::model::FeatureKind;

use crate::cli::enums::OutputFormat;

/// Available prism subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Analyze documents and report their warnings
    ///
    /// Without URLs, analyzes the config's entrypoints, or every .html and
    /// .js file of the package when none are configured. Exits with status 1
    /// when any error is reported.
    Analyze(AnalyzeArgs),

    /// List the features visible from one document
    Features(FeaturesArgs),
}

/// Arguments for the analyze command
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Package-relative URLs to analyze
    ///
    /// Examples:
    ///   prism analyze my-app.html
    ///   prism analyze src/my-app.html src/my-view.js
    #[arg(value_name = "URL")]
    pub urls: Vec<String>,

    /// Package root directory
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Also report warnings from bower_components/ and node_modules/
    #[arg(long)]
    pub external_packages: bool,
}

/// Arguments for the features command
#[derive(Args, Debug)]
pub struct FeaturesArgs {
    /// Package-relative URL of the document
    #[arg(value_name = "URL")]
    pub url: String,

    /// Only list features of this kind (e.g. element, polymer-element, behavior)
    #[arg(short, long, value_name = "KIND")]
    pub kind: Option<FeatureKind>,

    /// Only features declared in the document itself, not its imports
    #[arg(long)]
    pub local: bool,

    /// Package root directory
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Also list features from bower_components/ and node_modules/
    #[arg(long)]
    pub external_packages: bool,
}
