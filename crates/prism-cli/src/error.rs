//! Error handling for the prism CLI.
//!
//! Commands return [`anyhow::Result`]; failures the user can act on are
//! raised as [`CliError`] so [`to_miette`] can attach a hint.

use std::path::PathBuf;

use miette::Report;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] prism_config::ConfigError),

    #[error("Package root not found: {}", .0.display())]
    RootNotFound(PathBuf),

    /// The requested document could not be analyzed at all.
    #[error("Could not analyze {url}: {reason}")]
    NotAnalyzed { url: String, reason: String },

    #[error("Could not list package files: {0}")]
    Listing(#[from] prism_analysis::AnalysisError),
}

impl CliError {
    fn hint(&self) -> Option<&'static str> {
        match self {
            CliError::Config(_) => Some("Check prism.json and PRISM_* environment variables"),
            CliError::RootNotFound(_) => Some("Pass an existing directory with --root"),
            CliError::NotAnalyzed { .. } => Some("URLs are relative to the package root"),
            CliError::Listing(_) => None,
        }
    }
}

/// Convert a command failure into a miette report.
pub fn to_miette(err: anyhow::Error) -> Report {
    match err.downcast_ref::<CliError>().and_then(CliError::hint) {
        Some(hint) => miette::miette!("{err:#}\n\nHint: {hint}"),
        None => miette::miette!("{err:#}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_carry_hints() {
        let err = anyhow::Error::new(CliError::RootNotFound(PathBuf::from("missing")));
        let report = to_miette(err);
        let text = report.to_string();
        assert!(text.contains("Package root not found: missing"));
        assert!(text.contains("Hint: Pass an existing directory"));
    }

    #[test]
    fn context_is_kept() {
        let err = anyhow::anyhow!("boom").context("while analyzing");
        assert_eq!(to_miette(err).to_string(), "while analyzing: boom");
    }
}
