//! Command-line interface for prism.
//!
//! - [`cli`] - Argument definitions (clap)
//! - [`commands`] - `analyze` and `features`
//! - [`error`] - User-facing errors and miette conversion
//! - [`logger`] - tracing subscriber setup
//! - [`report`] - Warning reports in text and JSON
//! - [`ui`] - Terminal styling

pub mod cli;
pub mod commands;
pub mod error;
pub mod logger;
pub mod report;
pub mod ui;

pub use error::{CliError, Result};
