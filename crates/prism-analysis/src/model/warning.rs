use std::fmt;

use serde::Serialize;

use super::SourceRange;

/// How serious a [`Warning`] is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        })
    }
}

/// A structured, position-anchored analysis problem.
///
/// Warnings are the main recovery mechanism of the analyzer: almost every
/// "this looks wrong" condition is recorded as a warning on the owning
/// document or feature instead of aborting the analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Warning {
    pub code: String,
    pub message: String,
    pub severity: Severity,
    pub source_range: SourceRange,
}

impl Warning {
    pub fn new(
        code: impl Into<String>,
        message: impl Into<String>,
        severity: Severity,
        source_range: SourceRange,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            severity,
            source_range,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] {}: {}",
            self.source_range, self.severity, self.code, self.message
        )
    }
}
