//! Terminal styling and status messages.
//!
//! Status lines go to stderr; results go to stdout.

use console::{StyledObject, style};
use prism_analysis::model::Severity;

/// Whether colored output should be used.
///
/// `NO_COLOR` disables colors, `FORCE_COLOR` enables them even when stdout
/// is not a terminal.
pub fn should_use_color(no_color: bool) -> bool {
    if no_color || std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if std::env::var_os("FORCE_COLOR").is_some() {
        return true;
    }
    console::colors_enabled()
}

/// Apply the color decision to both output streams.
pub fn init_colors(no_color: bool) {
    let enabled = should_use_color(no_color);
    console::set_colors_enabled(enabled);
    console::set_colors_enabled_stderr(enabled);
}

pub fn severity(severity: Severity) -> StyledObject<String> {
    let label = format!("{:<7}", severity.to_string());
    match severity {
        Severity::Error => style(label).red().bold(),
        Severity::Warning => style(label).yellow(),
        Severity::Info => style(label).blue(),
    }
}

pub fn success(message: &str) {
    eprintln!("{} {}", style("✓").green().bold(), message);
}

pub fn error(message: &str) {
    eprintln!("{} {}", style("✗").red().bold(), style(message).red());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_color_flag_wins() {
        assert!(!should_use_color(true));
    }

    #[test]
    fn severity_labels_are_padded() {
        console::set_colors_enabled(false);
        assert_eq!(severity(Severity::Error).to_string(), "error  ");
        assert_eq!(severity(Severity::Warning).to_string(), "warning");
    }
}
