//! Logging setup for the prism CLI.
//!
//! Logs go to stderr so `--format json` output on stdout stays parseable.
//!
//! The level is picked in this order:
//! 1. `--verbose`: debug for prism crates
//! 2. `--quiet`: errors only
//! 3. `RUST_LOG`
//! 4. `log_level` from the config, or info

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const PRISM_CRATES: &[&str] = &["prism_analysis", "prism_graph", "prism_config", "prism_cli"];

/// Filter directives enabling `level` for every prism crate.
pub fn prism_filter(level: &str) -> EnvFilter {
    let directives: Vec<String> = PRISM_CRATES
        .iter()
        .map(|krate| format!("{krate}={level}"))
        .collect();
    EnvFilter::new(directives.join(","))
}

/// Initialize the global subscriber from the global flags.
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    init_logger_with_default(verbose, quiet, no_color, "info");
}

/// Like [`init_logger`], with `default_level` used when neither a flag nor
/// `RUST_LOG` decides.
pub fn init_logger_with_default(verbose: bool, quiet: bool, no_color: bool, default_level: &str) {
    let filter = if verbose {
        prism_filter("debug")
    } else if quiet {
        prism_filter("error")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| prism_filter(default_level))
    };
    init_logger_with_filter(filter, no_color);
}

pub fn init_logger_with_filter(filter: EnvFilter, no_color: bool) {
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color)
        .compact();

    // A second initialization (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_covers_every_crate() {
        let filter = prism_filter("debug").to_string();
        for krate in PRISM_CRATES {
            assert!(filter.contains(&format!("{krate}=debug")), "{filter}");
        }
    }
}
