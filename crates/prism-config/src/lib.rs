//! Configuration for prism.
//!
//! [`PrismConfig`] is assembled from layered sources, later ones winning:
//!
//! 1. built-in defaults
//! 2. a `prism.json` file (explicit path, or discovered in the working directory)
//! 3. `PRISM_*` environment variables (`PRISM_MAX_FILE_SIZE=1048576`)
//! 4. command line overrides ([`ConfigOverrides`])
//!
//! ```no_run
//! use prism_config::{ConfigOverrides, PrismConfig};
//!
//! let config = PrismConfig::load(None, &ConfigOverrides::default()).unwrap();
//! println!("analyzing {}", config.root.display());
//! ```

pub mod config;
pub mod error;
mod loading;
mod validation;

pub use config::{ConfigOverrides, PrismConfig, CONFIG_FILE_NAME, DEFAULT_MAX_FILE_SIZE};
pub use error::{ConfigError, Result};
