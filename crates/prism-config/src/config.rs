//! Configuration types.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// File looked up in the working directory when no `--config` is given.
pub const CONFIG_FILE_NAME: &str = "prism.json";

/// Files larger than this are not analyzed (10 MiB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Settings for one analysis run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrismConfig {
    /// Package directory URLs are resolved against.
    pub root: PathBuf,

    /// URLs to analyze. Empty means every `.html` and `.js` file in the package.
    pub entrypoints: Vec<String>,

    /// Directory names skipped when listing the package.
    pub exclude: Vec<String>,

    /// Largest file, in bytes, that will be loaded.
    pub max_file_size: u64,

    /// `trace`, `debug`, `info`, `warn` or `error`.
    pub log_level: Option<String>,

    /// Report features found under `bower_components/` and `node_modules/`.
    pub external_packages: bool,
}

impl Default for PrismConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            entrypoints: Vec::new(),
            exclude: vec!["bower_components".to_string(), "node_modules".to_string()],
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            log_level: None,
            external_packages: false,
        }
    }
}

/// Values given on the command line. Unset fields leave lower layers alone.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConfigOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub entrypoints: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_packages: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = PrismConfig::default();
        assert_eq!(config.root, PathBuf::from("."));
        assert!(config.entrypoints.is_empty());
        assert_eq!(config.exclude, ["bower_components", "node_modules"]);
        assert_eq!(config.max_file_size, 10_485_760);
        assert!(!config.external_packages);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let config: PrismConfig =
            serde_json::from_str(r#"{"entrypoints": ["index.html"]}"#).unwrap();
        assert_eq!(config.entrypoints, ["index.html"]);
        assert_eq!(config.max_file_size, DEFAULT_MAX_FILE_SIZE);
    }

    #[test]
    fn empty_overrides_serialize_to_nothing() {
        let value = serde_json::to_value(ConfigOverrides::default()).unwrap();
        assert_eq!(value, serde_json::json!({}));
    }
}
