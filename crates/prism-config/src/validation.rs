use crate::config::PrismConfig;
use crate::error::{ConfigError, Result};

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

impl PrismConfig {
    /// Check values no deserializer can catch.
    ///
    /// Paths are not checked for existence here; a missing root surfaces as
    /// load warnings during analysis.
    pub fn validate(&self) -> Result<()> {
        if self.root.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "root",
                hint: "the package root must not be empty, use \".\" for the current directory"
                    .to_string(),
            });
        }

        if self.max_file_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_file_size",
                hint: "must be greater than zero".to_string(),
            });
        }

        if let Some(level) = &self.log_level {
            if !LOG_LEVELS.contains(&level.to_ascii_lowercase().as_str()) {
                return Err(ConfigError::InvalidValue {
                    field: "log_level",
                    hint: format!("`{level}` is not one of {}", LOG_LEVELS.join(", ")),
                });
            }
        }

        if let Some(dir) = self.exclude.iter().find(|dir| dir.is_empty() || dir.contains('/')) {
            return Err(ConfigError::InvalidValue {
                field: "exclude",
                hint: format!("`{dir}` is not a directory name"),
            });
        }

        Ok(())
    }
}
