use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format as _, Json, Serialized},
};
use tracing::debug;

use crate::config::{CONFIG_FILE_NAME, ConfigOverrides, PrismConfig};
use crate::error::{ConfigError, Result};

impl PrismConfig {
    /// Load configuration from every source and validate it.
    /// Priority: CLI overrides > environment variables > config file > defaults
    ///
    /// `config_path` must exist when given; otherwise `prism.json` in the
    /// working directory is used if present.
    pub fn load(config_path: Option<&Path>, overrides: &ConfigOverrides) -> Result<Self> {
        let config: Self = Self::figment(config_path, overrides)?.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// The layered sources without extracting them.
    pub fn figment(config_path: Option<&Path>, overrides: &ConfigOverrides) -> Result<Figment> {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));

        if let Some(path) = Self::config_file(config_path)? {
            debug!(path = %path.display(), "reading config file");
            figment = figment.merge(Json::file(path));
        }

        // PRISM_ROOT, PRISM_MAX_FILE_SIZE, ...
        figment = figment.merge(Env::prefixed("PRISM_"));

        Ok(figment.merge(Serialized::defaults(overrides)))
    }

    fn config_file(config_path: Option<&Path>) -> Result<Option<PathBuf>> {
        match config_path {
            Some(path) if path.is_file() => Ok(Some(path.to_path_buf())),
            Some(path) => Err(ConfigError::NotFound(path.to_path_buf())),
            None => {
                let default_path = Path::new(CONFIG_FILE_NAME);
                Ok(default_path.is_file().then(|| default_path.to_path_buf()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    fn load(config_path: Option<&Path>, overrides: &ConfigOverrides) -> figment::Result<PrismConfig> {
        PrismConfig::load(config_path, overrides).map_err(|e| e.to_string().into())
    }

    #[test]
    fn defaults_without_any_source() {
        Jail::expect_with(|_| {
            let config = load(None, &ConfigOverrides::default())?;
            assert_eq!(config, PrismConfig::default());
            Ok(())
        });
    }

    #[test]
    fn discovers_prism_json_in_the_working_directory() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "prism.json",
                r#"{"root": "src", "entrypoints": ["app.html"], "max_file_size": 1024}"#,
            )?;
            let config = load(None, &ConfigOverrides::default())?;
            assert_eq!(config.root, PathBuf::from("src"));
            assert_eq!(config.entrypoints, ["app.html"]);
            assert_eq!(config.max_file_size, 1024);
            assert_eq!(config.exclude, PrismConfig::default().exclude);
            Ok(())
        });
    }

    #[test]
    fn environment_overrides_the_file() {
        Jail::expect_with(|jail| {
            jail.create_file("prism.json", r#"{"max_file_size": 1024}"#)?;
            jail.set_env("PRISM_MAX_FILE_SIZE", 2048);
            jail.set_env("PRISM_EXTERNAL_PACKAGES", true);
            let config = load(None, &ConfigOverrides::default())?;
            assert_eq!(config.max_file_size, 2048);
            assert!(config.external_packages);
            Ok(())
        });
    }

    #[test]
    fn command_line_overrides_everything() {
        Jail::expect_with(|jail| {
            jail.create_file("custom.json", r#"{"root": "from-file", "log_level": "warn"}"#)?;
            jail.set_env("PRISM_ROOT", "from-env");
            let overrides = ConfigOverrides {
                root: Some(PathBuf::from("from-cli")),
                entrypoints: vec!["index.html".to_string()],
                ..Default::default()
            };
            let config = load(Some(Path::new("custom.json")), &overrides)?;
            assert_eq!(config.root, PathBuf::from("from-cli"));
            assert_eq!(config.entrypoints, ["index.html"]);
            assert_eq!(config.log_level.as_deref(), Some("warn"));
            Ok(())
        });
    }

    #[test]
    fn invalid_values_are_rejected() {
        Jail::expect_with(|jail| {
            jail.create_file("prism.json", r#"{"max_file_size": 0}"#)?;
            let error = PrismConfig::load(None, &ConfigOverrides::default()).unwrap_err();
            assert!(matches!(
                error,
                ConfigError::InvalidValue {
                    field: "max_file_size",
                    ..
                }
            ));

            jail.create_file("prism.json", r#"{"max_file_size": "big"}"#)?;
            let error = PrismConfig::load(None, &ConfigOverrides::default()).unwrap_err();
            assert!(matches!(error, ConfigError::Load(_)));
            Ok(())
        });
    }
}
