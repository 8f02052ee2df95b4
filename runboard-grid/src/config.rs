//! Configuration loading for the runboard grid.
//!
//! All fields are required unless explicitly marked optional. No defaults.

use runboard_core::{ColumnKind, ColumnSelection, KindOrder, TimestampRenderer};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const CONFIG_ENV_VAR: &str = "RUNBOARD_CONFIG";

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GridConfig {
    pub api_base_url: String,
    /// Collection the grid is bound to.
    pub experiment_id: String,
    pub request_timeout_ms: u64,
    pub default_page_size: u32,
    pub auth: AuthConfig,
    pub catalog: CatalogConfig,
    pub timestamps: TimestampConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    pub bearer_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogConfig {
    pub kind_order: Vec<ColumnKind>,
    /// Column ids replacing the built-in seed selection.
    pub initial_columns: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TimestampConfig {
    pub format: String,
    pub local: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    pub json: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing configuration file path (use --config or RUNBOARD_CONFIG)")]
    MissingConfigPath,
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid config value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

impl GridConfig {
    /// Load from `explicit`, falling back to `RUNBOARD_CONFIG`.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = explicit
            .map(Path::to_path_buf)
            .or_else(config_path_from_env)
            .ok_or(ConfigError::MissingConfigPath)?;
        let config = Self::from_path(&path)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: GridConfig = toml::from_str(contents)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_base_url.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "api_base_url",
                reason: "must not be empty".to_string(),
            });
        }
        if !self.api_base_url.starts_with("http://") && !self.api_base_url.starts_with("https://")
        {
            return Err(ConfigError::InvalidValue {
                field: "api_base_url",
                reason: "must start with http:// or https://".to_string(),
            });
        }
        if self.experiment_id.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "experiment_id",
                reason: "must not be empty".to_string(),
            });
        }
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "request_timeout_ms",
                reason: "must be > 0".to_string(),
            });
        }
        if self.default_page_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "default_page_size",
                reason: "must be > 0".to_string(),
            });
        }
        if let Some(token) = &self.auth.bearer_token {
            if token.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "auth.bearer_token",
                    reason: "must not be empty when set".to_string(),
                });
            }
        }
        self.kind_order()?;
        self.initial_selection()?;
        self.timestamp_renderer()?;
        Ok(())
    }

    pub fn kind_order(&self) -> Result<KindOrder, ConfigError> {
        KindOrder::new(&self.catalog.kind_order).map_err(|err| ConfigError::InvalidValue {
            field: "catalog.kind_order",
            reason: err.to_string(),
        })
    }

    /// Configured initial columns, or the built-in seed.
    pub fn initial_selection(&self) -> Result<ColumnSelection, ConfigError> {
        match &self.catalog.initial_columns {
            Some(ids) => {
                ColumnSelection::from_ids(ids).map_err(|err| ConfigError::InvalidValue {
                    field: "catalog.initial_columns",
                    reason: err.to_string(),
                })
            }
            None => Ok(ColumnSelection::seed()),
        }
    }

    pub fn timestamp_renderer(&self) -> Result<TimestampRenderer, ConfigError> {
        TimestampRenderer::new(self.timestamps.format.clone(), self.timestamps.local).map_err(
            |err| ConfigError::InvalidValue {
                field: "timestamps.format",
                reason: err.to_string(),
            },
        )
    }
}

fn config_path_from_env() -> Option<PathBuf> {
    std::env::var(CONFIG_ENV_VAR).ok().map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use runboard_core::ColumnDescriptor;
    use std::io::Write;

    const SAMPLE: &str = r#"
api_base_url = "http://localhost:5000"
experiment_id = "42"
request_timeout_ms = 5000
default_page_size = 10

[auth]
bearer_token = "secret"

[catalog]
kind_order = ["attribute", "metric", "param", "tag"]

[timestamps]
format = "%Y-%m-%d %H:%M:%S"
local = false

[logging]
json = true
"#;

    fn sample() -> GridConfig {
        GridConfig::from_toml(SAMPLE).unwrap()
    }

    #[test]
    fn sample_config_is_valid() {
        let config = sample();
        assert!(config.validate().is_ok());
        assert_eq!(config.kind_order().unwrap(), KindOrder::default());
        assert_eq!(config.initial_selection().unwrap(), ColumnSelection::seed());
        assert!(config.logging.json);
    }

    #[test]
    fn load_reads_explicit_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let config = GridConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.experiment_id, "42");
        assert_eq!(config.auth.bearer_token.as_deref(), Some("secret"));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let contents = format!("{SAMPLE}\n[extra]\nvalue = 1\n");
        assert!(matches!(
            GridConfig::from_toml(&contents),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn missing_section_is_rejected() {
        let contents = SAMPLE.replace("[logging]\njson = true\n", "");
        assert!(GridConfig::from_toml(&contents).is_err());
    }

    #[test]
    fn zero_page_size_rejected() {
        let mut config = sample();
        config.default_page_size = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { field: "default_page_size", .. })
        ));
    }

    #[test]
    fn base_url_needs_scheme() {
        let mut config = sample();
        config.api_base_url = "localhost:5000".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn kind_order_must_name_each_kind() {
        let mut config = sample();
        config.catalog.kind_order = vec![ColumnKind::Tag, ColumnKind::Tag];
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { field: "catalog.kind_order", .. })
        ));
    }

    #[test]
    fn initial_columns_override_seed() {
        let mut config = sample();
        config.catalog.initial_columns =
            Some(vec!["metrics.`acc`".to_string(), "tags.`team`".to_string()]);
        let selection = config.initial_selection().unwrap();
        assert_eq!(
            selection.columns(),
            [ColumnDescriptor::metric("acc"), ColumnDescriptor::tag("team")]
        );

        config.catalog.initial_columns = Some(vec!["nope".to_string()]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn bad_timestamp_format_rejected() {
        let mut config = sample();
        config.timestamps.format = "%Q".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { field: "timestamps.format", .. })
        ));
    }
}
