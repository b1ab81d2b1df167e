//! # Configuration
//!
//! Optional `wysiwym.toml`:
//!
//! ```toml
//! schema = "ontology.toml"
//!
//! [logging]
//! format = "json"
//! filter = "wysiwym=debug"
//!
//! [history]
//! depth = 32
//! ```
//!
//! Command-line flags win over the file; `WYSIWYM_LOG_FORMAT` wins over
//! `logging.format` and `RUST_LOG` over `logging.filter`.

use crate::error::AppError;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use wysiwym_core::Schema;
use wysiwym_core::primitives::{DEFAULT_HISTORY_DEPTH, MAX_HISTORY_DEPTH};

/// File looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "wysiwym.toml";

/// Environment variable selecting `text` or `json` log output.
pub const LOG_FORMAT_ENV: &str = "WYSIWYM_LOG_FORMAT";

/// Default tracing filter.
pub const DEFAULT_LOG_FILTER: &str = "wysiwym=info,wysiwym_core=info";

/// Maximum size of any schema, script or config file (10 MB).
const MAX_INPUT_FILE_SIZE: u64 = 10 * 1024 * 1024;

// =============================================================================
// CONFIG TYPES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl LogFormat {
    /// Parse an environment value; anything but `json` is text.
    #[must_use]
    pub fn from_env_value(value: &str) -> Self {
        if value.eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Text
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    #[serde(default)]
    pub format: LogFormat,
    #[serde(default)]
    pub filter: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HistoryConfig {
    #[serde(default = "default_depth")]
    pub depth: usize,
}

fn default_depth() -> usize {
    DEFAULT_HISTORY_DEPTH
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            depth: DEFAULT_HISTORY_DEPTH,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Default schema path, relative to the config file.
    #[serde(default)]
    pub schema: Option<PathBuf>,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub history: HistoryConfig,
}

// =============================================================================
// LOADING
// =============================================================================

impl Config {
    /// Parse a config document and check its values.
    pub fn parse(text: &str) -> Result<Self, AppError> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `explicit`, else `wysiwym.toml` in the working directory if it
    /// exists, else the defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, AppError> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !fallback.is_file() {
                    return Ok(Self::default());
                }
                fallback
            }
        };
        let mut config = Self::parse(&read_text(&path)?)?;
        if let Some(schema) = config.schema.take() {
            config.schema = Some(resolve_relative(&path, &schema));
        }
        Ok(config)
    }

    fn validate(&self) -> Result<(), AppError> {
        if self.history.depth == 0 || self.history.depth > MAX_HISTORY_DEPTH {
            return Err(AppError::Config(format!(
                "history.depth must be between 1 and {}, got {}",
                MAX_HISTORY_DEPTH, self.history.depth
            )));
        }
        Ok(())
    }

    /// Log format after applying `WYSIWYM_LOG_FORMAT`.
    #[must_use]
    pub fn log_format(&self, env_value: Option<&str>) -> LogFormat {
        env_value
            .map(LogFormat::from_env_value)
            .unwrap_or(self.logging.format)
    }

    /// Tracing filter used when `RUST_LOG` is unset.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        self.logging.filter.as_deref().unwrap_or(DEFAULT_LOG_FILTER)
    }

    /// Pick the schema path: the flag, else the configured one.
    pub fn schema_path(&self, flag: Option<&Path>) -> Result<PathBuf, AppError> {
        flag.map(Path::to_path_buf)
            .or_else(|| self.schema.clone())
            .ok_or_else(|| {
                AppError::Config("no schema given; pass --schema or set `schema`".to_string())
            })
    }
}

fn resolve_relative(config_path: &Path, target: &Path) -> PathBuf {
    if target.is_absolute() {
        return target.to_path_buf();
    }
    config_path
        .parent()
        .map(|dir| dir.join(target))
        .unwrap_or_else(|| target.to_path_buf())
}

// =============================================================================
// FILE HELPERS
// =============================================================================

/// Read a text input file, refusing anything over the size limit.
pub fn read_text(path: &Path) -> Result<String, AppError> {
    let io_error = |source| AppError::Io {
        path: path.to_path_buf(),
        source,
    };
    let metadata = std::fs::metadata(path).map_err(io_error)?;
    if metadata.len() > MAX_INPUT_FILE_SIZE {
        return Err(AppError::Config(format!(
            "'{}' is {} bytes, over the {} byte limit",
            path.display(),
            metadata.len(),
            MAX_INPUT_FILE_SIZE
        )));
    }
    std::fs::read_to_string(path).map_err(io_error)
}

/// Load and validate a schema file.
pub fn load_schema(path: &Path) -> Result<Schema, AppError> {
    let schema: Schema = toml::from_str(&read_text(path)?)?;
    schema.validate()?;
    tracing::info!(
        path = %path.display(),
        classes = schema.classes.len(),
        properties = schema.properties.len(),
        "schema loaded"
    );
    Ok(schema)
}
