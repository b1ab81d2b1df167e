//! # Application Errors
//!
//! The binary wraps the engine error together with the failures only it can
//! hit: file access, TOML and JSON encoding, bad script references.

use std::path::PathBuf;
use thiserror::Error;
use wysiwym_core::WysiwymError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] WysiwymError),

    #[error("Cannot read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Script step {step}: {message}")]
    Script { step: usize, message: String },
}

impl AppError {
    pub(crate) fn script(step: usize, message: impl Into<String>) -> Self {
        Self::Script {
            step,
            message: message.into(),
        }
    }
}
