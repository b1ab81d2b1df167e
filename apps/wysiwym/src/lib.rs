//! # WYSIWYM Application Library
//!
//! Everything the `wysiwym` binary does, exposed for integration tests:
//! configuration, schema and script loading, and the CLI commands.

pub mod cli;
pub mod config;
pub mod error;
pub mod script;

pub use config::{Config, LogFormat};
pub use error::AppError;
