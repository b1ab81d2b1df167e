//! # WYSIWYM CLI Module
//!
//! This module implements the CLI interface for WYSIWYM.
//!
//! ## Available Commands
//!
//! - `anchor` - Show the anchor menus of a fresh node of a class
//! - `replay` - Replay an edit script with undo, redo and branching
//! - `refer` - Resolve referring expressions of a discourse script
//! - `date` - Classify a date and print its preposition phrase
//! - `schema` - Validate a schema and list its classes

mod commands;

use crate::config::Config;
use crate::error::AppError;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// WYSIWYM - knowledge authoring by guided text
///
/// Computes the menus behind the anchors of a generated text and replays
/// editing sessions against a static schema.
#[derive(Parser, Debug)]
#[command(name = "wysiwym")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the configuration file (default: ./wysiwym.toml if present)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to the schema file (overrides `schema` in the config)
    #[arg(short = 'S', long, global = true)]
    pub schema: Option<PathBuf>,

    /// Undo depth (overrides `history.depth` in the config)
    #[arg(long, global = true)]
    pub history_depth: Option<usize>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the anchor menus of a new node of a class
    Anchor {
        /// Class of the node
        #[arg(short, long)]
        class: String,
    },

    /// Replay an edit script
    Replay {
        /// Path to the TOML edit script
        script: PathBuf,
    },

    /// Resolve the referring expressions of a discourse script
    Refer {
        /// Path to the TOML discourse script
        script: PathBuf,
    },

    /// Classify a date
    Date {
        #[arg(long)]
        day: Option<u8>,
        #[arg(long)]
        month: Option<u8>,
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        end_day: Option<u8>,
        #[arg(long)]
        end_month: Option<u8>,
        #[arg(long)]
        end_year: Option<i32>,
        /// First year of a decade, e.g. 1990
        #[arg(long)]
        decade: Option<i32>,
        /// Century number, e.g. 19
        #[arg(long)]
        century: Option<i32>,
    },

    /// Validate the schema and list its classes
    Schema,
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub fn execute(cli: Cli, config: &Config) -> Result<(), AppError> {
    let json_mode = cli.json_mode;
    let depth = cli.history_depth.unwrap_or(config.history.depth);

    match cli.command {
        Commands::Anchor { class } => {
            let schema = config.schema_path(cli.schema.as_deref())?;
            cmd_anchor(&schema, &class, json_mode)
        }
        Commands::Replay { script } => {
            let schema = config.schema_path(cli.schema.as_deref())?;
            cmd_replay(&schema, &script, depth, json_mode)
        }
        Commands::Refer { script } => cmd_refer(&script, json_mode),
        Commands::Date {
            day,
            month,
            year,
            end_day,
            end_month,
            end_year,
            decade,
            century,
        } => {
            let date = wysiwym_core::DateValue {
                begin: wysiwym_core::DateParts { day, month, year },
                end: wysiwym_core::DateParts {
                    day: end_day,
                    month: end_month,
                    year: end_year,
                },
                decade,
                century,
            };
            cmd_date(date, json_mode)
        }
        Commands::Schema => {
            let schema = config.schema_path(cli.schema.as_deref())?;
            cmd_schema(&schema, json_mode)
        }
    }
}
