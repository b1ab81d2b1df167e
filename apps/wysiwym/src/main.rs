//! # WYSIWYM - Knowledge Authoring by Guided Text
//!
//! The command-line binary for the WYSIWYM graph and anchor engine.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                 apps/wysiwym (THE BINARY)                │
//! │                                                          │
//! │  ┌─────────────┐   ┌──────────────┐   ┌──────────────┐  │
//! │  │    CLI      │   │    Config    │   │   Scripts    │  │
//! │  │   (clap)    │   │ (toml/serde) │   │ (toml/serde) │  │
//! │  └──────┬──────┘   └──────┬───────┘   └──────┬───────┘  │
//! │         └─────────────────┼──────────────────┘          │
//! │                           ▼                             │
//! │                   ┌───────────────┐                     │
//! │                   │ wysiwym-core  │                     │
//! │                   │  (THE LOGIC)  │                     │
//! │                   └───────────────┘                     │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! wysiwym --schema ontology.toml anchor --class Project
//! wysiwym --schema ontology.toml replay session.toml
//! wysiwym refer discourse.toml
//! wysiwym date --day 3 --month 5 --year 2004
//! ```

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wysiwym::cli;
use wysiwym::config::{Config, LOG_FORMAT_ENV, LogFormat};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

fn main() {
    let cli = cli::Cli::parse();

    // A broken config still gets reported through a default subscriber.
    let loaded = Config::load(cli.config.as_deref());
    let config = loaded.as_ref().cloned().unwrap_or_default();
    init_tracing(&config, cli.verbose);

    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Error: {}", e);
            std::process::exit(2);
        }
    };

    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    if let Err(e) = cli::execute(cli, &config) {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing. `WYSIWYM_LOG_FORMAT=json` enables machine-parseable
/// output; `RUST_LOG` overrides the configured filter.
fn init_tracing(config: &Config, verbose: bool) {
    let env_format = std::env::var(LOG_FORMAT_ENV).ok();
    let log_format = config.log_format(env_format.as_deref());

    let default_filter = if verbose {
        "wysiwym=debug,wysiwym_core=debug"
    } else {
        config.log_filter()
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    match log_format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}

/// Print the startup banner.
fn print_banner() {
    println!(
        r#"
  WYSIWYM v{}
  What you see is what you meant
"#,
        env!("CARGO_PKG_VERSION")
    );
}
