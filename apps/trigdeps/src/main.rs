//! # trigdeps - Trigger Dependency List Tool
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │               apps/trigdeps (THE BINARY)             │
//! │                                                      │
//! │   ┌─────────────┐            ┌─────────────────┐     │
//! │   │    CLI      │            │  HTTP endpoint  │     │
//! │   │   (clap)    │            │     (axum)      │     │
//! │   └──────┬──────┘            └────────┬────────┘     │
//! │          └──────────────┬─────────────┘              │
//! │                         ▼                            │
//! │                 ┌───────────────┐                    │
//! │                 │ trigdeps-core │                    │
//! │                 │  (THE LOGIC)  │                    │
//! │                 └───────────────┘                    │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! trigdeps init
//! trigdeps merge -f popup.json
//! trigdeps --parent-discoveryid 42 merge -f prototypes.json
//! trigdeps remove -t 13551
//! trigdeps form
//! trigdeps export -o deps.json
//! trigdeps server --port 8080
//! ```

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use trigdeps::cli;

#[tokio::main]
async fn main() {
    let cli = cli::Cli::parse();

    // TRIGDEPS_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("TRIGDEPS_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let default_filter = if cli.verbose {
        "trigdeps=debug,tower_http=debug"
    } else {
        "trigdeps=info,tower_http=info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}
