//! # trigdeps CLI Module
//!
//! ## Available Commands
//!
//! - `init` - Create an empty state file
//! - `show` - Show the dependency list
//! - `merge` - Merge a popup payload from a JSON file
//! - `remove` - Remove one dependency
//! - `render` - Print the list as table rows
//! - `form` - Print the form submission body
//! - `export` - Write the list as JSON
//! - `import` - Replace the list from a JSON export
//! - `server` - Start the HTTP server

mod commands;

use crate::config::AppConfig;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use trigdeps_core::TrigDepsError;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// trigdeps - trigger dependency list tool
///
/// Merges trigger batches from the selection popup into a dependency list
/// without duplicates.
#[derive(Parser, Debug)]
#[command(name = "trigdeps")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to the state (snapshot) file
    #[arg(short = 'S', long, global = true, default_value = "trigdeps.state")]
    pub state: PathBuf,

    /// Path to the TOML config file (default: ./trigdeps.toml if present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Parent discovery rule id used in trigger prototype links
    #[arg(long, global = true)]
    pub parent_discoveryid: Option<String>,

    /// Fail on malformed batches instead of ignoring them
    #[arg(long, global = true)]
    pub strict: bool,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create an empty state file
    Init {
        /// Overwrite an existing state file
        #[arg(short, long)]
        force: bool,
    },

    /// Show the dependency list
    Show,

    /// Merge a popup payload (`{"object": ..., "values": [...]}`) from a file
    Merge {
        /// Path to the JSON payload
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Remove one dependency
    Remove {
        /// Trigger id to remove
        #[arg(short, long)]
        triggerid: String,
    },

    /// Print the list as HTML table rows
    Render,

    /// Print the form submission body
    Form,

    /// Write the list as JSON for inspection or editing
    Export {
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Replace the list with one read from a JSON export
    Import {
        /// Path to the JSON export
        #[arg(short, long)]
        file: PathBuf,

        /// Overwrite an existing state file
        #[arg(long)]
        force: bool,
    },

    /// Start HTTP server
    Server {
        /// Host to bind to
        #[arg(short = 'H', long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "8080")]
        port: u16,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), TrigDepsError> {
    let config = AppConfig::load(cli.config.as_deref())?
        .with_overrides(cli.parent_discoveryid.as_deref(), cli.strict)?;
    let state = cli.state.as_path();
    let json_mode = cli.json_mode;

    match cli.command {
        Some(Commands::Init { force }) => cmd_init(state, force),
        Some(Commands::Show) | None => cmd_show(state, json_mode),
        Some(Commands::Merge { file }) => cmd_merge(state, &config, json_mode, &file),
        Some(Commands::Remove { triggerid }) => {
            cmd_remove(state, &config, json_mode, &triggerid)
        }
        Some(Commands::Render) => cmd_render(state, json_mode),
        Some(Commands::Form) => cmd_form(state, json_mode),
        Some(Commands::Export { output }) => cmd_export(state, output.as_deref()),
        Some(Commands::Import { file, force }) => cmd_import(state, &file, force),
        Some(Commands::Server { host, port }) => cmd_server(state, &config, &host, port).await,
    }
}
