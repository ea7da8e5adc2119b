//! CLI interface for Caseguard

pub mod commands;
mod output;

pub use output::*;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "caseguard")]
#[command(author = "Krakaw")]
#[command(version = "0.1.0")]
#[command(about = "Inspect and drive the case-management client session", long_about = None)]
pub struct Cli {
    /// Path to caseguard.toml (defaults to searching upward from the current directory)
    #[arg(short, long, global = true, env = "CASEGUARD_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a default caseguard.toml configuration file
    Init,

    /// Store a token as the current session
    Login {
        /// Raw bearer token
        #[arg(short, long, conflicts_with = "response", required_unless_present = "response")]
        token: Option<String>,

        /// File holding a login or registration response body ({"token": "..."})
        #[arg(short, long)]
        response: Option<PathBuf>,

        /// HTTP status the response came with
        #[arg(short, long, default_value = "200")]
        status: u16,
    },

    /// Clear the stored token
    Logout,

    /// Show the identity decoded from the stored token
    Whoami {
        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Show authentication state and token expiry
    Status,

    /// Evaluate whether a route may be entered
    Check {
        /// Route path, e.g. /users
        route: String,
    },

    /// Re-read the stored token periodically and print every identity emission
    Watch {
        /// Seconds between refreshes
        #[arg(short, long, default_value = "2")]
        interval: u64,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Yaml,
}
