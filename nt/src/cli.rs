//! CLI argument parsing for nt

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "nt")]
#[command(author, version, about = "Notification template resolver and checker", long_about = None)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List bundled notification templates
    List,

    /// Resolve and parse template pairs, reporting where each dialect came from
    Check {
        /// Template names to check (default: every bundled template)
        names: Vec<String>,

        /// Override directory (default: from config)
        #[arg(short, long)]
        override_dir: Option<PathBuf>,
    },

    /// Show namespaced environment variables with secrets redacted
    Env,
}
