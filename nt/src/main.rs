//! nt - notification template checker
//!
//! CLI entry point for listing, checking and inspecting notification templates.

use std::fs;
use std::path::PathBuf;

use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use tracing::info;

use notifytemplates::cli::{Cli, Command};
use notifytemplates::config::{self, Config};
use notifytemplates::{BundledStore, TemplateCategory, TemplateLoader};

fn parse_level(s: &str) -> tracing::Level {
    match s.to_uppercase().as_str() {
        "TRACE" => tracing::Level::TRACE,
        "DEBUG" => tracing::Level::DEBUG,
        "INFO" => tracing::Level::INFO,
        "WARN" | "WARNING" => tracing::Level::WARN,
        "ERROR" => tracing::Level::ERROR,
        _ => {
            eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
            tracing::Level::INFO
        }
    }
}

fn setup_logging(level: tracing::Level) -> Result<()> {
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("notifytemplates")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    // Write to a log file, keeping stdout for command output
    let log_file = fs::File::create(log_dir.join("nt.log")).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {})", level);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    // CLI --log-level > config file > INFO
    let level = match cli.log_level.as_deref().or(config.log_level.as_deref()) {
        Some(s) => parse_level(s),
        None => tracing::Level::INFO,
    };
    setup_logging(level).context("Failed to setup logging")?;

    match cli.command {
        Command::List => cmd_list(),
        Command::Check { names, override_dir } => cmd_check(&config, names, override_dir),
        Command::Env => cmd_env(),
    }
}

fn cmd_list() -> Result<()> {
    for name in BundledStore.names(TemplateCategory::Notifications) {
        println!("{}", name);
    }
    Ok(())
}

fn cmd_check(config: &Config, names: Vec<String>, override_dir: Option<PathBuf>) -> Result<()> {
    let override_dir = override_dir.or_else(|| config.templates.override_dir.clone());
    let loader = TemplateLoader::new(override_dir);

    let names = if names.is_empty() {
        BundledStore.names(TemplateCategory::Notifications)
    } else {
        names
    };

    for name in &names {
        let bundle = loader.load(name).context(format!("Template '{}' failed", name))?;
        println!(
            "{} {} (text: {}, markup: {})",
            "✓".green(),
            name.cyan(),
            bundle.text.origin(),
            bundle.markup.origin()
        );
    }

    Ok(())
}

fn cmd_env() -> Result<()> {
    let vars = config::namespaced_env();
    if vars.is_empty() {
        println!("No namespaced environment variables set");
    }
    for (key, value) in vars {
        println!("{}={}", key.yellow(), value);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level_known() {
        assert_eq!(parse_level("debug"), tracing::Level::DEBUG);
        assert_eq!(parse_level("Warning"), tracing::Level::WARN);
        assert_eq!(parse_level("ERROR"), tracing::Level::ERROR);
    }

    #[test]
    fn test_parse_level_unknown_defaults_to_info() {
        assert_eq!(parse_level("verbose"), tracing::Level::INFO);
        assert_eq!(parse_level(""), tracing::Level::INFO);
    }
}
