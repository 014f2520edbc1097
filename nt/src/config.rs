//! Configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Environment key that overrides `templates.override-dir`
pub const TEMPLATE_PATH_ENV: &str = "NOTIFIER_TEMPLATE_PATH";

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Template resolution settings
    pub templates: TemplatesConfig,

    /// Log level (trace, debug, info, warn, error)
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,
}

/// Template resolution settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplatesConfig {
    /// Directory holding `<name>.txt` / `<name>.html` overrides
    #[serde(rename = "override-dir")]
    pub override_dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration with fallback chain, then apply the process environment
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        let mut config = Self::load_files(config_path)?;
        config.apply_env(std::env::vars());
        Ok(config)
    }

    fn load_files(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, it must load
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .notifytemplates.yml
        let local_config = PathBuf::from(".notifytemplates.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    // Logging is not up yet while config loads
                    eprintln!("Warning: Failed to load config from {}: {:#}", local_config.display(), e);
                    warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/notifytemplates/notifytemplates.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("notifytemplates").join("notifytemplates.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        eprintln!("Warning: Failed to load config from {}: {:#}", user_config.display(), e);
                    warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Apply namespaced environment variables on top of file configuration
    ///
    /// `AUTHELIA_NOTIFIER_TEMPLATE_PATH` and `X_AUTHELIA_NOTIFIER_TEMPLATE_PATH` set
    /// `templates.override-dir`; the `X_` form wins when both are present. An empty
    /// value clears the override directory.
    pub fn apply_env<I, K, V>(&mut self, vars: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let primary = format!("{}{}", secretkeys::ENV_PREFIX, TEMPLATE_PATH_ENV);
        let alternate = format!("{}{}", secretkeys::ENV_X_PREFIX, TEMPLATE_PATH_ENV);
        let mut primary_value = None;
        let mut alternate_value = None;

        for (key, value) in vars {
            let key = key.as_ref();
            if !secretkeys::is_namespaced(key) {
                continue;
            }

            let value = value.as_ref();
            debug!(%key, value = %secretkeys::redact(key, value), "Config::apply_env: namespaced variable");

            let upper = key.to_uppercase();
            if upper == primary {
                primary_value = Some(value.to_string());
            } else if upper == alternate {
                alternate_value = Some(value.to_string());
            }
        }

        if let Some(value) = alternate_value.or(primary_value) {
            self.templates.override_dir = if value.is_empty() { None } else { Some(PathBuf::from(value)) };
            debug!(override_dir = ?self.templates.override_dir, "Config::apply_env: override directory set");
        }
    }
}

/// Namespaced variables from the process environment, secrets masked, sorted by key
pub fn namespaced_env() -> Vec<(String, String)> {
    let mut vars: Vec<(String, String)> = std::env::vars().filter(|(k, _)| secretkeys::is_namespaced(k)).collect();
    vars.sort();
    secretkeys::redacted_pairs(vars)
}
