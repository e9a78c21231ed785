use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::application::{MissingAccountPolicy, DEFAULT_COLLECTION};

/// Default location of the configuration file.
pub const DEFAULT_CONFIG_PATH: &str = "saldo.toml";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub balance_sheet: BalanceSheetConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_path")]
    pub path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub json: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BalanceSheetConfig {
    /// Output collection written by `balance-sheet` and read by `show`.
    #[serde(default = "default_collection")]
    pub collection: String,

    #[serde(default)]
    pub missing_accounts: MissingAccountPolicy,
}

/// Values given on the command line, which win over the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub database: Option<String>,
    pub log_level: Option<String>,
}

fn default_database_path() -> String {
    "saldo.db".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_collection() -> String {
    DEFAULT_COLLECTION.to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl Default for BalanceSheetConfig {
    fn default() -> Self {
        Self {
            collection: default_collection(),
            missing_accounts: MissingAccountPolicy::default(),
        }
    }
}

impl Config {
    /// Parse a TOML document.
    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("Failed to parse config file")
    }

    /// Load the file at `path` if it exists, otherwise start from defaults,
    /// then apply command-line overrides.
    pub fn load(path: &Path, overrides: &Overrides) -> Result<Self> {
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            Self::from_toml(&contents)?
        } else {
            Config::default()
        };

        config.apply(overrides);
        Ok(config)
    }

    pub fn apply(&mut self, overrides: &Overrides) {
        if let Some(ref database) = overrides.database {
            self.database.path = database.clone();
        }
        if let Some(ref level) = overrides.log_level {
            self.logging.level = level.clone();
        }
    }
}
