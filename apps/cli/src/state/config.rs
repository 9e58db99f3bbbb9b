//! # Configuration State
//!
//! Where the taximeter keeps its files and how it shows money.
//!
//! ## Configuration Sources (Priority Order)
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Config Resolution                                    │
//! │                                                                         │
//! │  1. Environment         TAXI_RATES_PATH / TAXI_HISTORY_PATH /           │
//! │                         TAXI_CURRENCY_SYMBOL                            │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  2. Config file         $TAXI_CONFIG, else                              │
//! │                         ~/.config/taximeter/taximeter.toml (Linux)      │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  3. Defaults            ./rates.json, ./history.txt, €                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Config File
//! ```toml
//! [storage]
//! rates_path = "rates.json"
//! history_path = "history.txt"
//!
//! [display]
//! currency_symbol = "€"
//! ```
//!
//! ## Thread Safety
//! Configuration is read-only after startup, so no mutex is needed.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use taxi_core::Fare;
use thiserror::Error;
use tracing::{debug, info};

/// Environment variable naming the config file.
pub const CONFIG_PATH_ENV: &str = "TAXI_CONFIG";
/// Environment variable overriding the rates file.
pub const RATES_PATH_ENV: &str = "TAXI_RATES_PATH";
/// Environment variable overriding the history file.
pub const HISTORY_PATH_ENV: &str = "TAXI_HISTORY_PATH";
/// Environment variable overriding the currency symbol.
pub const CURRENCY_SYMBOL_ENV: &str = "TAXI_CURRENCY_SYMBOL";

const DEFAULT_RATES_PATH: &str = "rates.json";
const DEFAULT_HISTORY_PATH: &str = "history.txt";
const DEFAULT_CURRENCY_SYMBOL: &str = "€";

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigState {
    /// Rate table file (JSON)
    pub rates_path: PathBuf,

    /// Trip history file (one line per trip)
    pub history_path: PathBuf,

    /// Currency symbol shown before every amount
    pub currency_symbol: String,
}

impl Default for ConfigState {
    /// Files in the working directory, amounts in euros.
    fn default() -> Self {
        ConfigState {
            rates_path: PathBuf::from(DEFAULT_RATES_PATH),
            history_path: PathBuf::from(DEFAULT_HISTORY_PATH),
            currency_symbol: DEFAULT_CURRENCY_SYMBOL.to_string(),
        }
    }
}

/// On-disk layout of `taximeter.toml`. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    storage: StorageSection,
    display: DisplaySection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct StorageSection {
    rates_path: Option<PathBuf>,
    history_path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DisplaySection {
    currency_symbol: Option<String>,
}

impl ConfigState {
    /// Resolves configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::resolve(|key| std::env::var(key).ok(), Self::default_config_path())
    }

    /// Resolves configuration from an environment lookup and the fallback
    /// config file location.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (`TAXI_CONFIG`, else `default_file`)
    /// 3. Environment variables
    ///
    /// A config file named by `TAXI_CONFIG` must exist. The fallback file
    /// is optional.
    pub fn resolve<E>(env: E, default_file: Option<PathBuf>) -> Result<Self, ConfigError>
    where
        E: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        match env(CONFIG_PATH_ENV) {
            Some(path) => config.apply_file(&Self::read_file(Path::new(&path))?),
            None => {
                if let Some(path) = default_file {
                    if path.exists() {
                        config.apply_file(&Self::read_file(&path)?);
                    } else {
                        debug!(?path, "Config file not found, using defaults");
                    }
                }
            }
        }

        config.apply_env_overrides(env);
        Ok(config)
    }

    /// Formats a fare with the configured currency symbol.
    pub fn format_fare(&self, fare: Fare) -> String {
        fare.with_symbol(&self.currency_symbol)
    }

    /// Formats a per-second rate with the configured currency symbol.
    pub fn format_rate(&self, rate: f64) -> String {
        format!("{}{}", self.currency_symbol, rate)
    }

    fn read_file(path: &Path) -> Result<ConfigFile, ConfigError> {
        info!(?path, "Loading config from file");
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn apply_file(&mut self, file: &ConfigFile) {
        if let Some(path) = &file.storage.rates_path {
            self.rates_path = path.clone();
        }
        if let Some(path) = &file.storage.history_path {
            self.history_path = path.clone();
        }
        if let Some(symbol) = &file.display.currency_symbol {
            self.currency_symbol = symbol.clone();
        }
    }

    fn apply_env_overrides<E>(&mut self, env: E)
    where
        E: Fn(&str) -> Option<String>,
    {
        if let Some(path) = env(RATES_PATH_ENV) {
            debug!(path = %path, "Overriding rates path from environment");
            self.rates_path = PathBuf::from(path);
        }

        if let Some(path) = env(HISTORY_PATH_ENV) {
            debug!(path = %path, "Overriding history path from environment");
            self.history_path = PathBuf::from(path);
        }

        if let Some(symbol) = env(CURRENCY_SYMBOL_ENV) {
            self.currency_symbol = symbol;
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "taximeter")
            .map(|dirs| dirs.config_dir().join("taximeter.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_sources() {
        let config = ConfigState::resolve(env_from(&[]), None).unwrap();
        assert_eq!(config, ConfigState::default());
        assert_eq!(config.rates_path, PathBuf::from("rates.json"));
        assert_eq!(config.history_path, PathBuf::from("history.txt"));
        assert_eq!(config.currency_symbol, "€");
    }

    #[test]
    fn test_missing_default_file_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let config =
            ConfigState::resolve(env_from(&[]), Some(dir.path().join("taximeter.toml"))).unwrap();
        assert_eq!(config, ConfigState::default());
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("taximeter.toml");
        fs::write(
            &path,
            "[storage]\nhistory_path = \"/var/lib/taxi/history.txt\"\n\n[display]\ncurrency_symbol = \"$\"\n",
        )
        .unwrap();

        let config = ConfigState::resolve(env_from(&[]), Some(path)).unwrap();
        assert_eq!(config.rates_path, PathBuf::from("rates.json"));
        assert_eq!(
            config.history_path,
            PathBuf::from("/var/lib/taxi/history.txt")
        );
        assert_eq!(config.currency_symbol, "$");
    }

    #[test]
    fn test_env_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        fs::write(&path, "[storage]\nrates_path = \"from-file.json\"\n").unwrap();
        let path_str = path.to_string_lossy().to_string();

        let env = env_from(&[
            (CONFIG_PATH_ENV, path_str.as_str()),
            (RATES_PATH_ENV, "from-env.json"),
            (CURRENCY_SYMBOL_ENV, "£"),
        ]);
        let config = ConfigState::resolve(env, None).unwrap();

        assert_eq!(config.rates_path, PathBuf::from("from-env.json"));
        assert_eq!(config.currency_symbol, "£");
    }

    #[test]
    fn test_explicit_config_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml").to_string_lossy().to_string();

        let err = ConfigState::resolve(env_from(&[(CONFIG_PATH_ENV, missing.as_str())]), None)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("taximeter.toml");
        fs::write(&path, "[storage\nrates_path = ").unwrap();

        let err = ConfigState::resolve(env_from(&[]), Some(path)).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_format_fare_and_rate() {
        let config = ConfigState::default();
        assert_eq!(config.format_fare(Fare::new(0.25)), "€0.25");
        assert_eq!(config.format_rate(0.02), "€0.02");
    }
}
