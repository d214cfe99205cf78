//! # Shop Configuration
//!
//! Settings loaded once at startup and read-only afterwards.
//!
//! ## Sources (later overrides earlier)
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. Defaults (this file)                                                │
//! │  2. shop.toml                                                           │
//! │       --config <path>, or the platform config dir:                      │
//! │       ~/.config/okaybruh-shop/shop.toml (Linux)                         │
//! │       ~/Library/Application Support/com.okaybruh.shop/shop.toml (macOS) │
//! │  3. OKAYBRUH_* environment variables                                    │
//! │  4. Command-line flags (--backend, --api-url)                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//! ```toml
//! backend = "remote"
//! api_url = "https://shop.example.com/api"
//! request_timeout_secs = 10
//! store_name = "Okaybruh Shop"
//! tax_rate_bps = 1000
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use okaybruh_core::{TaxRate, DEFAULT_TAX_RATE, FEATURED_PRODUCT_COUNT};

/// Default REST service location.
pub const DEFAULT_API_URL: &str = "http://localhost:3000/api";

const CONFIG_FILE: &str = "shop.toml";
const DATABASE_FILE: &str = "okaybruh.db";

/// Configuration load failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("{0}")]
    Invalid(String),
}

// =============================================================================
// Backend Mode
// =============================================================================

/// Which storage backend the shop runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendMode {
    /// SQLite on this machine (demo/offline).
    #[default]
    #[serde(alias = "demo", alias = "offline")]
    Local,

    /// The shop's REST service.
    #[serde(alias = "server", alias = "api")]
    Remote,
}

impl fmt::Display for BackendMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendMode::Local => write!(f, "local"),
            BackendMode::Remote => write!(f, "remote"),
        }
    }
}

impl FromStr for BackendMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" | "demo" | "offline" => Ok(BackendMode::Local),
            "remote" | "server" | "api" => Ok(BackendMode::Remote),
            other => Err(format!(
                "unknown backend '{}', expected local or remote",
                other
            )),
        }
    }
}

// =============================================================================
// Shop Config
// =============================================================================

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShopConfig {
    pub backend: BackendMode,

    /// Base URL of the REST service, including the `/api` prefix.
    pub api_url: String,

    /// Per-request timeout for the REST service.
    pub request_timeout_secs: u64,

    /// SQLite file for local mode. Default: `<data_dir>/okaybruh.db`.
    pub database_path: Option<PathBuf>,

    /// Where the session id file lives. Default: platform data dir.
    pub data_dir: Option<PathBuf>,

    /// Shown on receipts; also the merchant name on offline payment codes.
    pub store_name: String,

    pub currency_symbol: String,

    /// Tax rate in basis points (1000 = 10%).
    pub tax_rate_bps: u32,

    /// How many products the storefront features.
    pub featured_count: usize,
}

impl Default for ShopConfig {
    fn default() -> Self {
        ShopConfig {
            backend: BackendMode::Local,
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout_secs: 10,
            database_path: None,
            data_dir: None,
            store_name: "Okaybruh Shop".to_string(),
            currency_symbol: "$".to_string(),
            tax_rate_bps: DEFAULT_TAX_RATE.bps(),
            featured_count: FEATURED_PRODUCT_COUNT,
        }
    }
}

impl ShopConfig {
    /// Loads defaults, then the config file, then environment overrides.
    ///
    /// A missing file is fine; an unreadable or malformed one is an error.
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut config = match config_path.or_else(Self::default_config_path) {
            Some(path) if path.exists() => {
                info!(?path, "Loading shop config from file");
                Self::from_file(&path)?
            }
            Some(path) => {
                debug!(?path, "Config file not found, using defaults");
                Self::default()
            }
            None => Self::default(),
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Applies `OKAYBRUH_*` overrides read through `var`.
    ///
    /// Unparseable numeric values are ignored with a debug log.
    pub fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(mode) = var("OKAYBRUH_BACKEND") {
            match mode.parse() {
                Ok(parsed) => self.backend = parsed,
                Err(e) => debug!(error = %e, "Ignoring OKAYBRUH_BACKEND"),
            }
        }
        if let Some(url) = var("OKAYBRUH_API_URL") {
            self.api_url = url;
        }
        if let Some(secs) = var("OKAYBRUH_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
            self.request_timeout_secs = secs;
        }
        if let Some(path) = var("OKAYBRUH_DB_PATH") {
            self.database_path = Some(PathBuf::from(path));
        }
        if let Some(dir) = var("OKAYBRUH_DATA_DIR") {
            self.data_dir = Some(PathBuf::from(dir));
        }
        if let Some(name) = var("OKAYBRUH_STORE_NAME") {
            self.store_name = name;
        }
        if let Some(symbol) = var("OKAYBRUH_CURRENCY_SYMBOL") {
            self.currency_symbol = symbol;
        }
        if let Some(bps) = var("OKAYBRUH_TAX_BPS").and_then(|v| v.parse().ok()) {
            self.tax_rate_bps = bps;
        }
        if let Some(count) = var("OKAYBRUH_FEATURED_COUNT").and_then(|v| v.parse().ok()) {
            self.featured_count = count;
        }
    }

    /// Checks the settings the selected backend depends on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backend == BackendMode::Remote
            && !self.api_url.starts_with("http://")
            && !self.api_url.starts_with("https://")
        {
            return Err(ConfigError::Invalid(format!(
                "API URL must start with http:// or https://, got: {}",
                self.api_url
            )));
        }

        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "request_timeout_secs must be greater than 0".into(),
            ));
        }

        if self.tax_rate_bps > 10_000 {
            return Err(ConfigError::Invalid(format!(
                "tax_rate_bps must be at most 10000, got: {}",
                self.tax_rate_bps
            )));
        }

        Ok(())
    }

    pub fn tax_rate(&self) -> TaxRate {
        TaxRate::from_bps(self.tax_rate_bps)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Resolved data directory (session file, default database).
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .or_else(|| project_dirs().map(|dirs| dirs.data_dir().to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Resolved SQLite file for local mode.
    pub fn database_path(&self) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(|| self.data_dir().join(DATABASE_FILE))
    }

    fn default_config_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "okaybruh", "shop")
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ShopConfig::default();
        assert_eq!(config.backend, BackendMode::Local);
        assert_eq!(config.api_url, "http://localhost:3000/api");
        assert_eq!(config.tax_rate(), DEFAULT_TAX_RATE);
        assert_eq!(config.featured_count, 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: ShopConfig = toml::from_str(
            r#"
            backend = "server"
            api_url = "https://shop.example.com/api"
            "#,
        )
        .unwrap();
        assert_eq!(config.backend, BackendMode::Remote);
        assert_eq!(config.api_url, "https://shop.example.com/api");
        assert_eq!(config.request_timeout_secs, 10);
        assert_eq!(config.store_name, "Okaybruh Shop");
    }

    #[test]
    fn test_env_overrides() {
        let mut config = ShopConfig::default();
        config.apply_overrides(env(&[
            ("OKAYBRUH_BACKEND", "api"),
            ("OKAYBRUH_API_URL", "http://10.0.0.5:3000/api"),
            ("OKAYBRUH_TAX_BPS", "700"),
            ("OKAYBRUH_TIMEOUT_SECS", "soon"),
        ]));
        assert_eq!(config.backend, BackendMode::Remote);
        assert_eq!(config.api_url, "http://10.0.0.5:3000/api");
        assert_eq!(config.tax_rate_bps, 700);
        assert_eq!(config.request_timeout_secs, 10);
    }

    #[test]
    fn test_validate_rejects_bad_remote_url() {
        let config = ShopConfig {
            backend: BackendMode::Remote,
            api_url: "ftp://shop".into(),
            ..ShopConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        // Only checked when the remote backend is selected
        let local = ShopConfig {
            api_url: "ftp://shop".into(),
            ..ShopConfig::default()
        };
        assert!(local.validate().is_ok());
    }

    #[test]
    fn test_backend_mode_parse() {
        assert_eq!("Demo".parse::<BackendMode>().unwrap(), BackendMode::Local);
        assert_eq!("server".parse::<BackendMode>().unwrap(), BackendMode::Remote);
        assert!("cloud".parse::<BackendMode>().is_err());
    }

    #[test]
    fn test_resolved_paths() {
        let config = ShopConfig {
            data_dir: Some(PathBuf::from("/tmp/okaybruh")),
            ..ShopConfig::default()
        };
        assert_eq!(config.database_path(), PathBuf::from("/tmp/okaybruh/okaybruh.db"));
    }

    #[test]
    fn test_missing_file_is_an_error_only_when_present_but_broken() {
        let dir = std::env::temp_dir().join(format!("okaybruh-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("shop.toml");

        std::fs::write(&path, "backend = [").unwrap();
        assert!(matches!(
            ShopConfig::from_file(&path),
            Err(ConfigError::Parse { .. })
        ));

        std::fs::write(&path, "store_name = \"Pop-up\"").unwrap();
        assert_eq!(ShopConfig::from_file(&path).unwrap().store_name, "Pop-up");

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
