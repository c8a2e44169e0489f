//! Configuration management with TOML, environment variables, and CLI overrides.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Application configuration with layered loading.
///
/// Resolved once at startup and handed to the store, fetcher and collectors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding category snapshots
    #[serde(default = "default_categories_dir")]
    pub categories_dir: PathBuf,

    /// Directory holding product snapshots
    #[serde(default = "default_products_dir")]
    pub products_dir: PathBuf,

    /// Proxy URL (e.g., socks5://host:port)
    #[serde(default)]
    pub proxy: Option<String>,

    /// Timeout for a single page fetch, in seconds
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    /// Base delay before each request in milliseconds
    #[serde(default)]
    pub delay_ms: u64,

    /// Random jitter added to delay (0 to this value)
    #[serde(default)]
    pub delay_jitter_ms: u64,

    /// Category pages fetched at the same time for one site
    #[serde(default = "default_max_concurrent_fetches")]
    pub max_concurrent_fetches: usize,
}

fn default_categories_dir() -> PathBuf {
    PathBuf::from("data/categories")
}

fn default_products_dir() -> PathBuf {
    PathBuf::from("data/products")
}

fn default_fetch_timeout_secs() -> u64 {
    15
}

fn default_max_concurrent_fetches() -> usize {
    4
}

impl Default for Config {
    fn default() -> Self {
        Self {
            categories_dir: default_categories_dir(),
            products_dir: default_products_dir(),
            proxy: None,
            fetch_timeout_secs: default_fetch_timeout_secs(),
            delay_ms: 0,
            delay_jitter_ms: 0,
            max_concurrent_fetches: default_max_concurrent_fetches(),
        }
    }
}

impl Config {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading config from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Loads configuration with fallback to default locations.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit_path {
            return Self::from_file(path);
        }

        let local_config = Path::new("config.toml");
        if local_config.exists() {
            debug!("Found config.toml in current directory");
            return Self::from_file(local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("catalog-harvest").join("config.toml");
            if xdg_config.exists() {
                debug!("Found config in XDG config directory");
                return Self::from_file(xdg_config);
            }
        }

        debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Applies environment variable overrides.
    pub fn with_env(mut self) -> Self {
        if let Ok(dir) = std::env::var("HARVEST_CATEGORIES_DIR") {
            self.categories_dir = PathBuf::from(dir);
        }

        if let Ok(dir) = std::env::var("HARVEST_PRODUCTS_DIR") {
            self.products_dir = PathBuf::from(dir);
        }

        if let Ok(proxy) = std::env::var("HARVEST_PROXY") {
            self.proxy = Some(proxy);
        }

        if let Ok(timeout) = std::env::var("HARVEST_TIMEOUT") {
            if let Ok(t) = timeout.parse() {
                self.fetch_timeout_secs = t;
            }
        }

        if let Ok(delay) = std::env::var("HARVEST_DELAY") {
            if let Ok(d) = delay.parse() {
                self.delay_ms = d;
            }
        }

        self
    }

    /// Fetch timeout as a duration.
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.categories_dir, PathBuf::from("data/categories"));
        assert_eq!(config.products_dir, PathBuf::from("data/products"));
        assert_eq!(config.fetch_timeout_secs, 15);
        assert_eq!(config.fetch_timeout(), Duration::from_secs(15));
        assert_eq!(config.delay_ms, 0);
        assert_eq!(config.delay_jitter_ms, 0);
        assert_eq!(config.max_concurrent_fetches, 4);
        assert!(config.proxy.is_none());
    }

    #[test]
    fn test_config_from_toml() {
        let toml = r#"
            categories_dir = "/var/harvest/categories"
            fetch_timeout_secs = 30
            max_concurrent_fetches = 8
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.categories_dir, PathBuf::from("/var/harvest/categories"));
        assert_eq!(config.products_dir, PathBuf::from("data/products"));
        assert_eq!(config.fetch_timeout_secs, 30);
        assert_eq!(config.max_concurrent_fetches, 8);
    }

    #[test]
    fn test_config_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            products_dir = "out/products"
            proxy = "socks5://localhost:1080"
            delay_ms = 250
            delay_jitter_ms = 100
            "#
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.products_dir, PathBuf::from("out/products"));
        assert_eq!(config.proxy, Some("socks5://localhost:1080".to_string()));
        assert_eq!(config.delay_ms, 250);
        assert_eq!(config.delay_jitter_ms, 100);
    }

    #[test]
    fn test_config_from_file_not_found() {
        let result = Config::from_file("/nonexistent/path/config.toml");
        let err = result.unwrap_err().to_string();
        assert!(err.contains("Failed to read config file"));
    }

    #[test]
    fn test_config_from_file_invalid_toml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "not valid toml {{{{").unwrap();

        let err = Config::from_file(file.path()).unwrap_err().to_string();
        assert!(err.contains("Failed to parse config file"));
    }

    #[test]
    fn test_config_load_explicit_path() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "fetch_timeout_secs = 5").unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.fetch_timeout_secs, 5);
    }

    #[test]
    fn test_config_with_env() {
        let orig_dir = std::env::var("HARVEST_CATEGORIES_DIR").ok();
        let orig_timeout = std::env::var("HARVEST_TIMEOUT").ok();

        std::env::set_var("HARVEST_CATEGORIES_DIR", "/tmp/cats");
        std::env::set_var("HARVEST_TIMEOUT", "not_a_number");

        let config = Config::new().with_env();
        assert_eq!(config.categories_dir, PathBuf::from("/tmp/cats"));
        // Invalid values are ignored
        assert_eq!(config.fetch_timeout_secs, 15);

        match orig_dir {
            Some(v) => std::env::set_var("HARVEST_CATEGORIES_DIR", v),
            None => std::env::remove_var("HARVEST_CATEGORIES_DIR"),
        }
        match orig_timeout {
            Some(v) => std::env::set_var("HARVEST_TIMEOUT", v),
            None => std::env::remove_var("HARVEST_TIMEOUT"),
        }
    }

    #[test]
    fn test_config_serde_roundtrip() {
        let config = Config {
            proxy: Some("http://proxy:8080".to_string()),
            max_concurrent_fetches: 2,
            ..Config::default()
        };

        let json = serde_json::to_string(&config).unwrap();
        let parsed: Config = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.proxy, config.proxy);
        assert_eq!(parsed.categories_dir, config.categories_dir);
        assert_eq!(parsed.max_concurrent_fetches, 2);
    }
}
