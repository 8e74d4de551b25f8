//! Configuration types, loaded from a TOML file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::api::{ALADHAN_BASE_URL, Location, MYMEMORY_BASE_URL};
use crate::error::{Error, Result};

const TEMPLATE_HEADER: &str = "\
# mawaqit configuration
#
# Timings are fetched for [location]. Set [api] timeout_secs to stop a
# stalled request; without it a request may wait indefinitely.

";

/// Remote service endpoints and languages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the timings API.
    pub timings_url: String,
    /// Base URL of the translation API.
    pub translate_url: String,
    /// Language the timezone city is reported in.
    pub from_lang: String,
    /// Language the city label is shown in.
    pub to_lang: String,
    /// Per-request timeout in seconds. Unset means no timeout.
    pub timeout_secs: Option<u64>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            timings_url: ALADHAN_BASE_URL.to_string(),
            translate_url: MYMEMORY_BASE_URL.to_string(),
            from_lang: "en-GB".to_string(),
            to_lang: "ar-SA".to_string(),
            timeout_secs: None,
        }
    }
}

impl ApiConfig {
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// HTTP widget endpoint configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address.
    pub host: String,
    /// Port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 9724,
        }
    }
}

/// Offline asset cache configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Cache store name.
    pub name: String,
    /// Directory holding cache stores. Defaults to the user cache directory.
    pub dir: Option<PathBuf>,
    /// Asset paths, relative to the asset root, stored on install.
    pub assets: Vec<String>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            name: "static".to_string(),
            dir: None,
            assets: vec![
                "index.html".to_string(),
                "css/index.css".to_string(),
                "js/index.js".to_string(),
            ],
        }
    }
}

impl CacheConfig {
    /// Returns the configured cache directory or the platform default.
    #[must_use]
    pub fn resolved_dir(&self) -> PathBuf {
        self.dir.clone().unwrap_or_else(|| {
            dirs::cache_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("mawaqit")
        })
    }
}

/// Countdown timing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CountdownConfig {
    /// Milliseconds between countdown ticks.
    pub tick_millis: u64,
}

impl Default for CountdownConfig {
    fn default() -> Self {
        Self { tick_millis: 1000 }
    }
}

impl CountdownConfig {
    /// Tick period. Never zero, since a zero interval cannot tick.
    #[must_use]
    pub const fn period(&self) -> Duration {
        if self.tick_millis == 0 {
            Duration::from_millis(1)
        } else {
            Duration::from_millis(self.tick_millis)
        }
    }
}

/// Complete application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub location: Location,
    pub api: ApiConfig,
    pub server: ServerConfig,
    pub cache: CacheConfig,
    pub countdown: CountdownConfig,
}

impl AppConfig {
    /// Creates a new config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the location timings are fetched for.
    #[must_use]
    pub fn with_location(mut self, location: Location) -> Self {
        self.location = location;
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout_secs(mut self, secs: Option<u64>) -> Self {
        self.api.timeout_secs = secs;
        self
    }

    /// Sets the cache directory.
    #[must_use]
    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache.dir = Some(dir.into());
        self
    }

    /// Default config file location (`$XDG_CONFIG_HOME/mawaqit/config.toml`).
    #[must_use]
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("mawaqit")
            .join("config.toml")
    }

    /// Parses a config from TOML text. Missing keys take defaults.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the text is not valid config TOML or a
    /// value is out of range.
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.countdown.tick_millis == 0 {
            return Err(Error::Config(
                "[countdown] tick_millis must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Loads the config at `path`, writing a default template first if the
    /// file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, written or parsed.
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            return Self::from_toml(&contents);
        }

        let config = Self::default();
        config.save(path)?;
        log::info!("Wrote default config to {}", path.display());
        Ok(config)
    }

    /// Writes the config as commented TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let body = toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))?;
        std::fs::write(path, format!("{TEMPLATE_HEADER}{body}"))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_app_config() {
        let config = AppConfig::default();
        assert!((config.location.latitude - 30.0).abs() < f64::EPSILON);
        assert!((config.location.longitude - 31.0).abs() < f64::EPSILON);
        assert_eq!(config.api.from_lang, "en-GB");
        assert_eq!(config.api.to_lang, "ar-SA");
        assert_eq!(config.api.timeout(), None);
        assert_eq!(config.server.port, 9724);
        assert_eq!(config.cache.name, "static");
        assert_eq!(config.cache.assets.len(), 3);
        assert_eq!(config.countdown.period(), Duration::from_secs(1));
    }

    #[test]
    fn builder_pattern() {
        let config = AppConfig::new()
            .with_location(Location {
                latitude: 21.4,
                longitude: 39.8,
            })
            .with_timeout_secs(Some(10))
            .with_cache_dir("/tmp/mawaqit-cache");

        assert!((config.location.latitude - 21.4).abs() < f64::EPSILON);
        assert_eq!(config.api.timeout(), Some(Duration::from_secs(10)));
        assert_eq!(config.cache.resolved_dir(), PathBuf::from("/tmp/mawaqit-cache"));
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [location]
            latitude = 24.7
            longitude = 46.7

            [api]
            timeout_secs = 5
            "#,
        )
        .unwrap();
        assert!((config.location.latitude - 24.7).abs() < f64::EPSILON);
        assert_eq!(config.api.timeout_secs, Some(5));
        assert_eq!(config.api.to_lang, "ar-SA");
        assert_eq!(config.cache.name, "static");
    }

    #[test]
    fn invalid_toml_is_config_error() {
        assert!(matches!(
            AppConfig::from_toml("[location\nlatitude = 1"),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn zero_tick_is_rejected() {
        let err = AppConfig::from_toml("[countdown]\ntick_millis = 0").unwrap_err();
        assert!(matches!(err, Error::Config(msg) if msg.contains("tick_millis")));

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[countdown]\ntick_millis = 0\n").unwrap();
        assert!(matches!(
            AppConfig::load_or_create(&path),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn zero_tick_period_is_clamped() {
        let countdown = CountdownConfig { tick_millis: 0 };
        assert_eq!(countdown.period(), Duration::from_millis(1));
        let countdown = CountdownConfig { tick_millis: 250 };
        assert_eq!(countdown.period(), Duration::from_millis(250));
    }

    #[test]
    fn load_or_create_writes_template_then_reads_it() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let created = AppConfig::load_or_create(&path).unwrap();
        assert!(path.exists());
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("# mawaqit configuration"));

        let loaded = AppConfig::load_or_create(&path).unwrap();
        assert_eq!(loaded, created);
    }

    #[test]
    fn default_path_is_under_mawaqit() {
        let path = AppConfig::default_path();
        assert!(path.ends_with("mawaqit/config.toml"));
    }
}
