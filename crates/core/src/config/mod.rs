//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (REFLEKT_*)
//! 2. TOML config file (if REFLEKT_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use url::Url;

mod validation;

pub use validation::ConfigError;

/// Thresholds a touch sequence must meet to count as a tab swipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwipeConfig {
    /// Minimum horizontal travel in CSS pixels.
    #[serde(default = "default_min_distance_px")]
    pub min_distance_px: f64,

    /// Maximum deviation from horizontal, in degrees.
    #[serde(default = "default_max_angle_deg")]
    pub max_angle_deg: f64,
}

impl Default for SwipeConfig {
    fn default() -> Self {
        Self { min_distance_px: default_min_distance_px(), max_angle_deg: default_max_angle_deg() }
    }
}

fn default_min_distance_px() -> f64 {
    60.0
}

fn default_max_angle_deg() -> f64 {
    30.0
}

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (REFLEKT_*)
/// 2. TOML config file (if REFLEKT_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Origin the worker is registered for; precache paths resolve against it.
    ///
    /// Set via REFLEKT_ORIGIN environment variable.
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Versioned name of the cache store. Bump to invalidate old entries.
    ///
    /// Set via REFLEKT_CACHE_NAME environment variable.
    #[serde(default = "default_cache_name")]
    pub cache_name: String,

    /// Path to SQLite cache database.
    ///
    /// Set via REFLEKT_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// User-Agent string for live fetches.
    ///
    /// Set via REFLEKT_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Live fetch timeout in milliseconds.
    ///
    /// Set via REFLEKT_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Maximum bytes accepted per live response.
    ///
    /// Set via REFLEKT_MAX_BYTES environment variable.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// Asset paths stored at install time.
    #[serde(default = "default_precache")]
    pub precache: Vec<String>,

    /// Page served when a navigation cannot reach the network.
    ///
    /// Must be listed in `precache`.
    #[serde(default = "default_offline_page")]
    pub offline_page: String,

    /// CSS selector for the anchors that make up the tab list.
    #[serde(default = "default_nav_selector")]
    pub nav_selector: String,

    /// Tab paths used when the page has no navigation anchors.
    #[serde(default = "default_fallback_tabs")]
    pub fallback_tabs: Vec<String>,

    /// Swipe thresholds (REFLEKT_SWIPE__MIN_DISTANCE_PX, REFLEKT_SWIPE__MAX_ANGLE_DEG).
    #[serde(default)]
    pub swipe: SwipeConfig,
}

fn default_origin() -> String {
    "http://localhost:5000".into()
}

fn default_cache_name() -> String {
    "reflekt-cache-v1".into()
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./reflekt-sw-cache.sqlite")
}

fn default_user_agent() -> String {
    "reflekt-sw/0.1".into()
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_max_bytes() -> usize {
    5_242_880 // 5MB
}

fn default_precache() -> Vec<String> {
    [
        "/",
        "/static/style.css",
        "/static/offline.html",
        "/static/icons/icon-192.png",
        "/static/icons/icon-512.png",
        "/static/manifest.json",
        "/static/swipe.js",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_offline_page() -> String {
    "/static/offline.html".into()
}

fn default_nav_selector() -> String {
    "nav a[href]".into()
}

fn default_fallback_tabs() -> Vec<String> {
    vec!["/".into(), "/reflections".into(), "/profile".into()]
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            origin: default_origin(),
            cache_name: default_cache_name(),
            db_path: default_db_path(),
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
            max_bytes: default_max_bytes(),
            precache: default_precache(),
            offline_page: default_offline_page(),
            nav_selector: default_nav_selector(),
            fallback_tabs: default_fallback_tabs(),
            swipe: SwipeConfig::default(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Parsed origin URL.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if the origin is not an absolute http(s) URL.
    pub fn origin_url(&self) -> Result<Url, ConfigError> {
        let url = Url::parse(&self.origin)
            .map_err(|e| ConfigError::Invalid { field: "origin".into(), reason: e.to_string() })?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            scheme => Err(ConfigError::Invalid { field: "origin".into(), reason: format!("unsupported scheme: {scheme}") }),
        }
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `REFLEKT_`
    /// 2. TOML file from `REFLEKT_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("REFLEKT_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("REFLEKT_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
