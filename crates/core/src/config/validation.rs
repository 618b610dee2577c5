//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid { field: field.into(), reason: reason.into() }
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache_name.trim().is_empty() {
            return Err(invalid("cache_name", "must not be empty"));
        }

        self.origin_url()?;

        if self.user_agent.is_empty() {
            return Err(invalid("user_agent", "must not be empty"));
        }

        if self.max_bytes == 0 {
            return Err(invalid("max_bytes", "must be greater than 0"));
        }
        if self.max_bytes > 50 * 1024 * 1024 {
            return Err(invalid("max_bytes", "must not exceed 50MB"));
        }

        if self.timeout_ms < 100 {
            return Err(invalid("timeout_ms", "must be at least 100ms"));
        }
        if self.timeout_ms > 300_000 {
            return Err(invalid("timeout_ms", "must not exceed 5 minutes (300000ms)"));
        }

        if self.precache.is_empty() {
            return Err(invalid("precache", "must list at least one asset"));
        }
        if !self.precache.contains(&self.offline_page) {
            return Err(invalid("offline_page", "must be listed in precache"));
        }

        if self.fallback_tabs.is_empty() {
            return Err(invalid("fallback_tabs", "must not be empty"));
        }
        if self.nav_selector.trim().is_empty() {
            return Err(invalid("nav_selector", "must not be empty"));
        }

        if self.swipe.min_distance_px.is_nan() || self.swipe.min_distance_px <= 0.0 {
            return Err(invalid("swipe.min_distance_px", "must be greater than 0"));
        }
        if !(0.0..90.0).contains(&self.swipe.max_angle_deg) || self.swipe.max_angle_deg == 0.0 {
            return Err(invalid("swipe.max_angle_deg", "must be between 0 and 90 degrees"));
        }

        if self.precache.len() > 50 {
            tracing::warn!(
                precache_count = self.precache.len(),
                "Large precache manifest; a single failed asset fails the whole install"
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SwipeConfig;

    fn assert_invalid(config: AppConfig, expected: &str) {
        let result = config.validate();
        assert!(
            matches!(&result, Err(ConfigError::Invalid { field, .. }) if field == expected),
            "expected {expected} to be rejected, got {result:?}"
        );
    }

    #[test]
    fn test_validate_default_config() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_empty_cache_name() {
        assert_invalid(AppConfig { cache_name: "  ".into(), ..Default::default() }, "cache_name");
    }

    #[test]
    fn test_validate_bad_origin() {
        assert_invalid(AppConfig { origin: "not a url".into(), ..Default::default() }, "origin");
    }

    #[test]
    fn test_validate_max_bytes_bounds() {
        assert_invalid(AppConfig { max_bytes: 0, ..Default::default() }, "max_bytes");
        assert_invalid(AppConfig { max_bytes: 51 * 1024 * 1024, ..Default::default() }, "max_bytes");
    }

    #[test]
    fn test_validate_timeout_bounds() {
        assert_invalid(AppConfig { timeout_ms: 50, ..Default::default() }, "timeout_ms");
        assert_invalid(AppConfig { timeout_ms: 301_000, ..Default::default() }, "timeout_ms");
    }

    #[test]
    fn test_validate_offline_page_must_be_precached() {
        let config = AppConfig { offline_page: "/offline".into(), ..Default::default() };
        assert_invalid(config, "offline_page");
    }

    #[test]
    fn test_validate_empty_precache() {
        assert_invalid(AppConfig { precache: Vec::new(), ..Default::default() }, "precache");
    }

    #[test]
    fn test_validate_empty_fallback_tabs() {
        assert_invalid(AppConfig { fallback_tabs: Vec::new(), ..Default::default() }, "fallback_tabs");
    }

    #[test]
    fn test_validate_swipe_thresholds() {
        let config = AppConfig { swipe: SwipeConfig { min_distance_px: 0.0, max_angle_deg: 30.0 }, ..Default::default() };
        assert_invalid(config, "swipe.min_distance_px");

        let config = AppConfig { swipe: SwipeConfig { min_distance_px: 60.0, max_angle_deg: 90.0 }, ..Default::default() };
        assert_invalid(config, "swipe.max_angle_deg");
    }

    #[test]
    fn test_validate_edge_case_values() {
        let config = AppConfig { max_bytes: 1, timeout_ms: 100, ..Default::default() };
        assert!(config.validate().is_ok());
    }
}
