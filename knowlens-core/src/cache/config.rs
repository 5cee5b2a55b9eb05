//! Configuration for the layout cache

use crate::error::{KnowlensError, Result};
use serde::{Deserialize, Serialize};

/// Environment variable overriding [`CacheConfig::max_cache_size`]
pub const ENV_CACHE_MAX_SIZE: &str = "KNOWLENS_CACHE_MAX_SIZE";

/// Configuration for the graph layout cache
///
/// Layout artifacts are large and few, so the default capacity is small:
/// the eviction scan is linear in the number of resident entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of resident entries
    pub max_cache_size: usize,

    /// Enable hit/miss/eviction counters
    pub enable_metrics: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_cache_size: 50,
            enable_metrics: true,
        }
    }
}

impl CacheConfig {
    /// Create a new builder for cache configuration
    pub fn builder() -> CacheConfigBuilder {
        CacheConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.max_cache_size == 0 {
            return Err(KnowlensError::ConfigError(
                "max_cache_size must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Load configuration from the environment (and `.env`), falling back to defaults
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let mut config = Self::default();
        if let Ok(raw) = std::env::var(ENV_CACHE_MAX_SIZE) {
            config.max_cache_size = raw.trim().parse().map_err(|e| {
                KnowlensError::ConfigError(format!("{}={:?}: {}", ENV_CACHE_MAX_SIZE, raw, e))
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Configuration for memory-constrained panels
    pub fn small() -> Self {
        Self {
            max_cache_size: 10,
            ..Default::default()
        }
    }

    /// Configuration for long-lived sessions browsing many graphs
    pub fn large() -> Self {
        Self {
            max_cache_size: 500,
            ..Default::default()
        }
    }
}

/// Builder for cache configuration
#[derive(Debug, Default)]
pub struct CacheConfigBuilder {
    max_cache_size: Option<usize>,
    enable_metrics: Option<bool>,
}

impl CacheConfigBuilder {
    /// Set maximum number of resident entries
    pub fn max_cache_size(mut self, max: usize) -> Self {
        self.max_cache_size = Some(max);
        self
    }

    /// Enable or disable metrics collection
    pub fn enable_metrics(mut self, enable: bool) -> Self {
        self.enable_metrics = Some(enable);
        self
    }

    /// Build the cache configuration
    pub fn build(self) -> CacheConfig {
        let defaults = CacheConfig::default();

        CacheConfig {
            max_cache_size: self.max_cache_size.unwrap_or(defaults.max_cache_size),
            enable_metrics: self.enable_metrics.unwrap_or(defaults.enable_metrics),
        }
    }
}
