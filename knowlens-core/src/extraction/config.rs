//! Configuration for the extraction coordinator

use crate::error::{KnowlensError, Result};
use crate::extraction::types::ExtractionMode;
use serde::{Deserialize, Serialize};

pub const ENV_EXTRACTION_MODE: &str = "KNOWLENS_EXTRACTION_MODE";
pub const ENV_PERSIST_RESULTS: &str = "KNOWLENS_PERSIST_RESULTS";
pub const ENV_GUARD_SEQUENCE: &str = "KNOWLENS_GUARD_SEQUENCE";

/// Configuration for [`StreamingExtractionCoordinator`](crate::extraction::StreamingExtractionCoordinator)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoordinatorConfig {
    /// Mode used when the caller does not pick one
    pub default_mode: ExtractionMode,

    /// Ask the service to persist results
    pub persist_results: bool,

    /// Drop events whose producer sequence is not newer than the last applied one
    pub guard_sequence: bool,

    /// Buffer size for message channels created by callers
    pub channel_capacity: usize,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            default_mode: ExtractionMode::Full,
            persist_results: true,
            guard_sequence: true,
            channel_capacity: 64,
        }
    }
}

impl CoordinatorConfig {
    pub fn builder() -> CoordinatorConfigBuilder {
        CoordinatorConfigBuilder::default()
    }

    pub fn validate(&self) -> Result<()> {
        if self.channel_capacity == 0 {
            return Err(KnowlensError::ConfigError(
                "channel_capacity must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Load configuration from the environment (and `.env`), falling back to defaults
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let mut config = Self::default();

        if let Ok(raw) = std::env::var(ENV_EXTRACTION_MODE) {
            config.default_mode = raw.parse::<ExtractionMode>().map_err(|_| {
                KnowlensError::ConfigError(format!("{}: unknown mode {:?}", ENV_EXTRACTION_MODE, raw))
            })?;
        }
        if let Ok(raw) = std::env::var(ENV_PERSIST_RESULTS) {
            config.persist_results = parse_flag(ENV_PERSIST_RESULTS, &raw)?;
        }
        if let Ok(raw) = std::env::var(ENV_GUARD_SEQUENCE) {
            config.guard_sequence = parse_flag(ENV_GUARD_SEQUENCE, &raw)?;
        }

        config.validate()?;
        Ok(config)
    }
}

fn parse_flag(name: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(KnowlensError::ConfigError(format!(
            "{}: expected a boolean, got {:?}",
            name, raw
        ))),
    }
}

#[derive(Debug, Default)]
pub struct CoordinatorConfigBuilder {
    default_mode: Option<ExtractionMode>,
    persist_results: Option<bool>,
    guard_sequence: Option<bool>,
    channel_capacity: Option<usize>,
}

impl CoordinatorConfigBuilder {
    pub fn default_mode(mut self, mode: ExtractionMode) -> Self {
        self.default_mode = Some(mode);
        self
    }

    pub fn persist_results(mut self, persist: bool) -> Self {
        self.persist_results = Some(persist);
        self
    }

    pub fn guard_sequence(mut self, guard: bool) -> Self {
        self.guard_sequence = Some(guard);
        self
    }

    pub fn channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = Some(capacity);
        self
    }

    pub fn build(self) -> CoordinatorConfig {
        let defaults = CoordinatorConfig::default();

        CoordinatorConfig {
            default_mode: self.default_mode.unwrap_or(defaults.default_mode),
            persist_results: self.persist_results.unwrap_or(defaults.persist_results),
            guard_sequence: self.guard_sequence.unwrap_or(defaults.guard_sequence),
            channel_capacity: self.channel_capacity.unwrap_or(defaults.channel_capacity),
        }
    }
}
