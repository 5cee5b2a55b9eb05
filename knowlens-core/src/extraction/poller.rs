//! Bounded polling for index status
//!
//! After a persisted extraction, callers wait for the service to finish
//! indexing the target before querying it. The wait is an explicit loop
//! with an attempt counter, exponential backoff and a hard upper bound.

use crate::error::{KnowlensError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Index state reported by the service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum IndexStatus {
    Ready,
    Indexing {
        #[serde(default)]
        progress: Option<f64>,
    },
    Missing,
    Failed {
        message: String,
    },
}

/// Where index status comes from
#[async_trait]
pub trait IndexStatusSource: Send + Sync {
    async fn index_status(&self, target: &str) -> Result<IndexStatus>;
}

/// Backoff schedule for [`IndexStatusPoller`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total number of status checks, including the first
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub backoff_factor: f64,
    pub max_delay: Duration,
    /// Random spread applied to each delay (0.0 - 1.0)
    pub jitter: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            initial_delay: Duration::from_millis(500),
            backoff_factor: 2.0,
            max_delay: Duration::from_secs(10),
            jitter: 0.1,
        }
    }
}

impl RetryPolicy {
    pub fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            return Err(KnowlensError::ConfigError(
                "max_attempts must be greater than 0".to_string(),
            ));
        }
        if self.backoff_factor < 1.0 {
            return Err(KnowlensError::ConfigError(
                "backoff_factor must be at least 1.0".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.jitter) {
            return Err(KnowlensError::ConfigError(
                "jitter must be between 0.0 and 1.0".to_string(),
            ));
        }

        Ok(())
    }

    /// Delay to wait after the given (1-based) failed attempt
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(32) as i32;
        let base = self.initial_delay.as_secs_f64() * self.backoff_factor.powi(exponent);
        let capped = base.min(self.max_delay.as_secs_f64());

        if self.jitter == 0.0 {
            return Duration::from_secs_f64(capped);
        }

        let spread = capped * self.jitter;
        let jittered = capped + (rand::random::<f64>() * 2.0 - 1.0) * spread;
        Duration::from_secs_f64(jittered.clamp(0.0, self.max_delay.as_secs_f64()))
    }
}

/// How a successful wait went
#[derive(Debug, Clone, PartialEq)]
pub struct PollReport {
    pub attempts: u32,
    pub elapsed: Duration,
}

/// Polls an [`IndexStatusSource`] until the target is ready
pub struct IndexStatusPoller<S> {
    source: S,
    policy: RetryPolicy,
}

impl<S: IndexStatusSource> IndexStatusPoller<S> {
    pub fn new(source: S, policy: RetryPolicy) -> Self {
        Self { source, policy }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Wait for `target` to become ready
    ///
    /// A `Failed` status stops immediately. Source errors, `Missing` and
    /// `Indexing` are retried until `max_attempts` checks have been made.
    pub async fn wait_until_ready(&self, target: &str) -> Result<PollReport> {
        self.policy.validate()?;

        let start = Instant::now();
        let mut attempt = 0;

        loop {
            attempt += 1;

            match self.source.index_status(target).await {
                Ok(IndexStatus::Ready) => {
                    info!("Index ready for {} after {} attempt(s)", target, attempt);
                    return Ok(PollReport {
                        attempts: attempt,
                        elapsed: start.elapsed(),
                    });
                }
                Ok(IndexStatus::Failed { message }) => {
                    warn!("Indexing failed for {}: {}", target, message);
                    return Err(KnowlensError::Other(format!(
                        "Indexing failed for {}: {}",
                        target, message
                    )));
                }
                Ok(status) => {
                    debug!("Index not ready for {} ({:?})", target, status);
                }
                Err(e) => {
                    warn!("Index status check failed for {}: {}", target, e);
                }
            }

            if attempt >= self.policy.max_attempts {
                return Err(KnowlensError::RetryExhausted {
                    attempts: attempt,
                    context: format!("waiting for index of {}", target),
                });
            }

            let delay = self.policy.delay_for(attempt);
            debug!(
                "Index status attempt {}/{} for {}, retrying after {:?}",
                attempt, self.policy.max_attempts, target, delay
            );
            tokio::time::sleep(delay).await;
        }
    }
}
