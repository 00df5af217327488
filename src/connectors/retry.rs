// @file: up_proxy/src/connectors/retry.rs
// @description: Backoff policy applied when the upstream answers 429.
// @author: LAS.

use std::time::Duration;
use crate::utils::config::AppConfig;

#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub cooldown: Duration,
    pub backoff_factor: f64,
    pub max_cooldown: Duration,
    /// Zero means retry forever.
    pub max_retries: u32,
}

impl RetryPolicy {
    pub fn fixed(cooldown: Duration, max_retries: u32) -> Self {
        Self {
            cooldown,
            backoff_factor: 1.0,
            max_cooldown: cooldown,
            max_retries,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            cooldown: Duration::from_millis(config.rate_limit_cooldown_ms),
            backoff_factor: config.rate_limit_backoff_factor.max(1.0),
            max_cooldown: Duration::from_millis(config.rate_limit_max_cooldown_ms),
            max_retries: config.rate_limit_max_retries,
        }
    }

    /// `attempt` counts the 429s seen so far for the current request, starting at 1.
    pub fn should_retry(&self, attempt: u32) -> bool {
        self.max_retries == 0 || attempt <= self.max_retries
    }

    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent: i32 = attempt.saturating_sub(1).min(32) as i32;
        let scaled: f64 = self.cooldown.as_secs_f64() * self.backoff_factor.powi(exponent);
        let capped: f64 = scaled.min(self.max_cooldown.as_secs_f64().max(self.cooldown.as_secs_f64()));
        Duration::from_secs_f64(capped)
    }
}
