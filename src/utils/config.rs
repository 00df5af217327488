// @file: up_proxy/src/utils/config.rs
// @description: Layered configuration: defaults, optional config file, .env and environment.
// @author: LAS.

use std::time::Duration;
use serde::Deserialize;
use config::{Config, ConfigError, File, Environment};
use crate::core::models::{AmountPolicy, DataSource};

// One year
const MAX_PERIOD_SECS: u64 = 365 * 24 * 60 * 60;

//
// TYPE DEFINITIONS
//

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,

    // Server Settings
    pub bind_host: String,
    pub port: u16,

    // Upstream
    pub up_token: String,
    pub up_base_url: String,
    pub page_size: usize,
    pub page_delay_ms: u64,

    // Rate Limit Backoff
    pub rate_limit_cooldown_ms: u64,
    pub rate_limit_backoff_factor: f64,
    pub rate_limit_max_cooldown_ms: u64,
    pub rate_limit_max_retries: u32,

    // Cache & Data Source
    pub cache_ttl_secs: u64,
    pub data_source: DataSource,
    pub local_file_path: String,
    pub snapshot_on_fetch: bool,
    pub amount_policy: AmountPolicy,

    // Scheduler
    pub self_url: Option<String>,
    pub keep_alive_enabled: bool,
    pub keep_alive_interval_secs: u64,
    pub keep_alive_path: String,
    pub prewarm_hour_utc: u32,
    pub prewarm_path: String,
}

impl AppConfig {
    //
    // PUBLIC INTERFACE
    //

    pub fn load() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        let builder = Config::builder()
            .set_default("log_level", "info")?

            // Server Defaults
            .set_default("bind_host", "0.0.0.0")?
            .set_default("port", 3000)?

            // Up API
            .set_default("up_token", "")?
            .set_default("up_base_url", "https://api.up.com.au/api/v1")?
            .set_default("page_size", 100)?
            .set_default("page_delay_ms", 250)?

            // 429 Handling
            .set_default("rate_limit_cooldown_ms", 30_000)?
            .set_default("rate_limit_backoff_factor", 1.0)?
            .set_default("rate_limit_max_cooldown_ms", 300_000)?
            .set_default("rate_limit_max_retries", 20)?

            // Cache
            .set_default("cache_ttl_secs", 1800)?
            .set_default("data_source", "live")?
            .set_default("local_file_path", "transactions.json")?
            .set_default("snapshot_on_fetch", false)?
            .set_default("amount_policy", "lenient")?

            // Scheduler
            .set_default("keep_alive_enabled", true)?
            .set_default("keep_alive_interval_secs", 600)?
            .set_default("keep_alive_path", "/api/transactions/tableau")?
            .set_default("prewarm_hour_utc", 6)?
            .set_default("prewarm_path", "/api/transactions/csv")?

            // File & Env Overrides
            .add_source(File::with_name("config").required(false))
            .add_source(Environment::with_prefix("APP"))

            // Host conventions
            .set_override_option("port", std::env::var("PORT").ok())?
            .set_override_option("up_token", std::env::var("UP_TOKEN").ok())?
            .set_override_option("self_url", std::env::var("SELF_URL").ok())?;

        let config: AppConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values the duration conversions below cannot represent.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache_ttl_secs > MAX_PERIOD_SECS {
            return Err(ConfigError::Message(format!(
                "cache_ttl_secs must be at most {} (got {})",
                MAX_PERIOD_SECS, self.cache_ttl_secs
            )));
        }
        if self.keep_alive_interval_secs > MAX_PERIOD_SECS {
            return Err(ConfigError::Message(format!(
                "keep_alive_interval_secs must be at most {} (got {})",
                MAX_PERIOD_SECS, self.keep_alive_interval_secs
            )));
        }
        if self.prewarm_hour_utc > 23 {
            return Err(ConfigError::Message(format!(
                "prewarm_hour_utc must be between 0 and 23 (got {})",
                self.prewarm_hour_utc
            )));
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.bind_host, self.port)
    }

    pub fn cache_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.cache_ttl_secs as i64)
    }

    pub fn keep_alive_interval(&self) -> Duration {
        Duration::from_secs(self.keep_alive_interval_secs.max(1))
    }
}
