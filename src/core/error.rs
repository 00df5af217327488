// @file: up_proxy/src/core/error.rs
// @description: Error taxonomy shared by the fetch pipeline, cache and HTTP layer.
// @author: LAS.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("Upstream returned {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Rate limit not lifted for {url} after {attempts} attempts")]
    RateLimitExhausted { url: String, attempts: u32 },

    #[error("Concurrent refresh failed: {0}")]
    RefreshFailed(String),

    #[error("Malformed amount '{value}' on transaction {id}")]
    MalformedAmount { id: String, value: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}
