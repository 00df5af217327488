// @file: up_proxy/src/connectors/up_rest.rs
// @description: HTTP client for the Up banking API with pagination and 429 backoff.
// @author: LAS.

use std::time::Duration;
use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::time::sleep;
use crate::connectors::retry::RetryPolicy;
use crate::core::error::ProxyError;
use crate::core::interfaces::TransactionSource;
use crate::core::models::{RawTransaction, TransactionPage};
use crate::utils::config::AppConfig;

//
// CLIENT STRUCT
//

#[derive(Clone)]
pub struct UpClient {
    http: Client,
    base_url: String,
    token: String,
    page_size: usize,
    page_delay: Duration,
    retry: RetryPolicy,
}

impl UpClient {
    pub fn new(
        base_url: impl Into<String>,
        token: impl Into<String>,
        page_size: usize,
        page_delay: Duration,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
            page_size: page_size.max(1),
            page_delay,
            retry,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.up_base_url.clone(),
            config.up_token.clone(),
            config.page_size,
            Duration::from_millis(config.page_delay_ms),
            RetryPolicy::from_config(config),
        )
    }


    //
    // PUBLIC INTERFACE
    //

    pub fn initial_transactions_url(&self) -> String {
        format!("{}/transactions?page[size]={}", self.base_url, self.page_size)
    }

    pub async fn fetch_all_transactions(&self) -> Result<Vec<RawTransaction>, ProxyError> {
        let mut all: Vec<RawTransaction> = Vec::new();
        let mut next: Option<String> = Some(self.initial_transactions_url());
        let mut pages: usize = 0;

        // #1. Walk `links.next` until the upstream stops handing one out
        while let Some(url) = next {
            let page: TransactionPage = self.get_json(&url).await?;
            pages += 1;
            debug!("Page {} returned {} transactions", pages, page.data.len());

            all.extend(page.data);
            next = page.links.next;

            // #2. Courtesy pause between pages
            if next.is_some() && !self.page_delay.is_zero() {
                sleep(self.page_delay).await;
            }
        }

        info!("Fetched {} transactions across {} pages", all.len(), pages);
        Ok(all)
    }

    pub async fn fetch_accounts(&self) -> Result<Value, ProxyError> {
        let url: String = format!("{}/accounts", self.base_url);
        self.get_json(&url).await
    }


    //
    // INTERNAL HELPERS
    //

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ProxyError> {
        let response: Response = self.get_with_backoff(url).await?;
        Ok(response.json::<T>().await?)
    }

    async fn get_with_backoff(&self, url: &str) -> Result<Response, ProxyError> {
        let mut attempt: u32 = 0;

        loop {
            let response: Response = self
                .http
                .get(url)
                .bearer_auth(&self.token)
                .send()
                .await?;

            let status: StatusCode = response.status();

            if status == StatusCode::TOO_MANY_REQUESTS {
                attempt += 1;
                if !self.retry.should_retry(attempt) {
                    return Err(ProxyError::RateLimitExhausted {
                        url: url.to_string(),
                        attempts: attempt,
                    });
                }
                let delay: Duration = self.retry.delay_for(attempt);
                warn!("Rate limited on {} (attempt {}), retrying in {:?}", url, attempt, delay);
                sleep(delay).await;
                continue;
            }

            if !status.is_success() {
                let body: String = response.text().await.unwrap_or_default();
                return Err(ProxyError::Upstream {
                    status: status.as_u16(),
                    body,
                });
            }

            return Ok(response);
        }
    }
}


//
// SOURCE IMPLEMENTATION
//

#[async_trait]
impl TransactionSource for UpClient {
    async fn fetch_all(&self) -> Result<Vec<RawTransaction>, ProxyError> {
        self.fetch_all_transactions().await
    }

    fn name(&self) -> &'static str {
        "live"
    }
}
