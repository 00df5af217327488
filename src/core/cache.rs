// @file: up_proxy/src/core/cache.rs
// @description: TTL cache over the flattened transaction set with a single-flight refresh.
// @author: LAS.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use chrono::{DateTime, Duration, Utc};
use log::{debug, info, warn};
use tokio::sync::{Mutex, RwLock};
use crate::core::csv_export::to_csv;
use crate::core::error::ProxyError;
use crate::core::flatten::flatten;
use crate::core::interfaces::{Clock, TransactionSource};
use crate::core::models::{AmountPolicy, FlatTransaction};


//
// CACHE ENTRY
//

/// One refresh worth of data. The CSV text is rendered from `rows` when the
/// entry is built and never touched afterwards.
#[derive(Debug)]
pub struct CacheEntry {
    rows: Vec<FlatTransaction>,
    csv_text: String,
    fetched_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn build(rows: Vec<FlatTransaction>, fetched_at: DateTime<Utc>) -> Result<Self, ProxyError> {
        let csv_text: String = to_csv(&rows)?;
        Ok(Self { rows, csv_text, fetched_at })
    }

    pub fn rows(&self) -> &[FlatTransaction] {
        &self.rows
    }

    pub fn csv_text(&self) -> &str {
        &self.csv_text
    }

    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.fetched_at < ttl
    }
}


//
// CACHE STRUCT
//

pub struct TransactionCache {
    source: Arc<dyn TransactionSource>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    amount_policy: AmountPolicy,
    entry: RwLock<Option<Arc<CacheEntry>>>,
    // Holds the attempt number and message of the last failed refresh
    refresh_guard: Mutex<Option<(u64, String)>>,
    attempts: AtomicU64,
}

impl TransactionCache {
    //
    // INITIALIZATION
    //

    pub fn new(
        source: Arc<dyn TransactionSource>,
        clock: Arc<dyn Clock>,
        ttl: Duration,
        amount_policy: AmountPolicy,
    ) -> Self {
        Self {
            source,
            clock,
            ttl,
            amount_policy,
            entry: RwLock::new(None),
            refresh_guard: Mutex::new(None),
            attempts: AtomicU64::new(0),
        }
    }


    //
    // PUBLIC INTERFACE
    //

    pub async fn get_or_refresh(&self) -> Result<Arc<CacheEntry>, ProxyError> {
        // #1. Remember which attempt was current when we arrived
        let seen: u64 = self.attempts.load(Ordering::SeqCst);

        // #2. Fast path, no refresh lock
        if let Some(entry) = self.fresh_entry().await {
            debug!("Cache hit (fetched at {})", entry.fetched_at());
            return Ok(entry);
        }

        // #3. Single-flight: whoever holds the guard refreshes, the rest wait
        let mut last_failure = self.refresh_guard.lock().await;

        // #4. Re-check, the previous holder may have refreshed already
        if let Some(entry) = self.fresh_entry().await {
            debug!("Cache refreshed by a concurrent caller");
            return Ok(entry);
        }

        // #5. An attempt finished while we waited and failed: share its outcome
        let current: u64 = self.attempts.load(Ordering::SeqCst);
        if current != seen {
            if let Some((attempt, message)) = last_failure.as_ref() {
                if *attempt == current {
                    debug!("Sharing failure of refresh attempt {}", attempt);
                    return Err(ProxyError::RefreshFailed(message.clone()));
                }
            }
        }

        // #6. Our turn
        let result = self.refresh().await;
        let attempt: u64 = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        match &result {
            Ok(_) => *last_failure = None,
            Err(e) => {
                warn!("Refresh attempt {} failed: {}", attempt, e);
                *last_failure = Some((attempt, e.to_string()));
            }
        }

        result
    }

    pub async fn peek(&self) -> Option<Arc<CacheEntry>> {
        self.entry.read().await.clone()
    }


    //
    // INTERNAL HELPERS
    //

    async fn fresh_entry(&self) -> Option<Arc<CacheEntry>> {
        let now = self.clock.now();
        let guard = self.entry.read().await;
        guard
            .as_ref()
            .filter(|entry| entry.is_fresh(now, self.ttl))
            .cloned()
    }

    async fn refresh(&self) -> Result<Arc<CacheEntry>, ProxyError> {
        info!("Refreshing transactions from {} source", self.source.name());

        // #1. Fetch and transform outside the entry lock
        let raw = self.source.fetch_all().await?;
        let rows: Vec<FlatTransaction> = flatten(raw, self.amount_policy)?;
        let entry: Arc<CacheEntry> = Arc::new(CacheEntry::build(rows, self.clock.now())?);

        // #2. Swap wholesale
        {
            let mut guard = self.entry.write().await;
            *guard = Some(entry.clone());
        }

        info!("Cached {} transactions", entry.rows().len());
        Ok(entry)
    }
}
