// @file: up_proxy/src/core/interfaces.rs
// @description: Traits for pluggable transaction sources and the cache clock.
// @author: LAS.

use crate::core::error::ProxyError;
use crate::core::models::RawTransaction;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

//
// TRAIT DEFINITIONS
//

#[async_trait]
pub trait TransactionSource: Send + Sync {
    // #1. Full listing, newest first, as the upstream orders it
    async fn fetch_all(&self) -> Result<Vec<RawTransaction>, ProxyError>;

    // #2. Short label for logs
    fn name(&self) -> &'static str;
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}


//
// PRODUCTION CLOCK
//

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
