// @file: up_proxy/src/connectors/local_file.rs
// @description: Offline transaction source backed by a JSON file, plus the snapshot writer feeding it.
// @author: LAS.

use std::path::{Path, PathBuf};
use async_trait::async_trait;
use log::{info, warn};
use serde::Deserialize;
use crate::core::error::ProxyError;
use crate::core::interfaces::TransactionSource;
use crate::core::models::{RawTransaction, TransactionPage};

//
// FILE FORMATS
//

// Accepts a saved upstream page as well as a bare array.
#[derive(Deserialize)]
#[serde(untagged)]
enum LocalDocument {
    Page(TransactionPage),
    List(Vec<RawTransaction>),
}


//
// LOCAL FILE SOURCE
//

pub struct LocalFileSource {
    path: PathBuf,
}

impl LocalFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl TransactionSource for LocalFileSource {
    async fn fetch_all(&self) -> Result<Vec<RawTransaction>, ProxyError> {
        // #1. Missing or unreadable file is an empty dataset, not a failure
        let bytes: Vec<u8> = match tokio::fs::read(&self.path).await {
            Ok(b) => b,
            Err(e) => {
                warn!("Local transactions file {:?} unavailable ({}), serving empty set", self.path, e);
                return Ok(Vec::new());
            }
        };

        // #2. Same for content that does not parse
        match serde_json::from_slice::<LocalDocument>(&bytes) {
            Ok(LocalDocument::Page(page)) => Ok(page.data),
            Ok(LocalDocument::List(list)) => Ok(list),
            Err(e) => {
                warn!("Local transactions file {:?} is not valid JSON ({}), serving empty set", self.path, e);
                Ok(Vec::new())
            }
        }
    }

    fn name(&self) -> &'static str {
        "local_file"
    }
}


//
// SNAPSHOTTING WRAPPER
//

/// Passes fetches through and writes each successful result to disk so a
/// later run in `local_file` mode can serve it.
pub struct SnapshotSource<S> {
    inner: S,
    path: PathBuf,
}

impl<S: TransactionSource> SnapshotSource<S> {
    pub fn new(inner: S, path: impl Into<PathBuf>) -> Self {
        Self { inner, path: path.into() }
    }
}

#[async_trait]
impl<S: TransactionSource> TransactionSource for SnapshotSource<S> {
    async fn fetch_all(&self) -> Result<Vec<RawTransaction>, ProxyError> {
        let rows = self.inner.fetch_all().await?;

        if let Err(e) = save_snapshot(&self.path, &rows).await {
            warn!("Could not write snapshot to {:?}: {}", self.path, e);
        }

        Ok(rows)
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }
}

pub async fn save_snapshot(path: &Path, rows: &[RawTransaction]) -> Result<(), ProxyError> {
    let json: Vec<u8> = serde_json::to_vec_pretty(rows)?;
    tokio::fs::write(path, json).await?;
    info!("Wrote snapshot of {} transactions to {:?}", rows.len(), path);
    Ok(())
}
