// @file: up_proxy/src/connectors/mod.rs
// @description: Factory for the configured transaction source.
// @author: LAS.

pub mod local_file;
pub mod retry;
pub mod up_rest;

use std::sync::Arc;
use crate::connectors::local_file::{LocalFileSource, SnapshotSource};
use crate::connectors::up_rest::UpClient;
use crate::core::interfaces::TransactionSource;
use crate::core::models::DataSource;
use crate::utils::config::AppConfig;

//
// FACTORY FUNCTION
//

pub fn build_source(config: &AppConfig, client: &UpClient) -> Arc<dyn TransactionSource> {
    match config.data_source {
        DataSource::Live if config.snapshot_on_fetch => {
            Arc::new(SnapshotSource::new(client.clone(), config.local_file_path.clone()))
        }
        DataSource::Live => Arc::new(client.clone()),
        DataSource::LocalFile => Arc::new(LocalFileSource::new(config.local_file_path.clone())),
    }
}
