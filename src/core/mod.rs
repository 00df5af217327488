// @file: up_proxy/src/core/mod.rs
// @description: Exports the transaction pipeline: models, flattening, CSV and cache.
// @author: LAS.

pub mod cache;
pub mod csv_export;
pub mod error;
pub mod flatten;
pub mod interfaces;
pub mod models;
