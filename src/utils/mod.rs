// @file: up_proxy/src/utils/mod.rs
// @description: Configuration and background jobs.
// @author: LAS.

pub mod config;
pub mod scheduler;
