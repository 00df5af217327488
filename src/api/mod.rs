// @file: up_proxy/src/api/mod.rs
// @description: HTTP surface.
// @author: LAS.

pub mod http_server;
