// @file: up_proxy\src\lib.rs
// @description: Exposes the modular architecture for the binary and the test suite.
// @author: LAS.


pub mod api;
pub mod core;
pub mod connectors;
pub mod utils;

#[cfg(test)]
mod tests;
