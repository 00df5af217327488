// @file: up_proxy/src/tests/mod.rs
// @description: Service-level suites run against a mock Up API.
// @author: LAS.

mod support;
