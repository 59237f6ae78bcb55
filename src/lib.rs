pub mod config;
pub mod constants;
pub mod domain;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod storage;

// Layered boundaries: use cases + ports, infrastructure adapters, HTTP surface
pub mod app;
pub mod handlers;
pub mod infra;
pub mod server;
