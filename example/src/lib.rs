//! example-app
//!
//! Loads a `Service` configuration from `APP_*` environment variables through
//! the loader generated from `proto/service.proto`.

pub mod config;

pub use config::{Color, Reporting, Service};
pub use protoenv::{LoadError, LoadFromEnv};
