//! Application glue module
//!
//! Configuration and application-level utilities.

mod config;

pub use config::{default_path, Config, ConfigError, ReconnectConfig, ScreenConfig};
