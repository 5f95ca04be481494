//! Runtime configuration container.

mod config;

pub use config::{BusConfig, ConfigError, DemoConfig, LogConfig, RuntimeConfig};
