//! # Runtime Configuration
//!
//! Unified configuration for the single-node runtime. Every knob has a sane
//! default; environment variables override individual fields.

/// Complete runtime configuration.
#[derive(Debug, Clone, Default)]
pub struct RuntimeConfig {
    /// Logging configuration.
    pub log: LogConfig,
    /// Event bus configuration.
    pub bus: BusConfig,
    /// Demo flow configuration.
    pub demo: DemoConfig,
}

impl RuntimeConfig {
    /// Load defaults, then apply environment overrides.
    ///
    /// - `HL_LOG_LEVEL` - tracing filter directive (default `info`)
    /// - `HL_BUS_CAPACITY` - per-subscriber event buffer
    /// - `HL_DEMO` - `0`/`false` skips the demo flow
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(level) = std::env::var("HL_LOG_LEVEL") {
            config.log.level = level;
        }
        if let Ok(capacity) = std::env::var("HL_BUS_CAPACITY") {
            if let Ok(c) = capacity.parse() {
                config.bus.capacity = c;
            }
        }
        if let Ok(demo) = std::env::var("HL_DEMO") {
            config.demo.run_demo_flow = !matches!(demo.as_str(), "0" | "false");
        }

        config
    }

    /// Reject configurations that cannot run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bus.capacity == 0 {
            return Err(ConfigError::ZeroBusCapacity);
        }
        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    /// The event bus needs room for at least one event.
    ZeroBusCapacity,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ZeroBusCapacity => {
                write!(f, "HL_BUS_CAPACITY must be at least 1")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Filter directive passed to the subscriber (`info`, `debug`, ...).
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Event bus configuration.
#[derive(Debug, Clone)]
pub struct BusConfig {
    /// Events buffered per subscriber before older ones are dropped.
    pub capacity: usize,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            capacity: shared_bus::DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

/// Demo flow configuration.
#[derive(Debug, Clone)]
pub struct DemoConfig {
    /// Whether to run the end-to-end demo after startup.
    pub run_demo_flow: bool,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            run_demo_flow: true,
        }
    }
}
