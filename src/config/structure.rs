//! Configuration structure
// (c) 2026 the xfer-engine developers

use std::sync::LazyLock;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::util::TimeFormat;

/// The set of configurable options supported by the engine.
///
/// There is no `default()`.
/// The hard-wired defaults are available through [`Configuration::system_default()`].
///
/// [More details about the configuration mechanism](crate::config).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Configuration {
    /// Log level for this crate's own messages, when `RUST_LOG` is not set.
    ///
    /// One of `trace`, `debug`, `info`, `warn`, `error`.
    pub trace_level: String,

    /// Format of time stamps in log messages
    pub time_format: TimeFormat,

    /// Age in seconds after which a cached directory listing no longer satisfies a list command.
    ///
    /// Listings requested with [`AVOID`](crate::protocol::ListFlags::AVOID) ignore this.
    pub cache_ttl: u64,

    /// The maximum number of consecutive steps an operation may take without waiting for the transport.
    ///
    /// Exceeding this indicates a state machine which is going round in circles;
    /// the command fails with an internal error.
    pub max_continue: u32,

    /// How many times a failed connection is retried, when the connect command asks for retries
    pub connect_retries: u32,

    /// Delay in seconds between connection attempts
    pub retry_delay: u64,
}

static SYSTEM_DEFAULT_CONFIG: LazyLock<Configuration> = LazyLock::new(|| Configuration {
    trace_level: "info".into(),
    time_format: TimeFormat::Local,
    cache_ttl: 600,
    max_continue: 64,
    connect_retries: 2,
    retry_delay: 5,
});

const TRACE_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

impl Configuration {
    /// Returns the system default settings
    #[must_use]
    pub fn system_default() -> &'static Self {
        &SYSTEM_DEFAULT_CONFIG
    }

    /// Accessor for `cache_ttl`, as a Duration
    #[must_use]
    pub fn cache_ttl_duration(&self) -> Duration {
        Duration::from_secs(self.cache_ttl)
    }

    /// Accessor for `retry_delay`, as a Duration
    #[must_use]
    pub fn retry_delay_duration(&self) -> Duration {
        Duration::from_secs(self.retry_delay)
    }

    /// Performs additional validation checks on a configuration object
    pub fn validate(&self) -> anyhow::Result<()> {
        if !TRACE_LEVELS.contains(&self.trace_level.to_ascii_lowercase().as_str()) {
            anyhow::bail!(
                "trace_level {:?} is not one of {}",
                self.trace_level,
                TRACE_LEVELS.join(", ")
            );
        }
        if self.max_continue == 0 {
            anyhow::bail!("max_continue must be at least 1");
        }
        Ok(())
    }
}
