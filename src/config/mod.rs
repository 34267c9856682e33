//! # Configuration management
//!
//! The engine obtains run-time configuration from the following sources, highest priority first:
//! 1. Environment variables named `XFER_<OPTION>`, for example `XFER_CACHE_TTL=60`
//! 2. A TOML configuration file, if the caller names one
//! 3. Hard-wired defaults (see [`Configuration::system_default`])
//!
//! Each option may appear in multiple places, but only the highest priority value is used.
//! Unknown option names are an error.
//!
//! ## File format
//!
//! ```toml
//! trace_level = "debug"
//! time_format = "utc"
//! cache_ttl = 60
//! connect_retries = 5
//! ```
//!
//! See [`Configuration`] for the available options.
// (c) 2026 the xfer-engine developers

mod manager;
pub use manager::{ConfigError, ENV_PREFIX, Manager};

pub mod structure;
pub use structure::Configuration;
