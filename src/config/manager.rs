//! Configuration source wrangling
// (c) 2026 the xfer-engine developers

use std::fmt::Debug;
use std::path::Path;

use figment::{
    Figment, Provider,
    providers::{Env, Format as _, Serialized, Toml},
};
use serde::Deserialize;
use tracing::debug;

use super::Configuration;

/// Prefix of environment variables which set configuration options
pub const ENV_PREFIX: &str = "XFER_";

/// Errors arising from configuration sources
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A source could not be read, or its data did not fit the configuration structure
    #[error("configuration error: {0}")]
    Extract(#[from] figment::Error),
    /// The data was read successfully but does not make sense
    #[error("invalid configuration: {0:#}")]
    Invalid(anyhow::Error),
}

/// Processes and merges all configuration sources.
///
/// Sources merged later take priority over earlier ones.
#[derive(Debug, Default)]
pub struct Manager {
    data: Figment,
}

impl Manager {
    /// Constructor. The structure starts out empty.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// General constructor for production use.
    ///
    /// Applies, in increasing priority: the system defaults, the given TOML file (if any),
    /// and environment variables prefixed with [`ENV_PREFIX`].
    #[must_use]
    pub fn standard(config_file: Option<&Path>) -> Self {
        let mut new1 = Self::new();
        new1.apply_system_default();
        if let Some(path) = config_file {
            new1.add_file(path);
        }
        new1.apply_env();
        new1
    }

    /// Merges in a data set, which is some sort of [figment::Provider](https://docs.rs/figment/latest/figment/trait.Provider.html).
    /// This uses figment's `merge` operation, which prefers to _replace_ existing items.
    pub fn merge_provider<T>(&mut self, provider: T)
    where
        T: Provider,
    {
        let f = std::mem::take(&mut self.data);
        self.data = f.merge(provider); // in the error case, this leaves the provider in a fused state
    }

    /// Merges in a TOML configuration file, if it exists
    pub fn add_file<P: AsRef<Path>>(&mut self, path: P) {
        let path = path.as_ref();
        if !path.exists() {
            debug!("configuration file {path:?} not present");
            return;
        }
        self.merge_provider(Toml::file(path));
    }

    /// Merges in environment variables prefixed with [`ENV_PREFIX`]
    pub fn apply_env(&mut self) {
        self.merge_provider(Env::prefixed(ENV_PREFIX));
    }

    /// Applies the system default settings, at a lower priority than everything else
    pub fn apply_system_default(&mut self) {
        let f = std::mem::take(&mut self.data);
        self.data = f.join(Serialized::defaults(Configuration::system_default()));
    }

    /// Attempts to extract a particular struct from the data.
    ///
    /// `T` is usually [Configuration], but it isn't intrinsically required to be.
    pub fn get<'de, T>(&self) -> Result<T, ConfigError>
    where
        T: Deserialize<'de>,
    {
        self.data.extract::<T>().map_err(ConfigError::from)
    }

    /// Extracts and validates a [`Configuration`]
    pub fn configuration(&self) -> Result<Configuration, ConfigError> {
        let config: Configuration = self.get()?;
        config.validate().map_err(ConfigError::Invalid)?;
        Ok(config)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod test {
    use super::{ConfigError, Manager};
    use crate::Configuration;
    use crate::util::TimeFormat;
    use assertables::assert_contains;
    use figment::providers::Serialized;
    use pretty_assertions::assert_eq;
    use serde::Serialize;

    #[test]
    fn defaults() {
        let mut mgr = Manager::new();
        mgr.apply_system_default();
        let result = mgr.configuration().unwrap();
        assert_eq!(*Configuration::system_default(), result);
    }

    #[test]
    fn merge_overrides() {
        #[derive(Serialize)]
        struct Partial {
            cache_ttl: u64,
        }
        let mut mgr = Manager::new();
        mgr.apply_system_default();
        mgr.merge_provider(Serialized::defaults(Partial { cache_ttl: 30 }));
        let result = mgr.configuration().unwrap();
        assert_eq!(
            result,
            Configuration {
                cache_ttl: 30,
                ..Configuration::system_default().clone()
            }
        );
    }

    #[test]
    fn system_default_never_overrides() {
        #[derive(Serialize)]
        struct Partial {
            max_continue: u32,
        }
        let mut mgr = Manager::new();
        mgr.merge_provider(Serialized::defaults(Partial { max_continue: 7 }));
        mgr.apply_system_default();
        let result = mgr.configuration().unwrap();
        assert_eq!(result.max_continue, 7);
        assert_eq!(result.cache_ttl, Configuration::system_default().cache_ttl);
    }

    #[test]
    fn file_and_env() {
        figment::Jail::expect_with(|jail| {
            let _ = jail.create_file(
                "xfer.toml",
                r#"
                cache_ttl = 30
                time_format = "UTC"
                max_continue = 10
                "#,
            )?;
            jail.set_env("XFER_MAX_CONTINUE", "20");
            let mgr = Manager::standard(Some("xfer.toml".as_ref()));
            let result = mgr.configuration().unwrap();
            assert_eq!(result.cache_ttl, 30);
            assert_eq!(result.time_format, TimeFormat::Utc);
            assert_eq!(result.max_continue, 20);
            assert_eq!(result.trace_level, "info");
            Ok(())
        });
    }

    #[test]
    fn missing_file_is_not_an_error() {
        figment::Jail::expect_with(|_jail| {
            let mgr = Manager::standard(Some("nonexistent.toml".as_ref()));
            let result = mgr.configuration().unwrap();
            assert_eq!(result, *Configuration::system_default());
            Ok(())
        });
    }

    #[test]
    fn unknown_field() {
        figment::Jail::expect_with(|jail| {
            let _ = jail.create_file("xfer.toml", "no_such_option = 1")?;
            let mgr = Manager::standard(Some("xfer.toml".as_ref()));
            let err = mgr.configuration().unwrap_err();
            assert!(matches!(err, ConfigError::Extract(_)));
            assert_contains!(err.to_string(), "no_such_option");
            Ok(())
        });
    }

    #[test]
    fn invalid_value() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("XFER_TRACE_LEVEL", "shouty");
            let mgr = Manager::standard(None);
            let err = mgr.configuration().unwrap_err();
            assert!(matches!(err, ConfigError::Invalid(_)));
            assert_contains!(err.to_string(), "shouty");
            Ok(())
        });
    }
}
