//! Log output for the engine
// (c) 2026 the xfer-engine developers

use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Context as _;
use serde::{Deserialize, Serialize};
use tracing_subscriber::{
    EnvFilter, Layer, Registry,
    fmt::{
        MakeWriter,
        format::Writer,
        time::{ChronoLocal, ChronoUtc, FormatTime},
    },
    prelude::*,
};

static INSTALLED: AtomicBool = AtomicBool::new(false);

/// Overrides the configured log level when set
const LOG_ENV_VAR: &str = "RUST_LOG";

/// How log lines are timestamped
#[derive(
    Copy,
    Clone,
    Debug,
    Default,
    Eq,
    PartialEq,
    strum::Display,
    strum::EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum TimeFormat {
    /// Local wall-clock time
    #[default]
    Local,
    /// UTC wall-clock time
    Utc,
    /// Local time in RFC 3339 form
    Rfc3339,
}

impl TryFrom<String> for TimeFormat {
    type Error = strum::ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

enum Timestamp {
    Local(ChronoLocal),
    Utc(ChronoUtc),
}

impl From<TimeFormat> for Timestamp {
    fn from(format: TimeFormat) -> Self {
        match format {
            TimeFormat::Local => Timestamp::Local(ChronoLocal::new("%Y-%m-%d %H:%M:%S%.3f".into())),
            TimeFormat::Utc => Timestamp::Utc(ChronoUtc::new("%Y-%m-%d %H:%M:%S%.3fZ".into())),
            TimeFormat::Rfc3339 => Timestamp::Local(ChronoLocal::rfc_3339()),
        }
    }
}

impl FormatTime for Timestamp {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        match self {
            Timestamp::Local(t) => t.format_time(w),
            Timestamp::Utc(t) => t.format_time(w),
        }
    }
}

/// Picks the event filter. `RUST_LOG` wins when set; otherwise only this crate logs, at `level`.
///
/// The flag is true when the filter came from the environment.
fn engine_filter(level: &str) -> anyhow::Result<(EnvFilter, bool)> {
    match std::env::var(LOG_ENV_VAR) {
        Ok(directives) => EnvFilter::try_new(&directives)
            .map(|f| (f, true))
            .with_context(|| format!("{LOG_ENV_VAR}={directives} was not understood")),
        Err(_) => EnvFilter::try_new(format!("xfer_engine={level}"))
            .map(|f| (f, false))
            .with_context(|| format!("invalid log level {level}")),
    }
}

/// A compact log layer writing to `writer`
pub(crate) fn log_layer<W>(
    writer: W,
    level: &str,
    time_format: TimeFormat,
) -> anyhow::Result<Box<dyn Layer<Registry> + Send + Sync>>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let (filter, from_env) = engine_filter(level)?;
    Ok(tracing_subscriber::fmt::layer()
        .compact()
        // Targets only tell us something when other crates are logging too
        .with_target(from_env)
        .with_timer(Timestamp::from(time_format))
        .with_writer(writer)
        .with_filter(filter)
        .boxed())
}

/// Has [`setup`] installed a subscriber?
#[must_use]
pub fn is_initialized() -> bool {
    INSTALLED.load(Ordering::Relaxed)
}

/// Sends the engine's log output to stderr at `level`, unless `RUST_LOG` says otherwise.
///
/// Only the first call in a process has any effect.
pub fn setup(level: &str, time_format: TimeFormat) -> anyhow::Result<()> {
    if is_initialized() {
        tracing::warn!("logging is already set up");
        return Ok(());
    }
    let layer = log_layer(std::io::stderr, level, time_format)?;
    INSTALLED.store(true, Ordering::Relaxed);
    tracing_subscriber::registry().with(layer).try_init()?;
    Ok(())
}

/// Captures log output from the current thread
#[cfg(test)]
pub(crate) mod capture {
    use std::io;
    use std::sync::{Arc, Mutex};

    use tracing_subscriber::prelude::*;

    use super::{TimeFormat, log_layer};

    #[derive(Clone, Default)]
    struct Buffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Buffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Runs `f` with engine logging at `trace`, returning its result and everything logged
    pub(crate) fn logs_of<R>(f: impl FnOnce() -> R) -> (R, String) {
        let buffer = Buffer::default();
        let writer = buffer.clone();
        let layer = log_layer(move || writer.clone(), "trace", TimeFormat::Utc).unwrap();
        let subscriber = tracing_subscriber::registry().with(layer);
        let result = tracing::subscriber::with_default(subscriber, f);
        let text = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
        (result, text)
    }
}
