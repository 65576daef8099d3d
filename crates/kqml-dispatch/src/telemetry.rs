//! Structured log output for processes embedding a dispatcher.
//!
//! Engine events are emitted under two targets:
//!
//! - `kqml_dispatch::dispatcher`: lifecycle transitions at `info`, routing
//!   decisions at `debug`/`trace`, read failures and replaced continuations
//!   at `warn`. Every event carries an `agent` field with the dispatcher name.
//! - `kqml_dispatch::reader`: queue activity of the in-memory reader at
//!   `trace`.
//!
//! Events raised on a listener thread are stamped with its name,
//! `<agent>-dispatcher-<ordinal>`, so output from several engines in one
//! process can be told apart. A filter such as
//! `info,kqml_dispatch::dispatcher=debug` shows routing for every engine.

use std::io::{self, IsTerminal};

use kqml_config::{LogFormat, LoggingConfig};
use once_cell::sync::OnceCell;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

static INSTALLED: OnceCell<()> = OnceCell::new();

/// Proof that engine log output has been routed to stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct TelemetryHandle;

/// Errors encountered while configuring log output.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// The configured filter expression could not be parsed.
    #[error("invalid log filter '{filter}': {message}")]
    Filter {
        /// Expression as configured.
        filter: String,
        /// Parser diagnostic.
        message: String,
    },
    /// Another global subscriber was installed first.
    #[error("failed to install log subscriber: {0}")]
    Install(#[from] TryInitError),
}

/// Routes engine events to stderr, once per process.
///
/// Only the first call installs anything; later calls return a handle without
/// re-reading `config`.
///
/// # Errors
///
/// Returns [`TelemetryError::Filter`] when `config.filter` does not parse and
/// [`TelemetryError::Install`] when the process already has a global
/// subscriber from elsewhere.
pub fn initialise(config: &LoggingConfig) -> Result<TelemetryHandle, TelemetryError> {
    INSTALLED
        .get_or_try_init(|| {
            let filter = engine_filter(config)?;
            tracing_subscriber::registry()
                .with(output_layer(config.format))
                .with(filter)
                .try_init()?;
            Ok::<(), TelemetryError>(())
        })
        .map(|()| TelemetryHandle)
}

fn engine_filter(config: &LoggingConfig) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_new(&config.filter).map_err(|error| TelemetryError::Filter {
        filter: config.filter.clone(),
        message: error.to_string(),
    })
}

fn output_layer(format: LogFormat) -> Box<dyn Layer<Registry> + Send + Sync> {
    let layer = fmt::layer()
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_thread_names(true)
        .with_timer(fmt::time::UtcTime::rfc_3339());
    match format {
        LogFormat::Json => layer.json().flatten_event(true).boxed(),
        LogFormat::Compact => layer.compact().boxed(),
    }
}
