//! Tracing setup for the connection manager stubs.
//!
//! Diagnostics go to journald when nobody is watching stderr (systemd, or a
//! supervisor piping our output), and to stderr otherwise. Stdout carries the
//! emulated modem output, so no layer ever writes to it.

use std::io::{IsTerminal as _, Write as _};

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    EnvFilter,
    fmt::{
        self,
        format::{DefaultFields, Format},
        writer::MakeWriter,
    },
    layer::SubscriberExt as _,
    util::{SubscriberInitExt as _, TryInitError},
};

#[derive(Debug)]
pub struct TelemetryConfig {
    syslog_identifier: String,
}

impl TelemetryConfig {
    /// `syslog_identifier` tags the journald entries.
    #[must_use]
    pub fn new(syslog_identifier: &str) -> Self {
        Self {
            syslog_identifier: syslog_identifier.to_owned(),
        }
    }

    pub fn try_init(self) -> Result<TelemetryGuard, TryInitError> {
        let interactive = std::io::stderr().is_terminal();
        let journald = if interactive {
            None
        } else {
            journald_layer(&self.syslog_identifier)
        };
        let stderr = journald
            .is_none()
            .then(|| diagnostics_layer(std::io::stderr, interactive));

        tracing_subscriber::registry()
            .with(stderr)
            .with(journald)
            .with(
                EnvFilter::builder()
                    .with_default_directive(LevelFilter::INFO.into())
                    .from_env_lossy(),
            )
            .try_init()?;

        Ok(TelemetryGuard { _priv: () })
    }

    /// Panics if a global subscriber is already installed.
    pub fn init(self) -> TelemetryGuard {
        self.try_init().expect("failed to initialize cm-telemetry")
    }
}

/// Keep it until the end of `main`, then call [`TelemetryGuard::flush`].
#[must_use = "call .flush at the end of the program, otherwise logs may get lost"]
pub struct TelemetryGuard {
    _priv: (),
}

impl TelemetryGuard {
    /// Flushes stderr. Stdout is left to whoever owns it.
    pub fn flush(self) {
        std::io::stderr().flush().ok();
    }
}

fn journald_layer(syslog_identifier: &str) -> Option<tracing_journald::Layer> {
    match tracing_journald::layer() {
        Ok(layer) => Some(layer.with_syslog_identifier(syslog_identifier.to_owned())),
        Err(err) => {
            // tracing is not up yet
            eprintln!("journald unavailable, logging to stderr: {err}");
            None
        }
    }
}

fn diagnostics_layer<S, W>(
    make_writer: W,
    ansi: bool,
) -> fmt::Layer<S, DefaultFields, Format, W>
where
    W: for<'w> MakeWriter<'w> + 'static,
{
    fmt::layer().with_writer(make_writer).with_ansi(ansi)
}
