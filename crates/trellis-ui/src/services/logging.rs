//! Tracing subscriber that writes to the browser console.
//!
//! # Design
//! - One console call per event; the level picks `debug`/`log`/`warn`/`error`.
//! - Timestamps are left to the devtools since wasm has no system clock.

use crate::core::logging::{
    ConsoleMethod, DEFAULT_LOG_LEVEL, LogFormat, LoggingConfig, console_method,
};
use anyhow::{Result, anyhow};
use gloo::console;
use std::io;
use tracing::Metadata;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global subscriber and the panic hook.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_console_logging(config: &LoggingConfig) -> Result<()> {
    console_error_panic_hook::set_once();
    let filter = EnvFilter::try_new(&config.level).unwrap_or_else(|err| {
        console::warn!("invalid log filter, using default", err.to_string());
        EnvFilter::new(DEFAULT_LOG_LEVEL)
    });
    match config.format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .json()
                    .without_time()
                    .with_ansi(false)
                    .with_writer(ConsoleMakeWriter),
            )
            .try_init()
            .map_err(|err| anyhow!("failed to install tracing subscriber: {err}")),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .without_time()
                    .with_ansi(false)
                    .with_target(false)
                    .with_writer(ConsoleMakeWriter),
            )
            .try_init()
            .map_err(|err| anyhow!("failed to install tracing subscriber: {err}")),
    }
}

struct ConsoleMakeWriter;

struct ConsoleWriter {
    method: ConsoleMethod,
    buffer: Vec<u8>,
}

impl io::Write for ConsoleWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for ConsoleWriter {
    fn drop(&mut self) {
        let text = String::from_utf8_lossy(&self.buffer);
        let line = text.trim_end();
        if line.is_empty() {
            return;
        }
        match self.method {
            ConsoleMethod::Debug => console::debug!(line),
            ConsoleMethod::Log => console::log!(line),
            ConsoleMethod::Warn => console::warn!(line),
            ConsoleMethod::Error => console::error!(line),
        }
    }
}

impl<'a> MakeWriter<'a> for ConsoleMakeWriter {
    type Writer = ConsoleWriter;

    fn make_writer(&'a self) -> Self::Writer {
        ConsoleWriter {
            method: ConsoleMethod::Log,
            buffer: Vec::new(),
        }
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        ConsoleWriter {
            method: console_method(meta.level()),
            buffer: Vec::new(),
        }
    }
}
