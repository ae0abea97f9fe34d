//! Tracing subscriber setup
//!
//! Shared between the CLI and tests: an `EnvFilter` driven by `RUST_LOG` and a
//! single fmt layer writing either to stderr or to a log file.

use std::fs::File;
use std::path::Path;
use std::sync::Arc;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Initialize the global tracing subscriber.
///
/// Logs go to `log_file_path` when given, otherwise to stderr. `RUST_LOG`
/// overrides `default_level`.
pub fn init_global(log_file_path: Option<&Path>, default_level: LevelFilter) -> std::io::Result<()> {
    let (writer, ansi) = match log_file_path {
        Some(path) => (BoxMakeWriter::new(Arc::new(File::create(path)?)), false),
        None => (BoxMakeWriter::new(std::io::stderr), true),
    };

    let subscriber = build_subscriber(writer, ansi, default_level);
    if subscriber.try_init().is_err() {
        tracing::debug!("Global tracing subscriber already installed");
    }
    Ok(())
}

/// Build a subscriber writing to `writer`.
///
/// This is the core subscriber configuration shared between production and tests.
pub fn build_subscriber(
    writer: BoxMakeWriter,
    ansi: bool,
    default_level: LevelFilter,
) -> impl tracing::Subscriber + Send + Sync {
    let env_filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();

    let fmt_layer = fmt::layer().with_writer(writer).with_ansi(ansi);

    tracing_subscriber::registry().with(fmt_layer).with(env_filter)
}
