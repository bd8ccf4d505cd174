//! # episim-cli::logging
//!
//! Tracing subscriber setup. `RUST_LOG` controls the filter; per-event logs
//! from the engines live under the `events` target at trace level, so
//! `RUST_LOG=events=trace` follows a run transition by transition.

use crate::args::LogFormat;
use tracing_subscriber::EnvFilter;

pub fn init(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match format {
        LogFormat::Human => tracing_subscriber::fmt().with_env_filter(filter).init(),
        LogFormat::Json => tracing_subscriber::fmt().with_env_filter(filter).json().init(),
    }
}
