//! # antnet-cli::logging
//!
//! Tracing-subscriber setup: human-readable output by default, JSON lines
//! when asked. `RUST_LOG` overrides the default `antnet=info` filter.

use crate::args::LogFormat;
use tracing_subscriber::EnvFilter;

pub fn init(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("antnet=info"));
    match format {
        LogFormat::Human => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
        }
        LogFormat::Json => {
            tracing_subscriber::fmt().json().with_env_filter(filter).init();
        }
    }
}
