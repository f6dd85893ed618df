use crate::{BookAMovieError, LogMode, Result};
use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber for `mode`.
///
/// `RUST_LOG` overrides the mode's default level, except in silent mode.
pub fn init_tracing(mode: LogMode) -> Result<()> {
    let default_level = match mode {
        LogMode::Silent => "off",
        LogMode::Local | LogMode::Dev => "debug",
        LogMode::Prod => "info",
    };

    let filter = match mode {
        LogMode::Silent => EnvFilter::new("off"),
        _ => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
    };

    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let installed = match mode {
        LogMode::Prod => builder.json().try_init(),
        LogMode::Local => builder.pretty().try_init(),
        LogMode::Dev | LogMode::Silent => builder.try_init(),
    };

    installed.map_err(|e| {
        BookAMovieError::InvalidArgument(format!("Failed to install tracing subscriber: {}", e))
    })
}
