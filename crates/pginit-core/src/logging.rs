//! Logging init: tracing to stderr with env-filter.

use tracing_subscriber::EnvFilter;

/// Initialize structured logging to stderr. The filter comes from
/// `RUST_LOG` when set, then `PGINIT_LOG_LEVEL` (a bare level such as
/// `debug`), then the default.
pub fn init_logging() {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => match std::env::var("PGINIT_LOG_LEVEL") {
            Ok(level) if !level.is_empty() => EnvFilter::new(level),
            _ => EnvFilter::new("info,pginit_core=debug,pginit_cli=debug"),
        },
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}
