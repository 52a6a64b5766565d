//! Logging setup using `tracing-subscriber`.

use tracing_subscriber::EnvFilter;

/// Initialise console logging on stderr.
///
/// Controlled by `RUST_LOG` (default: `info`).
pub fn init() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}
