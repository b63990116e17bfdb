//! Tracing subscriber setup for the binaries.

use tracing_subscriber::EnvFilter;

/// Installs a stderr `fmt` subscriber.
///
/// `RUST_LOG` wins when set; otherwise `default_level` is used as the filter.
/// Calling this twice is harmless: the second install is ignored.
pub fn init_logging(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
