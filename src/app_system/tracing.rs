use tracing_subscriber::{fmt, EnvFilter};

/// Initialize structured logging once for the entire application.
///
/// Filtering follows `RUST_LOG`; defaults to `info` when unset.
pub fn setup_tracing() {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}
