use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber. Verbosity is controlled via the
/// `FORMFILL_LOG` environment variable and defaults to `info`.
pub fn setup_logging() {
    let filter = EnvFilter::try_from_env("FORMFILL_LOG").unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
