use tracing_subscriber::EnvFilter;

/// Used when `RUST_LOG` is unset or unparsable.
pub const DEFAULT_FILTER: &str = "info,knotwork=debug";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Initialize a human readable stdout subscriber for development.
pub fn init_stdout_tracing() {
    tracing_subscriber::fmt().with_env_filter(env_filter()).init();
}

/// Initialize a subscriber writing one JSON object per event, with the
/// fields of the enclosing spans (request id, knot address) attached.
pub fn init_json_tracing() {
    tracing_subscriber::fmt()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_env_filter(env_filter())
        .init();
}
