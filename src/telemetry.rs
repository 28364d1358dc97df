use tracing::info;
use tracing_subscriber::EnvFilter;

/// Initializes structured logging for a pipeline binary. Set
/// `LOG_FORMAT=json` for machine-readable output.
pub fn init(service: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    info!(service, "Telemetry initialized");
}
