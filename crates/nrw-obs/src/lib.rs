use tracing::Subscriber;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "info,nrw=debug";

/// JSON logs, one object per line; RUST_LOG respected, default "info,nrw=debug"
fn subscriber() -> impl Subscriber + Send + Sync + 'static {
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_FILTER.to_string());

    tracing_subscriber::registry()
        .with(EnvFilter::new(env_filter))
        .with(tracing_subscriber::fmt::layer().json())
}

/// Initialize logging for a service binary; panics if a subscriber is already set
pub fn init(service_name: &str) {
    subscriber().init();
    tracing::info!(service = %service_name, "Observability initialized");
}

/// Like [`init`], but returns quietly if a subscriber is already installed (tests, embedding)
pub fn try_init(service_name: &str) -> bool {
    let installed = subscriber().try_init().is_ok();
    if installed {
        tracing::info!(service = %service_name, "Observability initialized");
    }
    installed
}
