use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` overrides `log_level`. With `json` set, events are emitted as
/// flattened JSON lines for log shipping; otherwise as human-readable text.
pub fn init_tracing(service_name: &str, log_level: &str, json: bool) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let registry = tracing_subscriber::registry().with(env_filter);

    let result = if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_file(true)
                    .with_line_number(true)
                    .json()
                    .flatten_event(true),
            )
            .try_init()
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_file(true)
                    .with_line_number(true),
            )
            .try_init()
    };

    match result {
        Ok(()) => tracing::info!(service = service_name, "Tracing initialized"),
        Err(e) => eprintln!(
            "Tracing for service '{}' was already initialized: {}",
            service_name, e
        ),
    }
}
