use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LoggingConfig;

/// Install the global tracing subscriber.
///
/// - `EnvFilter` from `RUST_LOG`, falling back to `info,finance_assistant=debug`.
/// - Compact human-readable output, or one JSON object per line when
///   `logging.json` is set.
pub fn init(logging: &LoggingConfig) {
    let filter_layer = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,finance_assistant=debug"));

    let registry = tracing_subscriber::registry().with(filter_layer);
    if logging.json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(false)
                    .with_target(true),
            )
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_line_number(true)
                    .compact(),
            )
            .init();
    }
}
