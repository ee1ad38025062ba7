//! Tracing initialization.

use std::sync::Once;

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

static INIT: Once = Once::new();

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level when set. Safe to call more
/// than once; only the first call has any effect.
pub fn init_tracing(config: &LoggingConfig) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&config.level))
            .unwrap_or_else(|_| EnvFilter::new("access_gate=info"));

        let builder = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(true);

        if config.json {
            builder.json().init();
        } else {
            builder.init();
        }
    });
}
