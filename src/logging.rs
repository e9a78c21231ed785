use std::sync::Once;

use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingConfig;

static TRACING_INIT: Once = Once::new();

/// Install the global subscriber. `RUST_LOG` takes precedence over the configured level.
/// Logs go to stderr so command output on stdout stays clean.
pub fn init_tracing(config: &LoggingConfig) {
    TRACING_INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&config.level));

        let builder = fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr);

        if config.json {
            builder.json().init();
        } else {
            builder.init();
        }
    });
}
