//! Logging configuration and subscriber installation.

use std::env;

use tracing_subscriber::EnvFilter;

/// Configuration for the tracing subscriber installed by the admin server
#[derive(Clone, Debug)]
pub struct LoggingConfig {
    /// Filter directives, same syntax as `RUST_LOG`
    pub filter: String,
    /// Emit one JSON object per line instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            json: false,
        }
    }
}

impl LoggingConfig {
    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let filter = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let json = env::var("LOG_FORMAT")
            .map(|v| v.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        Self { filter, json }
    }

    /// Install the global subscriber
    ///
    /// Fails if a global subscriber has already been set.
    pub fn init_tracing(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let filter = EnvFilter::try_new(&self.filter).unwrap_or_else(|_| EnvFilter::new("info"));
        let builder = tracing_subscriber::fmt().with_env_filter(filter);

        if self.json {
            builder.json().try_init()
        } else {
            builder.try_init()
        }
    }
}
