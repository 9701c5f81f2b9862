//! Admin server configuration.

use std::env;

/// Address the admin API listens on
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8080".to_string(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let bind = env::var("CONNECTION_CONTROL_BIND").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
        Self { bind }
    }
}
