//! Request and response bodies of the admin API.

use paperclip::actix::Apiv2Schema;
use serde::{Deserialize, Serialize};

use super::SecurityContext;
use crate::config::ConnectionControlConfig;

/// Response model for the health check endpoint
#[derive(Clone, Serialize, Deserialize, Apiv2Schema)]
pub struct HealthResponse {
    pub status: String,
}

/// Status variables published by the component
#[derive(Clone, Serialize, Deserialize, Apiv2Schema)]
pub struct StatusResponse {
    #[serde(rename = "Component_connection_control_delay_generated")]
    pub delay_generated: u64,
}

/// Current values of the component's system variables
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Apiv2Schema)]
pub struct VariablesResponse {
    #[serde(rename = "component_connection_control.failed_connections_threshold")]
    pub failed_connections_threshold: i64,
    #[serde(rename = "component_connection_control.min_connection_delay")]
    pub min_connection_delay: i64,
    #[serde(rename = "component_connection_control.max_connection_delay")]
    pub max_connection_delay: i64,
}

impl From<ConnectionControlConfig> for VariablesResponse {
    fn from(config: ConnectionControlConfig) -> Self {
        Self {
            failed_connections_threshold: config.failed_connections_threshold,
            min_connection_delay: config.min_connection_delay,
            max_connection_delay: config.max_connection_delay,
        }
    }
}

/// Request body for `PUT /api/variables/{name}`
#[derive(Clone, Serialize, Deserialize, Apiv2Schema)]
pub struct SetVariableRequest {
    pub value: i64,
}

/// Committed value after a successful update
#[derive(Clone, Serialize, Deserialize, Apiv2Schema)]
pub struct SetVariableResponse {
    pub name: String,
    pub value: i64,
}

/// A connection event forwarded by an external authenticator
#[derive(Clone, Serialize, Deserialize, Apiv2Schema)]
pub struct ConnectionEventRequest {
    /// `connect`, `change_user`, `disconnect` or `pre_authenticate`
    #[serde(default = "default_subclass")]
    pub subclass: String,
    /// Whether authentication succeeded
    pub success: bool,
    pub user: Option<String>,
    pub host: Option<String>,
    /// Client address; taken from the request when omitted
    pub ip: Option<String>,
    pub proxy_user: Option<String>,
    pub priv_user: Option<String>,
    pub priv_host: Option<String>,
}

fn default_subclass() -> String {
    "connect".to_string()
}

impl ConnectionEventRequest {
    pub fn security_context(&self, fallback_ip: Option<String>) -> SecurityContext {
        SecurityContext::default()
            .with_proxy_user(self.proxy_user.clone())
            .with_priv_user(self.priv_user.clone())
            .with_priv_host(self.priv_host.clone())
            .with_user(self.user.clone())
            .with_host(self.host.clone())
            .with_ip(self.ip.clone().or(fallback_ip))
    }
}

/// Result of feeding a connection event through the component
#[derive(Clone, Serialize, Deserialize, Apiv2Schema)]
pub struct ConnectionEventResponse {
    /// Account key the event was counted against
    pub account: String,
    /// Milliseconds the event was held back
    pub delayed_ms: u64,
    /// Failed attempts recorded for the account after the event
    pub failed_attempts: u64,
}
