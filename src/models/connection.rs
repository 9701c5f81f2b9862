//! Connection events and the per-connection handle the host passes with them.

use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{ConnectionControlError, Result};
use crate::services::wait::KillSwitch;

/// Security attributes of an authenticated (or authenticating) session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityContext {
    pub proxy_user: Option<String>,
    pub priv_user: Option<String>,
    pub priv_host: Option<String>,
    pub user: Option<String>,
    pub host: Option<String>,
    pub ip: Option<String>,
}

impl SecurityContext {
    /// Context for a plain `user` connecting from `host`
    pub fn new(user: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            user: Some(user.into()),
            host: Some(host.into()),
            ..Default::default()
        }
    }

    pub fn with_proxy_user(mut self, proxy_user: Option<String>) -> Self {
        self.proxy_user = proxy_user;
        self
    }

    pub fn with_priv_user(mut self, priv_user: Option<String>) -> Self {
        self.priv_user = priv_user;
        self
    }

    pub fn with_priv_host(mut self, priv_host: Option<String>) -> Self {
        self.priv_host = priv_host;
        self
    }

    pub fn with_user(mut self, user: Option<String>) -> Self {
        self.user = user;
        self
    }

    pub fn with_host(mut self, host: Option<String>) -> Self {
        self.host = host;
        self
    }

    pub fn with_ip(mut self, ip: Option<String>) -> Self {
        self.ip = ip;
        self
    }
}

/// Host-side view of the connection an event belongs to
pub trait ConnectionHandle: Send + Sync {
    /// Security context of the session, if the host can provide one
    fn security_context(&self) -> Result<SecurityContext>;

    /// Cancellation signal of the thread serving this connection
    fn kill_switch(&self) -> &KillSwitch;
}

/// Self-contained connection handle for hosts without their own session objects
#[derive(Debug, Clone, Default)]
pub struct Connection {
    context: Option<SecurityContext>,
    kill_switch: Arc<KillSwitch>,
}

impl Connection {
    pub fn new(context: SecurityContext) -> Self {
        Self {
            context: Some(context),
            kill_switch: Arc::new(KillSwitch::new()),
        }
    }

    /// A connection whose security context cannot be read
    pub fn without_security_context() -> Self {
        Self::default()
    }

    /// Shared handle to the kill switch, for killing the connection from another thread
    pub fn kill_handle(&self) -> Arc<KillSwitch> {
        Arc::clone(&self.kill_switch)
    }
}

impl ConnectionHandle for Connection {
    fn security_context(&self) -> Result<SecurityContext> {
        self.context
            .clone()
            .ok_or(ConnectionControlError::MissingSecurityContext)
    }

    fn kill_switch(&self) -> &KillSwitch {
        &self.kill_switch
    }
}

/// Connection event subclasses reported by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventSubclass {
    Connect,
    Disconnect,
    ChangeUser,
    PreAuthenticate,
}

impl EventSubclass {
    /// Only connect and change-user events carry an authentication outcome
    pub fn is_authentication(self) -> bool {
        matches!(self, EventSubclass::Connect | EventSubclass::ChangeUser)
    }
}

impl FromStr for EventSubclass {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "connect" => Ok(EventSubclass::Connect),
            "disconnect" => Ok(EventSubclass::Disconnect),
            "change_user" => Ok(EventSubclass::ChangeUser),
            "pre_authenticate" => Ok(EventSubclass::PreAuthenticate),
            other => Err(format!("unknown event subclass '{}'", other)),
        }
    }
}

/// Outcome of the authentication attempt carried by an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthOutcome {
    Success,
    Failure,
}

/// One connection event as delivered by the host
#[derive(Clone, Copy)]
pub struct ConnectionEvent<'a> {
    pub subclass: EventSubclass,
    pub outcome: AuthOutcome,
    pub connection: &'a dyn ConnectionHandle,
}

impl<'a> ConnectionEvent<'a> {
    pub fn new(
        subclass: EventSubclass,
        outcome: AuthOutcome,
        connection: &'a dyn ConnectionHandle,
    ) -> Self {
        Self {
            subclass,
            outcome,
            connection,
        }
    }

    pub fn connect(outcome: AuthOutcome, connection: &'a dyn ConnectionHandle) -> Self {
        Self::new(EventSubclass::Connect, outcome, connection)
    }

    pub fn change_user(outcome: AuthOutcome, connection: &'a dyn ConnectionHandle) -> Self {
        Self::new(EventSubclass::ChangeUser, outcome, connection)
    }
}

impl std::fmt::Debug for ConnectionEvent<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionEvent")
            .field("subclass", &self.subclass)
            .field("outcome", &self.outcome)
            .finish_non_exhaustive()
    }
}
