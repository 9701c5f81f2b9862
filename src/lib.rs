//! Connection Control - progressive delays for accounts with repeated failed logins
//!
//! A server component that watches authentication outcomes and slows down
//! brute-force attempts:
//! - Per-account failed login counters keyed by `'user'@'host'`
//! - Delays of `(failures + 1 - threshold)` seconds, clamped to configurable bounds
//! - A cancellable wait that returns as soon as the connection is killed
//! - System variables with check-then-update semantics
//! - A status counter and a read-only observability table
//! - An admin HTTP API with Prometheus metrics and OpenAPI documentation
//!
//! ## Architecture
//!
//! - `models/` - Account keys, connection events, option identifiers, table rows, API bodies
//! - `services/` - The component: counters, delay action, event coordinator, lifecycle
//! - `handlers/` - HTTP handlers of the admin API
//! - `middleware/` - Request metrics
//! - `utils/` - Request helpers
//! - `config/` - Option bounds and environment loading
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use connection_control::{
//!     AuthOutcome, Connection, ConnectionControl, ConnectionControlConfig, ConnectionEvent,
//!     InProcessHost, SecurityContext,
//! };
//!
//! let control = ConnectionControl::init(
//!     Arc::new(InProcessHost::new()),
//!     ConnectionControlConfig::default(),
//! )?;
//!
//! let connection = Connection::new(SecurityContext::new("app", "db.example"));
//! control.on_connection_event(&ConnectionEvent::connect(AuthOutcome::Failure, &connection));
//! assert_eq!(control.table_row_count(), 1);
//!
//! control.deinit();
//! # Ok::<(), connection_control::ConnectionControlError>(())
//! ```

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

pub use config::{ConnectionControlConfig, LoggingConfig, MetricsConfig, ServerConfig};
pub use error::{ConnectionControlError, Result};
pub use handlers::{create_base_app, create_openapi_spec};
pub use middleware::RequestMetrics;
pub use models::{
    AccountKey, AuthOutcome, Connection, ConnectionEvent, ConnectionHandle, ControlOption,
    EventSubclass, FailedLoginAttempt, SecurityContext, StatId,
};
pub use services::{
    ConnectionControl, ControlMetrics, DelayAction, EventCoordinator, FailedAttemptsList,
    HostServices, InProcessHost, KillOnDrop, KillSwitch, TableCursor, conditional_wait,
};
