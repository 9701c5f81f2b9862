//! HTTP request handlers of the admin API.
//!
//! Each handler adapts one host-facing entry point of the component to HTTP:
//! the event feed, the system variables, the status variable and the
//! observability table.

pub mod events;
pub mod health;
pub mod metrics;
pub mod openapi;
pub mod status;
pub mod variables;

pub use events::*;
pub use health::*;
pub use metrics::*;
pub use openapi::*;
pub use status::*;
pub use variables::*;
