//! Configuration structures and loading utilities.
//!
//! Option bounds and startup values of the component, plus the logging,
//! metrics and listener settings of the admin server. Every structure loads
//! from environment variables and falls back to its defaults.

pub mod connection_control;
pub mod logging;
pub mod metrics;
pub mod server;

pub use connection_control::*;
pub use logging::*;
pub use metrics::*;
pub use server::*;
