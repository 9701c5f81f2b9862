//! Middleware of the admin API.

pub mod metrics;

pub use metrics::*;
