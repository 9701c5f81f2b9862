//! Utility functions used by the admin API.
//!
//! Client address extraction for connection events and route labels for
//! request metrics.

pub mod http;
pub mod route;

pub use http::*;
pub use route::*;
