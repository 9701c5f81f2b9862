//! Data models for the connection control component.
//!
//! This module contains the plain data types shared by the core services and
//! the admin API: account keys, connection events, option identifiers, table
//! rows and audit records.

pub mod account;
pub mod api;
pub mod audit;
pub mod connection;
pub mod options;
pub mod table;

pub use account::*;
pub use api::*;
pub use audit::*;
pub use connection::*;
pub use options::*;
pub use table::*;
