//! Core services of the connection control component.
//!
//! The failed login counters, the account key builder, the cancellable wait,
//! the variable and statistics store, the event coordinator with its delay
//! action subscriber, the observability table, host registration and the
//! component lifecycle that ties them together. Prometheus export lives here
//! as well.

pub mod account_key;
pub mod component;
pub mod coordinator;
pub mod delay;
pub mod failed_attempts;
pub mod host;
pub mod metrics;
pub mod table;
pub mod variables;
pub mod wait;

pub use account_key::*;
pub use component::*;
pub use coordinator::*;
pub use delay::*;
pub use failed_attempts::*;
pub use host::*;
pub use metrics::*;
pub use table::*;
pub use variables::*;
pub use wait::{KillOnDrop, KillSwitch, conditional_wait};
