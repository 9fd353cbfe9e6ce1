//! URL utilities
//!
//! Host extraction feeds the per-host admission queue: two URLs belong to
//! the same queue exactly when this module reports the same host for both.

mod host;

pub use host::host_of;
