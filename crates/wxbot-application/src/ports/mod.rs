//! Application ports
//!
//! Domain ports are re-exported so callers can depend on this crate alone.

pub mod registry;

pub use wxbot_domain::ports::providers;
