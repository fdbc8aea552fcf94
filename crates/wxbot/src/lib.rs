//! # wxbot
//!
//! Backend of a chat weather bot. Keeps a cache of current conditions warm
//! for a fixed roster of places, answers lookups cache-first, and relays
//! refresh reports over a topic/partition broker.
//!
//! ## Architecture
//!
//! - `domain` - entities, the error taxonomy and provider ports
//! - `application` - refresh scheduler, weather lookup, provider registry
//! - `infrastructure` - keyed cache, producer/consumer, config, logging, bootstrap
//!
//! The binary entry points live in [`cli`] and [`commands`].

/// Domain layer - core types and ports
///
/// Re-exports from the domain crate for convenience
pub mod domain {
    pub use wxbot_domain::*;
}

/// Application layer - use cases and registries
pub mod application {
    pub use wxbot_application::*;
}

/// Infrastructure layer - config, logging, messaging and bootstrap
pub mod infrastructure {
    pub use wxbot_infrastructure::*;
}

/// Provider implementations, linked so their registry entries are present
pub mod providers {
    pub use wxbot_providers::*;
}

pub mod cli;
pub mod commands;

pub use cli::{Cli, Command};
