//! Application Layer - wxbot
//!
//! Use cases built on the domain ports:
//!
//! - [`use_cases::RefreshScheduler`] keeps the roster's cache entries warm
//! - [`use_cases::WeatherLookupService`] serves the bot's read path with
//!   per-conversation location state
//!
//! Provider selection goes through the `linkme` registries in
//! [`ports::registry`]; this crate never names a concrete provider.

pub mod ports;
pub mod use_cases;

pub use use_cases::*;
