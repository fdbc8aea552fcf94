//! Domain Layer - wxbot
//!
//! Core types and boundary contracts for the weather bot's background
//! data-freshness and messaging core. Nothing in this crate performs I/O;
//! concrete stores, brokers and HTTP clients live in `wxbot-providers`.
//!
//! ## Organization
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`entities`] | Snapshots, cache entries, rosters, broker records |
//! | [`error`] | The error taxonomy shared by every layer |
//! | [`ports`] | Provider traits (cache store, weather source, broker) |
//! | [`repositories`] | Typed cache repository consumed by use cases |
//! | [`constants`] | Domain defaults |

pub mod constants;
pub mod entities;
pub mod error;
pub mod ports;
pub mod repositories;

pub use entities::*;
pub use error::{Error, Result};
