//! Configuration
//!
//! One explicit [`AppConfig`] record, loaded once at startup by
//! [`ConfigLoader`] and validated before anything is wired.

pub mod loader;
pub mod types;

pub use loader::{ConfigLoader, render_toml, validate_app_config};
pub use types::*;
