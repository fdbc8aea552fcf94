//! # wxbot - Infrastructure Layer
//!
//! Wraps the raw providers into the components the bot runs on and owns
//! their lifecycle.
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`cache`] | `KeyedCache`, the namespaced weather repository |
//! | [`messaging`] | `MessageProducer`, `MessageConsumer`, sweep report notifier |
//! | [`shutdown`] | `ShutdownCoordinator` and OS signal handling |
//! | [`config`] | `AppConfig`, `ConfigLoader`, validation |
//! | [`logging`] | tracing subscriber setup |
//! | [`bootstrap`] | composition root (`init_app`, `AppContext`) |

pub mod bootstrap;
pub mod cache;
pub mod config;
pub mod constants;
pub mod error_ext;
pub mod logging;
pub mod messaging;
pub mod shutdown;

pub use bootstrap::{AppContext, init_app};
pub use cache::KeyedCache;
pub use config::{AppConfig, ConfigLoader};
pub use messaging::{MessageConsumer, MessageProducer};
pub use shutdown::{Drain, ShutdownCoordinator};
