//! Cache infrastructure
//!
//! [`KeyedCache`] turns a raw JSON store (`CacheProvider`) into the typed,
//! namespaced weather repository the use cases depend on.

pub mod keyed;

pub use keyed::{KeyedCache, namespaced_key};
