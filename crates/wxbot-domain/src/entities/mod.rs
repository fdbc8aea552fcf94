//! Domain entities

pub mod message;
pub mod weather;

pub use message::{InboundRecord, OutboundMessage, RecordMetadata};
pub use weather::{
    CacheEntry, ConversationId, Coordinates, Roster, SelectedLocation, Snapshot,
};
