//! Broker messaging
//!
//! Thin wrappers that own a broker client and add the delivery protocol:
//! [`MessageProducer`] races acknowledgment against a timeout and caller
//! cancellation, [`MessageConsumer`] fans every partition into one
//! background delivery task.

pub mod consumer;
pub mod producer;
pub mod sweep;

pub use consumer::MessageConsumer;
pub use producer::MessageProducer;
pub use sweep::{SweepNotifier, SweepReportListener};
