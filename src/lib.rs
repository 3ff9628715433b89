//! log-linker: correlates application log events with recorded HTTP
//! transactions.
//!
//! A traffic-recording proxy stores every HTTP transaction with a send time
//! and an elapsed duration. Applications under test report their log lines to
//! an ingestion boundary, which hands each line over as a flat property map.
//! This crate links the two: each log event is matched against the
//! transactions whose request/response time window plausibly produced it, and
//! the linked result is dispatched to registered consumers.
//!
//! Ingestion is multi-producer; [`engine::CorrelationEngine`] is shared
//! behind an `Arc`. Two serialization points exist per event, acquired in
//! sequence and never nested across events: the maintainer's mutex (refresh +
//! index query are one consistent unit) and the dispatch mutex (one event's
//! consumer fan-out never interleaves with another's). No ordering guarantee
//! is made between concurrently arriving events.
//!
//! No DB, no network; pure computation + in-memory state.

pub mod config;
pub mod consumer;
pub mod engine;
pub mod error;
pub mod event;
pub mod history;
pub mod index;
pub mod linker;
pub mod maintainer;
pub mod timestamp;

pub use config::LinkConfig;
pub use consumer::{Consumer, MemoryLogStore};
pub use engine::CorrelationEngine;
pub use error::{HistoryError, TimestampError};
pub use event::{LinkedLogEvent, LogEvent, Properties, TransactionLink};
pub use history::{
  InMemoryHistoryStore, SessionId, TransactionHistoryStore, TransactionId,
  TransactionTiming,
};
pub use linker::Linker;
pub use maintainer::TransactionIndexMaintainer;
