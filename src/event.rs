//! Log event types flowing through the correlation pipeline.

use serde::Serialize;

use crate::history::TransactionId;

/// The flat property map the ingestion boundary decodes an inbound log payload
/// into. Values are whatever JSON the producer sent.
pub type Properties = serde_json::Map<String, serde_json::Value>;

// ---------------------------------------------------------------------------
// LogEvent
// ---------------------------------------------------------------------------

/// One log event reported by the application under test. Immutable once
/// constructed; the original property map is kept alongside the extracted
/// fields and exposed read-only.
#[derive(Debug, Clone, Serialize)]
pub struct LogEvent {
  timestamp: String,
  level: String,
  message: String,
  properties: Properties,
}

impl LogEvent {
  pub fn new(
    timestamp: impl Into<String>,
    level: impl Into<String>,
    message: impl Into<String>,
    properties: Properties,
  ) -> Self {
    Self {
      timestamp: timestamp.into(),
      level: level.into(),
      message: message.into(),
      properties,
    }
  }

  /// Raw timestamp string as reported, not yet parsed.
  pub fn timestamp(&self) -> &str {
    &self.timestamp
  }

  pub fn level(&self) -> &str {
    &self.level
  }

  pub fn message(&self) -> &str {
    &self.message
  }

  /// Full original property map, including fields beyond the required three.
  pub fn properties(&self) -> &Properties {
    &self.properties
  }
}

// ---------------------------------------------------------------------------
// Linked result
// ---------------------------------------------------------------------------

/// One correlation produced by a linker: which strategy matched, and which
/// transaction it matched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionLink {
  pub linker_name: String,
  pub transaction_id: TransactionId,
}

/// A log event paired with every transaction link the registered linkers
/// produced for it. Links are grouped per linker, linkers in registration
/// order. Immutable after construction.
#[derive(Debug, Clone, Serialize)]
pub struct LinkedLogEvent {
  event: LogEvent,
  links: Vec<TransactionLink>,
}

impl LinkedLogEvent {
  pub fn new(event: LogEvent, links: Vec<TransactionLink>) -> Self {
    Self { event, links }
  }

  pub fn event(&self) -> &LogEvent {
    &self.event
  }

  pub fn links(&self) -> &[TransactionLink] {
    &self.links
  }

  /// Flattened view of the linked transaction ids. No ordering guarantee
  /// beyond the per-linker grouping of [`links`](Self::links).
  pub fn transaction_ids(&self) -> Vec<TransactionId> {
    self.links.iter().map(|l| l.transaction_id).collect()
  }
}
