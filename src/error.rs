//! Structured error types for the correlation pipeline.

use thiserror::Error;

/// Failure to turn a raw timestamp string into a UTC instant.
#[derive(Debug, Error)]
pub enum TimestampError {
  #[error("pattern '{0}' is not a usable date-time format")]
  Pattern(String),

  #[error("zone '{0}' is not a recognized zone name or offset")]
  Zone(String),

  #[error("'{raw}' is not parsable with pattern '{pattern}': {source}")]
  Unparsable {
    raw: String,
    pattern: String,
    source: chrono::ParseError,
  },
}

impl TimestampError {
  pub fn pattern(pattern: &str) -> Self {
    Self::Pattern(pattern.to_string())
  }

  pub fn zone(zone: &str) -> Self {
    Self::Zone(zone.to_string())
  }

  pub fn unparsable(raw: &str, pattern: &str, source: chrono::ParseError) -> Self {
    Self::Unparsable {
      raw: raw.to_string(),
      pattern: pattern.to_string(),
      source,
    }
  }
}

/// Failure reported by the transaction-history collaborator. The store is an
/// external subsystem; its failures reach us as an opaque message.
#[derive(Debug, Error)]
#[error("transaction history: {0}")]
pub struct HistoryError(String);

impl HistoryError {
  pub fn new(message: impl Into<String>) -> Self {
    Self(message.into())
  }
}
