//! Time-based linker configuration with sane defaults.

use serde::{Deserialize, Serialize};

use crate::timestamp;

/// Tunables for matching a log event's timestamp against transaction intervals.
///
/// All four fields must be in effect (via [`configure`]) before the first log
/// event is correlated.
///
/// [`configure`]: crate::maintainer::TransactionIndexMaintainer::configure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
  /// Timestamp format: a registry alias (see [`timestamp::predefined_patterns`])
  /// or a literal chrono strftime string.
  pub pattern: String,
  /// Fallback zone applied when the timestamp string carries no zone of its own.
  /// Empty means "trust the value to already be UTC".
  pub zone: String,
  /// Half-width of the correlation window, in milliseconds.
  pub tolerance_ms: i64,
  /// Shift applied to the parsed timestamp before the window is computed, in
  /// milliseconds. May be negative (log clock runs ahead of the proxy clock).
  pub offset_ms: i64,
}

impl Default for LinkConfig {
  fn default() -> Self {
    Self {
      pattern: timestamp::DEFAULT_PATTERN.to_string(),
      zone: String::new(),
      tolerance_ms: 100,
      offset_ms: 0,
    }
  }
}
