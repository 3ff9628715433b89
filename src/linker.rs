//! Correlation strategies.
//!
//! A linker takes a log event and answers with the transaction ids it relates
//! to. The set of strategies is a closed enum, keeping the correlation path
//! statically verifiable.

use std::sync::Arc;

use crate::event::LogEvent;
use crate::history::TransactionId;
use crate::maintainer::TransactionIndexMaintainer;

#[derive(Clone)]
pub enum Linker {
  /// Relates nothing to anything. Keeps the fan-out honest in tests and in
  /// hosts that want a named "no correlation" column.
  NoOp,
  /// Matches transactions whose recorded interval intersects the tolerance
  /// window around the event's timestamp.
  TimeBased(Arc<TransactionIndexMaintainer>),
}

impl Linker {
  pub fn name(&self) -> &'static str {
    match self {
      Linker::NoOp => "none",
      Linker::TimeBased(_) => "time-based",
    }
  }

  pub fn find_related(&self, event: &LogEvent) -> Vec<TransactionId> {
    match self {
      Linker::NoOp => Vec::new(),
      Linker::TimeBased(maintainer) => maintainer.find_related(event),
    }
  }
}
