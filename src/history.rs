//! Read-only boundary to the proxy's transaction history.
//!
//! The proxy records one transaction per HTTP request/response pair: a send
//! time and an elapsed duration, which together form a time interval. This
//! module owns the collaborator trait plus an in-memory implementation used by
//! the binary and by tests.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::error::HistoryError;

/// Opaque identifier of a recorded HTTP transaction.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TransactionId(pub i32);

impl fmt::Display for TransactionId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    self.0.fmt(f)
  }
}

/// Identifier of the proxy session whose traffic is being recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub i64);

/// Recorded timing of one transaction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TransactionTiming {
  /// When the request was sent, as epoch milliseconds (UTC).
  pub sent_at_epoch_ms: i64,
  /// How long the request/response round trip took.
  pub elapsed_ms: i64,
}

/// Read-only access to recorded transactions. The correlation core never
/// writes to this store.
pub trait TransactionHistoryStore: Send + Sync {
  /// Ids of transactions recorded for `session` strictly greater than `after`
  /// (all of them when `after` is `None`), in ascending order.
  fn ids_since(
    &self,
    session: SessionId,
    after: Option<TransactionId>,
  ) -> Result<Vec<TransactionId>, HistoryError>;

  /// Recorded timing of one transaction.
  fn read(&self, id: TransactionId) -> Result<TransactionTiming, HistoryError>;
}

/// In-memory transaction table. Holds the traffic of a single session and
/// serves any `SessionId` it is asked about.
#[derive(Debug, Default)]
pub struct InMemoryHistoryStore {
  transactions: Mutex<BTreeMap<TransactionId, TransactionTiming>>,
}

impl InMemoryHistoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Record one transaction. Re-recording an id overwrites its timing.
  pub fn record(&self, id: TransactionId, timing: TransactionTiming) {
    self.transactions.lock().unwrap().insert(id, timing);
  }

  pub fn len(&self) -> usize {
    self.transactions.lock().unwrap().len()
  }

  pub fn is_empty(&self) -> bool {
    self.transactions.lock().unwrap().is_empty()
  }
}

impl TransactionHistoryStore for InMemoryHistoryStore {
  fn ids_since(
    &self,
    _session: SessionId,
    after: Option<TransactionId>,
  ) -> Result<Vec<TransactionId>, HistoryError> {
    let transactions = self.transactions.lock().unwrap();
    let ids = match after {
      // BTreeMap keys iterate ascending, which is the contract.
      Some(watermark) => transactions
        .keys()
        .filter(|id| **id > watermark)
        .copied()
        .collect(),
      None => transactions.keys().copied().collect(),
    };
    Ok(ids)
  }

  fn read(&self, id: TransactionId) -> Result<TransactionTiming, HistoryError> {
    self
      .transactions
      .lock()
      .unwrap()
      .get(&id)
      .copied()
      .ok_or_else(|| HistoryError::new(format!("no transaction with id {}", id)))
  }
}
