//! Incremental maintenance of the transaction interval index.
//!
//! Used concurrently from every producer thread that reports log events, so
//! all index state lives behind a single mutex: a correlation call never sees
//! a half-updated watermark, and two calls never ingest the same transaction
//! twice.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration};
use tracing::error;

use crate::config::LinkConfig;
use crate::event::LogEvent;
use crate::history::{SessionId, TransactionHistoryStore, TransactionId};
use crate::index::TransactionIntervalIndex;
use crate::timestamp;

/// Index plus the high-water mark of ids already folded into it. Mutated only
/// under the maintainer's mutex.
#[derive(Debug, Default)]
struct IndexState {
  index: TransactionIntervalIndex,
  watermark: Option<TransactionId>,
}

/// Pulls newly recorded transactions from the history store into the interval
/// index and answers time-window queries against it.
pub struct TransactionIndexMaintainer {
  store: Arc<dyn TransactionHistoryStore>,
  session: SessionId,
  config: Mutex<Option<LinkConfig>>,
  state: Mutex<IndexState>,
}

impl TransactionIndexMaintainer {
  /// An unconfigured maintainer. [`configure`](Self::configure) must be
  /// called before the first [`find_related`](Self::find_related).
  pub fn new(store: Arc<dyn TransactionHistoryStore>, session: SessionId) -> Self {
    Self {
      store,
      session,
      config: Mutex::new(None),
      state: Mutex::new(IndexState::default()),
    }
  }

  /// Set (or replace) the time configuration.
  pub fn configure(&self, config: LinkConfig) {
    *self.config.lock().unwrap() = Some(config);
  }

  /// Pull transactions recorded since the last refresh into the index.
  /// Idempotent: with no new transactions this performs no mutation.
  pub fn refresh(&self) {
    let mut state = self.state.lock().unwrap();
    self.refresh_locked(&mut state);
  }

  /// Transactions whose recorded interval intersects the tolerance window
  /// around the event's (offset-adjusted) timestamp.
  ///
  /// An unparseable timestamp contributes zero links and is logged; the event
  /// itself lives on, and other linkers may still match it.
  ///
  /// # Panics
  ///
  /// When called before [`configure`](Self::configure). That is a host
  /// initialization-order bug, reported loudly rather than degraded silently.
  pub fn find_related(&self, event: &LogEvent) -> Vec<TransactionId> {
    let config = self
      .config
      .lock()
      .unwrap()
      .clone()
      .expect("TransactionIndexMaintainer::find_related called before configure()");

    let log_time =
      match timestamp::parse_to_utc(event.timestamp(), &config.pattern, &config.zone) {
        Ok(t) => t,
        Err(e) => {
          error!(
            timestamp = event.timestamp(),
            pattern = %config.pattern,
            error = %e,
            "log event timestamp is not parsable, contributing no links"
          );
          return Vec::new();
        }
      };

    let shifted = log_time + Duration::milliseconds(config.offset_ms);
    let from = shifted - Duration::milliseconds(config.tolerance_ms);
    let till = shifted + Duration::milliseconds(config.tolerance_ms);

    // Refresh and query under one lock acquisition so the result reflects a
    // consistent index.
    let mut state = self.state.lock().unwrap();
    self.refresh_locked(&mut state);
    state.index.query_intersecting(from, till)
  }

  fn refresh_locked(&self, state: &mut IndexState) {
    let ids = match self.store.ids_since(self.session, state.watermark) {
      Ok(ids) => ids,
      Err(e) => {
        error!(error = %e, "listing new transaction ids failed, keeping index as-is");
        return;
      }
    };

    for id in ids {
      let timing = match self.store.read(id) {
        Ok(t) => t,
        Err(e) => {
          // Watermark stays below this id; the next refresh resumes here.
          error!(transaction = %id, error = %e, "reading transaction failed, halting refresh");
          return;
        }
      };
      let Some(start) = DateTime::from_timestamp_millis(timing.sent_at_epoch_ms) else {
        error!(transaction = %id, sent_at = timing.sent_at_epoch_ms, "transaction send time out of range, halting refresh");
        return;
      };
      let end = start + Duration::milliseconds(timing.elapsed_ms);
      state.index.add(start, end, id);
      state.watermark = Some(id);
    }
  }

  /// Highest transaction id folded into the index so far.
  pub fn watermark(&self) -> Option<TransactionId> {
    self.state.lock().unwrap().watermark
  }

  /// Number of intervals currently indexed.
  pub fn interval_count(&self) -> usize {
    self.state.lock().unwrap().index.len()
  }
}
