//! Outward-facing consumer seam.

use std::sync::Mutex;

use crate::event::LinkedLogEvent;

/// Receives every linked log event the engine produces. Side-effecting; the
/// core defines no error contract and applies no timeout; consumers are
/// assumed non-blocking.
pub trait Consumer: Send + Sync {
  fn on_linked_log_event(&self, event: &LinkedLogEvent);
}

/// Accumulates every dispatched event in memory, e.g. to back a results view.
#[derive(Debug, Default)]
pub struct MemoryLogStore {
  events: Mutex<Vec<LinkedLogEvent>>,
}

impl MemoryLogStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Copy of everything received so far, in dispatch order.
  pub fn snapshot(&self) -> Vec<LinkedLogEvent> {
    self.events.lock().unwrap().clone()
  }

  pub fn len(&self) -> usize {
    self.events.lock().unwrap().len()
  }

  pub fn is_empty(&self) -> bool {
    self.events.lock().unwrap().is_empty()
  }
}

impl Consumer for MemoryLogStore {
  fn on_linked_log_event(&self, event: &LinkedLogEvent) {
    self.events.lock().unwrap().push(event.clone());
  }
}
