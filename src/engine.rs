//! Core engine: validates inbound log events, fans out to linkers, dispatches
//! linked results to consumers.

use std::sync::{Arc, Mutex};

use serde_json::Value;
use tracing::{debug, warn};

use crate::consumer::Consumer;
use crate::event::{LinkedLogEvent, LogEvent, Properties, TransactionLink};
use crate::linker::Linker;

const TIMESTAMP_KEY: &str = "@timestamp";
const MESSAGE_KEY: &str = "message";
const LEVEL_KEY: &str = "level";

/// The public entry point of the correlation pipeline. Safe to share across
/// producer threads behind an `Arc`; see the crate docs for the locking
/// model.
#[derive(Default)]
pub struct CorrelationEngine {
  linkers: Mutex<Vec<Linker>>,
  consumers: Mutex<Vec<Arc<dyn Consumer>>>,
}

impl CorrelationEngine {
  pub fn new() -> Self {
    Self::default()
  }

  /// Correlate one inbound log event and dispatch the linked result.
  ///
  /// An event missing any of the required properties (`@timestamp`,
  /// `message`, `level`) is logged and dropped; nothing else happens to it.
  /// Consumer panics are not caught: a misbehaving consumer aborts delivery
  /// to the consumers registered after it for that event.
  pub fn add_log_event(&self, properties: Properties) {
    let Some(event) = event_from_properties(properties) else {
      warn!("properties do not form an application log event, skipping");
      return;
    };

    let links = self.link(&event);
    let linked = LinkedLogEvent::new(event, links);
    self.dispatch(&linked);
  }

  fn link(&self, event: &LogEvent) -> Vec<TransactionLink> {
    // Clone the registry so slow linkers (the time-based one may block on
    // history I/O) run outside the list lock.
    let linkers = self.linkers.lock().unwrap().clone();

    let mut links = Vec::new();
    for linker in &linkers {
      for transaction_id in linker.find_related(event) {
        links.push(TransactionLink {
          linker_name: linker.name().to_string(),
          transaction_id,
        });
      }
    }
    links
  }

  /// Consumer fan-out. Holding the consumer-list lock for the whole fan-out
  /// is what keeps two events from interleaving mid-update against shared
  /// consumer state.
  fn dispatch(&self, linked: &LinkedLogEvent) {
    let consumers = self.consumers.lock().unwrap();
    for consumer in consumers.iter() {
      consumer.on_linked_log_event(linked);
    }
  }

  pub fn register_linker(&self, linker: Linker) {
    self.linkers.lock().unwrap().push(linker);
  }

  pub fn register_consumer(&self, consumer: Arc<dyn Consumer>) {
    debug!("registering consumer");
    self.consumers.lock().unwrap().push(consumer);
  }

  /// Remove a previously registered consumer, matched by identity.
  pub fn remove_consumer(&self, consumer: &Arc<dyn Consumer>) {
    debug!("removing registered consumer");
    self
      .consumers
      .lock()
      .unwrap()
      .retain(|c| !Arc::ptr_eq(c, consumer));
  }
}

fn event_from_properties(properties: Properties) -> Option<LogEvent> {
  let timestamp = required_property(&properties, TIMESTAMP_KEY)?;
  let message = required_property(&properties, MESSAGE_KEY)?;
  let level = required_property(&properties, LEVEL_KEY)?;
  Some(LogEvent::new(timestamp, level, message, properties))
}

fn required_property(properties: &Properties, key: &str) -> Option<String> {
  match properties.get(key) {
    None | Some(Value::Null) => {
      warn!(key, "application log event does not contain required property");
      None
    }
    Some(Value::String(s)) => Some(s.clone()),
    // Producers sometimes send levels or timestamps as bare numbers; keep
    // their JSON rendering.
    Some(other) => Some(other.to_string()),
  }
}
