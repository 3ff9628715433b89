//! Binary entrypoint: correlate JSON log lines from stdin against a recorded
//! transaction table, write linked results as JSON lines to stdout.
//!
//! Usage: `log-linker <transactions.json>` where the file holds an array of
//! `{"id": .., "sent_at_epoch_ms": .., "elapsed_ms": ..}` records. Each stdin
//! line is a JSON object of log-event properties (at minimum `@timestamp`,
//! `message`, `level`). Invalid lines are logged to stderr and skipped.
//!
//! Time configuration comes from the environment: LOG_LINKER_PATTERN,
//! LOG_LINKER_ZONE, LOG_LINKER_TOLERANCE_MS, LOG_LINKER_OFFSET_MS.

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use serde::Deserialize;
use tracing_subscriber::EnvFilter;

use log_linker::{
  Consumer, CorrelationEngine, InMemoryHistoryStore, LinkConfig, LinkedLogEvent, Linker,
  SessionId, TransactionId, TransactionIndexMaintainer, TransactionTiming,
};

#[derive(Debug, Deserialize)]
struct TransactionRecord {
  id: TransactionId,
  sent_at_epoch_ms: i64,
  elapsed_ms: i64,
}

/// Writes each linked event as one JSON line.
struct StdoutEmitter;

impl Consumer for StdoutEmitter {
  fn on_linked_log_event(&self, event: &LinkedLogEvent) {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let _ = serde_json::to_writer(&mut out, event);
    let _ = writeln!(out);
  }
}

fn config_from_env() -> LinkConfig {
  let defaults = LinkConfig::default();
  LinkConfig {
    pattern: std::env::var("LOG_LINKER_PATTERN").unwrap_or(defaults.pattern),
    zone: std::env::var("LOG_LINKER_ZONE").unwrap_or(defaults.zone),
    tolerance_ms: std::env::var("LOG_LINKER_TOLERANCE_MS")
      .map(|v| v.parse().expect("LOG_LINKER_TOLERANCE_MS must be an integer"))
      .unwrap_or(defaults.tolerance_ms),
    offset_ms: std::env::var("LOG_LINKER_OFFSET_MS")
      .map(|v| v.parse().expect("LOG_LINKER_OFFSET_MS must be an integer"))
      .unwrap_or(defaults.offset_ms),
  }
}

fn load_store(path: &str) -> io::Result<Arc<InMemoryHistoryStore>> {
  let raw = std::fs::read_to_string(path)?;
  let records: Vec<TransactionRecord> = serde_json::from_str(&raw)
    .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

  let store = Arc::new(InMemoryHistoryStore::new());
  for record in records {
    store.record(
      record.id,
      TransactionTiming {
        sent_at_epoch_ms: record.sent_at_epoch_ms,
        elapsed_ms: record.elapsed_ms,
      },
    );
  }
  Ok(store)
}

fn main() {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    )
    .with_writer(io::stderr)
    .init();

  let path = match std::env::args().nth(1) {
    Some(p) => p,
    None => {
      eprintln!("usage: log-linker <transactions.json>");
      std::process::exit(2);
    }
  };

  let store = match load_store(&path) {
    Ok(s) => s,
    Err(e) => {
      eprintln!("log-linker: cannot load transactions from {}: {}", path, e);
      std::process::exit(1);
    }
  };
  tracing::info!(transactions = store.len(), "transaction table loaded");

  let maintainer = Arc::new(TransactionIndexMaintainer::new(store, SessionId(0)));
  maintainer.configure(config_from_env());

  let engine = CorrelationEngine::new();
  engine.register_linker(Linker::NoOp);
  engine.register_linker(Linker::TimeBased(maintainer));
  engine.register_consumer(Arc::new(StdoutEmitter));

  let stdin = io::stdin();
  for line in stdin.lock().lines() {
    let line = match line {
      Ok(l) => l,
      Err(e) => {
        eprintln!("log-linker: read error: {}", e);
        std::process::exit(1);
      }
    };

    // Skip blank lines.
    let trimmed = line.trim();
    if trimmed.is_empty() {
      continue;
    }

    match serde_json::from_str::<serde_json::Value>(trimmed) {
      Ok(serde_json::Value::Object(properties)) => engine.add_log_event(properties),
      Ok(_) => tracing::warn!("log line is not a JSON object, skipping"),
      Err(e) => tracing::warn!(error = %e, "log line is not valid JSON, skipping"),
    }
  }
}
