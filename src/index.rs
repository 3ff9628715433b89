//! Append-only time-interval index over recorded transactions.

use chrono::{DateTime, Utc};

use crate::history::TransactionId;

/// One recorded transaction's closed time interval `[start, end]`. Created
/// when the maintainer first observes the transaction; never mutated or
/// removed afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionInterval {
  pub id: TransactionId,
  pub start: DateTime<Utc>,
  pub end: DateTime<Utc>,
}

/// Insertion-ordered collection of transaction intervals with range queries.
///
/// The index only grows: nothing evicts old intervals for the lifetime of the
/// session.
#[derive(Debug, Default)]
pub struct TransactionIntervalIndex {
  intervals: Vec<TransactionInterval>,
}

impl TransactionIntervalIndex {
  pub fn new() -> Self {
    Self::default()
  }

  /// Append an interval.
  ///
  /// # Panics
  ///
  /// When `start > end`. That is a caller error, not a data condition.
  pub fn add(&mut self, start: DateTime<Utc>, end: DateTime<Utc>, id: TransactionId) {
    assert!(
      start <= end,
      "interval start {start} is after end {end} (transaction {id})"
    );
    self.intervals.push(TransactionInterval { id, start, end });
  }

  /// Ids of all intervals whose closed `[start, end]` intersects the closed
  /// `[from, till]`. Touching endpoints count as intersecting. Results come
  /// back in insertion order, not time order.
  pub fn query_intersecting(
    &self,
    from: DateTime<Utc>,
    till: DateTime<Utc>,
  ) -> Vec<TransactionId> {
    self
      .intervals
      .iter()
      .filter(|i| !(till < i.start || from > i.end))
      .map(|i| i.id)
      .collect()
  }

  /// Stricter variant: only intervals fully contained within `[from, till]`.
  /// The correlation path does not use this; kept as part of the index's
  /// query surface.
  pub fn query_enclosed(
    &self,
    from: DateTime<Utc>,
    till: DateTime<Utc>,
  ) -> Vec<TransactionId> {
    self
      .intervals
      .iter()
      .filter(|i| from <= i.start && i.end <= till)
      .map(|i| i.id)
      .collect()
  }

  pub fn len(&self) -> usize {
    self.intervals.len()
  }

  pub fn is_empty(&self) -> bool {
    self.intervals.is_empty()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::TimeZone;

  fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
  }

  /// One interval [10:20:30, 10:20:35], queried with a range.
  fn query_single(from: DateTime<Utc>, till: DateTime<Utc>) -> Vec<TransactionId> {
    let mut index = TransactionIntervalIndex::new();
    index.add(
      at(2018, 10, 5, 10, 20, 30),
      at(2018, 10, 5, 10, 20, 35),
      TransactionId(1),
    );
    index.query_intersecting(from, till)
  }

  #[test]
  fn query_overlapping_interval_start() {
    let hits = query_single(at(2018, 10, 5, 10, 20, 29), at(2018, 10, 5, 10, 20, 31));
    assert_eq!(hits.len(), 1);
  }

  #[test]
  fn query_overlapping_interval_end() {
    let hits = query_single(at(2018, 10, 5, 10, 20, 31), at(2018, 10, 5, 10, 20, 36));
    assert_eq!(hits.len(), 1);
  }

  #[test]
  fn query_entirely_before_interval() {
    let hits = query_single(at(2018, 10, 5, 10, 20, 27), at(2018, 10, 5, 10, 20, 29));
    assert!(hits.is_empty());
  }

  #[test]
  fn query_entirely_after_interval() {
    let hits = query_single(at(2018, 10, 5, 10, 20, 36), at(2018, 10, 5, 10, 20, 38));
    assert!(hits.is_empty());
  }

  #[test]
  fn query_inside_interval() {
    let hits = query_single(at(2018, 10, 5, 10, 20, 32), at(2018, 10, 5, 10, 20, 33));
    assert_eq!(hits.len(), 1);
  }

  #[test]
  fn query_matching_interval_exactly() {
    let hits = query_single(at(2018, 10, 5, 10, 20, 30), at(2018, 10, 5, 10, 20, 35));
    assert_eq!(hits.len(), 1);
  }

  #[test]
  fn query_wrapping_interval() {
    let hits = query_single(at(2018, 10, 5, 10, 20, 29), at(2018, 10, 5, 10, 20, 36));
    assert_eq!(hits.len(), 1);
  }

  #[test]
  fn point_query_inside_interval() {
    let hits = query_single(at(2018, 10, 5, 10, 20, 32), at(2018, 10, 5, 10, 20, 32));
    assert_eq!(hits.len(), 1);
  }

  #[test]
  fn point_query_touching_interval_start() {
    let hits = query_single(at(2018, 10, 5, 10, 20, 30), at(2018, 10, 5, 10, 20, 30));
    assert_eq!(hits.len(), 1);
  }

  #[test]
  fn point_query_touching_interval_end() {
    let hits = query_single(at(2018, 10, 5, 10, 20, 35), at(2018, 10, 5, 10, 20, 35));
    assert_eq!(hits.len(), 1);
  }

  /// Results come back in insertion order even when later-inserted intervals
  /// are chronologically earlier.
  #[test]
  fn results_are_in_insertion_order() {
    let mut index = TransactionIntervalIndex::new();
    let d = at(2018, 11, 6, 11, 20, 31);
    let a = at(2018, 10, 5, 10, 20, 30);
    let c = at(2018, 11, 5, 11, 20, 31);
    let b = at(2018, 10, 5, 11, 21, 31);

    index.add(d, d, TransactionId(40)); // D
    index.add(a, a, TransactionId(10)); // A1
    index.add(a, a, TransactionId(11)); // A2
    index.add(c, c, TransactionId(30)); // C
    index.add(b, b, TransactionId(20)); // B

    let hits =
      index.query_intersecting(at(2018, 10, 5, 10, 30, 1), at(2018, 11, 5, 12, 30, 1));
    assert_eq!(hits, vec![TransactionId(30), TransactionId(20)]);
  }

  #[test]
  fn insertion_order_holds_for_proper_ranges_too() {
    let mut index = TransactionIntervalIndex::new();
    index.add(
      at(2018, 11, 6, 11, 20, 31),
      at(2018, 11, 6, 11, 20, 33),
      TransactionId(40),
    );
    index.add(
      at(2018, 10, 5, 10, 20, 30),
      at(2018, 10, 5, 10, 20, 32),
      TransactionId(10),
    );
    index.add(
      at(2018, 11, 5, 11, 20, 31),
      at(2018, 11, 5, 11, 20, 33),
      TransactionId(30),
    );
    index.add(
      at(2018, 10, 5, 11, 21, 31),
      at(2018, 10, 5, 11, 21, 33),
      TransactionId(20),
    );

    let hits =
      index.query_intersecting(at(2018, 10, 5, 10, 30, 1), at(2018, 11, 5, 12, 30, 1));
    assert_eq!(hits, vec![TransactionId(30), TransactionId(20)]);
  }

  #[test]
  fn enclosed_requires_full_containment() {
    let mut index = TransactionIntervalIndex::new();
    index.add(
      at(2018, 10, 5, 10, 20, 30),
      at(2018, 10, 5, 10, 20, 35),
      TransactionId(1),
    );

    // Overlapping but sticking out on the left: intersects, not enclosed.
    let from = at(2018, 10, 5, 10, 20, 32);
    let till = at(2018, 10, 5, 10, 20, 40);
    assert_eq!(index.query_intersecting(from, till).len(), 1);
    assert!(index.query_enclosed(from, till).is_empty());

    // Wrapping range encloses.
    let from = at(2018, 10, 5, 10, 20, 30);
    let till = at(2018, 10, 5, 10, 20, 35);
    assert_eq!(index.query_enclosed(from, till), vec![TransactionId(1)]);
  }

  #[test]
  #[should_panic(expected = "after end")]
  fn add_rejects_inverted_interval() {
    let mut index = TransactionIntervalIndex::new();
    index.add(
      at(2018, 10, 5, 10, 20, 35),
      at(2018, 10, 5, 10, 20, 30),
      TransactionId(1),
    );
  }
}
