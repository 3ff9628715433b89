//! Tolerant timestamp parsing to UTC.
//!
//! Application logs disagree about time zones: some stamps carry an explicit
//! offset, some rely on a zone configured out of band, some are naive local
//! times that already mean UTC. [`parse_to_utc`] resolves all three with a
//! staged fallback:
//!
//! 1. Zone-aware parse. An explicit zone in the string always wins.
//! 2. When the string resolves no zone, force the configured fallback zone.
//! 3. When there is no fallback either, trust the value as already-UTC local
//!    time.
//!
//! "Zone missing" is a structural outcome of the parse attempt, never derived
//! from inspecting error messages.

use std::fmt::Write as _;

use chrono::format::{self, Fixed, Item, ParseErrorKind, Parsed, StrftimeItems};
use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};

use crate::error::TimestampError;

/// Registry alias used when no pattern has been configured.
pub const DEFAULT_PATTERN: &str = "ISO_DATE_TIME";

/// Symbolic aliases resolvable in place of a literal format string.
const PREDEFINED: &[(&str, &str)] = &[
  ("ISO_DATE_TIME", "%Y-%m-%dT%H:%M:%S%.f%:z"),
  ("RFC_1123_DATE_TIME", "%a, %d %b %Y %H:%M:%S %z"),
];

/// The registry aliases accepted by [`parse_to_utc`] and [`test_pattern`].
pub fn predefined_patterns() -> Vec<&'static str> {
  PREDEFINED.iter().map(|(alias, _)| *alias).collect()
}

fn resolve_pattern(pattern: &str) -> &str {
  PREDEFINED
    .iter()
    .find(|(alias, _)| *alias == pattern)
    .map(|(_, fmt)| *fmt)
    .unwrap_or(pattern)
}

/// Parse `raw` under `pattern` (alias or literal strftime string) into a UTC
/// instant, falling back to `fallback_zone` and then to naive-as-UTC when the
/// string itself resolves no zone.
pub fn parse_to_utc(
  raw: &str,
  pattern: &str,
  fallback_zone: &str,
) -> Result<DateTime<Utc>, TimestampError> {
  let fmt = resolve_pattern(pattern);
  match try_parse_zoned(raw, fmt) {
    ZonedAttempt::Zoned(utc) => Ok(utc),
    ZonedAttempt::ZoneMissing(naive) => match resolve_zone(fallback_zone)? {
      Some(offset) => Ok((naive - offset).and_utc()),
      None => Ok(naive.and_utc()),
    },
    ZonedAttempt::Failed(e) if e.kind() == ParseErrorKind::BadFormat => {
      Err(TimestampError::pattern(pattern))
    }
    ZonedAttempt::Failed(e) => Err(TimestampError::unparsable(raw, pattern, e)),
  }
}

/// Validate that `pattern` is syntactically usable by formatting the current
/// time with it. Returns the rendered sample.
pub fn test_pattern(pattern: &str) -> Result<String, TimestampError> {
  let fmt = resolve_pattern(pattern);
  let mut rendered = String::new();
  write!(rendered, "{}", Utc::now().format(fmt))
    .map_err(|_| TimestampError::pattern(pattern))?;
  Ok(rendered)
}

/// Outcome of one zone-aware parse attempt.
enum ZonedAttempt {
  /// The string carried a resolvable zone; converted to UTC via its offset.
  Zoned(DateTime<Utc>),
  /// Everything but the zone parsed cleanly. Carries the naive local value.
  ZoneMissing(NaiveDateTime),
  /// The string does not match the format.
  Failed(chrono::ParseError),
}

fn try_parse_zoned(raw: &str, fmt: &str) -> ZonedAttempt {
  let mut parsed = Parsed::new();
  let items = StrftimeItems::new(fmt).map(zulu_tolerant);
  match format::parse(&mut parsed, raw, items) {
    Ok(()) => match parsed.to_datetime() {
      Ok(dt) => ZonedAttempt::Zoned(dt.with_timezone(&Utc)),
      // Input fully consumed but no offset resolved: the format carries no
      // zone item at all.
      Err(e) => match naive_of(&parsed) {
        Some(naive) => ZonedAttempt::ZoneMissing(naive),
        None => ZonedAttempt::Failed(e),
      },
    },
    // Input ran out mid-format. Counts as zone-missing only when the string
    // parses cleanly once the zone items are dropped; a genuinely truncated
    // timestamp stays an error.
    Err(e) if e.kind() == ParseErrorKind::TooShort => {
      let mut without_zone = Parsed::new();
      let items = StrftimeItems::new(fmt).filter(|item| !is_zone_item(item));
      match format::parse(&mut without_zone, raw, items) {
        Ok(()) => match naive_of(&without_zone) {
          Some(naive) => ZonedAttempt::ZoneMissing(naive),
          None => ZonedAttempt::Failed(e),
        },
        Err(_) => ZonedAttempt::Failed(e),
      }
    }
    Err(e) => ZonedAttempt::Failed(e),
  }
}

/// Offset items upgraded to their `Z`-accepting variants: ISO-8601 stamps
/// written by UTC-clocked producers end in a literal `Z`, which the plain
/// offset items reject.
fn zulu_tolerant(item: Item<'_>) -> Item<'_> {
  match item {
    Item::Fixed(Fixed::TimezoneOffset) => Item::Fixed(Fixed::TimezoneOffsetZ),
    Item::Fixed(Fixed::TimezoneOffsetColon) => Item::Fixed(Fixed::TimezoneOffsetColonZ),
    other => other,
  }
}

fn is_zone_item(item: &Item<'_>) -> bool {
  matches!(
    item,
    Item::Fixed(
      Fixed::TimezoneName
        | Fixed::TimezoneOffset
        | Fixed::TimezoneOffsetColon
        | Fixed::TimezoneOffsetDoubleColon
        | Fixed::TimezoneOffsetTripleColon
        | Fixed::TimezoneOffsetColonZ
        | Fixed::TimezoneOffsetZ
    )
  )
}

fn naive_of(parsed: &Parsed) -> Option<NaiveDateTime> {
  let date = parsed.to_naive_date().ok()?;
  let time = parsed.to_naive_time().ok()?;
  Some(date.and_time(time))
}

/// Resolve a configured zone string to a fixed offset. Accepts `""` (none),
/// `Z`, `UTC`, `GMT`, `UTC+8`-style prefixed offsets, and bare `+HH:MM` /
/// `+HHMM` / `+H` offsets.
fn resolve_zone(zone: &str) -> Result<Option<FixedOffset>, TimestampError> {
  let trimmed = zone.trim();
  if trimmed.is_empty() {
    return Ok(None);
  }
  let rest = trimmed
    .strip_prefix("UTC")
    .or_else(|| trimmed.strip_prefix("GMT"))
    .unwrap_or(trimmed);
  if rest.is_empty() || rest == "Z" || rest == "z" {
    return Ok(Some(FixedOffset::east_opt(0).unwrap()));
  }
  parse_offset(rest)
    .map(Some)
    .ok_or_else(|| TimestampError::zone(zone))
}

fn parse_offset(s: &str) -> Option<FixedOffset> {
  let sign = match s.as_bytes().first()? {
    b'+' => 1,
    b'-' => -1,
    _ => return None,
  };
  let digits = &s[1..];
  let (hours, minutes) = match digits.split_once(':') {
    Some((h, m)) => (h, m),
    None if digits.len() == 4 => digits.split_at(2),
    None if matches!(digits.len(), 1 | 2) => (digits, "0"),
    None => return None,
  };
  let h: i32 = hours.parse().ok()?;
  let m: i32 = minutes.parse().ok()?;
  if h > 23 || m > 59 {
    return None;
  }
  FixedOffset::east_opt(sign * (h * 3600 + m * 60))
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::NaiveDate;

  const MILLIS_PATTERN: &str = "%Y-%m-%dT%H:%M:%S%.3f%:z";

  fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32, ms: u32) -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(y, mo, d)
      .unwrap()
      .and_hms_milli_opt(h, mi, s, ms)
      .unwrap()
      .and_utc()
  }

  #[test]
  fn zone_in_value_converts_to_utc() {
    let parsed = parse_to_utc("2018-10-11T17:17:24.416+02:00", MILLIS_PATTERN, "").unwrap();
    assert_eq!(parsed, utc(2018, 10, 11, 15, 17, 24, 416));
  }

  #[test]
  fn zone_absent_and_no_fallback_is_trusted_as_utc() {
    let parsed = parse_to_utc("2018-10-11T17:17:24.416", MILLIS_PATTERN, "").unwrap();
    assert_eq!(parsed, utc(2018, 10, 11, 17, 17, 24, 416));
  }

  #[test]
  fn zone_absent_uses_fallback_zone() {
    let parsed = parse_to_utc("2018-10-11T17:17:24.416", MILLIS_PATTERN, "UTC+8").unwrap();
    assert_eq!(parsed, utc(2018, 10, 11, 9, 17, 24, 416));
  }

  #[test]
  fn explicit_zone_wins_over_fallback() {
    let parsed =
      parse_to_utc("2018-10-11T17:17:24.416+02:00", MILLIS_PATTERN, "UTC+8").unwrap();
    assert_eq!(parsed, utc(2018, 10, 11, 15, 17, 24, 416));
  }

  #[test]
  fn iso_alias_matches_literal_pattern() {
    let zoned = parse_to_utc("2018-10-11T17:17:24.416+02:00", "ISO_DATE_TIME", "UTC+8");
    assert_eq!(zoned.unwrap(), utc(2018, 10, 11, 15, 17, 24, 416));

    let naive = parse_to_utc("2018-10-11T17:17:24.416", "ISO_DATE_TIME", "");
    assert_eq!(naive.unwrap(), utc(2018, 10, 11, 17, 17, 24, 416));
  }

  #[test]
  fn rfc_1123_alias_parses_numeric_offsets() {
    let parsed = parse_to_utc(
      "Thu, 11 Oct 2018 17:17:24 +0200",
      "RFC_1123_DATE_TIME",
      "",
    )
    .unwrap();
    assert_eq!(parsed, utc(2018, 10, 11, 15, 17, 24, 0));
  }

  #[test]
  fn zulu_suffix_is_an_explicit_zone() {
    let parsed = parse_to_utc("2018-10-11T17:17:24.416Z", MILLIS_PATTERN, "UTC+8").unwrap();
    assert_eq!(parsed, utc(2018, 10, 11, 17, 17, 24, 416));
  }

  #[test]
  fn negative_fallback_offset() {
    let parsed = parse_to_utc("2018-10-11T17:17:24.416", MILLIS_PATTERN, "-05:30").unwrap();
    assert_eq!(parsed, utc(2018, 10, 11, 22, 47, 24, 416));
  }

  #[test]
  fn truncated_timestamp_is_not_zone_missing() {
    let err = parse_to_utc("2018-10-11T17:17", MILLIS_PATTERN, "").unwrap_err();
    assert!(matches!(err, TimestampError::Unparsable { .. }));
  }

  #[test]
  fn trailing_garbage_fails() {
    let err = parse_to_utc("2018-10-11T17:17:24.416nope", MILLIS_PATTERN, "").unwrap_err();
    assert!(matches!(err, TimestampError::Unparsable { .. }));
  }

  #[test]
  fn unresolvable_fallback_zone_is_an_error() {
    let err = parse_to_utc("2018-10-11T17:17:24.416", MILLIS_PATTERN, "Mars/Olympus")
      .unwrap_err();
    assert!(matches!(err, TimestampError::Zone(_)));
  }

  #[test]
  fn zone_string_forms() {
    for (zone, east_secs) in [
      ("Z", 0),
      ("UTC", 0),
      ("GMT", 0),
      ("UTC+8", 8 * 3600),
      ("GMT-3", -3 * 3600),
      ("UTC+05:45", 5 * 3600 + 45 * 60),
      ("+0200", 2 * 3600),
      ("-08:00", -8 * 3600),
    ] {
      let resolved = resolve_zone(zone).unwrap().unwrap();
      assert_eq!(resolved.local_minus_utc(), east_secs, "zone {zone}");
    }
  }

  #[test]
  fn broken_pattern_is_reported_as_such() {
    let err = parse_to_utc("2018-10-11T17:17:24.416", "%!", "").unwrap_err();
    assert!(matches!(err, TimestampError::Pattern(_)));
  }

  #[test]
  fn test_pattern_accepts_aliases_and_literals() {
    assert!(test_pattern("ISO_DATE_TIME").is_ok());
    assert!(test_pattern("%Y-%m-%d %H:%M:%S").is_ok());
    assert!(test_pattern("%!").is_err());
  }

  #[test]
  fn predefined_patterns_lists_both_aliases() {
    let aliases = predefined_patterns();
    assert!(aliases.contains(&"ISO_DATE_TIME"));
    assert!(aliases.contains(&"RFC_1123_DATE_TIME"));
  }
}
