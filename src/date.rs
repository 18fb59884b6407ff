//! Parsing of the loose ISO-8601 date-time strings engines print
//!
//! Engines are not consistent about separators, fractional seconds, or how
//! they spell a UTC offset, so the grammar here is deliberately permissive.
//! Offsets are fixed numeric UTC offsets, never named zones.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, Offset, Utc};
use regex::Regex;
use std::sync::LazyLock;

static ISODATE_RX: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(
    r"(?x)
    (?P<year>\d{4})-?(?P<month>\d{2})-?(?P<day>\d{2})
    (?:
      \s*(?:T\s*)?
      (?P<hour>\d{2})
      (?::?(?P<minute>\d{2})(?::?(?P<second>\d{2}))?)?
      (?:[,.](?P<fraction>\d+))?
      (?:\s*(?P<tz>Z|[+-](?P<tzhh>\d{2})(?::?(?P<tzmm>\d{2}))?))?
    )?",
  )
  .expect("static regex")
});

/// A parsed timestamp with an optional explicit UTC offset.
///
/// The offset is `None` when the input carried no timezone at all; such a
/// value is naive and only comparable to other naive values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VcsDate {
  pub datetime: NaiveDateTime,
  pub offset: Option<FixedOffset>,
}

impl VcsDate {
  /// The timestamp as an offset-carrying `DateTime`, if an offset was given.
  pub fn fixed(&self) -> Option<DateTime<FixedOffset>> {
    self.offset.map(|off| {
      let utc = self.datetime - Duration::seconds(i64::from(off.local_minus_utc()));
      DateTime::from_naive_utc_and_offset(utc, off)
    })
  }

  /// Like [`fixed`](Self::fixed), but naive values are taken to be UTC.
  pub fn fixed_or_utc(&self) -> DateTime<FixedOffset> {
    self.fixed().unwrap_or_else(|| DateTime::from_naive_utc_and_offset(self.datetime, Utc.fix()))
  }
}

/// Parse a string that loosely fits an ISO 8601 formatted date-time.
///
/// The date may be embedded in surrounding text; the first match wins.
/// Fractional parts fall back per the grammar: with no minute the fraction
/// scales to minutes, with no second it scales to seconds, otherwise it is
/// sub-second precision.
///
/// # Panics
///
/// Panics if the string contains nothing matching the grammar, or a matched
/// date is not a real calendar date. A failure here means the engine emitted
/// something this adapter does not understand, which is unrecoverable.
pub fn parse_isodate(datestr: &str) -> VcsDate {
  let caps = ISODATE_RX
    .captures(datestr)
    .unwrap_or_else(|| panic!("unrecognized date format: {}", datestr));

  let num = |name: &str| caps.name(name).map(|m| m.as_str().parse::<u32>().unwrap_or(0));
  let year: i32 = caps["year"].parse().unwrap_or(0);
  let month = num("month").unwrap_or(1);
  let day = num("day").unwrap_or(1);

  let fraction = caps.name("fraction").map_or(0.0, |m| {
    // interpret the digits as a decimal fraction; 9 digits is plenty
    m.as_str().chars().take(9).fold((0.0f64, 0.1f64), |(acc, scale), c| {
      (acc + scale * f64::from(c.to_digit(10).unwrap_or(0)), scale / 10.0)
    }).0
  });

  let (hour, minute, second, micro) = match (num("hour"), num("minute"), num("second")) {
    (None, _, _) => (0, 0, 0, 0),
    (Some(h), None, _) => (h, (60.0 * fraction) as u32, 0, 0),
    (Some(h), Some(m), None) => (h, m, (60.0 * fraction) as u32, 0),
    (Some(h), Some(m), Some(s)) => (h, m, s, (1_000_000.0 * fraction) as u32),
  };

  let datetime = NaiveDate::from_ymd_opt(year, month, day)
    .and_then(|d| d.and_hms_micro_opt(hour, minute, second, micro))
    .unwrap_or_else(|| panic!("invalid date-time: {}", datestr));

  let offset = caps.name("tz").map(|tz| {
    if tz.as_str() == "Z" {
      Utc.fix()
    } else {
      let minutes = num("tzhh").unwrap_or(0) * 60 + num("tzmm").unwrap_or(0);
      let secs = (minutes * 60) as i32;
      let secs = if tz.as_str().starts_with('-') { -secs } else { secs };
      FixedOffset::east_opt(secs).unwrap_or_else(|| panic!("invalid UTC offset: {}", datestr))
    }
  });

  VcsDate { datetime, offset }
}
