//! Date and timezone parsing for date-driven strategies
//!
//! All parsers are fallible and return `Option`; callers collapse `None`
//! into their fail-closed result.

use crate::context::{CURRENT_DATE, EvaluationContext, FlagConfig};
use chrono::{
    DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone, Utc,
};
use chrono_tz::Tz;
use serde_json::Value;

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Which end of a date range a bound describes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeBound {
    /// Normalized to 00:00:00 of its day
    Start,
    /// Normalized to 23:59:59 of its day
    End,
}

/// Parse an IANA timezone name
pub fn parse_timezone(name: &str) -> Option<Tz> {
    name.parse::<Tz>().ok()
}

/// Timezone named by the config's `timezone` field, or `default` when absent.
///
/// A present but unknown or non-string `timezone` yields `None`.
pub fn config_timezone(config: &FlagConfig, default: Tz) -> Option<Tz> {
    match config.get("timezone") {
        None | Some(Value::Null) => Some(default),
        Some(Value::String(name)) => parse_timezone(name),
        Some(_) => None,
    }
}

/// Parse a date or datetime string in `tz`.
///
/// RFC 3339 strings carry their own offset and are converted into `tz`;
/// naive strings are read as local time in `tz`.
pub fn parse_datetime_str(raw: &str, tz: Tz) -> Option<DateTime<Tz>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&tz));
    }
    for format in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return localize(tz, naive);
        }
    }
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .ok()
        .and_then(|date| localize(tz, date.and_time(NaiveTime::MIN)))
}

/// Parse a string or unix-seconds value in `tz`
pub fn parse_datetime(value: &Value, tz: Tz) -> Option<DateTime<Tz>> {
    match value {
        Value::String(raw) => parse_datetime_str(raw, tz),
        Value::Number(n) => n
            .as_i64()
            .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
            .map(|utc| utc.with_timezone(&tz)),
        _ => None,
    }
}

/// Parse a range bound and snap it to the start or end of its day
pub fn parse_range_bound(value: &Value, tz: Tz, bound: RangeBound) -> Option<DateTime<Tz>> {
    let parsed = parse_datetime(value, tz)?;
    let time = match bound {
        RangeBound::Start => NaiveTime::MIN,
        RangeBound::End => NaiveTime::from_hms_opt(23, 59, 59)?,
    };
    localize(tz, parsed.date_naive().and_time(time))
}

/// "Now" for an evaluation: the context's `current_date` when present,
/// otherwise the system clock. An unparsable `current_date` yields `None`.
pub fn evaluation_now(context: &EvaluationContext, tz: Tz) -> Option<DateTime<Tz>> {
    match context.get(CURRENT_DATE) {
        None | Some(Value::Null) => Some(Utc::now().with_timezone(&tz)),
        Some(value) => parse_datetime(value, tz),
    }
}

/// Resolve a local time in `tz`.
///
/// Ambiguous times take the earlier instant. Times skipped by a DST jump
/// are read with the offset in force before the jump, which moves them
/// forward past the gap. A skipped midnight becomes the first instant
/// after the gap.
fn localize(tz: Tz, naive: NaiveDateTime) -> Option<DateTime<Tz>> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => Some(dt),
        LocalResult::None => {
            let before = tz
                .from_local_datetime(&(naive - Duration::days(1)))
                .earliest()?
                .offset()
                .fix();
            let utc = naive - Duration::seconds(i64::from(before.local_minus_utc()));
            Some(tz.from_utc_datetime(&utc))
        }
    }
}
