//! Wire date formats.
//!
//! Calendar dates are written as `YYYY-MM-DD`. Backends that store dates as
//! JS `Date` values send full ISO timestamps instead, so reads accept both.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer};

const DATE_FORMAT: &str = "%Y-%m-%d";
const NAIVE_TIMESTAMP_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parses an ISO calendar date or the date part of an ISO timestamp.
pub fn parse_calendar_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, DATE_FORMAT) {
        return Some(date);
    }
    // The calendar date is the literal prefix; converting through UTC would
    // shift it for non-zero offsets.
    let (date_part, _) = trimmed.split_once(['T', ' '])?;
    NaiveDate::parse_from_str(date_part, DATE_FORMAT).ok()
}

/// Parses an RFC 3339 timestamp, a naive ISO timestamp (taken as UTC), or a
/// bare date (taken as UTC midnight).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if let Ok(value) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(value.with_timezone(&Utc));
    }
    for format in NAIVE_TIMESTAMP_FORMATS {
        if let Ok(value) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(value.and_utc());
        }
    }
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|value| value.and_utc())
}

pub(crate) fn deserialize_calendar_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_calendar_date(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid calendar date `{raw}`")))
}

pub(crate) fn deserialize_optional_timestamp<'de, D>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    parse_timestamp(&raw)
        .map(Some)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp `{raw}`")))
}

/// Any JSON shape the backend may put in `age`.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawAge {
    Whole(i64),
    Fractional(f64),
    Text(String),
    Other(IgnoredAny),
}

/// Server age as sent. Values that are not whole numbers read as `None`
/// instead of failing the whole list.
pub(crate) fn deserialize_lenient_age<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let age = match Option::<RawAge>::deserialize(deserializer)? {
        None | Some(RawAge::Other(_)) => None,
        Some(RawAge::Whole(value)) => Some(value),
        Some(RawAge::Fractional(value)) => {
            (value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15)
                .then_some(value as i64)
        }
        Some(RawAge::Text(raw)) => raw.trim().parse().ok(),
    };
    Ok(age)
}
