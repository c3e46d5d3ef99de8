// Copyright 2025 Cowboy AI, LLC.

//! Date transformations and the reference `string -> {date, time}` pipe
//!
//! Each step is an ordinary function so it can be chained on its own:
//!
//! ```text
//! "Jan 1, 2024" -> 1704067200000 -> DateTime<Utc> -> "2024-01-01T00:00:00.000Z"
//!               -> ["2024-01-01", "00:00:00.000Z"] -> DateAndTime
//! ```
//!
//! Dates without a zone are read as UTC midnight, so results do not depend
//! on the host time zone.

use chrono::{DateTime, NaiveDate, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{TransformError, TransformResult};
use crate::pipe::{pipe, Pipe};

/// Calendar formats tried in order after RFC 3339
const DATE_FORMATS: &[&str] = &["%b %d, %Y", "%B %d, %Y", "%Y-%m-%d"];

/// A date split into its calendar and time-of-day parts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateAndTime {
    /// `YYYY-MM-DD`
    pub date: String,
    /// `HH:MM:SS.sssZ`
    pub time: String,
}

impl DateAndTime {
    /// Build from exactly two parts: date then time
    pub fn from_parts(parts: Vec<String>) -> TransformResult<Self> {
        match <[String; 2]>::try_from(parts) {
            Ok([date, time]) => Ok(Self { date, time }),
            Err(parts) => Err(TransformError::MalformedIso(parts.join("T"))),
        }
    }

    /// Render as JSON
    ///
    /// Cannot fail for this record; the `Result` keeps the signature in line
    /// with other serializers feeding [`TransformError::Serialization`].
    pub fn to_json(&self) -> TransformResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Parse a date string into epoch milliseconds
pub fn parse_date(input: &str) -> TransformResult<i64> {
    let trimmed = input.trim();
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(timestamp.timestamp_millis());
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            let midnight = date
                .and_hms_opt(0, 0, 0)
                .ok_or_else(|| TransformError::parse(input, "no midnight for date"))?;
            return Ok(Utc.from_utc_datetime(&midnight).timestamp_millis());
        }
    }

    debug!(input, "no date format matched");
    Err(TransformError::parse(input, "unrecognized date format"))
}

/// Epoch milliseconds to a UTC date-time
pub fn from_millis(millis: i64) -> TransformResult<DateTime<Utc>> {
    Utc.timestamp_millis_opt(millis)
        .single()
        .ok_or(TransformError::TimestampOutOfRange(millis))
}

/// `YYYY-MM-DDTHH:MM:SS.sssZ`
pub fn to_iso_string(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Split an ISO string on `'T'`
pub fn split_iso(iso: String) -> Vec<String> {
    iso.split('T').map(str::to_owned).collect()
}

/// `string -> [date, time]`
pub fn string_to_iso_parts() -> Pipe<String, TransformResult<Vec<String>>> {
    pipe(|input: String| parse_date(&input))
        .with_label("parse_date")
        .and_then(from_millis)
        .with_label("from_millis")
        .map_ok(to_iso_string)
        .with_label("to_iso_string")
        .map_ok(split_iso)
        .with_label("split_iso")
}

/// `string -> DateAndTime`
pub fn string_to_date_and_time() -> Pipe<String, TransformResult<DateAndTime>> {
    string_to_iso_parts()
        .and_then(DateAndTime::from_parts)
        .with_label("from_parts")
}
