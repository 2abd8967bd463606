//! Timestamp normalization for telemetry rows.
//!
//! The backing store serializes dates either natively (ISO strings) or with
//! the extended-JSON convention (`{"$date": ...}`), so a row's timestamp can
//! arrive in several shapes. [`normalize_timestamp`] tries a fixed, ordered
//! list of [`TimestampShape`] matchers and never fails: anything it cannot
//! read becomes [`NormalizedTimestamp::Unparseable`] holding the raw text.

use std::fmt;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;

const DATE_KEY: &str = "$date";
const NUMBER_LONG_KEY: &str = "$numberLong";

/// Format used when rendering an instant in a concrete time zone.
pub const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M",
    // `%b` also accepts full month names when parsing.
    "%b %d %Y %H:%M:%S",
    "%b %d, %Y %H:%M:%S",
    "%b %d %Y %H:%M",
    "%b %d, %Y %H:%M",
    "%d %b %Y %H:%M:%S",
    "%a %b %d %Y %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%b %d %Y",
    "%b %d, %Y",
    "%d %b %Y",
    "%a %b %d %Y",
];

const OFFSET_DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%d %H:%M:%S%.f%:z"];

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NormalizedTimestamp {
    /// A readable point in time.
    At(DateTime<Utc>),
    /// The raw value could not be read; holds its display form verbatim.
    Unparseable(String),
}

impl NormalizedTimestamp {
    pub fn instant(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::At(instant) => Some(*instant),
            Self::Unparseable(_) => None,
        }
    }

    pub fn is_parsed(&self) -> bool {
        matches!(self, Self::At(_))
    }

    /// Renders the instant in `tz`, or the raw text for unparseable values.
    pub fn display_in<Tz>(&self, tz: &Tz) -> String
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        match self {
            Self::At(instant) => instant.with_timezone(tz).format(DISPLAY_FORMAT).to_string(),
            Self::Unparseable(raw) => raw.clone(),
        }
    }

    /// Renders in the local time zone of the running process.
    pub fn display_local(&self) -> String {
        self.display_in(&Local)
    }
}

impl fmt::Display for NormalizedTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_local())
    }
}

/// Wire encodings a raw timestamp can take, in matching order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampShape {
    /// `"2024-01-15T10:30:00Z"`
    StringDate,
    /// `{"$date": "2024-01-15T10:30:00Z"}`
    WrappedDate,
    /// `{"$date": {"$numberLong": "1705314600000"}}` (or a bare number under `$date`)
    WrappedEpochMillis,
}

impl TimestampShape {
    pub const ORDER: [TimestampShape; 3] = [
        TimestampShape::StringDate,
        TimestampShape::WrappedDate,
        TimestampShape::WrappedEpochMillis,
    ];

    /// Returns `None` when `raw` is not this shape or its payload does not parse.
    pub fn try_parse(self, raw: &Value) -> Option<DateTime<Utc>> {
        match self {
            TimestampShape::StringDate => raw.as_str().and_then(parse_date_string),
            TimestampShape::WrappedDate => raw
                .get(DATE_KEY)
                .and_then(Value::as_str)
                .and_then(parse_date_string),
            TimestampShape::WrappedEpochMillis => {
                let wrapped = raw.get(DATE_KEY)?;
                let millis = match wrapped {
                    Value::Number(number) => number.as_i64()?,
                    Value::Object(_) => wrapped
                        .get(NUMBER_LONG_KEY)
                        .and_then(Value::as_str)
                        .and_then(|digits| digits.trim().parse::<i64>().ok())?,
                    _ => return None,
                };
                Utc.timestamp_millis_opt(millis).single()
            }
        }
    }
}

/// Converts any raw wire timestamp into a [`NormalizedTimestamp`]. First matching shape wins.
pub fn normalize_timestamp(raw: &Value) -> NormalizedTimestamp {
    TimestampShape::ORDER
        .iter()
        .find_map(|shape| shape.try_parse(raw))
        .map(NormalizedTimestamp::At)
        .unwrap_or_else(|| NormalizedTimestamp::Unparseable(display_raw(raw)))
}

fn display_raw(raw: &Value) -> String {
    match raw {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Parses ISO 8601, RFC 2822 and the common slash and month-name forms.
///
/// Strings without an offset are read as UTC, matching how the store writes them.
pub fn parse_date_string(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(parsed) = DateTime::parse_from_rfc2822(text) {
        return Some(parsed.with_timezone(&Utc));
    }
    for format in OFFSET_DATETIME_FORMATS {
        if let Ok(parsed) = DateTime::parse_from_str(text, format) {
            return Some(parsed.with_timezone(&Utc));
        }
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(text, format) {
            return Some(parsed.and_utc());
        }
    }
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc())
}
