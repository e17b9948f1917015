//! Typed cell values for prepared event logs
//!
//! Every column of a prepared table has a single [`ColumnKind`]. Cells are
//! stored as [`Value`]s whose derived ordering places nulls last, which is
//! the ordering used for every sort in the pipeline.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone};
use ordered_float::OrderedFloat;
use serde::{Serialize, Serializer};
use std::fmt;

/// Offset-aware formats tried after RFC 3339
const ZONED_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y/%m/%d %H:%M:%S%.f%:z",
];

/// Naive formats, interpreted as wall-clock time without an offset
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S%.f",
    "%m/%d/%Y %H:%M",
];

/// Date-only formats, read as midnight
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

/// An absolute point in time, either offset-aware or naive
///
/// Naive timestamps are carried with a zero offset and rendered without one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Timestamp {
    instant: DateTime<FixedOffset>,
    zoned: bool,
}

impl Timestamp {
    /// Wrap an offset-aware datetime
    pub fn zoned(instant: DateTime<FixedOffset>) -> Self {
        Self {
            instant,
            zoned: true,
        }
    }

    /// Wrap a naive datetime
    pub fn naive(local: NaiveDateTime) -> Self {
        Self {
            instant: local.and_utc().fixed_offset(),
            zoned: false,
        }
    }

    /// Parse a timestamp in one of the accepted textual forms
    ///
    /// Returns `None` for empty input and for anything unrecognised; callers
    /// decide whether that is fatal.
    pub fn parse(raw: &str) -> Option<Self> {
        let s = raw.trim();
        if s.is_empty() {
            return None;
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(Self::zoned(dt));
        }

        for fmt in ZONED_FORMATS {
            if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
                return Some(Self::zoned(dt));
            }
        }

        // "2023-05-01 10:00:00Z" is not RFC 3339 but shows up in exported logs
        if let Some(body) = s.strip_suffix('Z').or_else(|| s.strip_suffix('z')) {
            for fmt in NAIVE_FORMATS {
                if let Ok(local) = NaiveDateTime::parse_from_str(body, fmt) {
                    return Some(Self::zoned(local.and_utc().fixed_offset()));
                }
            }
        }

        for fmt in NAIVE_FORMATS {
            if let Ok(local) = NaiveDateTime::parse_from_str(s, fmt) {
                return Some(Self::naive(local));
            }
        }

        DATE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(Self::naive)
    }

    /// Whether the source value carried an explicit offset
    pub fn is_zoned(&self) -> bool {
        self.zoned
    }

    /// The underlying offset-aware instant
    pub fn instant(&self) -> DateTime<FixedOffset> {
        self.instant
    }

    /// Calendar date in the timestamp's own zone
    pub fn date(&self) -> NaiveDate {
        self.instant.date_naive()
    }

    /// Truncate to midnight of the calendar day, keeping the same offset
    pub fn floor_day(&self) -> Self {
        let offset = *self.instant.offset();
        let instant = self
            .date()
            .and_hms_opt(0, 0, 0)
            .and_then(|midnight| offset.from_local_datetime(&midnight).single())
            .unwrap_or(self.instant);
        Self {
            instant,
            zoned: self.zoned,
        }
    }

    /// Fractional minutes elapsed since `earlier` (negative if `earlier` is later)
    pub fn minutes_since(&self, earlier: &Timestamp) -> f64 {
        let delta = self.instant.signed_duration_since(earlier.instant);
        match delta.num_microseconds() {
            Some(us) => us as f64 / 60_000_000.0,
            None => delta.num_milliseconds() as f64 / 60_000.0,
        }
    }

    /// Fractional hours elapsed since `earlier`
    pub fn hours_since(&self, earlier: &Timestamp) -> f64 {
        self.minutes_since(earlier) / 60.0
    }

    /// Seconds since the Unix epoch, used for plot coordinates
    pub fn epoch_seconds(&self) -> f64 {
        self.instant.timestamp_millis() as f64 / 1000.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.zoned {
            write!(f, "{}", self.instant.format("%Y-%m-%d %H:%M:%S%.f%:z"))
        } else {
            write!(f, "{}", self.instant.naive_local().format("%Y-%m-%d %H:%M:%S%.f"))
        }
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Storage type of a prepared-table column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Number,
    Time,
    Text,
}

impl ColumnKind {
    /// Numeric if every non-empty cell parses as `f64`, text otherwise
    ///
    /// A column with no values at all is numeric (entirely null).
    pub fn infer<'a>(cells: impl IntoIterator<Item = &'a str>) -> Self {
        for cell in cells {
            let cell = cell.trim();
            if !cell.is_empty() && cell.parse::<f64>().is_err() {
                return ColumnKind::Text;
            }
        }
        ColumnKind::Number
    }
}

/// A single typed cell
///
/// Variant order matters: the derived `Ord` sorts nulls after every value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Value {
    Number(OrderedFloat<f64>),
    Time(Timestamp),
    Text(String),
    Null,
}

impl Value {
    /// Numeric value, normalising NaN to null
    pub fn number(n: f64) -> Self {
        if n.is_nan() {
            Value::Null
        } else {
            Value::Number(OrderedFloat(n))
        }
    }

    /// Parse a raw numeric or text cell; empty cells become null
    ///
    /// Timestamp columns are parsed by the preparation step, which owns the
    /// reject/drop policy.
    pub fn from_cell(raw: &str, kind: ColumnKind) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Value::Null;
        }
        match kind {
            ColumnKind::Number => trimmed
                .parse::<f64>()
                .map(Value::number)
                .unwrap_or(Value::Null),
            ColumnKind::Time => Timestamp::parse(trimmed)
                .map(Value::Time)
                .unwrap_or(Value::Null),
            ColumnKind::Text => Value::Text(raw.to_string()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(n.0),
            _ => None,
        }
    }

    pub fn as_time(&self) -> Option<&Timestamp> {
        match self {
            Value::Time(t) => Some(t),
            _ => None,
        }
    }

    /// Horizontal plot coordinate (epoch seconds for timestamps)
    pub fn plot_coordinate(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(n.0),
            Value::Time(t) => Some(t.epoch_seconds()),
            Value::Text(_) | Value::Null => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", n.0),
            Value::Time(t) => write!(f, "{}", t),
            Value::Text(s) => f.write_str(s),
            Value::Null => Ok(()),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Number(n) => serializer.serialize_f64(n.0),
            Value::Time(t) => t.serialize(serializer),
            Value::Text(s) => serializer.serialize_str(s),
            Value::Null => serializer.serialize_none(),
        }
    }
}
