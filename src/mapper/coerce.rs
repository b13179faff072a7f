//! Logical type inference and text coercion.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::{Error, Result};
use crate::types::{LogicalType, Value};

/// Year filled in when a date-time text carries no year.
pub const EPOCH_YEAR: i32 = 2000;

const NUMERIC_PATTERNS: [&str; 6] = ["num", "float", "double", "dec", "real", "int"];

const DATETIME_FORMATS: [&str; 10] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%d-%b-%Y %H:%M:%S",
    "%d-%b-%y %H:%M:%S",
    "%d-%b-%y %I.%M.%S%.f %p",
];

const DATE_FORMATS: [&str; 5] = ["%Y-%m-%d", "%Y/%m/%d", "%d-%b-%Y", "%d-%b-%y", "%Y%m%d"];

const TIME_FORMATS: [&str; 3] = ["%H:%M:%S", "%H:%M:%S%.f", "%H:%M"];

/// Derive the logical type of a column from its declared vendor type.
///
/// Numeric types are integers only when the scale is exactly zero. Date and
/// time types on columns named `*_at` keep their time of day; others may be
/// downgraded to plain dates.
pub fn infer_logical_type(
    vendor_type: &str,
    scale: Option<i32>,
    column_name: &str,
) -> Option<LogicalType> {
    let ty = vendor_type.to_ascii_lowercase();
    if ty.contains("char") {
        Some(LogicalType::String)
    } else if NUMERIC_PATTERNS.iter().any(|p| ty.contains(p)) {
        if scale == Some(0) {
            Some(LogicalType::Integer)
        } else {
            Some(LogicalType::Float)
        }
    } else if ty.contains("date") || ty.contains("time") {
        if column_name.to_ascii_lowercase().ends_with("_at") {
            Some(LogicalType::Time)
        } else {
            Some(LogicalType::Datetime)
        }
    } else if ty.contains("lob") {
        Some(LogicalType::Binary)
    } else {
        None
    }
}

/// Whether `text` is a textual `null` (any case, surrounding whitespace).
pub fn is_null_text(text: &str) -> bool {
    text.trim().eq_ignore_ascii_case("null")
}

/// Coerce text into a value of the given logical type.
///
/// Date-times are parsed on a best-effort basis: unparseable or blank text
/// yields `Value::Null` rather than an error. Floats are strict.
pub fn coerce_scalar(text: &str, logical_type: LogicalType) -> Result<Value> {
    if is_null_text(text) {
        return Ok(Value::Null);
    }
    let value = match logical_type {
        LogicalType::String => Value::String(text.to_string()),
        LogicalType::Integer => Value::Integer(parse_integer(text)),
        LogicalType::Float => text
            .trim()
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|_| Error::type_conversion(format!("not a number: {:?}", text)))?,
        LogicalType::Datetime => parse_loose_datetime(text)
            .map(Value::date_or_datetime)
            .unwrap_or(Value::Null),
        LogicalType::Time => parse_loose_datetime(text)
            .map(Value::DateTime)
            .unwrap_or(Value::Null),
        LogicalType::Binary => Value::Binary(text.as_bytes().to_vec()),
    };
    Ok(value)
}

/// Integer parse that tolerates fractional text and boolean-ish driver output.
fn parse_integer(text: &str) -> i64 {
    let t = text.trim();
    if let Ok(n) = t.parse::<i64>() {
        return n;
    }
    if let Ok(x) = t.parse::<f64>() {
        if x.is_finite() {
            return x.trunc() as i64;
        }
    }
    match t.to_ascii_lowercase().as_str() {
        "true" | "t" | "yes" | "y" => 1,
        _ => 0,
    }
}

fn epoch_date() -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(EPOCH_YEAR, 1, 1)
}

/// Parse loosely formatted date/time text.
///
/// Missing date components default to 2000-01-01: a bare time lands on
/// that day, and month-day text lands in the year 2000.
pub fn parse_loose_datetime(text: &str) -> Option<NaiveDateTime> {
    let s = text.trim();
    if s.is_empty() {
        return None;
    }
    parse_with_date(s)
        .or_else(|| {
            TIME_FORMATS
                .iter()
                .find_map(|f| NaiveTime::parse_from_str(s, f).ok())
                .and_then(|t| Some(epoch_date()?.and_time(t)))
        })
        .or_else(|| parse_with_date(&format!("{}-{}", EPOCH_YEAR, s)))
}

fn parse_with_date(s: &str) -> Option<NaiveDateTime> {
    DATETIME_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|f| NaiveDate::parse_from_str(s, f).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}
