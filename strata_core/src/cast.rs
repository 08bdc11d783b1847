//! Best-effort coercion of raw values into concrete types.
//!
//! Every function returns `None` when the value is absent-like or cannot be
//! coerced; the typed accessors on `Configurable` turn that into the zero
//! value of the requested type.

use crate::types::Value;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::time::Duration;

pub fn to_string(value: &Value) -> Option<String> {
    match value {
        Value::Nil | Value::List(_) | Value::Map(_) => None,
        other => Some(other.to_string())
    }
}

pub fn to_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Int(i) => Some(*i != 0),
        Value::Float(f) => Some(*f != 0.0),
        Value::Duration(d) => Some(!d.is_zero()),
        Value::String(s) => parse_bool(s),
        _ => None
    }
}

pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "t" | "true" | "y" | "yes" | "on" => Some(true),
        "0" | "f" | "false" | "n" | "no" | "off" => Some(false),
        _ => None
    }
}

pub fn to_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Bool(b) => Some(i64::from(*b)),
        Value::Int(i) => Some(*i),
        Value::Float(f) if f.is_finite() => Some(f.trunc() as i64),
        Value::String(s) => s.trim().parse().ok(),
        Value::Time(t) => Some(t.timestamp()),
        Value::Duration(d) => i64::try_from(d.as_secs()).ok(),
        _ => None
    }
}

pub fn to_i32(value: &Value) -> Option<i32> {
    to_i64(value).and_then(|i| i32::try_from(i).ok())
}

pub fn to_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Int(i) => Some(*i as f64),
        Value::Float(f) => Some(*f),
        Value::String(s) => s.trim().parse().ok(),
        Value::Duration(d) => Some(d.as_secs_f64()),
        _ => None
    }
}

pub fn to_time(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Time(t) => Some(*t),
        Value::Int(secs) => DateTime::from_timestamp(*secs, 0),
        Value::Float(f) if f.is_finite() => {
            let secs = f.floor();
            let nanos = ((f - secs) * 1e9).round() as u32;
            DateTime::from_timestamp(secs as i64, nanos.min(999_999_999))
        }
        Value::String(s) => parse_time(s),
        _ => None
    }
}

/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DDTHH:MM:SS`,
/// `YYYY-MM-DD` and unix seconds.
pub fn parse_time(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(t) = DateTime::parse_from_rfc3339(raw) {
        return Some(t.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(t) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(t.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|t| t.and_utc());
    }
    raw.parse::<i64>()
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
}

pub fn to_duration(value: &Value) -> Option<Duration> {
    match value {
        Value::Duration(d) => Some(*d),
        Value::Int(secs) => u64::try_from(*secs).ok().map(Duration::from_secs),
        Value::Float(secs) => Duration::try_from_secs_f64(*secs).ok(),
        Value::String(s) => parse_duration(s),
        _ => None
    }
}

/// Parses `"90"`, `"1.5"` (seconds) and unit literals such as `"1h30m"`,
/// `"250ms"` or `"1.5s"`. Negative durations are rejected.
pub fn parse_duration(raw: &str) -> Option<Duration> {
    let raw = raw.trim();
    let raw = raw.strip_prefix('+').unwrap_or(raw);
    if raw.is_empty() {
        return None;
    }
    if let Ok(secs) = raw.parse::<f64>() {
        return Duration::try_from_secs_f64(secs).ok();
    }

    let mut total_nanos = 0f64;
    let mut rest = raw;
    while !rest.is_empty() {
        let number_end = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        if number_end == 0 {
            return None;
        }
        let amount: f64 = rest[..number_end].parse().ok()?;
        rest = &rest[number_end..];

        let unit_end = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let scale = match &rest[..unit_end] {
            "h" => 3_600e9,
            "m" => 60e9,
            "s" => 1e9,
            "ms" => 1e6,
            "us" | "µs" => 1e3,
            "ns" => 1.0,
            _ => return None
        };
        total_nanos += amount * scale;
        rest = &rest[unit_end..];
    }

    if !total_nanos.is_finite() || total_nanos > u64::MAX as f64 {
        return None;
    }
    Some(Duration::from_nanos(total_nanos.round() as u64))
}
