//! Value coercion for raw dataset fields
//!
//! `coerce` is total: it never fails. The explicit missing marker maps to a
//! fixed default per kind:
//!
//! | kind    | default                    |
//! |---------|----------------------------|
//! | text    | `"Other"`                  |
//! | integer | `0`                        |
//! | float   | `0.0`                      |
//! | date    | `1970-01-01T00:00:00Z`     |
//!
//! Present values are converted best-effort. A present value that cannot be
//! parsed as the target number or timestamp falls back to the same default
//! as a missing one, and the fallback is logged at debug level.

use chrono::{DateTime, Utc};
use hrs_common::time::{epoch, parse_timestamp};

use crate::models::RawValue;

/// Placeholder stored for missing text fields
pub const MISSING_TEXT: &str = "Other";

/// Declared semantic type of a raw field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Text,
    Integer,
    Float,
    Date,
    /// Any tag not recognised by `from_tag`; always coerces to `""`
    Unspecified,
}

impl ValueKind {
    /// Map a loose type tag ("txt", "int", "float", "date", ...) to a kind
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "txt" | "text" | "str" | "string" => ValueKind::Text,
            "int" | "integer" => ValueKind::Integer,
            "float" | "double" => ValueKind::Float,
            "date" | "datetime" | "timestamp" => ValueKind::Date,
            _ => ValueKind::Unspecified,
        }
    }
}

/// Canonical value produced by coercion
#[derive(Debug, Clone, PartialEq)]
pub enum CanonicalValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Date(DateTime<Utc>),
}

/// Coerce `value` into the canonical representation for `kind`
pub fn coerce(value: &RawValue, kind: ValueKind) -> CanonicalValue {
    match kind {
        ValueKind::Text => CanonicalValue::Text(coerce_text(value)),
        ValueKind::Integer => CanonicalValue::Integer(coerce_integer(value)),
        ValueKind::Float => CanonicalValue::Float(coerce_float(value)),
        ValueKind::Date => CanonicalValue::Date(coerce_date(value)),
        ValueKind::Unspecified => CanonicalValue::Text(String::new()),
    }
}

pub fn coerce_text(value: &RawValue) -> String {
    match value {
        RawValue::Present(v) => v.clone(),
        RawValue::Absent => MISSING_TEXT.to_string(),
    }
}

/// Integers accept a decimal rendering too ("4.0" → 4), truncating toward zero
pub fn coerce_integer(value: &RawValue) -> i64 {
    let Some(raw) = value.as_present() else {
        return 0;
    };
    let raw = raw.trim();

    if let Ok(n) = raw.parse::<i64>() {
        return n;
    }
    match raw.parse::<f64>() {
        Ok(f) if f.is_finite() => f.trunc() as i64,
        _ => {
            tracing::debug!(value = %raw, "Unparseable integer, using default 0");
            0
        }
    }
}

pub fn coerce_float(value: &RawValue) -> f64 {
    let Some(raw) = value.as_present() else {
        return 0.0;
    };

    match raw.trim().parse::<f64>() {
        Ok(f) if f.is_finite() => f,
        _ => {
            tracing::debug!(value = %raw, "Unparseable float, using default 0.0");
            0.0
        }
    }
}

pub fn coerce_date(value: &RawValue) -> DateTime<Utc> {
    let Some(raw) = value.as_present() else {
        return epoch();
    };

    parse_timestamp(raw).unwrap_or_else(|| {
        tracing::debug!(value = %raw, "Unparseable timestamp, using epoch");
        epoch()
    })
}
