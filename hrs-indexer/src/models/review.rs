//! Review-level records: raw source rows, tone scores, canonical reviews

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One loosely-typed value from the source dataset
///
/// `Absent` is the explicit missing marker (an empty CSV cell). It is
/// distinct from `Present("")`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RawValue {
    Present(String),
    #[default]
    Absent,
}

impl RawValue {
    pub fn present(value: impl Into<String>) -> Self {
        RawValue::Present(value.into())
    }

    pub fn as_present(&self) -> Option<&str> {
        match self {
            RawValue::Present(v) => Some(v.as_str()),
            RawValue::Absent => None,
        }
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Present(value.to_string())
    }
}

impl From<Option<String>> for RawValue {
    fn from(value: Option<String>) -> Self {
        value.map(RawValue::Present).unwrap_or(RawValue::Absent)
    }
}

/// One source record: hotel identity fields plus one review's raw fields
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawReviewRow {
    pub name: RawValue,
    pub city: RawValue,
    pub country: RawValue,
    pub latitude: RawValue,
    pub longitude: RawValue,
    pub postal_code: RawValue,
    pub date: RawValue,
    pub date_added: RawValue,
    pub rating: RawValue,
    pub text: RawValue,
    pub title: RawValue,
    pub user_city: RawValue,
    pub username: RawValue,
    pub user_province: RawValue,
}

/// Sentiment score for one tone category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToneScore {
    #[serde(alias = "tone_id")]
    pub tone_id: String,
    pub score: f64,
}

impl ToneScore {
    pub fn new(tone_id: impl Into<String>, score: f64) -> Self {
        Self {
            tone_id: tone_id.into(),
            score,
        }
    }
}

/// Canonical review as stored inside a hotel document
///
/// `text` is the dedup key within one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub date: DateTime<Utc>,
    pub date_added: DateTime<Utc>,
    pub rating: i64,
    pub text: String,
    pub title: String,
    pub user_city: String,
    pub username: String,
    pub user_province: String,
    #[serde(default)]
    pub tones: Vec<ToneScore>,
}
