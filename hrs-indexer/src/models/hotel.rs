//! Hotel-level records: the indexed document and the caller-facing summary

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::review::{Review, ToneScore};

/// Opaque, stable identity of one hotel's indexed document
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for DocumentId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

/// Hotel identity fields taken from a source row (everything but the name)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HotelMeta {
    pub city: String,
    pub country: String,
    pub location: GeoPoint,
    pub postal_code: String,
}

/// Mean score per tone category, ordered by tone id
pub type NormTones = BTreeMap<String, f64>;

/// One hotel's indexed document
///
/// `id` lives outside the persisted body (it is the store key), so it is not
/// serialized. `norm_tones` is persisted as a `[{toneId, score}]` list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelDocument {
    #[serde(skip)]
    pub id: DocumentId,
    pub name: String,
    pub city: String,
    pub country: String,
    pub location: GeoPoint,
    pub postal_code: String,
    #[serde(default)]
    pub reviews: Vec<Review>,
    #[serde(default, alias = "norm_tones", with = "tone_list")]
    pub norm_tones: NormTones,
}

impl HotelDocument {
    /// Decode a persisted body and attach the store key
    pub fn from_stored(id: DocumentId, body: serde_json::Value) -> serde_json::Result<Self> {
        let mut document: HotelDocument = serde_json::from_value(body)?;
        document.id = id;
        Ok(document)
    }
}

/// Caller-facing result for one hotel in a batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotelSummary {
    pub name: String,
    pub tones: NormTones,
    /// Set when the document write for this hotel failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Serde adapter: `BTreeMap<toneId, score>` <-> `[{toneId, score}]`
mod tone_list {
    use super::{NormTones, ToneScore};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(tones: &NormTones, serializer: S) -> Result<S::Ok, S::Error> {
        let list: Vec<ToneScore> = tones
            .iter()
            .map(|(tone_id, score)| ToneScore::new(tone_id.clone(), *score))
            .collect();
        list.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NormTones, D::Error> {
        let list = Vec::<ToneScore>::deserialize(deserializer)?;
        Ok(list.into_iter().map(|t| (t.tone_id, t.score)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn review(text: &str) -> Review {
        Review {
            date: Utc.with_ymd_and_hms(2016, 5, 1, 0, 0, 0).unwrap(),
            date_added: Utc.with_ymd_and_hms(2016, 6, 1, 0, 0, 0).unwrap(),
            rating: 4,
            text: text.to_string(),
            title: "Title".to_string(),
            user_city: "Austin".to_string(),
            username: "guest".to_string(),
            user_province: "TX".to_string(),
            tones: vec![ToneScore::new("joy", 0.75)],
        }
    }

    #[test]
    fn test_document_serializes_to_persisted_schema() {
        let mut norm_tones = NormTones::new();
        norm_tones.insert("joy".to_string(), 0.75);
        norm_tones.insert("anger".to_string(), 0.25);

        let document = HotelDocument {
            id: DocumentId::new("doc-1"),
            name: "Hotel Russo Palace".to_string(),
            city: "Venice".to_string(),
            country: "IT".to_string(),
            location: GeoPoint { lat: 45.4, lon: 12.3 },
            postal_code: "30126".to_string(),
            reviews: vec![review("Lovely")],
            norm_tones,
        };

        let body = serde_json::to_value(&document).unwrap();

        assert!(body.get("id").is_none(), "id is the store key, not part of the body");
        assert_eq!(body["postalCode"], "30126");
        assert_eq!(body["location"], json!({"lat": 45.4, "lon": 12.3}));
        assert_eq!(body["reviews"][0]["dateAdded"], "2016-06-01T00:00:00Z");
        assert_eq!(body["reviews"][0]["userProvince"], "TX");
        assert_eq!(body["reviews"][0]["tones"][0], json!({"toneId": "joy", "score": 0.75}));
        // Sorted by tone id
        assert_eq!(
            body["normTones"],
            json!([{"toneId": "anger", "score": 0.25}, {"toneId": "joy", "score": 0.75}])
        );
    }

    #[test]
    fn test_from_stored_attaches_id() {
        let body = json!({
            "name": "Inn",
            "city": "Rome",
            "country": "IT",
            "location": {"lat": 1.0, "lon": 2.0},
            "postalCode": "00100",
            "reviews": [],
            "normTones": [{"toneId": "joy", "score": 0.5}]
        });

        let document = HotelDocument::from_stored(DocumentId::new("abc"), body).unwrap();

        assert_eq!(document.id.as_str(), "abc");
        assert_eq!(document.norm_tones.get("joy"), Some(&0.5));
    }

    #[test]
    fn test_from_stored_accepts_snake_case_tone_fields() {
        let body = json!({
            "name": "Inn",
            "city": "Rome",
            "country": "IT",
            "location": {"lat": 1.0, "lon": 2.0},
            "postalCode": "00100",
            "norm_tones": [{"tone_id": "sadness", "score": 0.1}]
        });

        let document = HotelDocument::from_stored(DocumentId::new("abc"), body).unwrap();

        assert!(document.reviews.is_empty());
        assert_eq!(document.norm_tones.get("sadness"), Some(&0.1));
    }

    #[test]
    fn test_summary_omits_error_when_absent() {
        let summary = HotelSummary {
            name: "Inn".to_string(),
            tones: NormTones::new(),
            error: None,
        };
        let body = serde_json::to_value(&summary).unwrap();
        assert!(body.get("error").is_none());
    }
}
