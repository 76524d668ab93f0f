//! Merge engine
//!
//! Reconciles a hotel's previously indexed document (if any) with a freshly
//! built batch of reviews.
//!
//! **Algorithm:**
//! 1. Start from the existing document's id and reviews, or a fresh id and no reviews
//! 2. Collect the review texts already present
//! 3. Append each new review whose text is unseen, in input order; discard the rest
//! 4. Overwrite identity fields (name, city, country, location, postal code) from the source
//!
//! A new review whose text matches a stored one is dropped, even when its
//! rating or tones differ. The stored review is kept as-is.
//!
//! `norm_tones` comes back empty; the aggregation step fills it from the merged reviews.

use hrs_common::IdGenerator;
use std::collections::HashSet;
use std::sync::Arc;

use crate::models::{DocumentId, HotelDocument, HotelMeta, Review};

pub struct MergeEngine {
    ids: Arc<dyn IdGenerator>,
}

impl MergeEngine {
    pub fn new(ids: Arc<dyn IdGenerator>) -> Self {
        Self { ids }
    }

    pub fn merge(
        &self,
        existing: Option<HotelDocument>,
        hotel_name: &str,
        meta: &HotelMeta,
        new_reviews: Vec<Review>,
    ) -> HotelDocument {
        let (id, mut reviews) = match existing {
            Some(doc) => (doc.id, doc.reviews),
            None => {
                let id = DocumentId::new(self.ids.generate());
                tracing::debug!(hotel = %hotel_name, doc_id = %id, "No indexed document, issuing new id");
                (id, Vec::new())
            }
        };

        let mut seen: HashSet<String> = reviews.iter().map(|r| r.text.clone()).collect();
        let offered = new_reviews.len();
        let before = reviews.len();

        for review in new_reviews {
            if seen.insert(review.text.clone()) {
                reviews.push(review);
            }
        }

        let added = reviews.len() - before;
        tracing::debug!(
            hotel = %hotel_name,
            doc_id = %id,
            existing = before,
            offered,
            added,
            skipped = offered - added,
            "Merged reviews"
        );

        HotelDocument {
            id,
            name: hotel_name.to_string(),
            city: meta.city.clone(),
            country: meta.country.clone(),
            location: meta.location,
            postal_code: meta.postal_code.clone(),
            reviews,
            norm_tones: Default::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GeoPoint, ToneScore};
    use hrs_common::time::epoch;
    use hrs_common::SequentialIdGenerator;

    fn engine() -> MergeEngine {
        MergeEngine::new(Arc::new(SequentialIdGenerator::new("doc")))
    }

    fn review(text: &str, tones: &[(&str, f64)]) -> Review {
        Review {
            date: epoch(),
            date_added: epoch(),
            rating: 3,
            text: text.to_string(),
            title: "t".to_string(),
            user_city: "Other".to_string(),
            username: "u".to_string(),
            user_province: "Other".to_string(),
            tones: tones.iter().map(|(id, s)| ToneScore::new(*id, *s)).collect(),
        }
    }

    fn meta(city: &str) -> HotelMeta {
        HotelMeta {
            city: city.to_string(),
            country: "US".to_string(),
            location: GeoPoint { lat: 1.5, lon: -2.5 },
            postal_code: "94016".to_string(),
        }
    }

    fn texts(doc: &HotelDocument) -> Vec<&str> {
        doc.reviews.iter().map(|r| r.text.as_str()).collect()
    }

    #[test]
    fn test_first_sync_issues_fresh_id_and_dedups_batch() {
        let doc = engine().merge(
            None,
            "Inn",
            &meta("Austin"),
            vec![review("a", &[]), review("b", &[]), review("a", &[("joy", 0.9)])],
        );

        assert_eq!(doc.id.as_str(), "doc-1");
        assert_eq!(texts(&doc), vec!["a", "b"]);
        assert!(doc.reviews[0].tones.is_empty(), "first occurrence wins");
    }

    #[test]
    fn test_fresh_ids_are_distinct() {
        let engine = engine();
        let first = engine.merge(None, "A", &meta("x"), vec![]);
        let second = engine.merge(None, "B", &meta("x"), vec![]);
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn test_existing_id_and_reviews_are_kept() {
        let engine = engine();
        let existing = HotelDocument {
            id: DocumentId::new("stored-7"),
            name: "Inn".to_string(),
            reviews: vec![review("old", &[("joy", 0.8)])],
            ..Default::default()
        };

        let doc = engine.merge(Some(existing), "Inn", &meta("Austin"), vec![review("new", &[])]);

        assert_eq!(doc.id.as_str(), "stored-7");
        assert_eq!(texts(&doc), vec!["old", "new"]);
    }

    #[test]
    fn test_duplicate_text_does_not_replace_stored_review() {
        let existing = HotelDocument {
            id: DocumentId::new("stored"),
            reviews: vec![review("Great stay", &[("joy", 0.8)])],
            ..Default::default()
        };

        let doc = engine().merge(
            Some(existing),
            "Inn",
            &meta("Austin"),
            vec![review("Great stay", &[("joy", 0.1)])],
        );

        assert_eq!(doc.reviews.len(), 1);
        assert_eq!(doc.reviews[0].tones, vec![ToneScore::new("joy", 0.8)]);
    }

    #[test]
    fn test_merge_is_idempotent() {
        let engine = engine();
        let batch = vec![review("a", &[]), review("b", &[])];

        let once = engine.merge(None, "Inn", &meta("Austin"), batch.clone());
        let twice = engine.merge(Some(once.clone()), "Inn", &meta("Austin"), batch);

        assert_eq!(once.reviews.len(), twice.reviews.len());
        assert_eq!(once.id, twice.id);
    }

    #[test]
    fn test_empty_batch_refreshes_identity_fields_only() {
        let existing = HotelDocument {
            id: DocumentId::new("stored"),
            name: "Inn".to_string(),
            city: "Old City".to_string(),
            reviews: vec![review("a", &[])],
            ..Default::default()
        };

        let doc = engine().merge(Some(existing), "Inn", &meta("New City"), vec![]);

        assert_eq!(doc.city, "New City");
        assert_eq!(doc.postal_code, "94016");
        assert_eq!(doc.location, GeoPoint { lat: 1.5, lon: -2.5 });
        assert_eq!(texts(&doc), vec!["a"]);
    }
}
