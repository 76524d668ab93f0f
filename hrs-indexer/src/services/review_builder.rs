//! Review builder
//!
//! Assembles canonical reviews and hotel identity fields from raw source
//! rows. Pure functions: scoring happens upstream and the resulting tones
//! are attached unmodified.

use crate::models::{GeoPoint, HotelMeta, RawReviewRow, Review, ToneScore};
use crate::services::value_coercion::{coerce_date, coerce_float, coerce_integer, coerce_text};

/// Build one canonical review from a raw row and its tone scores
pub fn build_review(row: &RawReviewRow, tones: Vec<ToneScore>) -> Review {
    Review {
        date: coerce_date(&row.date),
        date_added: coerce_date(&row.date_added),
        rating: coerce_integer(&row.rating),
        text: coerce_text(&row.text),
        title: coerce_text(&row.title),
        user_city: coerce_text(&row.user_city),
        username: coerce_text(&row.username),
        user_province: coerce_text(&row.user_province),
        tones,
    }
}

/// Hotel name used for grouping and lookup
pub fn hotel_name(row: &RawReviewRow) -> String {
    coerce_text(&row.name)
}

/// Review text that will be scored and used as the dedup key
pub fn review_text(row: &RawReviewRow) -> String {
    coerce_text(&row.text)
}

/// Hotel identity fields (other than the name) carried by a row
pub fn hotel_meta(row: &RawReviewRow) -> HotelMeta {
    HotelMeta {
        city: coerce_text(&row.city),
        country: coerce_text(&row.country),
        location: GeoPoint {
            lat: coerce_float(&row.latitude),
            lon: coerce_float(&row.longitude),
        },
        postal_code: coerce_text(&row.postal_code),
    }
}
