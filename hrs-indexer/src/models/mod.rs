//! Data models for hotel review sync

pub mod hotel;
pub mod review;

pub use hotel::{DocumentId, GeoPoint, HotelDocument, HotelMeta, HotelSummary, NormTones};
pub use review::{RawReviewRow, RawValue, Review, ToneScore};
