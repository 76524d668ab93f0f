//! Tone aggregation
//!
//! Recomputes a hotel's `normTones` from its full review set: the arithmetic
//! mean of every score per tone id. Tone ids that no review carries are
//! absent from the output.
//!
//! Scores for each tone are summed in sorted order, so the result is
//! bit-for-bit identical for any permutation of the input reviews.

use std::collections::HashMap;

use crate::models::{NormTones, Review};

pub fn aggregate(reviews: &[Review]) -> NormTones {
    let mut scores: HashMap<&str, Vec<f64>> = HashMap::new();

    for tone in reviews.iter().flat_map(|r| r.tones.iter()) {
        scores.entry(tone.tone_id.as_str()).or_default().push(tone.score);
    }

    scores
        .into_iter()
        .map(|(tone_id, mut values)| {
            values.sort_by(f64::total_cmp);
            let mean = values.iter().sum::<f64>() / values.len() as f64;
            (tone_id.to_string(), mean)
        })
        .collect()
}
