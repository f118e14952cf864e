//! Hybrid score: semantic similarity plus a rating boost.

use bookrec_core::types::MAX_RATING;

/// `(1 - distance) + (rating / 5) * popularity_weight`.
///
/// Unbounded and only comparable within one result set. Distances above 1
/// give a negative similarity term on purpose, so poor matches sink below
/// relevant but less popular books.
pub fn hybrid_score(distance: f32, rating: f32, popularity_weight: f32) -> f32 {
    let similarity = 1.0 - distance;
    similarity + (rating / MAX_RATING) * popularity_weight
}
