// ---------------------------------------------------------------------------
// Scoring — rating-weighted re-ranking
// ---------------------------------------------------------------------------
//
// Pure functions that blend a candidate's similarity to the anchor course
// with its normalized rating. No side effects.
// ---------------------------------------------------------------------------

use crate::types::Rating;

/// Lower bound of the external rating scale.
pub const RATING_SCALE_MIN: f64 = 0.0;
/// Upper bound of the external rating scale.
pub const RATING_SCALE_MAX: f64 = 5.0;

/// Map a rating onto [0, 1] using the fixed 0–5 scale.
///
/// Unrated courses contribute 0. Ratings outside the scale are not clamped
/// and produce values outside [0, 1].
pub fn normalize_rating(rating: Rating) -> f64 {
	match rating {
		Rating::Score(v) => (v - RATING_SCALE_MIN) / (RATING_SCALE_MAX - RATING_SCALE_MIN),
		Rating::Unrated => 0.0,
	}
}

/// Result of a score computation, keeping the inputs for display.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreResult {
	pub similarity: f64,
	pub normalized_rating: f64,
	pub score: f64,
}

/// `similarity · (1 − w) + normalized_rating · w`.
pub fn compute_final_score(similarity: f64, rating: Rating, rating_weight: f64) -> ScoreResult {
	let normalized_rating = normalize_rating(rating);
	ScoreResult {
		similarity,
		normalized_rating,
		score: similarity * (1.0 - rating_weight) + normalized_rating * rating_weight,
	}
}
