// ---------------------------------------------------------------------------
// SimilarityIndex — dense pairwise cosine similarity
// ---------------------------------------------------------------------------
//
// Fully materialized n × n matrix over the reduced course vectors. Memory is
// O(n²), which bounds the catalog size to the low tens of thousands. The
// upper triangle is computed and mirrored so the matrix is exactly
// symmetric. The diagonal is 1.0, or 0.0 for a zero vector (whose whole row
// is then 0.0), so self-similarity is always the row maximum.
// ---------------------------------------------------------------------------

use ndarray::Array2;

use crate::cosine::{compute_magnitude, cosine_similarity_with_magnitude};

#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityIndex {
	size: usize,
	scores: Vec<f64>,
}

impl SimilarityIndex {
	/// Build the index from one reduced vector per row of `vectors`.
	pub fn build(vectors: &Array2<f64>) -> Self {
		let size = vectors.nrows();
		let rows: Vec<Vec<f64>> = vectors.rows().into_iter().map(|r| r.to_vec()).collect();
		let magnitudes: Vec<f64> = rows.iter().map(|r| compute_magnitude(r)).collect();

		let mut scores = vec![0.0; size * size];
		for i in 0..size {
			scores[i * size + i] = if magnitudes[i] > 0.0 { 1.0 } else { 0.0 };
			for j in (i + 1)..size {
				let sim =
					cosine_similarity_with_magnitude(&rows[i], &rows[j], magnitudes[i], magnitudes[j]);
				scores[i * size + j] = sim;
				scores[j * size + i] = sim;
			}
		}

		Self { size, scores }
	}

	/// Number of indexed courses.
	pub fn len(&self) -> usize {
		self.size
	}

	pub fn is_empty(&self) -> bool {
		self.size == 0
	}

	pub fn get(&self, i: usize, j: usize) -> Option<f64> {
		if i < self.size && j < self.size {
			Some(self.scores[i * self.size + j])
		} else {
			None
		}
	}

	/// Similarity of course `i` to every course, self included, in row order.
	pub fn row(&self, i: usize) -> Option<&[f64]> {
		if i >= self.size {
			return None;
		}
		Some(&self.scores[i * self.size..(i + 1) * self.size])
	}

	/// The `limit` most similar courses to `i`, self included, as
	/// `(index, score)` pairs. Score descending; equal scores keep row order.
	pub fn ranked(&self, i: usize, limit: usize) -> Vec<(usize, f64)> {
		let Some(row) = self.row(i) else {
			return Vec::new();
		};
		let mut pairs: Vec<(usize, f64)> = row.iter().copied().enumerate().collect();
		pairs.sort_by(|a, b| b.1.total_cmp(&a.1));
		pairs.truncate(limit);
		pairs
	}
}
