/// Compute the magnitude (L2 norm) of a vector.
pub fn compute_magnitude(vector: &[f64]) -> f64 {
	vector.iter().map(|v| v * v).sum::<f64>().sqrt()
}

/// Compute cosine similarity using pre-computed magnitudes.
/// Returns 0.0 for zero magnitudes or dimension mismatches; the result is
/// clamped to [-1.0, 1.0].
pub fn cosine_similarity_with_magnitude(a: &[f64], b: &[f64], mag_a: f64, mag_b: f64) -> f64 {
	if a.len() != b.len() || a.is_empty() {
		return 0.0;
	}

	let denom = mag_a * mag_b;
	if denom == 0.0 {
		return 0.0;
	}

	let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
	let result = dot / denom;
	if !result.is_finite() {
		return 0.0;
	}
	result.clamp(-1.0, 1.0)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
		cosine_similarity_with_magnitude(a, b, compute_magnitude(a), compute_magnitude(b))
	}

	#[test]
	fn identical_vectors() {
		let v = vec![1.0, 2.0, 3.0];
		assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-12);
	}

	#[test]
	fn orthogonal_vectors() {
		assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-12);
	}

	#[test]
	fn opposite_vectors() {
		assert!((cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]) + 1.0).abs() < 1e-12);
	}

	#[test]
	fn scale_invariant() {
		let a = [1.0, 2.0, 3.0];
		let b = [10.0, 20.0, 30.0];
		assert!((cosine_similarity(&a, &b) - 1.0).abs() < 1e-12);
	}

	#[test]
	fn empty_vectors() {
		assert_eq!(cosine_similarity(&[], &[]), 0.0);
	}

	#[test]
	fn mismatched_lengths() {
		assert_eq!(cosine_similarity(&[1.0], &[1.0, 2.0]), 0.0);
	}

	#[test]
	fn zero_magnitude() {
		assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]), 0.0);
	}

	#[test]
	fn magnitude_basic() {
		assert!((compute_magnitude(&[3.0, 4.0]) - 5.0).abs() < 1e-12);
		assert_eq!(compute_magnitude(&[]), 0.0);
	}
}
