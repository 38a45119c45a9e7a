// ---------------------------------------------------------------------------
// Truncated SVD — randomized range finder + symmetric eigen-decomposition
// ---------------------------------------------------------------------------
//
// Projects a sparse TF-IDF matrix X (n × m) onto its leading k singular
// directions and returns X·V = U·Σ (n × k).
//
//   1. Q  = qr(X·Ω).Q, Ω an m × (k + oversamples) seeded test matrix
//   2. n_iter power iterations: Q = qr(X · qr(Xᵀ·Q).Q).Q
//   3. C  = Xᵀ·Q, eigen-decompose the small Gram matrix Cᵀ·C = W·Λ·Wᵀ
//   4. V = C·W·Σ⁻¹ with Σ = sqrt(Λ), columns ordered by Σ descending
//   5. project with the sparse product X·V, so an all-zero row stays zero
//
// Sparse products stay in ndarray; the dense factorizations go through
// nalgebra. Fully deterministic for a given seed.
// ---------------------------------------------------------------------------

use nalgebra::{DMatrix, SymmetricEigen};
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::tfidf::SparseMatrix;

/// Eigenvalues at or below this fraction of the largest one are numerical
/// noise from rank-deficient input and produce no component.
const RANK_TOLERANCE: f64 = 1e-12;

#[derive(Debug, Clone)]
pub struct TruncatedSvd {
	pub n_components: usize,
	pub n_oversamples: usize,
	pub n_iter: usize,
	pub random_state: u64,
}

/// Reduced representation produced by [`TruncatedSvd::fit_transform`].
#[derive(Debug, Clone)]
pub struct SvdOutput {
	/// One row per input row; columns are latent components.
	pub transformed: Array2<f64>,
	/// Singular values, descending, one per column of `transformed`.
	pub singular_values: Vec<f64>,
}

impl TruncatedSvd {
	pub fn fit_transform(&self, x: &SparseMatrix) -> SvdOutput {
		let n = x.n_rows();
		let m = x.n_cols();
		let width = (self.n_components + self.n_oversamples).min(m).max(1);

		let mut rng = StdRng::seed_from_u64(self.random_state);
		let omega = Array2::<f64>::from_shape_fn((m, width), |_| rng.random_range(-1.0..1.0));

		let mut q = orthonormalize(&x.dot_dense(&omega));
		for _ in 0..self.n_iter {
			let z = orthonormalize(&x.transpose_dot_dense(&q));
			q = orthonormalize(&x.dot_dense(&z));
		}

		let c = to_dmatrix(&x.transpose_dot_dense(&q));
		let eigen = SymmetricEigen::new(c.transpose() * &c);
		let eigenvalues = &eigen.eigenvalues;

		let largest = eigenvalues.iter().copied().fold(0.0, f64::max);
		let mut order: Vec<usize> = (0..eigenvalues.len())
			.filter(|&i| eigenvalues[i] > largest * RANK_TOLERANCE)
			.collect();
		order.sort_by(|&a, &b| eigenvalues[b].total_cmp(&eigenvalues[a]));
		order.truncate(self.n_components);

		if order.is_empty() {
			return SvdOutput {
				transformed: Array2::zeros((n, 0)),
				singular_values: Vec::new(),
			};
		}

		let singular_values: Vec<f64> = order.iter().map(|&i| eigenvalues[i].sqrt()).collect();
		let w = eigen.eigenvectors.select_columns(order.iter());
		let mut v = c * w;
		for (j, &sigma) in singular_values.iter().enumerate() {
			v.column_mut(j).unscale_mut(sigma);
		}

		SvdOutput {
			transformed: x.dot_dense(&to_array(&v)),
			singular_values,
		}
	}
}

/// Orthonormal basis for the column space of `a` from a thin Householder QR.
fn orthonormalize(a: &Array2<f64>) -> Array2<f64> {
	to_array(&to_dmatrix(a).qr().q())
}

fn to_dmatrix(a: &Array2<f64>) -> DMatrix<f64> {
	DMatrix::from_fn(a.nrows(), a.ncols(), |i, j| a[[i, j]])
}

fn to_array(m: &DMatrix<f64>) -> Array2<f64> {
	Array2::from_shape_fn((m.nrows(), m.ncols()), |(i, j)| m[(i, j)])
}
