// ---------------------------------------------------------------------------
// FeatureBuilder — tags -> TF-IDF -> truncated SVD
// ---------------------------------------------------------------------------

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::config::RecommenderConfig;
use crate::error::RecommenderError;
use crate::svd::TruncatedSvd;
use crate::tfidf::{TfidfVectorizer, TfidfVocabulary};

/// Fitted state of the feature pipeline, kept with the model it produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureState {
	pub vocabulary: TfidfVocabulary,
	/// Components actually used after the vocabulary-size adjustment.
	pub n_components: usize,
	pub singular_values: Vec<f64>,
}

/// Reduced course vectors, in input row order.
#[derive(Debug, Clone)]
pub struct FeatureMatrix {
	pub vectors: Array2<f64>,
	pub state: FeatureState,
}

pub struct FeatureBuilder<'a> {
	config: &'a RecommenderConfig,
}

impl<'a> FeatureBuilder<'a> {
	pub fn new(config: &'a RecommenderConfig) -> Self {
		Self { config }
	}

	pub fn fit_transform<S: AsRef<str>>(
		&self,
		tags: &[S],
	) -> Result<FeatureMatrix, RecommenderError> {
		let (vocabulary, tfidf) = TfidfVectorizer::new(self.config.max_features).fit_transform(tags)?;
		tracing::info!(
			rows = tfidf.n_rows(),
			features = tfidf.n_cols(),
			nnz = tfidf.nnz(),
			"TF-IDF matrix built"
		);

		let n_components = resolve_components(self.config.n_components, vocabulary.len())?;

		let svd = TruncatedSvd {
			n_components,
			n_oversamples: self.config.n_oversamples,
			n_iter: self.config.n_iter,
			random_state: self.config.random_state,
		};
		let reduced = svd.fit_transform(&tfidf);
		tracing::info!(
			rows = reduced.transformed.nrows(),
			components = reduced.transformed.ncols(),
			"Reduced TF-IDF matrix"
		);

		Ok(FeatureMatrix {
			vectors: reduced.transformed,
			state: FeatureState {
				vocabulary,
				n_components,
				singular_values: reduced.singular_values,
			},
		})
	}
}

/// Clamp the requested component count below the vocabulary size.
///
/// A request at or above the vocabulary size is lowered to
/// `vocabulary_size - 1`; if nothing is left the fit cannot proceed.
pub fn resolve_components(
	requested: usize,
	vocabulary_size: usize,
) -> Result<usize, RecommenderError> {
	let mut components = requested;
	if components >= vocabulary_size {
		components = vocabulary_size.saturating_sub(1);
		tracing::warn!(
			requested,
			vocabulary_size,
			components,
			"n_components is not below the number of features; lowering it"
		);
	}
	if components == 0 {
		return Err(RecommenderError::InsufficientFeatureSpace {
			requested,
			vocabulary_size,
		});
	}
	Ok(components)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn config(n_components: usize) -> RecommenderConfig {
		RecommenderConfig {
			n_components,
			..RecommenderConfig::default()
		}
	}

	#[test]
	fn components_below_vocabulary_are_kept() {
		assert_eq!(resolve_components(10, 50).unwrap(), 10);
	}

	#[test]
	fn components_at_or_above_vocabulary_are_lowered() {
		assert_eq!(resolve_components(100, 7).unwrap(), 6);
		assert_eq!(resolve_components(7, 7).unwrap(), 6);
	}

	#[test]
	fn single_term_vocabulary_is_insufficient() {
		let err = resolve_components(100, 1).unwrap_err();
		assert!(matches!(
			err,
			RecommenderError::InsufficientFeatureSpace {
				requested: 100,
				vocabulary_size: 1
			}
		));
	}

	#[test]
	fn zero_requested_components_is_insufficient() {
		assert!(resolve_components(0, 10).is_err());
	}

	#[test]
	fn output_rows_follow_input_order() {
		let tags = [
			"python programming basic",
			"sql database indexing",
			"python data analysis",
			"database administration",
		];
		let cfg = config(2);
		let out = FeatureBuilder::new(&cfg).fit_transform(&tags).unwrap();
		assert_eq!(out.vectors.nrows(), 4);
		assert_eq!(out.vectors.ncols(), 2);
		assert_eq!(out.state.n_components, 2);
		assert_eq!(out.state.singular_values.len(), 2);
	}

	#[test]
	fn one_word_corpus_fails_with_feature_space_error() {
		let tags = ["python", "python python"];
		let cfg = config(100);
		let err = FeatureBuilder::new(&cfg).fit_transform(&tags).unwrap_err();
		assert!(matches!(err, RecommenderError::InsufficientFeatureSpace { .. }));
	}
}
