use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecommenderError {
	#[error("Missing required columns: {}", .0.join(", "))]
	MissingColumns(Vec<String>),
	#[error("Invalid dataset: {0}")]
	InvalidDataset(String),
	#[error("Empty vocabulary: no usable terms left after stop-word removal")]
	EmptyVocabulary,
	#[error(
		"Insufficient feature space: cannot reduce {vocabulary_size} features to {requested} components"
	)]
	InsufficientFeatureSpace {
		requested: usize,
		vocabulary_size: usize,
	},
	#[error("Invalid params: {0}")]
	InvalidParams(String),
	#[error("Model not fitted: call fit or load first")]
	NotFitted,
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	#[error("CSV error: {0}")]
	Csv(#[from] csv::Error),
	#[error("Serialization error: {0}")]
	Serialization(String),
	#[error("Model file corruption: {0}")]
	Corruption(String),
}

impl RecommenderError {
	pub fn code(&self) -> &str {
		match self {
			Self::MissingColumns(_) => "RECOMMENDER_MISSING_COLUMNS",
			Self::InvalidDataset(_) => "RECOMMENDER_INVALID_DATASET",
			Self::EmptyVocabulary => "RECOMMENDER_EMPTY_VOCABULARY",
			Self::InsufficientFeatureSpace { .. } => "RECOMMENDER_INSUFFICIENT_FEATURES",
			Self::InvalidParams(_) => "RECOMMENDER_INVALID_PARAMS",
			Self::NotFitted => "RECOMMENDER_NOT_FITTED",
			Self::Io(_) => "RECOMMENDER_IO",
			Self::Csv(_) => "RECOMMENDER_CSV",
			Self::Serialization(_) => "RECOMMENDER_SERIALIZATION",
			Self::Corruption(_) => "RECOMMENDER_CORRUPT",
		}
	}

	pub fn to_json_rpc_error(&self) -> serde_json::Value {
		serde_json::json!({
			"recommenderCode": self.code(),
			"message": self.to_string(),
		})
	}
}
