use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Model configuration
// ---------------------------------------------------------------------------

/// Hyper-parameters for fitting a recommender model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecommenderConfig {
	/// Latent components kept by the truncated SVD.
	pub n_components: usize,
	/// Vocabulary cap for the TF-IDF vectorizer.
	pub max_features: usize,
	/// Seed for the SVD range finder.
	pub random_state: u64,
	pub n_oversamples: usize,
	pub n_iter: usize,
}

impl Default for RecommenderConfig {
	fn default() -> Self {
		Self {
			n_components: 100,
			max_features: 5000,
			random_state: 42,
			n_oversamples: 10,
			n_iter: 5,
		}
	}
}

/// Default number of recommendations per query.
pub const DEFAULT_TOP_N: usize = 5;
/// Default weight of the normalized rating in the final score.
pub const DEFAULT_RATING_WEIGHT: f64 = 0.05;

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
	name = "coursemate-recommender",
	about = "Content-based course recommender (TF-IDF + truncated SVD + cosine similarity)"
)]
pub struct CliArgs {
	/// Log level (trace, debug, info, warn, error)
	#[arg(long, default_value = "info", env = "COURSEMATE_LOG_LEVEL", global = true)]
	pub log_level: String,

	#[command(subcommand)]
	pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
	/// Fit a model from a course CSV and save it
	Train {
		/// Course metadata CSV (Coursera export layout)
		#[arg(long, env = "COURSEMATE_DATA")]
		data: PathBuf,

		/// Where to write the fitted model
		#[arg(long, default_value = "cf_recommender.model.gz", env = "COURSEMATE_MODEL")]
		output: PathBuf,

		/// Latent SVD components
		#[arg(long, default_value = "100")]
		n_components: usize,

		/// TF-IDF vocabulary cap
		#[arg(long, default_value = "5000")]
		max_features: usize,

		/// Seed for the SVD range finder
		#[arg(long, default_value = "42")]
		random_state: u64,
	},

	/// Print recommendations for a course name as JSON
	Recommend {
		/// Fitted model file
		#[arg(long, default_value = "cf_recommender.model.gz", env = "COURSEMATE_MODEL")]
		model: PathBuf,

		/// Course name to anchor the query on
		#[arg(long)]
		course: String,

		/// Maximum number of recommendations
		#[arg(long, default_value_t = DEFAULT_TOP_N)]
		top_n: usize,

		/// Weight of the course rating in the final score
		#[arg(long, default_value_t = DEFAULT_RATING_WEIGHT)]
		rating_weight: f64,
	},

	/// Print a summary of a fitted model as JSON
	Info {
		#[arg(long, default_value = "cf_recommender.model.gz", env = "COURSEMATE_MODEL")]
		model: PathBuf,
	},

	/// Serve recommendations over JSON-RPC 2.0 / NDJSON on stdio
	Serve {
		/// Model to load at startup; `model/load` can replace it later
		#[arg(long, env = "COURSEMATE_MODEL")]
		model: Option<PathBuf>,
	},
}

impl Command {
	/// Model configuration for `train`; defaults otherwise.
	pub fn recommender_config(&self) -> RecommenderConfig {
		match self {
			Self::Train {
				n_components,
				max_features,
				random_state,
				..
			} => RecommenderConfig {
				n_components: *n_components,
				max_features: *max_features,
				random_state: *random_state,
				..RecommenderConfig::default()
			},
			_ => RecommenderConfig::default(),
		}
	}
}
