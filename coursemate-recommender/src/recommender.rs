// ---------------------------------------------------------------------------
// Recommender — fit / recommend orchestration
// ---------------------------------------------------------------------------
//
// `FittedModel` is an immutable value built once by `fit` or `load` and
// queried by shared reference. `RecommenderService` holds at most one model
// and only replaces it after a fit or load has fully succeeded.
//
// Anchor lookup is first-match-wins by row order, both for duplicate
// normalized names and for the substring fallback. Results therefore depend
// on the order of rows in the source dataset.
// ---------------------------------------------------------------------------

use std::collections::HashSet;
use std::path::Path;

use ndarray::Array2;
use serde::Serialize;

use crate::config::RecommenderConfig;
use crate::dataset::Dataset;
use crate::error::RecommenderError;
use crate::features::{FeatureBuilder, FeatureState};
use crate::normalize::normalize_str;
use crate::persistence;
use crate::scoring::compute_final_score;
use crate::similarity::SimilarityIndex;
use crate::types::{Course, RawCourse, RecommendedCourse};

// ---------------------------------------------------------------------------
// FittedModel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct FittedModel {
	config: RecommenderConfig,
	courses: Vec<Course>,
	features: FeatureState,
	vectors: Array2<f64>,
	similarity: SimilarityIndex,
}

/// Summary of a fitted model, as reported by `info`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo {
	pub courses: usize,
	pub vocabulary_size: usize,
	pub n_components: usize,
	pub singular_values: Vec<f64>,
	pub config: RecommenderConfig,
}

impl FittedModel {
	/// Fit a model from a dataset.
	///
	/// Required columns are checked before anything else. Duplicate rows
	/// (same name, university, difficulty, rating, url and description)
	/// collapse to their first occurrence.
	pub fn fit(dataset: &Dataset, config: &RecommenderConfig) -> Result<Self, RecommenderError> {
		let raw = dataset.courses()?;
		let total = raw.len();

		let keep: Vec<bool> = {
			let mut seen = HashSet::new();
			raw.iter().map(|c| seen.insert(c.dedup_key())).collect()
		};
		let unique: Vec<RawCourse> = raw
			.into_iter()
			.zip(keep)
			.filter_map(|(course, keep)| keep.then_some(course))
			.collect();

		let courses: Vec<Course> = unique
			.into_iter()
			.enumerate()
			.map(|(i, raw)| Course::from_raw(i, raw))
			.collect();
		tracing::info!(
			rows = total,
			courses = courses.len(),
			duplicates = total - courses.len(),
			"Course catalog prepared"
		);

		let tags: Vec<&str> = courses.iter().map(Course::tags).collect();
		let features = FeatureBuilder::new(config).fit_transform(&tags)?;

		let model = Self::from_parts(config.clone(), courses, features.state, features.vectors);
		tracing::info!(
			courses = model.len(),
			components = model.vectors.ncols(),
			"Similarity index built"
		);
		Ok(model)
	}

	/// Assemble a model from fitted parts, rebuilding the similarity index
	/// from the reduced vectors.
	pub(crate) fn from_parts(
		config: RecommenderConfig,
		courses: Vec<Course>,
		features: FeatureState,
		vectors: Array2<f64>,
	) -> Self {
		let similarity = SimilarityIndex::build(&vectors);
		Self {
			config,
			courses,
			features,
			vectors,
			similarity,
		}
	}

	pub fn save(&self, path: impl AsRef<Path>) -> Result<(), RecommenderError> {
		persistence::save_model(path.as_ref(), self)
	}

	pub fn load(path: impl AsRef<Path>) -> Result<Self, RecommenderError> {
		persistence::load_model(path.as_ref())
	}

	/// Recommend up to `top_n` courses similar to the one named by `input`.
	///
	/// An input matching no course yields an empty list. The anchor course is
	/// never part of its own results.
	pub fn recommend(&self, input: &str, top_n: usize, rating_weight: f64) -> Vec<RecommendedCourse> {
		if top_n == 0 {
			return Vec::new();
		}
		let Some(anchor) = self.find_anchor(input) else {
			tracing::debug!(input, "No course matches query");
			return Vec::new();
		};
		if anchor >= self.similarity.len() {
			tracing::warn!(anchor, size = self.similarity.len(), "Anchor outside similarity index");
			return Vec::new();
		}

		let mut recommendations: Vec<RecommendedCourse> = self
			.similarity
			.ranked(anchor, top_n.saturating_add(1))
			.into_iter()
			.filter(|&(i, _)| i != anchor)
			.take(top_n)
			.map(|(i, similarity)| {
				let course = &self.courses[i];
				let score = compute_final_score(similarity, course.rating(), rating_weight);
				RecommendedCourse {
					course_name: course.original_name().to_string(),
					course_url: course.url().to_string(),
					rating_label: course.rating_label().to_string(),
					rating: course.rating(),
					institution: course.university().to_string(),
					difficulty_level: course.difficulty_level().to_string(),
					similarity_score: score.similarity,
					final_score: score.score,
				}
			})
			.collect();

		recommendations.sort_by(|a, b| b.final_score.total_cmp(&a.final_score));
		recommendations
	}

	/// Row index of the course a query refers to: exact normalized-name
	/// match first, then the first name containing the query. An empty query
	/// therefore matches the first course.
	pub fn find_anchor(&self, input: &str) -> Option<usize> {
		let query = normalize_str(input);
		if let Some(i) = self.courses.iter().position(|c| c.normalized_name() == query) {
			return Some(i);
		}
		let i = self
			.courses
			.iter()
			.position(|c| c.normalized_name().contains(query.as_str()))?;
		tracing::debug!(
			query = %query,
			matched = self.courses[i].normalized_name(),
			"Using partial course name match"
		);
		Some(i)
	}

	pub fn len(&self) -> usize {
		self.courses.len()
	}

	pub fn is_empty(&self) -> bool {
		self.courses.is_empty()
	}

	pub fn config(&self) -> &RecommenderConfig {
		&self.config
	}

	pub fn courses(&self) -> &[Course] {
		&self.courses
	}

	pub fn features(&self) -> &FeatureState {
		&self.features
	}

	/// Reduced course vectors, one row per course.
	pub fn vectors(&self) -> &Array2<f64> {
		&self.vectors
	}

	pub fn similarity(&self) -> &SimilarityIndex {
		&self.similarity
	}

	pub fn info(&self) -> ModelInfo {
		ModelInfo {
			courses: self.len(),
			vocabulary_size: self.features.vocabulary.len(),
			n_components: self.vectors.ncols(),
			singular_values: self.features.singular_values.clone(),
			config: self.config.clone(),
		}
	}
}

// ---------------------------------------------------------------------------
// RecommenderService
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct RecommenderService {
	config: RecommenderConfig,
	model: Option<FittedModel>,
}

impl RecommenderService {
	pub fn new(config: RecommenderConfig) -> Self {
		Self { config, model: None }
	}

	pub fn from_model(model: FittedModel) -> Self {
		Self {
			config: model.config().clone(),
			model: Some(model),
		}
	}

	/// Fit a new model. The held model is replaced only on success.
	pub fn fit(&mut self, dataset: &Dataset) -> Result<(), RecommenderError> {
		let model = FittedModel::fit(dataset, &self.config)?;
		self.model = Some(model);
		Ok(())
	}

	pub fn recommend(
		&self,
		input: &str,
		top_n: usize,
		rating_weight: f64,
	) -> Result<Vec<RecommendedCourse>, RecommenderError> {
		Ok(self.model()?.recommend(input, top_n, rating_weight))
	}

	pub fn is_fitted(&self) -> bool {
		self.model.is_some()
	}

	pub fn model(&self) -> Result<&FittedModel, RecommenderError> {
		self.model.as_ref().ok_or(RecommenderError::NotFitted)
	}

	pub fn config(&self) -> &RecommenderConfig {
		&self.config
	}

	pub fn save(&self, path: impl AsRef<Path>) -> Result<(), RecommenderError> {
		self.model()?.save(path)
	}

	/// Load a model from disk. The held model is replaced only on success.
	pub fn load(&mut self, path: impl AsRef<Path>) -> Result<(), RecommenderError> {
		let model = FittedModel::load(path)?;
		self.config = model.config().clone();
		self.model = Some(model);
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::dataset::REQUIRED_COLUMNS;
	use crate::types::Rating;

	type Row = [&'static str; 7];

	fn dataset(rows: &[Row]) -> Dataset {
		Dataset::from_records(REQUIRED_COLUMNS, rows.iter().map(|r| r.to_vec())).unwrap()
	}

	fn catalog() -> Dataset {
		dataset(&[
			[
				"Intro to Python",
				"Uni A",
				"Beginner",
				"4.8",
				"https://a",
				"learn python programming basics",
				"python programming",
			],
			[
				"Python for Data Analysis",
				"Uni B",
				"Intermediate",
				"4.5",
				"https://b",
				"python data analysis with pandas",
				"python data analysis",
			],
			[
				"Advanced Databases",
				"Uni C",
				"Advanced",
				"Not Calibrated",
				"https://c",
				"sql indexing and query planning",
				"sql database",
			],
			[
				"Database Design",
				"Uni D",
				"Beginner",
				"4.0",
				"https://d",
				"relational database design with sql",
				"sql database modeling",
			],
			[
				"Machine Learning with Python",
				"Uni E",
				"Advanced",
				"4.9",
				"https://e",
				"machine learning models in python",
				"python machine learning",
			],
		])
	}

	fn fitted() -> FittedModel {
		FittedModel::fit(&catalog(), &RecommenderConfig::default()).unwrap()
	}

	#[test]
	fn duplicate_course_is_collapsed_and_anchor_excluded() {
		let ds = dataset(&[
			["Intro to Python", "", "", "", "", "learn python basics", ""],
			["Intro to Python", "", "", "", "", "learn python basics", ""],
			["Advanced Databases", "", "", "", "", "sql and indexing", ""],
		]);
		let model = FittedModel::fit(&ds, &RecommenderConfig::default()).unwrap();
		assert_eq!(model.len(), 2);

		let recs = model.recommend("Intro to Python", 5, 0.05);
		assert_eq!(recs.len(), 1);
		assert_eq!(recs[0].course_name, "Advanced Databases");
	}

	#[test]
	fn duplicates_differing_only_in_skills_collapse() {
		let ds = dataset(&[
			["Intro to Python", "U", "B", "4", "u", "learn python basics", "python"],
			["Intro to Python", "U", "B", "4", "u", "learn python basics", "coding"],
			["Advanced Databases", "U", "A", "4", "v", "sql and indexing", "sql"],
		]);
		let model = FittedModel::fit(&ds, &RecommenderConfig::default()).unwrap();
		assert_eq!(model.len(), 2);
		assert_eq!(model.courses()[0].skills(), "python");
		assert_eq!(model.courses()[1].row_index(), 1);
	}

	#[test]
	fn anchor_is_never_recommended() {
		let model = fitted();
		for course in model.courses() {
			let recs = model.recommend(course.original_name(), 10, 0.05);
			assert!(recs.iter().all(|r| r.course_name != course.original_name()));
		}
	}

	#[test]
	fn result_count_is_bounded() {
		let model = fitted();
		assert_eq!(model.recommend("Intro to Python", 2, 0.05).len(), 2);
		assert_eq!(model.recommend("Intro to Python", 10, 0.05).len(), 4);
		assert!(model.recommend("Intro to Python", 0, 0.05).is_empty());
	}

	#[test]
	fn unbounded_top_n_returns_every_other_course() {
		let model = fitted();
		assert_eq!(model.recommend("Intro to Python", usize::MAX, 0.05).len(), 4);

		let pair = dataset(&[
			["Intro to Python", "", "", "4.5", "", "learn python basics", ""],
			["Advanced Databases", "", "", "", "", "sql and indexing", ""],
		]);
		let model = FittedModel::fit(&pair, &RecommenderConfig::default()).unwrap();
		let recs = model.recommend("Intro to Python", usize::MAX, 0.05);
		assert_eq!(recs.len(), 1);
		assert_eq!(recs[0].course_name, "Advanced Databases");
	}

	#[test]
	fn results_sorted_by_final_score() {
		let model = fitted();
		let recs = model.recommend("Intro to Python", 4, 0.05);
		for pair in recs.windows(2) {
			assert!(pair[0].final_score >= pair[1].final_score);
		}
		for rec in &recs {
			let expected = compute_final_score(rec.similarity_score, rec.rating, 0.05).score;
			assert!((rec.final_score - expected).abs() < 1e-12);
		}
	}

	#[test]
	fn python_courses_rank_above_database_courses() {
		let model = fitted();
		let recs = model.recommend("Python for Data Analysis", 2, 0.0);
		let names: Vec<&str> = recs.iter().map(|r| r.course_name.as_str()).collect();
		assert!(names.contains(&"Intro to Python"), "{names:?}");
		assert!(names.contains(&"Machine Learning with Python"), "{names:?}");
	}

	#[test]
	fn unknown_course_yields_empty_list() {
		let model = fitted();
		assert!(model.recommend("Underwater Basket Weaving", 5, 0.05).is_empty());
	}

	#[test]
	fn query_is_normalized_before_matching() {
		let model = fitted();
		assert_eq!(model.find_anchor("  DATABASE designs!! "), Some(3));
	}

	#[test]
	fn partial_match_takes_first_by_row_order() {
		let model = fitted();
		assert_eq!(model.find_anchor("python"), Some(0));
		assert_eq!(model.find_anchor("database"), Some(2));
	}

	#[test]
	fn empty_query_matches_first_course() {
		let model = fitted();
		assert_eq!(model.find_anchor(""), Some(0));
	}

	#[test]
	fn unrated_course_keeps_similarity_share_only() {
		let model = fitted();
		let recs = model.recommend("Database Design", 4, 0.05);
		let unrated = recs
			.iter()
			.find(|r| r.course_name == "Advanced Databases")
			.unwrap();
		assert_eq!(unrated.rating, Rating::Unrated);
		assert!((unrated.final_score - unrated.similarity_score * 0.95).abs() < 1e-12);
		assert_eq!(serde_json::to_value(unrated).unwrap()["rating"], "Not Rated");

		let recs = model.recommend("Advanced Databases", 4, 0.05);
		let rated = recs.iter().find(|r| r.course_name == "Database Design").unwrap();
		assert_eq!(rated.rating_label, "4.0");
		assert_eq!(rated.rating, Rating::Score(4.0));
	}

	#[test]
	fn fitting_is_deterministic() {
		let a = fitted();
		let b = fitted();
		assert_eq!(a.vectors(), b.vectors());
		assert_eq!(
			a.recommend("Intro to Python", 4, 0.05),
			b.recommend("Intro to Python", 4, 0.05)
		);
	}

	#[test]
	fn info_reports_fitted_shape() {
		let info = fitted().info();
		assert_eq!(info.courses, 5);
		assert!(info.vocabulary_size > info.n_components);
		assert_eq!(info.singular_values.len(), info.n_components);
	}

	#[test]
	fn service_requires_fit_before_recommend() {
		let service = RecommenderService::default();
		assert!(!service.is_fitted());
		let err = service.recommend("Intro to Python", 5, 0.05).unwrap_err();
		assert!(matches!(err, RecommenderError::NotFitted));
	}

	#[test]
	fn failed_fit_keeps_previous_model() {
		let mut service = RecommenderService::default();
		service.fit(&catalog()).unwrap();
		let before = service.recommend("Intro to Python", 3, 0.05).unwrap();

		let broken = Dataset::from_records(["Course Name"], vec![vec!["Intro to Python"]]).unwrap();
		let err = service.fit(&broken).unwrap_err();
		match err {
			RecommenderError::MissingColumns(cols) => assert_eq!(cols.len(), 6),
			other => panic!("unexpected error: {other}"),
		}

		let one_word = dataset(&[["python", "", "", "", "", "", ""]]);
		assert!(service.fit(&one_word).is_err());

		assert_eq!(service.model().unwrap().len(), 5);
		assert_eq!(service.recommend("Intro to Python", 3, 0.05).unwrap(), before);
	}

	#[test]
	fn service_save_requires_model() {
		let dir = tempfile::tempdir().unwrap();
		let err = RecommenderService::default()
			.save(dir.path().join("m.gz"))
			.unwrap_err();
		assert!(matches!(err, RecommenderError::NotFitted));
	}
}
