use serde::{Deserialize, Serialize};

use crate::normalize::normalize;

/// Display marker for courses without a usable rating.
pub const NOT_RATED: &str = "Not Rated";

// ---------------------------------------------------------------------------
// Rating
// ---------------------------------------------------------------------------

/// A course rating on the external 0–5 scale, or the unrated sentinel.
///
/// Missing, empty, non-numeric ("Not Calibrated") and non-finite inputs are
/// all `Unrated`; no number is ever made up for them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "Option<f64>", into = "Option<f64>")]
pub enum Rating {
	Score(f64),
	Unrated,
}

impl Rating {
	pub fn parse(raw: Option<&str>) -> Self {
		match raw.map(str::trim).and_then(|s| s.parse::<f64>().ok()) {
			Some(v) if v.is_finite() => Self::Score(v),
			_ => Self::Unrated,
		}
	}

	pub fn value(&self) -> Option<f64> {
		match self {
			Self::Score(v) => Some(*v),
			Self::Unrated => None,
		}
	}
}

impl From<Option<f64>> for Rating {
	fn from(value: Option<f64>) -> Self {
		match value {
			Some(v) if v.is_finite() => Self::Score(v),
			_ => Self::Unrated,
		}
	}
}

impl From<Rating> for Option<f64> {
	fn from(rating: Rating) -> Self {
		rating.value()
	}
}

// ---------------------------------------------------------------------------
// Raw dataset row
// ---------------------------------------------------------------------------

/// One course row as read from the source table, before any cleaning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct RawCourse {
	pub name: Option<String>,
	pub university: Option<String>,
	pub difficulty_level: Option<String>,
	pub rating: Option<String>,
	pub url: Option<String>,
	pub description: Option<String>,
	pub skills: Option<String>,
}

impl RawCourse {
	/// Composite identity used to collapse duplicate rows. Skills are not
	/// part of it.
	pub fn dedup_key(&self) -> [Option<&str>; 6] {
		[
			self.name.as_deref(),
			self.university.as_deref(),
			self.difficulty_level.as_deref(),
			self.rating.as_deref(),
			self.url.as_deref(),
			self.description.as_deref(),
		]
	}
}

// ---------------------------------------------------------------------------
// Fitted course record
// ---------------------------------------------------------------------------

/// A course in a fitted model. Immutable; `normalized_name` and `tags` are
/// derived from the raw fields at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
	row_index: usize,
	original_name: String,
	normalized_name: String,
	university: String,
	difficulty_level: String,
	rating: Rating,
	rating_label: String,
	url: String,
	description: String,
	skills: String,
	tags: String,
}

impl Course {
	pub fn from_raw(row_index: usize, raw: RawCourse) -> Self {
		let normalized_name = normalize(raw.name.as_deref());
		let tags = format!(
			"{} {} {}",
			normalized_name,
			normalize(raw.description.as_deref()),
			normalize(raw.skills.as_deref())
		);
		let rating = Rating::parse(raw.rating.as_deref());
		let rating_label = match (rating, raw.rating.as_deref()) {
			(Rating::Score(_), Some(cell)) => cell.trim().to_string(),
			_ => NOT_RATED.to_string(),
		};
		Self {
			row_index,
			rating,
			rating_label,
			original_name: raw.name.unwrap_or_default(),
			normalized_name,
			university: raw.university.unwrap_or_default(),
			difficulty_level: raw.difficulty_level.unwrap_or_default(),
			url: raw.url.unwrap_or_default(),
			description: raw.description.unwrap_or_default(),
			skills: raw.skills.unwrap_or_default(),
			tags,
		}
	}

	pub fn row_index(&self) -> usize {
		self.row_index
	}

	pub fn original_name(&self) -> &str {
		&self.original_name
	}

	pub fn normalized_name(&self) -> &str {
		&self.normalized_name
	}

	pub fn university(&self) -> &str {
		&self.university
	}

	pub fn difficulty_level(&self) -> &str {
		&self.difficulty_level
	}

	pub fn rating(&self) -> Rating {
		self.rating
	}

	/// Rating text as it appeared in the source table, or [`NOT_RATED`].
	pub fn rating_label(&self) -> &str {
		&self.rating_label
	}

	pub fn url(&self) -> &str {
		&self.url
	}

	pub fn description(&self) -> &str {
		&self.description
	}

	pub fn skills(&self) -> &str {
		&self.skills
	}

	/// Exact text fed to the vectorizer.
	pub fn tags(&self) -> &str {
		&self.tags
	}
}

// ---------------------------------------------------------------------------
// Query output
// ---------------------------------------------------------------------------

/// One recommendation, in the shape the web layer consumes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendedCourse {
	pub course_name: String,
	pub course_url: String,
	/// Source rating text, or [`NOT_RATED`].
	#[serde(rename = "rating")]
	pub rating_label: String,
	#[serde(skip)]
	pub rating: Rating,
	pub institution: String,
	pub difficulty_level: String,
	/// Raw cosine similarity to the anchor course.
	pub similarity_score: f64,
	/// Similarity blended with the normalized rating.
	pub final_score: f64,
}
