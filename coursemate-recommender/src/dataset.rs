// ---------------------------------------------------------------------------
// Dataset — tabular course metadata input
// ---------------------------------------------------------------------------
//
// A header row plus string cells. Empty cells are treated as missing.
// Column validation happens before any processing so a bad input never
// touches model state.
// ---------------------------------------------------------------------------

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use crate::error::RecommenderError;
use crate::types::RawCourse;

pub const COURSE_NAME: &str = "Course Name";
pub const UNIVERSITY: &str = "University";
pub const DIFFICULTY_LEVEL: &str = "Difficulty Level";
pub const COURSE_RATING: &str = "Course Rating";
pub const COURSE_URL: &str = "Course URL";
pub const COURSE_DESCRIPTION: &str = "Course Description";
pub const SKILLS: &str = "Skills";

pub const REQUIRED_COLUMNS: [&str; 7] = [
	COURSE_NAME,
	UNIVERSITY,
	DIFFICULTY_LEVEL,
	COURSE_RATING,
	COURSE_URL,
	COURSE_DESCRIPTION,
	SKILLS,
];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
	headers: Vec<String>,
	records: Vec<Vec<Option<String>>>,
}

impl Dataset {
	/// Build a dataset from in-memory rows. Every row must have one cell per
	/// header.
	pub fn from_records<H, R, C>(headers: H, rows: R) -> Result<Self, RecommenderError>
	where
		H: IntoIterator,
		H::Item: Into<String>,
		R: IntoIterator,
		R::Item: IntoIterator<Item = C>,
		C: Into<String>,
	{
		let headers: Vec<String> = headers
			.into_iter()
			.map(|h| Into::<String>::into(h).trim().to_string())
			.collect();
		let mut records = Vec::new();
		for (line, row) in rows.into_iter().enumerate() {
			let cells: Vec<Option<String>> = row.into_iter().map(|c| cell(c.into())).collect();
			if cells.len() != headers.len() {
				return Err(RecommenderError::InvalidDataset(format!(
					"row {} has {} cells, expected {}",
					line,
					cells.len(),
					headers.len()
				)));
			}
			records.push(cells);
		}
		Ok(Self { headers, records })
	}

	/// Read a CSV with a header row. Invalid UTF-8 is decoded lossily.
	pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, RecommenderError> {
		let mut csv_reader = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);

		let headers: Vec<String> = csv_reader
			.byte_headers()?
			.iter()
			.map(|h| String::from_utf8_lossy(h).trim().to_string())
			.collect();

		let mut records = Vec::new();
		for record in csv_reader.byte_records() {
			let record = record.map_err(|e| {
				if matches!(e.kind(), csv::ErrorKind::UnequalLengths { .. }) {
					RecommenderError::InvalidDataset(e.to_string())
				} else {
					RecommenderError::Csv(e)
				}
			})?;
			records.push(
				record
					.iter()
					.map(|c| cell(String::from_utf8_lossy(c).into_owned()))
					.collect(),
			);
		}

		tracing::debug!(columns = headers.len(), rows = records.len(), "CSV dataset read");
		Ok(Self { headers, records })
	}

	pub fn from_csv_path(path: impl AsRef<Path>) -> Result<Self, RecommenderError> {
		let file = std::fs::File::open(path.as_ref())?;
		Self::from_csv_reader(std::io::BufReader::new(file))
	}

	pub fn headers(&self) -> &[String] {
		&self.headers
	}

	pub fn len(&self) -> usize {
		self.records.len()
	}

	pub fn is_empty(&self) -> bool {
		self.records.is_empty()
	}

	/// Required columns that are absent, in canonical order.
	pub fn missing_columns(&self) -> Vec<String> {
		REQUIRED_COLUMNS
			.iter()
			.filter(|c| !self.headers.iter().any(|h| h == *c))
			.map(|c| c.to_string())
			.collect()
	}

	pub fn validate(&self) -> Result<(), RecommenderError> {
		let missing = self.missing_columns();
		if missing.is_empty() {
			Ok(())
		} else {
			Err(RecommenderError::MissingColumns(missing))
		}
	}

	/// Extract the course rows. Fails if a required column is missing.
	pub fn courses(&self) -> Result<Vec<RawCourse>, RecommenderError> {
		self.validate()?;
		// First occurrence wins for repeated header names
		let mut position: HashMap<&str, usize> = HashMap::new();
		for (i, h) in self.headers.iter().enumerate() {
			position.entry(h.as_str()).or_insert(i);
		}
		let column = |record: &[Option<String>], name: &str| -> Option<String> {
			position.get(name).and_then(|&i| record.get(i).cloned().flatten())
		};

		Ok(self
			.records
			.iter()
			.map(|r| RawCourse {
				name: column(r, COURSE_NAME),
				university: column(r, UNIVERSITY),
				difficulty_level: column(r, DIFFICULTY_LEVEL),
				rating: column(r, COURSE_RATING),
				url: column(r, COURSE_URL),
				description: column(r, COURSE_DESCRIPTION),
				skills: column(r, SKILLS),
			})
			.collect())
	}
}

fn cell(value: String) -> Option<String> {
	if value.is_empty() { None } else { Some(value) }
}
