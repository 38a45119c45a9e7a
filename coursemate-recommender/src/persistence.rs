// ---------------------------------------------------------------------------
// Model persistence — gzipped JSON model file
// ---------------------------------------------------------------------------
//
// File format (v1): gzipped JSON
//
//   { "version": 1, "config": {...}, "courses": [...], "features": {...},
//     "nRows": n, "nCols": k, "vectors": "<base64 f64 LE, row-major>" }
//
// Reduced vectors are stored bit-exact. The similarity index is not stored;
// it is rebuilt from the vectors on load through the same code path as
// `fit`, so a loaded model answers queries identically to the saved one.
//
// Writes go to a temporary file next to the target and are renamed into
// place, so a failed save never leaves a truncated model behind.
// ---------------------------------------------------------------------------

use std::io::{Read, Write};
use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use flate2::Compression;
use flate2::read::{GzDecoder, GzEncoder};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::config::RecommenderConfig;
use crate::error::RecommenderError;
use crate::features::FeatureState;
use crate::recommender::FittedModel;
use crate::types::Course;

pub const MODEL_FORMAT_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Vector encode / decode
// ---------------------------------------------------------------------------

/// Encode a f64 slice as base64 of little-endian bytes.
pub fn encode_vector(values: &[f64]) -> String {
	let bytes: Vec<u8> = values.iter().flat_map(|f| f.to_le_bytes()).collect();
	STANDARD.encode(&bytes)
}

/// Decode base64 little-endian f64 bytes back to `Vec<f64>`.
pub fn decode_vector(encoded: &str) -> Result<Vec<f64>, RecommenderError> {
	let bytes = STANDARD
		.decode(encoded)
		.map_err(|e| RecommenderError::Corruption(format!("Invalid base64: {}", e)))?;
	if bytes.len() % 8 != 0 {
		return Err(RecommenderError::Corruption("Invalid vector length".into()));
	}
	Ok(bytes
		.chunks_exact(8)
		.map(|chunk| {
			let mut buf = [0u8; 8];
			buf.copy_from_slice(chunk);
			f64::from_le_bytes(buf)
		})
		.collect())
}

// ---------------------------------------------------------------------------
// Gzip compress / decompress
// ---------------------------------------------------------------------------

pub fn compress(data: &[u8]) -> Result<Vec<u8>, RecommenderError> {
	let mut encoder = GzEncoder::new(data, Compression::new(6));
	let mut compressed = Vec::new();
	encoder.read_to_end(&mut compressed)?;
	Ok(compressed)
}

pub fn decompress(data: &[u8]) -> Result<Vec<u8>, RecommenderError> {
	let mut decoder = GzDecoder::new(data);
	let mut decompressed = Vec::new();
	decoder
		.read_to_end(&mut decompressed)
		.map_err(|e| RecommenderError::Corruption(format!("Invalid gzip stream: {}", e)))?;
	Ok(decompressed)
}

/// Check if data starts with gzip magic bytes (0x1f, 0x8b).
pub fn is_gzipped(data: &[u8]) -> bool {
	data.len() >= 2 && data[0] == 0x1f && data[1] == 0x8b
}

// ---------------------------------------------------------------------------
// Model file
// ---------------------------------------------------------------------------

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelFileV1 {
	version: u32,
	config: RecommenderConfig,
	courses: Vec<Course>,
	features: FeatureState,
	n_rows: usize,
	n_cols: usize,
	vectors: String,
}

/// Save a fitted model to `path`.
pub fn save_model(path: &Path, model: &FittedModel) -> Result<(), RecommenderError> {
	let vectors = model.vectors();
	let flat: Vec<f64> = vectors.iter().copied().collect();
	let file = ModelFileV1 {
		version: MODEL_FORMAT_VERSION,
		config: model.config().clone(),
		courses: model.courses().to_vec(),
		features: model.features().clone(),
		n_rows: vectors.nrows(),
		n_cols: vectors.ncols(),
		vectors: encode_vector(&flat),
	};

	let json = serde_json::to_vec(&file)
		.map_err(|e| RecommenderError::Serialization(format!("Failed to serialize model: {}", e)))?;
	let compressed = compress(&json)?;

	let dir = match path.parent() {
		Some(p) if !p.as_os_str().is_empty() => p,
		_ => Path::new("."),
	};
	std::fs::create_dir_all(dir)?;
	let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
	tmp.write_all(&compressed)?;
	tmp.as_file().sync_all()?;
	tmp.persist(path).map_err(|e| RecommenderError::Io(e.error))?;

	tracing::info!(
		path = %path.display(),
		courses = model.len(),
		bytes = compressed.len(),
		"Model saved"
	);
	Ok(())
}

/// Load a model from `path`. Plain (uncompressed) JSON is accepted too.
pub fn load_model(path: &Path) -> Result<FittedModel, RecommenderError> {
	let raw = std::fs::read(path)?;
	let json = if is_gzipped(&raw) { decompress(&raw)? } else { raw };

	let version = serde_json::from_slice::<serde_json::Value>(&json)
		.map_err(|e| RecommenderError::Corruption(format!("Invalid model JSON: {}", e)))?
		.get("version")
		.and_then(serde_json::Value::as_u64);
	if version != Some(u64::from(MODEL_FORMAT_VERSION)) {
		return Err(RecommenderError::Corruption(format!(
			"Unsupported model version: {}",
			version.map_or_else(|| "missing".to_string(), |v| v.to_string())
		)));
	}

	let file: ModelFileV1 = serde_json::from_slice(&json)
		.map_err(|e| RecommenderError::Corruption(format!("Invalid model JSON: {}", e)))?;

	if file.courses.len() != file.n_rows {
		return Err(RecommenderError::Corruption(format!(
			"Model has {} courses but {} vector rows",
			file.courses.len(),
			file.n_rows
		)));
	}
	if let Some((i, _)) = file
		.courses
		.iter()
		.enumerate()
		.find(|(i, c)| c.row_index() != *i)
	{
		return Err(RecommenderError::Corruption(format!(
			"Course at position {} has a mismatched row index",
			i
		)));
	}

	let flat = decode_vector(&file.vectors)?;
	let vectors = Array2::from_shape_vec((file.n_rows, file.n_cols), flat)
		.map_err(|e| RecommenderError::Corruption(format!("Invalid vector shape: {}", e)))?;

	let model = FittedModel::from_parts(file.config, file.courses, file.features, vectors);
	tracing::info!(path = %path.display(), courses = model.len(), "Model loaded");
	Ok(model)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::dataset::{Dataset, REQUIRED_COLUMNS};

	fn model() -> FittedModel {
		let ds = Dataset::from_records(REQUIRED_COLUMNS, vec![
			vec![
				"Intro to Python",
				"Uni A",
				"Beginner",
				"4.8",
				"https://a",
				"learn python basics",
				"python",
			],
			vec![
				"Advanced Databases",
				"Uni B",
				"Advanced",
				"Not Calibrated",
				"https://b",
				"sql and indexing",
				"sql",
			],
			vec![
				"Python Data Science",
				"Uni C",
				"Intermediate",
				"4.6",
				"https://c",
				"data analysis in python",
				"python data",
			],
		])
		.unwrap();
		FittedModel::fit(&ds, &RecommenderConfig::default()).unwrap()
	}

	#[test]
	fn vector_encoding_is_bit_exact() {
		let values = [0.1, -2.5e-300, f64::MAX, 0.0, -0.0, 1.0 / 3.0];
		let decoded = decode_vector(&encode_vector(&values)).unwrap();
		let bits: Vec<u64> = decoded.iter().map(|v| v.to_bits()).collect();
		let expected: Vec<u64> = values.iter().map(|v| v.to_bits()).collect();
		assert_eq!(bits, expected);
	}

	#[test]
	fn decode_vector_rejects_bad_input() {
		assert!(matches!(
			decode_vector("!!!"),
			Err(RecommenderError::Corruption(_))
		));
		assert!(matches!(
			decode_vector(&STANDARD.encode([1u8, 2, 3])),
			Err(RecommenderError::Corruption(_))
		));
	}

	#[test]
	fn compress_decompress_roundtrip() {
		let data = b"course recommender model";
		let compressed = compress(data).unwrap();
		assert!(is_gzipped(&compressed));
		assert_eq!(decompress(&compressed).unwrap(), data);
		assert!(!is_gzipped(b"{}"));
	}

	#[test]
	fn saved_model_answers_queries_identically() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("model.gz");
		let original = model();
		original.save(&path).unwrap();

		let loaded = FittedModel::load(&path).unwrap();
		assert_eq!(loaded.courses(), original.courses());
		assert_eq!(loaded.vectors(), original.vectors());
		assert_eq!(loaded.similarity(), original.similarity());
		for course in original.courses() {
			assert_eq!(
				loaded.recommend(course.original_name(), 5, 0.05),
				original.recommend(course.original_name(), 5, 0.05)
			);
		}
	}

	#[test]
	fn save_creates_missing_directories_and_overwrites() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("nested").join("model.gz");
		let m = model();
		m.save(&path).unwrap();
		m.save(&path).unwrap();
		assert_eq!(FittedModel::load(&path).unwrap().len(), 3);
		let leftovers = std::fs::read_dir(path.parent().unwrap()).unwrap().count();
		assert_eq!(leftovers, 1);
	}

	#[test]
	fn unsupported_version_is_corruption() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("model.json");
		std::fs::write(&path, br#"{ "version": 99 }"#).unwrap();
		let err = FittedModel::load(&path).unwrap_err();
		assert!(matches!(err, RecommenderError::Corruption(_)));
		assert!(err.to_string().contains("99"));
	}

	#[test]
	fn garbage_file_is_corruption() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("model.gz");
		std::fs::write(&path, b"not a model").unwrap();
		assert!(matches!(
			FittedModel::load(&path),
			Err(RecommenderError::Corruption(_))
		));
	}

	#[test]
	fn mismatched_vector_shape_is_corruption() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("model.gz");
		model().save(&path).unwrap();

		let json = decompress(&std::fs::read(&path).unwrap()).unwrap();
		let mut value: serde_json::Value = serde_json::from_slice(&json).unwrap();
		value["nCols"] = serde_json::json!(1000);
		std::fs::write(&path, compress(&serde_json::to_vec(&value).unwrap()).unwrap()).unwrap();

		assert!(matches!(
			FittedModel::load(&path),
			Err(RecommenderError::Corruption(_))
		));
	}

	#[test]
	fn missing_file_is_io_error() {
		let dir = tempfile::tempdir().unwrap();
		assert!(matches!(
			FittedModel::load(dir.path().join("absent.gz")),
			Err(RecommenderError::Io(_))
		));
	}
}
