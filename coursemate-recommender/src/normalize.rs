// ---------------------------------------------------------------------------
// Text normalization
// ---------------------------------------------------------------------------
//
// Cleans raw free-text course fields into a canonical token stream. The same
// function runs over training data and query input, so it must be
// idempotent: `normalize_str(&normalize_str(t)) == normalize_str(t)`.
//
// Pipeline, in order:
//   1. missing input -> ""
//   2. drop mis-decoded replacement sequences
//   3. drop everything outside printable ASCII (ASCII whitespace survives)
//   4. drop everything that is not an ASCII letter or whitespace
//   5. lowercase
//   6. split on whitespace, lemmatize each token
//   7. join with single spaces
// ---------------------------------------------------------------------------

use std::sync::OnceLock;

use regex::Regex;

use crate::lemmatize::lemmatize;

fn mojibake_re() -> &'static Regex {
	static RE: OnceLock<Regex> = OnceLock::new();
	// U+FFFD, its UTF-8 bytes read back as Latin-1, and runs of doubled quotes
	RE.get_or_init(|| Regex::new(r#"(?:\x{FFFD}|ï¿½|"{2,})+"#).expect("static regex"))
}

fn non_printable_re() -> &'static Regex {
	static RE: OnceLock<Regex> = OnceLock::new();
	RE.get_or_init(|| Regex::new(r"[^\x20-\x7E\t\n\r\x0B\x0C]+").expect("static regex"))
}

fn non_letter_re() -> &'static Regex {
	static RE: OnceLock<Regex> = OnceLock::new();
	RE.get_or_init(|| Regex::new(r"[^a-zA-Z\t\n\r\x0B\x0C ]+").expect("static regex"))
}

/// Normalize an optional text field. Missing input yields an empty string.
pub fn normalize(text: Option<&str>) -> String {
	match text {
		Some(t) => normalize_str(t),
		None => String::new(),
	}
}

/// Normalize a text field. Never fails; the worst case is an empty string.
pub fn normalize_str(text: &str) -> String {
	let text = mojibake_re().replace_all(text, "");
	let text = non_printable_re().replace_all(&text, "");
	let text = non_letter_re().replace_all(&text, "");
	let text = text.to_ascii_lowercase();

	text.split_ascii_whitespace()
		.map(lemmatize)
		.collect::<Vec<_>>()
		.join(" ")
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn missing_input_is_empty() {
		assert_eq!(normalize(None), "");
		assert_eq!(normalize(Some("")), "");
	}

	#[test]
	fn strips_digits_and_punctuation() {
		assert_eq!(normalize_str("Python 3.10: Data-Science!"), "python datascience");
	}

	#[test]
	fn lowercases_and_lemmatizes() {
		assert_eq!(normalize_str("Introduction to Databases"), "introduction to database");
		assert_eq!(normalize_str("Machine Learning Courses"), "machine learning course");
	}

	#[test]
	fn collapses_whitespace_and_trims() {
		assert_eq!(normalize_str("  deep\t\tlearning \n basics  "), "deep learning basic");
	}

	#[test]
	fn strips_non_ascii() {
		assert_eq!(normalize_str("café résumé"), "caf rsum");
		assert_eq!(normalize_str("日本語 python"), "python");
	}

	#[test]
	fn strips_mojibake_and_doubled_quotes() {
		assert_eq!(normalize_str("data\u{FFFD}\u{FFFD}base"), "database");
		assert_eq!(normalize_str("dataï¿½base"), "database");
		assert_eq!(normalize_str(r#"say """hello"""#), "say hello");
	}

	#[test]
	fn only_punctuation_becomes_empty() {
		assert_eq!(normalize_str("123 !!! ???"), "");
	}

	#[test]
	fn idempotent() {
		let samples = [
			"Introduction to Python",
			"  Advanced   Databases: SQL & Indexing (2nd ed.) ",
			"Children's Studies — analyses of classes",
			"Glasses, boxes and quizzes",
			"ï¿½ï¿½ broken\u{FFFD} text \"\"quoted\"\"",
			"",
			"Statistics for Data Science with Python",
		];
		for sample in samples {
			let once = normalize_str(sample);
			assert_eq!(normalize_str(&once), once, "not idempotent for {sample:?}");
		}
	}
}
