// ---------------------------------------------------------------------------
// Lemmatizer — English noun morphology reduction
// ---------------------------------------------------------------------------
//
// Dictionary-free approximation of WordNet's `morphy` for nouns: an
// irregular-plural table, a set of words that are already base forms, and
// suffix-detachment rules. Rules are applied until the token stops changing,
// so the output is always a fixed point.
// ---------------------------------------------------------------------------

use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

/// Tokens of this length or shorter are never rewritten.
const MIN_RULE_LEN: usize = 3;

const IRREGULAR_PLURALS: &[(&str, &str)] = &[
	("children", "child"),
	("men", "man"),
	("women", "woman"),
	("people", "person"),
	("mice", "mouse"),
	("feet", "foot"),
	("teeth", "tooth"),
	("geese", "goose"),
	("oxen", "ox"),
	("analyses", "analysis"),
	("crises", "crisis"),
	("theses", "thesis"),
	("hypotheses", "hypothesis"),
	("diagnoses", "diagnosis"),
	("indices", "index"),
	("matrices", "matrix"),
	("vertices", "vertex"),
	("appendices", "appendix"),
	("criteria", "criterion"),
	("phenomena", "phenomenon"),
	("lives", "life"),
	("wives", "wife"),
	("knives", "knife"),
	("leaves", "leaf"),
	("halves", "half"),
	("shelves", "shelf"),
	("selves", "self"),
	("wolves", "wolf"),
	("movies", "movie"),
	("calories", "calorie"),
	("cookies", "cookie"),
	("quizzes", "quiz"),
	("heroes", "hero"),
	("potatoes", "potato"),
	("tomatoes", "tomato"),
];

/// Words ending in `s` that are already base forms.
const INVARIANT: &[&str] = &[
	"series",
	"species",
	"news",
	"means",
	"mathematics",
	"physics",
	"economics",
	"analytics",
	"ethics",
	"politics",
	"logistics",
	"graphics",
	"electronics",
	"robotics",
	"genetics",
	"linguistics",
	"aerodynamics",
	"thermodynamics",
	"athletics",
	"always",
	"perhaps",
	"across",
	"towards",
	"whereas",
	"afterwards",
	"sometimes",
	"nevertheless",
];

/// Singular nouns ending in `s` whose plural adds `es` (bus, buses). The
/// generic rules would strip too much from either form.
const S_NOUNS: &[&str] = &[
	"bus", "gas", "lens", "bias", "alias", "atlas", "canvas", "plus", "bonus", "virus",
	"campus", "status", "focus", "census", "corpus", "syllabus", "iris",
];

/// Endings that look plural but belong to a singular noun.
const PROTECTED_ENDINGS: &[&str] = &["ss", "us", "is"];

/// Suffixes whose plural adds `es` rather than `s`.
const ES_STEMS: &[&str] = &["sses", "xes", "zzes", "ches", "shes"];

fn irregular_table() -> &'static HashMap<&'static str, &'static str> {
	static TABLE: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
	TABLE.get_or_init(|| IRREGULAR_PLURALS.iter().copied().collect())
}

fn invariant_set() -> &'static HashSet<&'static str> {
	static SET: OnceLock<HashSet<&'static str>> = OnceLock::new();
	SET.get_or_init(|| INVARIANT.iter().copied().collect())
}

fn s_noun_set() -> &'static HashSet<&'static str> {
	static SET: OnceLock<HashSet<&'static str>> = OnceLock::new();
	SET.get_or_init(|| S_NOUNS.iter().copied().collect())
}

/// Reduce a lowercase ASCII token to its noun base form.
///
/// `lemmatize(lemmatize(w)) == lemmatize(w)` for every input.
pub fn lemmatize(token: &str) -> String {
	let mut current = token.to_string();
	// Each step either shortens the token or maps it onto a fixed point,
	// so the loop is bounded by the token length.
	for _ in 0..=token.len() {
		match lemmatize_step(&current) {
			Some(next) if next != current => current = next,
			_ => break,
		}
	}
	current
}

/// Apply the first matching rule, or `None` when the token is a base form.
fn lemmatize_step(token: &str) -> Option<String> {
	if let Some(base) = irregular_table().get(token) {
		return Some((*base).to_string());
	}
	if s_noun_set().contains(token) {
		return None;
	}
	if let Some(stem) = token.strip_suffix("es").filter(|stem| s_noun_set().contains(*stem)) {
		return Some(stem.to_string());
	}
	if token.len() <= MIN_RULE_LEN || invariant_set().contains(token) {
		return None;
	}
	if !token.ends_with('s') {
		return None;
	}
	if PROTECTED_ENDINGS.iter().any(|end| token.ends_with(end)) {
		return None;
	}
	if token.len() > 4 && token.ends_with("ies") {
		return Some(format!("{}y", &token[..token.len() - 3]));
	}
	if ES_STEMS.iter().any(|suffix| token.ends_with(suffix)) {
		return Some(token[..token.len() - 2].to_string());
	}
	Some(token[..token.len() - 1].to_string())
}
