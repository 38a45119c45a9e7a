// ---------------------------------------------------------------------------
// TF-IDF vectorization
// ---------------------------------------------------------------------------
//
// Bag-of-words over tokens of two or more ASCII alphanumerics, English stop
// words removed, vocabulary capped by total corpus frequency. Weighting is
// smoothed IDF, `ln((1 + n) / (1 + df)) + 1`, times raw term counts, with
// every row scaled to unit L2 norm. Output is a CSR sparse matrix whose
// columns follow the alphabetical order of the vocabulary.
// ---------------------------------------------------------------------------

use std::collections::{BTreeMap, HashMap};
use std::sync::OnceLock;

use ndarray::Array2;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::RecommenderError;
use crate::stopwords;

fn token_re() -> &'static Regex {
	static RE: OnceLock<Regex> = OnceLock::new();
	RE.get_or_init(|| Regex::new(r"[a-z0-9]{2,}").expect("static regex"))
}

/// Split a document into lowercase tokens, stop words removed.
pub fn tokenize(text: &str) -> Vec<String> {
	let lower = text.to_ascii_lowercase();
	token_re()
		.find_iter(&lower)
		.map(|m| m.as_str())
		.filter(|t| !stopwords::is_stop_word(t))
		.map(str::to_string)
		.collect()
}

// ---------------------------------------------------------------------------
// Sparse matrix
// ---------------------------------------------------------------------------

/// Compressed sparse row matrix of `f64`.
#[derive(Debug, Clone, PartialEq)]
pub struct SparseMatrix {
	n_rows: usize,
	n_cols: usize,
	indptr: Vec<usize>,
	indices: Vec<usize>,
	values: Vec<f64>,
}

impl SparseMatrix {
	pub fn n_rows(&self) -> usize {
		self.n_rows
	}

	pub fn n_cols(&self) -> usize {
		self.n_cols
	}

	pub fn nnz(&self) -> usize {
		self.values.len()
	}

	/// Column indices and values of row `i`.
	pub fn row(&self, i: usize) -> (&[usize], &[f64]) {
		let (start, end) = (self.indptr[i], self.indptr[i + 1]);
		(&self.indices[start..end], &self.values[start..end])
	}

	/// `self · rhs` where `rhs` is `n_cols × k`.
	pub fn dot_dense(&self, rhs: &Array2<f64>) -> Array2<f64> {
		let k = rhs.ncols();
		let mut out = Array2::<f64>::zeros((self.n_rows, k));
		for i in 0..self.n_rows {
			let (cols, vals) = self.row(i);
			let mut out_row = out.row_mut(i);
			for (&c, &v) in cols.iter().zip(vals) {
				out_row.scaled_add(v, &rhs.row(c));
			}
		}
		out
	}

	/// `selfᵀ · rhs` where `rhs` is `n_rows × k`.
	pub fn transpose_dot_dense(&self, rhs: &Array2<f64>) -> Array2<f64> {
		let k = rhs.ncols();
		let mut out = Array2::<f64>::zeros((self.n_cols, k));
		for i in 0..self.n_rows {
			let (cols, vals) = self.row(i);
			let rhs_row = rhs.row(i);
			for (&c, &v) in cols.iter().zip(vals) {
				out.row_mut(c).scaled_add(v, &rhs_row);
			}
		}
		out
	}
}

// ---------------------------------------------------------------------------
// Vectorizer
// ---------------------------------------------------------------------------

/// Frozen vocabulary and IDF weights learned by [`TfidfVectorizer::fit_transform`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfidfVocabulary {
	pub terms: Vec<String>,
	pub idf: Vec<f64>,
}

impl TfidfVocabulary {
	pub fn len(&self) -> usize {
		self.terms.len()
	}

	pub fn is_empty(&self) -> bool {
		self.terms.is_empty()
	}
}

pub struct TfidfVectorizer {
	max_features: usize,
}

impl TfidfVectorizer {
	pub fn new(max_features: usize) -> Self {
		Self { max_features }
	}

	/// Learn the vocabulary from `documents` and return their TF-IDF matrix.
	pub fn fit_transform<S: AsRef<str>>(
		&self,
		documents: &[S],
	) -> Result<(TfidfVocabulary, SparseMatrix), RecommenderError> {
		let tokenized: Vec<Vec<String>> = documents.iter().map(|d| tokenize(d.as_ref())).collect();

		let mut term_freq: HashMap<&str, usize> = HashMap::new();
		for tokens in &tokenized {
			for t in tokens {
				*term_freq.entry(t.as_str()).or_insert(0) += 1;
			}
		}
		if term_freq.is_empty() {
			return Err(RecommenderError::EmptyVocabulary);
		}

		// Highest corpus frequency first, alphabetical among equals
		let mut ranked: Vec<(&str, usize)> = term_freq.into_iter().collect();
		ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
		ranked.truncate(self.max_features.max(1));

		let mut terms: Vec<String> = ranked.into_iter().map(|(t, _)| t.to_string()).collect();
		terms.sort();
		let column: HashMap<&str, usize> =
			terms.iter().enumerate().map(|(i, t)| (t.as_str(), i)).collect();

		// Per-document counts, keyed by column so each row comes out sorted
		let doc_counts: Vec<BTreeMap<usize, usize>> = tokenized
			.iter()
			.map(|tokens| {
				let mut counts = BTreeMap::new();
				for t in tokens {
					if let Some(&c) = column.get(t.as_str()) {
						*counts.entry(c).or_insert(0) += 1;
					}
				}
				counts
			})
			.collect();

		let n_docs = documents.len() as f64;
		let mut doc_freq = vec![0usize; terms.len()];
		for counts in &doc_counts {
			for &c in counts.keys() {
				doc_freq[c] += 1;
			}
		}
		let idf: Vec<f64> = doc_freq
			.iter()
			.map(|&df| ((1.0 + n_docs) / (1.0 + df as f64)).ln() + 1.0)
			.collect();

		let mut indptr = Vec::with_capacity(doc_counts.len() + 1);
		let mut indices = Vec::new();
		let mut values = Vec::new();
		indptr.push(0);
		for counts in &doc_counts {
			let start = values.len();
			for (&c, &count) in counts {
				indices.push(c);
				values.push(count as f64 * idf[c]);
			}
			let norm = values[start..].iter().map(|v| v * v).sum::<f64>().sqrt();
			if norm > 0.0 {
				for v in &mut values[start..] {
					*v /= norm;
				}
			}
			indptr.push(values.len());
		}

		let matrix = SparseMatrix {
			n_rows: doc_counts.len(),
			n_cols: terms.len(),
			indptr,
			indices,
			values,
		};
		Ok((TfidfVocabulary { terms, idf }, matrix))
	}
}
