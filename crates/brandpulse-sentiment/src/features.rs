//! TF-IDF feature extraction over unigrams and bigrams.
//!
//! The vocabulary is learned once by [`TfidfVectorizer::fit_transform`] and is
//! immutable afterwards. Terms seen later that are not in the vocabulary are
//! dropped silently.

use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

use indexmap::IndexMap;
use ndarray::ArrayView1;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::SentimentError;
use crate::stop_words::is_stop_word;

/// Document-frequency thresholds applied when the vocabulary is learned.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureConfig {
    /// A term must appear in at least this many documents.
    pub min_df: usize,
    /// A term may appear in at most this fraction of documents.
    pub max_df: f64,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            min_df: 5,
            max_df: 0.9,
        }
    }
}

/// Sparse feature vector: `(feature index, weight)` pairs sorted by index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SparseVector {
    entries: Vec<(usize, f64)>,
}

impl SparseVector {
    /// Build from arbitrary pairs; entries are sorted by index.
    #[must_use]
    pub fn new(mut entries: Vec<(usize, f64)>) -> Self {
        entries.sort_unstable_by_key(|&(index, _)| index);
        Self { entries }
    }

    #[must_use]
    pub fn entries(&self) -> &[(usize, f64)] {
        &self.entries
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Dot product with a dense row of weights, such as one row of a
    /// coefficient matrix. Indices past the end of `dense` contribute nothing.
    #[must_use]
    pub fn dot(&self, dense: ArrayView1<'_, f64>) -> f64 {
        self.entries
            .iter()
            .map(|&(index, weight)| dense.get(index).map_or(0.0, |w| w * weight))
            .sum()
    }

    #[must_use]
    pub fn norm(&self) -> f64 {
        self.entries.iter().map(|(_, w)| w * w).sum::<f64>().sqrt()
    }
}

fn token_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\b\w\w+\b").expect("valid token regex"))
}

/// Split text into the unigram and bigram terms used as features.
///
/// Text is lowercased, tokens of two or more word characters are extracted,
/// stop words are removed, then every unigram and every adjacent pair of the
/// remaining tokens is emitted (`"battery life"`).
#[must_use]
pub fn analyze(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let tokens: Vec<&str> = token_pattern()
        .find_iter(&lowered)
        .map(|m| m.as_str())
        .filter(|token| !is_stop_word(token))
        .collect();

    let mut terms: Vec<String> = tokens.iter().map(|t| (*t).to_string()).collect();
    terms.extend(tokens.windows(2).map(|pair| format!("{} {}", pair[0], pair[1])));
    terms
}

/// Learned vocabulary plus smoothed inverse document frequencies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    config: FeatureConfig,
    /// Term to feature index, in lexicographic term order.
    vocabulary: IndexMap<String, usize>,
    idf: Vec<f64>,
}

impl TfidfVectorizer {
    /// Learn the vocabulary from `corpus` and return the weighted matrix for it.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::Features`] if the corpus is empty, the
    /// document-frequency bounds are inconsistent, or no term survives them.
    #[allow(clippy::cast_precision_loss)]
    pub fn fit_transform<S: AsRef<str>>(
        config: FeatureConfig,
        corpus: &[S],
    ) -> Result<(Self, Vec<SparseVector>), SentimentError> {
        if corpus.is_empty() {
            return Err(SentimentError::Features(
                "cannot fit a vocabulary on an empty corpus".to_string(),
            ));
        }

        let analyzed: Vec<Vec<String>> = corpus.iter().map(|doc| analyze(doc.as_ref())).collect();

        let mut document_frequency: HashMap<&str, usize> = HashMap::new();
        for terms in &analyzed {
            let unique: HashSet<&str> = terms.iter().map(String::as_str).collect();
            for term in unique {
                *document_frequency.entry(term).or_insert(0) += 1;
            }
        }

        let n_docs = corpus.len();
        let max_doc_count = config.max_df * n_docs as f64;
        if max_doc_count < config.min_df as f64 {
            return Err(SentimentError::Features(format!(
                "max_df {} over {n_docs} documents allows fewer documents than min_df {}",
                config.max_df, config.min_df
            )));
        }

        let mut kept: Vec<(&str, usize)> = document_frequency
            .into_iter()
            .filter(|&(_, df)| df >= config.min_df && df as f64 <= max_doc_count)
            .collect();
        if kept.is_empty() {
            return Err(SentimentError::Features(format!(
                "no term survives min_df {} and max_df {} over {n_docs} documents",
                config.min_df, config.max_df
            )));
        }
        kept.sort_unstable_by(|a, b| a.0.cmp(b.0));

        let mut vocabulary = IndexMap::with_capacity(kept.len());
        let mut idf = Vec::with_capacity(kept.len());
        for (index, (term, df)) in kept.into_iter().enumerate() {
            vocabulary.insert(term.to_string(), index);
            idf.push(smoothed_idf(n_docs, df));
        }

        tracing::debug!(
            documents = n_docs,
            vocabulary = vocabulary.len(),
            "tf-idf vocabulary learned"
        );

        let vectorizer = Self {
            config,
            vocabulary,
            idf,
        };
        let matrix = analyzed
            .iter()
            .map(|terms| vectorizer.weigh(terms))
            .collect();
        Ok((vectorizer, matrix))
    }

    /// Weight `texts` against the fixed vocabulary.
    #[must_use]
    pub fn transform<S: AsRef<str>>(&self, texts: &[S]) -> Vec<SparseVector> {
        texts
            .iter()
            .map(|text| self.weigh(&analyze(text.as_ref())))
            .collect()
    }

    #[must_use]
    pub fn vocabulary(&self) -> &IndexMap<String, usize> {
        &self.vocabulary
    }

    #[must_use]
    pub fn idf(&self) -> &[f64] {
        &self.idf
    }

    #[must_use]
    pub fn config(&self) -> FeatureConfig {
        self.config
    }

    #[must_use]
    pub fn n_features(&self) -> usize {
        self.vocabulary.len()
    }

    /// Raw counts times IDF, then L2-normalised. Empty when no term is known.
    fn weigh(&self, terms: &[String]) -> SparseVector {
        let mut counts: HashMap<usize, usize> = HashMap::new();
        for term in terms {
            if let Some(&index) = self.vocabulary.get(term.as_str()) {
                *counts.entry(index).or_insert(0) += 1;
            }
        }

        #[allow(clippy::cast_precision_loss)]
        let mut entries: Vec<(usize, f64)> = counts
            .into_iter()
            .map(|(index, count)| (index, count as f64 * self.idf[index]))
            .collect();
        entries.sort_unstable_by_key(|&(index, _)| index);

        let mut vector = SparseVector { entries };
        let norm = vector.norm();
        if norm > 0.0 {
            for (_, weight) in &mut vector.entries {
                *weight /= norm;
            }
        }
        vector
    }
}

/// `ln((1 + n) / (1 + df)) + 1`.
#[allow(clippy::cast_precision_loss)]
fn smoothed_idf(n_docs: usize, df: usize) -> f64 {
    ((1 + n_docs) as f64 / (1 + df) as f64).ln() + 1.0
}

#[cfg(test)]
#[path = "features_test.rs"]
mod tests;
