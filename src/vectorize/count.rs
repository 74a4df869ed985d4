// Count vectorizer.
//
// Turns preprocessed sentences into a sparse document-term matrix. Terms are
// runs of two or more word characters (single letters and digits carry no
// topical signal), lowercased. The vocabulary is sorted lexicographically so
// term indices are stable for a given corpus regardless of sentence order.

use std::collections::{BTreeMap, HashMap};

use anyhow::Result;
use tracing::info;

/// Sorted vocabulary with a reverse lookup.
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    terms: Vec<String>,
    index: HashMap<String, usize>,
}

impl Vocabulary {
    /// Build from terms; duplicates are removed and the result sorted.
    pub fn from_terms<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut terms: Vec<String> = terms.into_iter().map(Into::into).collect();
        terms.sort();
        terms.dedup();
        let index = terms
            .iter()
            .enumerate()
            .map(|(i, t)| (t.clone(), i))
            .collect();
        Self { terms, index }
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// The term at `idx`.
    pub fn term(&self, idx: usize) -> Option<&str> {
        self.terms.get(idx).map(String::as_str)
    }

    /// The index of `term`, if it is in the vocabulary.
    pub fn index_of(&self, term: &str) -> Option<usize> {
        self.index.get(term).copied()
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }
}

/// Sparse document-term counts, one row per document.
///
/// Each row lists `(term_index, count)` pairs sorted by term index, with
/// every count non-zero. Empty documents have empty rows.
#[derive(Debug, Clone, PartialEq)]
pub struct CountMatrix {
    rows: Vec<Vec<(usize, u32)>>,
    n_terms: usize,
}

impl CountMatrix {
    /// Build a matrix from rows. Zero counts are dropped and each row is
    /// sorted; indices must be below `n_terms`.
    pub fn from_rows(rows: Vec<Vec<(usize, u32)>>, n_terms: usize) -> Result<Self> {
        let mut cleaned = Vec::with_capacity(rows.len());
        for (d, row) in rows.into_iter().enumerate() {
            let mut merged: BTreeMap<usize, u32> = BTreeMap::new();
            for (term, count) in row {
                if term >= n_terms {
                    anyhow::bail!(
                        "Document {d} references term {term}, but the vocabulary has {n_terms} terms"
                    );
                }
                if count > 0 {
                    *merged.entry(term).or_insert(0) += count;
                }
            }
            cleaned.push(merged.into_iter().collect());
        }
        Ok(Self {
            rows: cleaned,
            n_terms,
        })
    }

    pub fn n_docs(&self) -> usize {
        self.rows.len()
    }

    pub fn n_terms(&self) -> usize {
        self.n_terms
    }

    /// The non-zero entries of document `d`.
    pub fn row(&self, d: usize) -> &[(usize, u32)] {
        &self.rows[d]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[(usize, u32)]> {
        self.rows.iter().map(Vec::as_slice)
    }

    /// Number of stored (non-zero) entries.
    pub fn nnz(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }

    /// Total count of each term across all documents.
    pub fn term_totals(&self) -> Vec<u64> {
        let mut totals = vec![0u64; self.n_terms];
        for row in &self.rows {
            for &(term, count) in row {
                totals[term] += count as u64;
            }
        }
        totals
    }
}

/// Builds a vocabulary and count matrix from text.
#[derive(Debug, Clone)]
pub struct CountVectorizer {
    /// Drop terms appearing in fewer than this many documents.
    pub min_df: usize,
    /// Keep only the N most frequent terms (ties broken alphabetically).
    pub max_features: Option<usize>,
}

impl Default for CountVectorizer {
    fn default() -> Self {
        Self {
            min_df: 1,
            max_features: None,
        }
    }
}

impl CountVectorizer {
    /// Split a document into vectorizer terms.
    pub fn analyze(text: &str) -> Vec<String> {
        text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
            .filter(|t| t.chars().count() >= 2)
            .map(str::to_lowercase)
            .collect()
    }

    /// Learn the vocabulary from `documents` and count terms in each.
    pub fn fit_transform(&self, documents: &[String]) -> Result<(CountMatrix, Vocabulary)> {
        let analyzed: Vec<Vec<String>> = documents.iter().map(|d| Self::analyze(d)).collect();

        let mut doc_freq: HashMap<&str, usize> = HashMap::new();
        let mut total_freq: HashMap<&str, u64> = HashMap::new();
        for doc in &analyzed {
            let mut seen: Vec<&str> = doc.iter().map(String::as_str).collect();
            for term in &seen {
                *total_freq.entry(*term).or_insert(0) += 1;
            }
            seen.sort_unstable();
            seen.dedup();
            for term in seen {
                *doc_freq.entry(term).or_insert(0) += 1;
            }
        }

        let mut kept: Vec<&str> = doc_freq
            .iter()
            .filter(|&(_, &df)| df >= self.min_df)
            .map(|(&t, _)| t)
            .collect();

        if let Some(max) = self.max_features {
            kept.sort_by(|a, b| total_freq[b].cmp(&total_freq[a]).then_with(|| a.cmp(b)));
            kept.truncate(max);
        }

        let vocabulary = Vocabulary::from_terms(kept);
        if vocabulary.is_empty() {
            anyhow::bail!(
                "Empty vocabulary: after preprocessing, the {} documents contain only stopwords \
                 or single-character tokens",
                documents.len()
            );
        }

        let rows = analyzed
            .iter()
            .map(|doc| {
                doc.iter()
                    .filter_map(|t| vocabulary.index_of(t))
                    .map(|i| (i, 1))
                    .collect()
            })
            .collect();
        let matrix = CountMatrix::from_rows(rows, vocabulary.len())?;

        info!(
            documents = matrix.n_docs(),
            terms = matrix.n_terms(),
            nnz = matrix.nnz(),
            "Built document-term matrix"
        );

        Ok((matrix, vocabulary))
    }
}
