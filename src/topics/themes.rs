// Themes: the human-readable result of a topic model.
//
// A theme is one LDA topic named after its top keywords ("Theme 2: meetings
// schedule time"). Each theme also carries the two numbers the charts plot:
// how often its keywords occur across the corpus, and how many sentences
// lean toward it more than any other theme.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::lda::{LdaModel, LdaParams};
use crate::vectorize::{CountMatrix, Vocabulary};

/// One discovered theme.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Theme {
    /// 1-based theme number.
    pub id: usize,
    /// Display name, e.g. "Theme 1: pay raise salary".
    pub label: String,
    /// Top keywords, heaviest first.
    pub keywords: Vec<String>,
    /// Each keyword's probability within the theme, parallel to `keywords`.
    pub keyword_weights: Vec<f64>,
    /// Total corpus occurrences of this theme's keywords.
    pub occurrences: u64,
    /// Sentences whose dominant theme is this one.
    pub documents: usize,
}

/// Everything one analysis run produced.
#[derive(Debug, Clone, Serialize)]
pub struct ThemeReport {
    pub themes: Vec<Theme>,
    /// Sentences read from the input.
    pub sentence_count: usize,
    /// Sentences left with no vocabulary terms after preprocessing.
    pub empty_sentences: usize,
    pub vocabulary_size: usize,
    pub keywords_per_theme: usize,
    pub params: LdaParams,
    pub generated_at: DateTime<Utc>,
}

impl ThemeReport {
    /// Sum of every theme's keyword occurrences.
    pub fn total_occurrences(&self) -> u64 {
        self.themes.iter().map(|t| t.occurrences).sum()
    }

    /// Each theme's share of the total occurrences (all zero if there are none).
    pub fn occurrence_shares(&self) -> Vec<f64> {
        let total = self.total_occurrences();
        self.themes
            .iter()
            .map(|t| {
                if total == 0 {
                    0.0
                } else {
                    t.occurrences as f64 / total as f64
                }
            })
            .collect()
    }
}

/// The `n_words` heaviest vocabulary terms of each topic.
pub fn extract_topic_keywords(
    model: &LdaModel,
    vocabulary: &Vocabulary,
    n_words: usize,
) -> Vec<Vec<String>> {
    (0..model.n_topics())
        .map(|topic| {
            model
                .top_terms(topic, n_words)
                .into_iter()
                .filter_map(|(idx, _)| vocabulary.term(idx).map(str::to_string))
                .collect()
        })
        .collect()
}

/// "Theme {n}: kw1 kw2 ..." for each keyword list, numbered from 1.
pub fn generate_theme_names(topic_keywords: &[Vec<String>]) -> Vec<String> {
    topic_keywords
        .iter()
        .enumerate()
        .map(|(idx, keywords)| format!("Theme {}: {}", idx + 1, keywords.join(" ")))
        .collect()
}

/// Turn a fitted model into themes with their chart counts.
///
/// `doc_topics` are per-document topic distributions for `matrix`; rows of
/// empty documents are ignored when counting dominant themes.
pub fn build_themes(
    model: &LdaModel,
    vocabulary: &Vocabulary,
    matrix: &CountMatrix,
    doc_topics: &[Vec<f64>],
    n_words: usize,
) -> Vec<Theme> {
    let totals = matrix.term_totals();

    let mut dominant = vec![0usize; model.n_topics()];
    for (d, dist) in doc_topics.iter().enumerate() {
        if matrix.row(d).is_empty() {
            continue;
        }
        if let Some(topic) = argmax(dist) {
            dominant[topic] += 1;
        }
    }

    let keywords = extract_topic_keywords(model, vocabulary, n_words);
    let names = generate_theme_names(&keywords);

    (0..model.n_topics())
        .zip(keywords)
        .zip(names)
        .map(|((topic, keywords), label)| {
            let top = model.top_terms(topic, n_words);
            let distribution = model.topic_word_distribution(topic);
            Theme {
                id: topic + 1,
                label,
                keywords,
                keyword_weights: top.iter().map(|&(i, _)| distribution[i]).collect(),
                occurrences: top.iter().map(|&(i, _)| totals[i]).sum(),
                documents: dominant[topic],
            }
        })
        .collect()
}

/// Index of the largest value; the first one wins ties.
fn argmax(values: &[f64]) -> Option<usize> {
    values
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f64)>, (i, &v)| match best {
            Some((_, b)) if b >= v => best,
            _ => Some((i, v)),
        })
        .map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_theme_names() {
        let kws = vec![
            vec!["pay".to_string(), "raise".to_string()],
            vec!["meetings".to_string()],
        ];
        assert_eq!(
            generate_theme_names(&kws),
            vec!["Theme 1: pay raise", "Theme 2: meetings"]
        );
    }

    #[test]
    fn test_generate_theme_names_empty_keywords() {
        assert_eq!(generate_theme_names(&[vec![]]), vec!["Theme 1: "]);
    }

    #[test]
    fn test_argmax_first_wins_ties() {
        assert_eq!(argmax(&[0.2, 0.5, 0.5]), Some(1));
        assert_eq!(argmax(&[]), None);
    }
}
