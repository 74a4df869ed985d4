// LDA-backed theme extraction: the whole pipeline behind one call.
//
// sentences → preprocess → count matrix → LDA → keywords → themes

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{info, warn};

use super::lda::{LatentDirichlet, LdaParams};
use super::themes::{build_themes, ThemeReport};
use super::traits::TopicExtractor;
use crate::text::Preprocessor;
use crate::vectorize::CountVectorizer;

/// Discovers a fixed number of themes with latent Dirichlet allocation.
#[derive(Debug, Clone)]
pub struct LdaExtractor {
    pub preprocessor: Preprocessor,
    pub vectorizer: CountVectorizer,
    pub params: LdaParams,
    /// Keywords used to label each theme.
    pub keywords_per_theme: usize,
}

impl Default for LdaExtractor {
    fn default() -> Self {
        Self {
            preprocessor: Preprocessor::english(),
            vectorizer: CountVectorizer::default(),
            params: LdaParams::default(),
            keywords_per_theme: 5,
        }
    }
}

impl TopicExtractor for LdaExtractor {
    fn model_name(&self) -> &'static str {
        "lda"
    }

    /// One tick per LDA pass.
    fn progress_len(&self) -> u64 {
        self.params.max_iter as u64
    }

    fn extract_with_progress(
        &self,
        sentences: &[String],
        on_step: &mut dyn FnMut(usize),
    ) -> Result<ThemeReport> {
        if sentences.is_empty() {
            anyhow::bail!("No sentences to analyze, cannot discover themes");
        }
        if self.keywords_per_theme == 0 {
            anyhow::bail!("At least one keyword per theme is required");
        }

        let cleaned = self.preprocessor.preprocess_all(sentences);
        let (matrix, vocabulary) = self
            .vectorizer
            .fit_transform(&cleaned)
            .context("Failed to vectorize sentences")?;

        let empty_sentences = matrix.rows().filter(|r| r.is_empty()).count();
        if empty_sentences > 0 {
            warn!(
                empty = empty_sentences,
                total = sentences.len(),
                "Some sentences have no usable words after preprocessing"
            );
        }
        if self.params.n_topics > vocabulary.len() {
            warn!(
                topics = self.params.n_topics,
                vocabulary = vocabulary.len(),
                "More topics requested than distinct terms; themes will overlap"
            );
        }

        let lda = LatentDirichlet::new(self.params.clone())?;
        let model = lda.fit(&matrix, |i| on_step(i))?;
        let doc_topics = model.transform(&matrix)?;
        let themes = build_themes(
            &model,
            &vocabulary,
            &matrix,
            &doc_topics,
            self.keywords_per_theme,
        );

        for theme in &themes {
            info!(
                model = self.model_name(),
                theme = %theme.label,
                occurrences = theme.occurrences,
                "Discovered theme"
            );
        }

        Ok(ThemeReport {
            themes,
            sentence_count: sentences.len(),
            empty_sentences,
            vocabulary_size: vocabulary.len(),
            keywords_per_theme: self.keywords_per_theme,
            params: self.params.clone(),
            generated_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn survey() -> Vec<String> {
        [
            "The salary is too low and the annual raise was tiny",
            "Salary increases never keep up with inflation",
            "I want a better salary and a real raise",
            "Too many meetings waste the whole afternoon",
            "Meetings run long and meetings have no agenda",
            "Fewer meetings would give me time to focus",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    #[test]
    fn test_extract_basic() {
        let extractor = LdaExtractor {
            params: LdaParams {
                n_topics: 2,
                ..LdaParams::default()
            },
            keywords_per_theme: 3,
            ..LdaExtractor::default()
        };
        let report = extractor.extract(&survey()).unwrap();

        assert_eq!(report.themes.len(), 2);
        assert_eq!(report.sentence_count, 6);
        for (i, theme) in report.themes.iter().enumerate() {
            assert_eq!(theme.id, i + 1);
            assert_eq!(theme.keywords.len(), 3);
            assert!(theme.label.starts_with(&format!("Theme {}: ", i + 1)));
        }
        let docs: usize = report.themes.iter().map(|t| t.documents).sum();
        assert_eq!(docs, 6);
    }

    #[test]
    fn test_stopword_only_sentence_counted_as_empty() {
        let mut sentences = survey();
        sentences.push("the and of".to_string());
        let extractor = LdaExtractor {
            params: LdaParams {
                n_topics: 2,
                ..LdaParams::default()
            },
            ..LdaExtractor::default()
        };
        let report = extractor.extract(&sentences).unwrap();

        assert_eq!(report.sentence_count, 7);
        assert_eq!(report.empty_sentences, 1);
        let docs: usize = report.themes.iter().map(|t| t.documents).sum();
        assert_eq!(docs, report.sentence_count - 1);
    }

    #[test]
    fn test_progress_ticks_once_per_pass() {
        let extractor = LdaExtractor {
            params: LdaParams {
                n_topics: 2,
                max_iter: 4,
                ..LdaParams::default()
            },
            ..LdaExtractor::default()
        };
        let mut ticks = Vec::new();
        extractor
            .extract_with_progress(&survey(), &mut |i| ticks.push(i))
            .unwrap();
        assert_eq!(ticks, vec![1, 2, 3, 4]);
        assert_eq!(extractor.progress_len(), 4);
    }

    #[test]
    fn test_extract_empty_fails() {
        let extractor = LdaExtractor::default();
        assert!(extractor.extract(&[]).is_err());
    }

    #[test]
    fn test_extract_only_stopwords_fails() {
        let extractor = LdaExtractor::default();
        let sentences = vec!["the and of".to_string(), "is it a".to_string()];
        assert!(extractor.extract(&sentences).is_err());
    }

    #[test]
    fn test_zero_keywords_fails() {
        let extractor = LdaExtractor {
            keywords_per_theme: 0,
            ..LdaExtractor::default()
        };
        assert!(extractor.extract(&survey()).is_err());
    }
}
