// Sentence normalization.
//
// Each sentence is tokenized into words, lowercased, and filtered against an
// English stopword list (from the `stop-words` crate, the same source the
// TF-IDF keyword extraction used). Survivors are rejoined with single spaces
// so the vectorizer sees plain whitespace-separated text.
//
// URLs and email addresses are removed before tokenizing: in free-text survey
// answers they only ever produce junk tokens like "https" or "com".

use std::collections::HashSet;
use std::sync::OnceLock;

use regex_lite::Regex;
use stop_words::{get, LANGUAGE};
use tracing::debug;

fn noise_pattern() -> &'static Regex {
    static NOISE: OnceLock<Regex> = OnceLock::new();
    NOISE.get_or_init(|| {
        Regex::new(r"(?i)(https?://\S+|www\.\S+|[a-z0-9._%+-]+@[a-z0-9.-]+\.[a-z]{2,})")
            .expect("static noise pattern is valid")
    })
}

/// Characters that can make up a word: anything but whitespace and
/// punctuation. `_` counts as a word character.
const WORD_CHAR: &str =
    r"[^\s!-/:-@\[-\^`{-~\x{A0}-\x{BF}\x{D7}\x{F7}\x{2000}-\x{206F}\x{3000}-\x{303F}]";

fn token_pattern() -> &'static Regex {
    static TOKEN: OnceLock<Regex> = OnceLock::new();
    TOKEN.get_or_init(|| {
        Regex::new(&format!(r"{WORD_CHAR}+(?:['\x{{2019}}]{WORD_CHAR}+)*"))
            .expect("static token pattern is valid")
    })
}

/// Split text into word tokens.
///
/// A token is a run of letters, digits or `_`. An apostrophe between two
/// word characters stays inside the token (normalized to `'`), so "don't" is
/// one word; everything else is a separator. Case is preserved.
pub fn tokenize(text: &str) -> Vec<String> {
    token_pattern()
        .find_iter(text)
        .map(|m| m.as_str().replace('\u{2019}', "'"))
        .collect()
}

/// Lowercases sentences and removes stopwords.
#[derive(Debug, Clone)]
pub struct Preprocessor {
    stopwords: HashSet<String>,
}

impl Preprocessor {
    /// A preprocessor using the English stopword list.
    pub fn english() -> Self {
        let list: Vec<String> = get(LANGUAGE::English);
        let stopwords: HashSet<String> = list.into_iter().map(|w| w.to_lowercase()).collect();
        debug!(stopwords = stopwords.len(), "Loaded English stopwords");
        Self { stopwords }
    }

    /// Add user-supplied stopwords (e.g. the survey's own question words).
    pub fn with_extra_stopwords<I, S>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for word in extra {
            let word = word.as_ref().trim().to_lowercase();
            if !word.is_empty() {
                self.stopwords.insert(word);
            }
        }
        self
    }

    /// Whether `word` (compared lowercase) is a stopword.
    pub fn is_stopword(&self, word: &str) -> bool {
        self.stopwords.contains(&word.to_lowercase())
    }

    /// The active stopwords, sorted.
    pub fn stopwords(&self) -> Vec<&str> {
        let mut words: Vec<&str> = self.stopwords.iter().map(String::as_str).collect();
        words.sort_unstable();
        words
    }

    /// Normalize one sentence: tokenize, lowercase, drop stopwords.
    pub fn preprocess(&self, sentence: &str) -> String {
        let cleaned = noise_pattern().replace_all(sentence, " ");
        tokenize(&cleaned)
            .into_iter()
            .map(|t| t.to_lowercase())
            .filter(|t| !self.stopwords.contains(t))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Normalize every sentence, preserving order.
    pub fn preprocess_all(&self, sentences: &[String]) -> Vec<String> {
        sentences.iter().map(|s| self.preprocess(s)).collect()
    }
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::english()
    }
}
