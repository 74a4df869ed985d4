use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};

use crate::topics::lda::LdaParams;

/// Every environment variable the tool reads, with its documented default.
pub const ENV_VARS: &[(&str, &str, &str)] = &[
    ("THEMEGEN_TOPICS", "5", "Number of themes to discover"),
    ("THEMEGEN_KEYWORDS", "5", "Keywords used to label each theme"),
    ("THEMEGEN_SEED", "42", "Random seed for the topic model"),
    ("THEMEGEN_MAX_ITER", "10", "Passes over the corpus when fitting"),
    (
        "THEMEGEN_EXTRA_STOPWORDS",
        "",
        "Comma-separated words to ignore in addition to English stopwords",
    ),
    (
        "THEMEGEN_OUTPUT_DIR",
        "./output",
        "Where exported reports and charts are written",
    ),
];

/// Central configuration loaded from environment variables.
///
/// The .env file is loaded automatically at startup via dotenvy. Command-line
/// flags override anything set here.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub topics: usize,
    pub keywords: usize,
    pub seed: u64,
    pub max_iter: usize,
    pub extra_stopwords: Vec<String>,
    pub output_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        let params = LdaParams::default();
        Self {
            topics: params.n_topics,
            keywords: 5,
            seed: params.seed,
            max_iter: params.max_iter,
            extra_stopwords: Vec::new(),
            output_dir: PathBuf::from("./output"),
        }
    }
}

impl Config {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary variable lookup (tests use a map).
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let config = Self {
            topics: parse_var(&lookup, "THEMEGEN_TOPICS")?.unwrap_or(defaults.topics),
            keywords: parse_var(&lookup, "THEMEGEN_KEYWORDS")?.unwrap_or(defaults.keywords),
            seed: parse_var(&lookup, "THEMEGEN_SEED")?.unwrap_or(defaults.seed),
            max_iter: parse_var(&lookup, "THEMEGEN_MAX_ITER")?.unwrap_or(defaults.max_iter),
            extra_stopwords: lookup("THEMEGEN_EXTRA_STOPWORDS")
                .map(|v| split_list(&v))
                .unwrap_or_default(),
            output_dir: lookup("THEMEGEN_OUTPUT_DIR")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
        };
        Ok(config)
    }

    /// Reject values no analysis can run with.
    pub fn validate(&self) -> Result<()> {
        if self.topics == 0 {
            anyhow::bail!("The number of topics must be at least 1 (THEMEGEN_TOPICS / --topics)");
        }
        if self.keywords == 0 {
            anyhow::bail!(
                "The number of keywords per theme must be at least 1 (THEMEGEN_KEYWORDS / --keywords)"
            );
        }
        if self.max_iter == 0 {
            anyhow::bail!("At least one iteration is required (THEMEGEN_MAX_ITER / --max-iter)");
        }
        Ok(())
    }

    /// LDA parameters implied by this configuration.
    pub fn lda_params(&self) -> LdaParams {
        LdaParams {
            n_topics: self.topics,
            max_iter: self.max_iter,
            seed: self.seed,
            ..LdaParams::default()
        }
    }

    /// Contents of a `.env.example` documenting every variable.
    pub fn env_template() -> String {
        let mut out = String::from("# themegen configuration. Copy to .env and adjust.\n");
        for (key, default, help) in ENV_VARS {
            out.push_str(&format!("\n# {help}\n{key}={default}\n"));
        }
        out
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .with_context(|| format!("{key} has an invalid value: {raw:?}")),
        _ => Ok(None),
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}
