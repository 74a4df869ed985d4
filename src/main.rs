use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use themegen::config::Config;
use themegen::corpus::{read_sentences, ColumnSelector, ReadOptions};
use themegen::output;
use themegen::text::Preprocessor;
use themegen::topics::extractor::LdaExtractor;
use themegen::topics::traits::TopicExtractor;

/// themegen: discover the themes hiding in a pile of short answers.
///
/// Reads sentences from a CSV or text file, fits a topic model, and labels
/// each theme with its most representative keywords.
#[derive(Parser)]
#[command(name = "themegen", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Discover themes in a file of sentences
    Analyze {
        /// Sentence file (.csv, or plain text with one sentence per line)
        file: PathBuf,

        /// Number of themes to generate (default: THEMEGEN_TOPICS or 5)
        #[arg(long, short = 't')]
        topics: Option<usize>,

        /// Keywords per theme (default: THEMEGEN_KEYWORDS or 5)
        #[arg(long, short = 'k')]
        keywords: Option<usize>,

        /// CSV column holding the sentences: an index or a header name
        #[arg(long, default_value = "0")]
        column: ColumnSelector,

        /// Treat the first CSV row as a header
        #[arg(long)]
        header: bool,

        /// Random seed for the topic model (default: THEMEGEN_SEED or 42)
        #[arg(long)]
        seed: Option<u64>,

        /// Passes over the corpus (default: THEMEGEN_MAX_ITER or 10)
        #[arg(long)]
        max_iter: Option<usize>,

        /// Extra word to ignore (repeatable)
        #[arg(long = "stopword", value_name = "WORD")]
        stopwords: Vec<String>,

        /// Output format
        #[arg(long, value_enum, default_value = "terminal")]
        format: Format,

        /// Where to write json/markdown output (json defaults to stdout)
        #[arg(long)]
        out: Option<PathBuf>,

        /// Also write pie.svg and bar.svg into this directory
        #[arg(long)]
        svg_dir: Option<PathBuf>,
    },

    /// Print the active stopword list
    Stopwords {
        /// Show at most this many words
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Write a .env.example documenting every setting
    Init {
        /// Destination file
        #[arg(long, default_value = ".env.example")]
        path: PathBuf,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Terminal,
    Json,
    Markdown,
}

fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("themegen=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            file,
            topics,
            keywords,
            column,
            header,
            seed,
            max_iter,
            stopwords,
            format,
            out,
            svg_dir,
        } => {
            let mut config = Config::load()?;
            if let Some(topics) = topics {
                config.topics = topics;
            }
            if let Some(keywords) = keywords {
                config.keywords = keywords;
            }
            if let Some(seed) = seed {
                config.seed = seed;
            }
            if let Some(max_iter) = max_iter {
                config.max_iter = max_iter;
            }
            config.extra_stopwords.extend(stopwords);
            config.validate()?;

            let options = ReadOptions {
                column,
                has_header: header,
            };
            let sentences = read_sentences(&file, &options)?;

            let extractor = LdaExtractor {
                preprocessor: Preprocessor::english()
                    .with_extra_stopwords(&config.extra_stopwords),
                params: config.lda_params(),
                keywords_per_theme: config.keywords,
                ..LdaExtractor::default()
            };

            info!(
                model = extractor.model_name(),
                sentences = sentences.len(),
                topics = config.topics,
                "Discovering themes"
            );

            let pb = ProgressBar::new(extractor.progress_len());
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("  Fitting topics [{bar:30}] {pos}/{len} ({eta})")?,
            );
            let report = extractor.extract_with_progress(&sentences, &mut |_| pb.inc(1));
            pb.finish_and_clear();
            let report = report?;

            let charts = svg_dir
                .as_ref()
                .map(|dir| output::svg::write_charts(&report, dir))
                .transpose()?;

            match format {
                Format::Terminal => output::terminal::display_report(&report),
                Format::Json => match &out {
                    Some(path) => {
                        output::write_json(&report, path)?;
                        println!("{}", format!("JSON report saved to: {}", path.display()).bold());
                    }
                    None => println!("{}", serde_json::to_string_pretty(&report)?),
                },
                Format::Markdown => {
                    let path = out.unwrap_or_else(|| config.output_dir.join("themes-report.md"));
                    let link = svg_dir
                        .as_ref()
                        .map(|dir| output::markdown::chart_link(&path, dir))
                        .transpose()?;
                    output::markdown::generate_report(&report, link.as_deref(), &path)?;
                    println!(
                        "{}",
                        format!("Markdown report saved to: {}", path.display()).bold()
                    );
                }
            }

            if let Some((pie, bar)) = charts {
                eprintln!("Charts written: {} and {}", pie.display(), bar.display());
            }
        }

        Commands::Stopwords { limit } => {
            let config = Config::load()?;
            let preprocessor =
                Preprocessor::english().with_extra_stopwords(&config.extra_stopwords);
            let words = preprocessor.stopwords();
            let shown = limit.unwrap_or(words.len()).min(words.len());
            for word in &words[..shown] {
                println!("{word}");
            }
            if shown < words.len() {
                println!("{}", format!("... {} more", words.len() - shown).dimmed());
            }
        }

        Commands::Init { path } => {
            if path.exists() {
                anyhow::bail!(
                    "{} already exists; remove it first to regenerate",
                    path.display()
                );
            }
            std::fs::write(&path, Config::env_template())
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Configuration template written to: {}", path.display());
            println!("\nCopy it to .env and adjust, then run: themegen analyze <FILE>");
        }
    }

    Ok(())
}
