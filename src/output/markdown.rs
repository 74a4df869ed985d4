// Markdown report generation.
//
// Produces a self-contained document with the theme table, keyword lists,
// and (when charts were exported alongside) image links to the SVGs.

use std::fmt::Write as _;
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};

use super::ensure_parent;
use crate::topics::themes::ThemeReport;

/// Render the report as Markdown. `chart_dir` is linked relative to the
/// report when given.
pub fn render_report(report: &ThemeReport, chart_dir: Option<&str>) -> String {
    let mut md = String::new();
    let shares = report.occurrence_shares();

    let _ = writeln!(md, "# Theme Report\n");
    let _ = writeln!(
        md,
        "Generated {} from {} sentences ({} distinct words, {} topics, seed {}).\n",
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
        report.sentence_count,
        report.vocabulary_size,
        report.params.n_topics,
        report.params.seed,
    );
    if report.empty_sentences > 0 {
        let _ = writeln!(
            md,
            "> {} sentences had no usable words after removing stopwords.\n",
            report.empty_sentences
        );
    }

    let _ = writeln!(md, "## Themes\n");
    let _ = writeln!(md, "| Theme | Keywords | Frequency | Share | Sentences |");
    let _ = writeln!(md, "|---|---|---:|---:|---:|");
    for (theme, share) in report.themes.iter().zip(&shares) {
        let _ = writeln!(
            md,
            "| {} | {} | {} | {:.1}% | {} |",
            theme.id,
            escape_cell(&theme.keywords.join(", ")),
            theme.occurrences,
            share * 100.0,
            theme.documents
        );
    }
    md.push('\n');

    for theme in &report.themes {
        let _ = writeln!(md, "### {}\n", escape_cell(&theme.label));
        for (keyword, weight) in theme.keywords.iter().zip(&theme.keyword_weights) {
            let _ = writeln!(md, "- {} ({:.3})", keyword, weight);
        }
        md.push('\n');
    }

    if let Some(dir) = chart_dir {
        let dir = dir.trim_end_matches('/');
        let _ = writeln!(md, "## Charts\n");
        let _ = writeln!(md, "![Theme Distribution]({dir}/pie.svg)\n");
        let _ = writeln!(md, "![Theme Frequency]({dir}/bar.svg)");
    }

    md
}

/// Write the Markdown report to `path`.
pub fn generate_report(report: &ThemeReport, chart_dir: Option<&str>, path: &Path) -> Result<()> {
    ensure_parent(path)?;
    std::fs::write(path, render_report(report, chart_dir))
        .with_context(|| format!("Failed to write Markdown report to {}", path.display()))?;
    Ok(())
}

/// How a report at `report_path` should link to charts in `chart_dir`.
///
/// Relative when the chart directory sits under the report's directory,
/// otherwise absolute.
pub fn chart_link(report_path: &Path, chart_dir: &Path) -> Result<String> {
    let base = without_cur_dir(report_path.parent().unwrap_or(Path::new("")));
    let charts = without_cur_dir(chart_dir);

    if let Ok(rel) = charts.strip_prefix(&base) {
        if rel.as_os_str().is_empty() {
            return Ok(".".to_string());
        }
        return Ok(rel.display().to_string());
    }
    if charts.is_absolute() {
        return Ok(charts.display().to_string());
    }
    let cwd = std::env::current_dir().context("Failed to resolve the current directory")?;
    Ok(cwd.join(charts).display().to_string())
}

fn without_cur_dir(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

/// Keep pipes from breaking table cells.
fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}
