// Colored terminal output for themes and their charts.
//
// Two charts, matching the questions people ask of a survey: what share of
// the keyword mentions does each theme hold (the "pie", drawn as a stacked
// strip with a legend), and how do the themes compare in absolute terms
// (the bar chart).

use std::fmt::Write as _;

use colored::{Color, Colorize};

use super::{allocate_cells, truncate_chars};
use crate::topics::themes::ThemeReport;

/// Width of the stacked distribution strip.
const STRIP_WIDTH: usize = 60;
/// Width of the longest bar in the frequency chart.
const BAR_WIDTH: usize = 40;
/// Label column width in the bar chart.
const LABEL_WIDTH: usize = 36;

const NO_OCCURRENCES: &str = "No keyword occurrences to chart.";

const PALETTE: [Color; 8] = [
    Color::BrightBlue,
    Color::BrightGreen,
    Color::BrightYellow,
    Color::BrightMagenta,
    Color::BrightCyan,
    Color::BrightRed,
    Color::Blue,
    Color::Green,
];

/// Palette color for the theme at `idx`.
pub fn theme_color(idx: usize) -> Color {
    PALETTE[idx % PALETTE.len()]
}

/// Print everything: the theme list followed by both charts.
pub fn display_report(report: &ThemeReport) {
    display_themes(report);
    display_distribution(report);
    display_frequency(report);
}

/// Print each theme's label and keywords.
pub fn display_themes(report: &ThemeReport) {
    println!(
        "\n{}",
        format!(
            "=== Themes ({} sentences, {} distinct words) ===",
            report.sentence_count, report.vocabulary_size
        )
        .bold()
    );

    for (i, theme) in report.themes.iter().enumerate() {
        println!("\n  {}", theme.label.color(theme_color(i)).bold());
        for (keyword, weight) in theme.keywords.iter().zip(&theme.keyword_weights) {
            println!("    - {:<24} {}", keyword, format!("{weight:.3}").dimmed());
        }
    }

    if report.empty_sentences > 0 {
        println!(
            "\n  {} {} sentences had no usable words after removing stopwords",
            "~".yellow(),
            report.empty_sentences
        );
    }
}

/// "Theme Distribution": each theme's share of keyword occurrences.
pub fn display_distribution(report: &ThemeReport) {
    print!("{}", render_distribution(report));
}

/// "Theme Frequency": keyword occurrences per theme as horizontal bars.
pub fn display_frequency(report: &ThemeReport) {
    print!("{}", render_frequency(report));
}

/// The distribution chart as printable text.
pub fn render_distribution(report: &ThemeReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n{}\n", "=== Theme Distribution ===".bold());

    if report.total_occurrences() == 0 {
        let _ = writeln!(out, "  {NO_OCCURRENCES}");
        return out;
    }

    let shares = report.occurrence_shares();
    let cells = allocate_cells(&shares, STRIP_WIDTH);

    let strip: String = cells
        .iter()
        .enumerate()
        .map(|(i, &n)| "█".repeat(n).color(theme_color(i)).to_string())
        .collect();
    let _ = writeln!(out, "  {strip}\n");

    for (i, (theme, share)) in report.themes.iter().zip(&shares).enumerate() {
        let _ = writeln!(
            out,
            "  {} {:>5.1}%  {}",
            "■".color(theme_color(i)),
            share * 100.0,
            truncate_chars(&theme.label, 60)
        );
    }
    out
}

/// The frequency chart as printable text.
pub fn render_frequency(report: &ThemeReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n{}\n", "=== Theme Frequency ===".bold());

    let max = report.themes.iter().map(|t| t.occurrences).max().unwrap_or(0);
    if max == 0 {
        let _ = writeln!(out, "  {NO_OCCURRENCES}");
        return out;
    }

    for (i, theme) in report.themes.iter().enumerate() {
        let filled = bar_length(theme.occurrences, max, BAR_WIDTH);
        let bar = "█".repeat(filled).color(theme_color(i));
        let _ = writeln!(
            out,
            "  {:<width$} {}{} {}",
            truncate_chars(&theme.label, LABEL_WIDTH - 3),
            bar,
            " ".repeat(BAR_WIDTH - filled),
            theme.occurrences,
            width = LABEL_WIDTH
        );
    }

    let _ = writeln!(
        out,
        "\n  {}",
        "Frequency = occurrences of each theme's keywords across all sentences".dimmed()
    );
    out
}

/// Bar length for `value` when `max` fills `width`; non-zero values get at least one cell.
pub fn bar_length(value: u64, max: u64, width: usize) -> usize {
    if max == 0 || value == 0 {
        return 0;
    }
    let len = (value as f64 / max as f64 * width as f64).round() as usize;
    len.clamp(1, width)
}
