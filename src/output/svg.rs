// SVG chart export.
//
// Writes `pie.svg` (theme distribution) and `bar.svg` (theme frequency) so the
// charts can be dropped into a slide deck or survey write-up. The markup is
// generated directly; both charts are a handful of shapes and text nodes.

use std::f64::consts::PI;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use super::truncate_chars;
use crate::topics::themes::ThemeReport;

const FILLS: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

/// Pie slices start here (degrees, counter-clockwise from 3 o'clock).
const START_ANGLE_DEG: f64 = 140.0;

fn fill(idx: usize) -> &'static str {
    FILLS[idx % FILLS.len()]
}

/// Escape text for use inside SVG elements and attributes.
pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render the theme distribution pie chart.
pub fn render_pie(report: &ThemeReport) -> String {
    let (width, height) = (800.0, 800.0);
    let (cx, cy, r) = (400.0, 420.0, 250.0);

    let mut svg = header(width, height, "Theme Distribution");
    let shares = report.occurrence_shares();

    if report.total_occurrences() == 0 {
        let _ = writeln!(
            svg,
            r#"  <text x="{cx}" y="{cy}" text-anchor="middle">No keyword occurrences</text>"#
        );
        svg.push_str("</svg>\n");
        return svg;
    }

    let point = |angle: f64, radius: f64| (cx + radius * angle.cos(), cy - radius * angle.sin());

    let mut angle = START_ANGLE_DEG.to_radians();
    for (i, (theme, &share)) in report.themes.iter().zip(&shares).enumerate() {
        if share <= 0.0 {
            continue;
        }
        let sweep = share * 2.0 * PI;
        let end = angle + sweep;

        if share >= 1.0 - 1e-9 {
            let _ = writeln!(
                svg,
                r#"  <circle cx="{cx}" cy="{cy}" r="{r}" fill="{}" stroke="white"/>"#,
                fill(i)
            );
        } else {
            let (x1, y1) = point(angle, r);
            let (x2, y2) = point(end, r);
            let large_arc = u8::from(sweep > PI);
            let _ = writeln!(
                svg,
                r#"  <path d="M {cx:.2} {cy:.2} L {x1:.2} {y1:.2} A {r} {r} 0 {large_arc} 0 {x2:.2} {y2:.2} Z" fill="{}" stroke="white"/>"#,
                fill(i)
            );
        }

        let mid = angle + sweep / 2.0;
        let (px, py) = point(mid, r * 0.6);
        let _ = writeln!(
            svg,
            r#"  <text x="{px:.2}" y="{py:.2}" text-anchor="middle" font-size="14">{:.1}%</text>"#,
            share * 100.0
        );
        let (lx, ly) = point(mid, r * 1.12);
        let anchor = if mid.cos() >= 0.0 { "start" } else { "end" };
        let _ = writeln!(
            svg,
            r#"  <text x="{lx:.2}" y="{ly:.2}" text-anchor="{anchor}" font-size="13">{}</text>"#,
            escape_xml(&truncate_chars(&theme.label, 40))
        );

        angle = end;
    }

    svg.push_str("</svg>\n");
    svg
}

/// Render the theme frequency bar chart.
pub fn render_bar(report: &ThemeReport) -> String {
    let n = report.themes.len().max(1) as f64;
    let (left, right, top, bottom) = (80.0, 40.0, 70.0, 220.0);
    let slot = 90.0;
    let width = left + right + slot * n;
    let height = 600.0;
    let plot_h = height - top - bottom;
    let base_y = top + plot_h;

    let mut svg = header(width, height, "Theme Frequency");
    let max = report.themes.iter().map(|t| t.occurrences).max().unwrap_or(0);
    if max == 0 {
        let _ = writeln!(
            svg,
            r#"  <text x="{:.2}" y="{:.2}" text-anchor="middle">No keyword occurrences</text>"#,
            width / 2.0,
            height / 2.0
        );
        svg.push_str("</svg>\n");
        return svg;
    }

    // Axes
    let _ = writeln!(
        svg,
        r#"  <line x1="{left}" y1="{top}" x2="{left}" y2="{base_y}" stroke="black"/>"#
    );
    let _ = writeln!(
        svg,
        r#"  <line x1="{left}" y1="{base_y}" x2="{}" y2="{base_y}" stroke="black"/>"#,
        width - right
    );
    let _ = writeln!(
        svg,
        r#"  <text x="20" y="{:.2}" transform="rotate(-90 20 {:.2})" text-anchor="middle" font-size="14">Frequency</text>"#,
        top + plot_h / 2.0,
        top + plot_h / 2.0
    );
    let _ = writeln!(
        svg,
        r#"  <text x="{:.2}" y="{}" text-anchor="middle" font-size="14">Themes</text>"#,
        left + slot * n / 2.0,
        height - 15.0
    );
    let _ = writeln!(
        svg,
        r#"  <text x="{}" y="{:.2}" text-anchor="end" font-size="12">{max}</text>"#,
        left - 6.0,
        top + 4.0
    );
    let _ = writeln!(
        svg,
        r#"  <text x="{}" y="{:.2}" text-anchor="end" font-size="12">0</text>"#,
        left - 6.0,
        base_y + 4.0
    );

    for (i, theme) in report.themes.iter().enumerate() {
        let h = theme.occurrences as f64 / max as f64 * plot_h;
        let x = left + slot * i as f64 + slot * 0.15;
        let bar_w = slot * 0.7;
        let y = base_y - h;
        let _ = writeln!(
            svg,
            r#"  <rect x="{x:.2}" y="{y:.2}" width="{bar_w:.2}" height="{h:.2}" fill="{}"/>"#,
            fill(i)
        );
        let _ = writeln!(
            svg,
            r#"  <text x="{:.2}" y="{:.2}" text-anchor="middle" font-size="12">{}</text>"#,
            x + bar_w / 2.0,
            y - 5.0,
            theme.occurrences
        );
        // Tick labels rotated 45° like the classic matplotlib xticks.
        let tx = x + bar_w / 2.0;
        let ty = base_y + 14.0;
        let _ = writeln!(
            svg,
            r#"  <text x="{tx:.2}" y="{ty:.2}" transform="rotate(45 {tx:.2} {ty:.2})" font-size="12">{}</text>"#,
            escape_xml(&truncate_chars(&theme.label, 30))
        );
    }

    svg.push_str("</svg>\n");
    svg
}

fn header(width: f64, height: f64, title: &str) -> String {
    let mut svg = String::new();
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}" font-family="sans-serif">"#
    );
    let _ = writeln!(
        svg,
        r#"  <rect width="100%" height="100%" fill="white"/>"#
    );
    let _ = writeln!(
        svg,
        r#"  <text x="{:.2}" y="36" text-anchor="middle" font-size="20" font-weight="bold">{}</text>"#,
        width / 2.0,
        escape_xml(title)
    );
    svg
}

/// Write `pie.svg` and `bar.svg` into `dir`, returning their paths.
pub fn write_charts(report: &ThemeReport, dir: &Path) -> Result<(PathBuf, PathBuf)> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create chart directory {}", dir.display()))?;

    let pie_path = dir.join("pie.svg");
    std::fs::write(&pie_path, render_pie(report))
        .with_context(|| format!("Failed to write {}", pie_path.display()))?;

    let bar_path = dir.join("bar.svg");
    std::fs::write(&bar_path, render_bar(report))
        .with_context(|| format!("Failed to write {}", bar_path.display()))?;

    info!(dir = %dir.display(), "Wrote SVG charts");
    Ok((pie_path, bar_path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("a<b & \"c\""), "a&lt;b &amp; &quot;c&quot;");
    }
}
