// Output formatting: terminal charts and exported reports.

pub mod markdown;
pub mod svg;
pub mod terminal;

use std::path::Path;

use anyhow::{Context, Result};

use crate::topics::themes::ThemeReport;

/// Truncate a string to at most `max_chars` characters, appending "..." if truncated.
///
/// Unlike byte slicing (`&text[..120]`), this respects UTF-8 character boundaries
/// and will never panic on multi-byte characters like emoji or accented letters.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    let char_count = text.chars().count();
    if char_count <= max_chars {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max_chars).collect();
        format!("{truncated}...")
    }
}

/// Split `width` cells between shares so the parts sum to exactly `width`
/// (largest-remainder rounding). All-zero shares get no cells.
pub fn allocate_cells(shares: &[f64], width: usize) -> Vec<usize> {
    let total: f64 = shares.iter().sum();
    if total <= 0.0 {
        return vec![0; shares.len()];
    }

    let exact: Vec<f64> = shares.iter().map(|s| s / total * width as f64).collect();
    let mut cells: Vec<usize> = exact.iter().map(|e| e.floor() as usize).collect();
    let mut remaining = width.saturating_sub(cells.iter().sum());

    let mut by_remainder: Vec<usize> = (0..shares.len()).collect();
    by_remainder.sort_by(|&a, &b| {
        let ra = exact[a] - exact[a].floor();
        let rb = exact[b] - exact[b].floor();
        rb.total_cmp(&ra).then_with(|| a.cmp(&b))
    });
    for idx in by_remainder {
        if remaining == 0 {
            break;
        }
        cells[idx] += 1;
        remaining -= 1;
    }
    cells
}

/// Write the report as pretty-printed JSON to `path`.
pub fn write_json(report: &ThemeReport, path: &Path) -> Result<()> {
    ensure_parent(path)?;
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write JSON report to {}", path.display()))?;
    Ok(())
}

pub(crate) fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
    }
    Ok(())
}
