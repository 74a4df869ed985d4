// Sentence reader for CSV and plain-text inputs.
//
// The format is picked from the file extension: `.csv` goes through a real
// CSV parser (quoted fields may contain commas and newlines), anything else
// is treated as one sentence per line. Both paths strip a UTF-8 BOM, trim
// whitespace, and drop blank entries.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use tracing::{debug, info};

/// How the sentence file is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Comma-separated values; sentences come from one column.
    Csv,
    /// One sentence per line.
    PlainText,
}

impl SourceFormat {
    /// Pick the format from a path's extension (`.csv`, any case, is CSV).
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => Self::Csv,
            _ => Self::PlainText,
        }
    }
}

/// Which CSV column holds the sentences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnSelector {
    /// Zero-based column position.
    Index(usize),
    /// Header name; requires a header row.
    Name(String),
}

impl Default for ColumnSelector {
    fn default() -> Self {
        Self::Index(0)
    }
}

impl FromStr for ColumnSelector {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            anyhow::bail!("Column selector must not be empty");
        }
        if s.chars().all(|c| c.is_ascii_digit()) {
            let idx = s
                .parse::<usize>()
                .with_context(|| format!("Column index out of range: {s}"))?;
            Ok(Self::Index(idx))
        } else {
            Ok(Self::Name(s.to_string()))
        }
    }
}

impl fmt::Display for ColumnSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(i) => write!(f, "#{i}"),
            Self::Name(n) => write!(f, "\"{n}\""),
        }
    }
}

/// Options controlling how sentences are pulled out of a file.
#[derive(Debug, Clone, Default)]
pub struct ReadOptions {
    pub column: ColumnSelector,
    /// Treat the first CSV row as a header instead of data.
    pub has_header: bool,
}

/// Read every non-blank sentence from `path`.
pub fn read_sentences(path: &Path, options: &ReadOptions) -> Result<Vec<String>> {
    let format = SourceFormat::from_path(path);
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read sentence file {}", path.display()))?;

    let sentences = read_sentences_from_str(&raw, format, options)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    if sentences.is_empty() {
        anyhow::bail!(
            "No sentences found in {}: the file is empty or the selected column is blank",
            path.display()
        );
    }

    info!(
        path = %path.display(),
        format = ?format,
        sentences = sentences.len(),
        "Loaded sentences"
    );
    Ok(sentences)
}

/// Parse sentences from in-memory text in the given format.
pub fn read_sentences_from_str(
    text: &str,
    format: SourceFormat,
    options: &ReadOptions,
) -> Result<Vec<String>> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    match format {
        SourceFormat::PlainText => Ok(text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect()),
        SourceFormat::Csv => read_csv(text, options),
    }
}

fn read_csv(text: &str, options: &ReadOptions) -> Result<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(options.has_header)
        .flexible(true)
        .from_reader(text.as_bytes());

    let column = match &options.column {
        ColumnSelector::Index(i) => *i,
        ColumnSelector::Name(name) => {
            if !options.has_header {
                anyhow::bail!(
                    "Column {} selected by name, but the file is read without a header row \
                     (pass --header)",
                    options.column
                );
            }
            let headers = reader.headers().context("Failed to read CSV header row")?;
            headers
                .iter()
                .position(|h| h.trim() == name)
                .with_context(|| {
                    let available: Vec<&str> = headers.iter().collect();
                    format!(
                        "Column \"{name}\" not found in CSV header (available: {})",
                        available.join(", ")
                    )
                })?
        }
    };

    let mut sentences = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("Malformed CSV at record {}", row + 1))?;
        match record.get(column) {
            Some(field) => {
                let field = field.trim();
                if !field.is_empty() {
                    sentences.push(field.to_string());
                }
            }
            None => debug!(row = row + 1, column, "Row has no such column, skipping"),
        }
    }
    Ok(sentences)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(SourceFormat::from_path(Path::new("a.csv")), SourceFormat::Csv);
        assert_eq!(SourceFormat::from_path(Path::new("a.CSV")), SourceFormat::Csv);
        assert_eq!(SourceFormat::from_path(Path::new("a.txt")), SourceFormat::PlainText);
        assert_eq!(SourceFormat::from_path(Path::new("noext")), SourceFormat::PlainText);
    }

    #[test]
    fn test_column_selector_parse() {
        assert_eq!("0".parse::<ColumnSelector>().unwrap(), ColumnSelector::Index(0));
        assert_eq!("12".parse::<ColumnSelector>().unwrap(), ColumnSelector::Index(12));
        assert_eq!(
            "challenges".parse::<ColumnSelector>().unwrap(),
            ColumnSelector::Name("challenges".to_string())
        );
        assert!("  ".parse::<ColumnSelector>().is_err());
    }

    #[test]
    fn test_plain_text_drops_blank_lines_and_bom() {
        let text = "\u{feff}First line\n\n   \nSecond line  \r\n";
        let s = read_sentences_from_str(text, SourceFormat::PlainText, &ReadOptions::default())
            .unwrap();
        assert_eq!(s, vec!["First line", "Second line"]);
    }

    #[test]
    fn test_csv_first_column_without_header() {
        let text = "\"Hello, world\",x\nSecond,y\n";
        let s = read_sentences_from_str(text, SourceFormat::Csv, &ReadOptions::default()).unwrap();
        assert_eq!(s, vec!["Hello, world", "Second"]);
    }

    #[test]
    fn test_csv_named_column() {
        let text = "id,challenges\n1,Too many meetings\n2,\n3,Slow laptops\n";
        let opts = ReadOptions {
            column: ColumnSelector::Name("challenges".to_string()),
            has_header: true,
        };
        let s = read_sentences_from_str(text, SourceFormat::Csv, &opts).unwrap();
        assert_eq!(s, vec!["Too many meetings", "Slow laptops"]);
    }

    #[test]
    fn test_csv_unknown_column_name_fails() {
        let opts = ReadOptions {
            column: ColumnSelector::Name("missing".to_string()),
            has_header: true,
        };
        let err = read_sentences_from_str("a,b\n1,2\n", SourceFormat::Csv, &opts).unwrap_err();
        assert!(err.to_string().contains("missing"));
    }

    #[test]
    fn test_csv_name_without_header_fails() {
        let opts = ReadOptions {
            column: ColumnSelector::Name("a".to_string()),
            has_header: false,
        };
        assert!(read_sentences_from_str("a\n1\n", SourceFormat::Csv, &opts).is_err());
    }

    #[test]
    fn test_csv_short_rows_skipped() {
        let opts = ReadOptions {
            column: ColumnSelector::Index(1),
            has_header: false,
        };
        let s = read_sentences_from_str("a,kept\nonly\nb,also kept\n", SourceFormat::Csv, &opts)
            .unwrap();
        assert_eq!(s, vec!["kept", "also kept"]);
    }
}
