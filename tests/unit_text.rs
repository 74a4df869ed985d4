// Unit tests for sentence loading and normalization.
//
// Tests the corpus reader against real files on disk (CSV and plain text)
// and the preprocessor's invariants: lowercase output, no surviving
// stopwords, order preservation.

use std::io::Write;

use themegen::corpus::{read_sentences, ColumnSelector, ReadOptions};
use themegen::text::{tokenize, Preprocessor};

fn write_temp(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

// ============================================================
// read_sentences: format dispatch
// ============================================================

#[test]
fn reads_plain_text_lines() {
    let file = write_temp(".txt", "Pay is too low\n\nMeetings run long\n");
    let sentences = read_sentences(file.path(), &ReadOptions::default()).unwrap();
    assert_eq!(sentences, vec!["Pay is too low", "Meetings run long"]);
}

#[test]
fn reads_csv_first_column_by_default() {
    let file = write_temp(
        ".csv",
        "\"Pay, benefits and bonuses\",1\n\"Multi\nline answer\",2\n",
    );
    let sentences = read_sentences(file.path(), &ReadOptions::default()).unwrap();
    assert_eq!(
        sentences,
        vec!["Pay, benefits and bonuses", "Multi\nline answer"]
    );
}

#[test]
fn reads_csv_column_by_header_name() {
    let file = write_temp(
        ".csv",
        "respondent,challenges\n1,Slow laptops\n2,Unclear goals\n",
    );
    let options = ReadOptions {
        column: ColumnSelector::Name("challenges".to_string()),
        has_header: true,
    };
    let sentences = read_sentences(file.path(), &options).unwrap();
    assert_eq!(sentences, vec!["Slow laptops", "Unclear goals"]);
}

#[test]
fn csv_without_header_keeps_first_row() {
    let file = write_temp(".csv", "challenges\nSlow laptops\n");
    let sentences = read_sentences(file.path(), &ReadOptions::default()).unwrap();
    assert_eq!(sentences, vec!["challenges", "Slow laptops"]);
}

#[test]
fn empty_file_is_an_error() {
    let file = write_temp(".txt", "\n   \n");
    let err = read_sentences(file.path(), &ReadOptions::default()).unwrap_err();
    assert!(err.to_string().contains("No sentences"));
}

#[test]
fn missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nope.csv");
    assert!(read_sentences(&path, &ReadOptions::default()).is_err());
}

// ============================================================
// Preprocessor: invariants
// ============================================================

#[test]
fn preprocess_output_is_lowercase_without_stopwords() {
    let p = Preprocessor::english();
    let sentences = vec![
        "The Managers do NOT listen to our Feedback".to_string(),
        "We are always waiting on IT for new Laptops".to_string(),
    ];
    for out in p.preprocess_all(&sentences) {
        assert_eq!(out, out.to_lowercase());
        for word in out.split_whitespace() {
            assert!(!p.is_stopword(word), "stopword {word:?} survived");
        }
    }
}

#[test]
fn preprocess_preserves_word_order() {
    let p = Preprocessor::english();
    let out = p.preprocess("budget deadline payroll");
    assert_eq!(out, "budget deadline payroll");
}

#[test]
fn preprocess_of_only_stopwords_is_empty() {
    let p = Preprocessor::english();
    assert_eq!(p.preprocess("the and of"), "");
}

#[test]
fn tokenize_drops_punctuation_only_input() {
    assert!(tokenize("... !!! ---").is_empty());
}

#[test]
fn stopword_list_is_sorted_and_contains_the() {
    let p = Preprocessor::english();
    let words = p.stopwords();
    assert!(words.contains(&"the"));
    assert!(words.windows(2).all(|w| w[0] <= w[1]));
}
