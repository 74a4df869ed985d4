// Corpus loading: turning an input file into a list of raw sentences.

pub mod reader;

pub use reader::{read_sentences, read_sentences_from_str, ColumnSelector, ReadOptions, SourceFormat};
