// Text normalization: tokenizing sentences and stripping stopwords.

pub mod preprocess;

pub use preprocess::{tokenize, Preprocessor};
