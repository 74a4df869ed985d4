// Bag-of-words vectorization: sparse document-term count matrices.

pub mod count;

pub use count::{CountMatrix, CountVectorizer, Vocabulary};
