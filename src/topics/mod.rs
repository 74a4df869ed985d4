// Topic discovery: LDA fitting, keyword extraction, and theme naming.

pub mod extractor;
pub mod lda;
pub mod themes;
pub mod traits;
