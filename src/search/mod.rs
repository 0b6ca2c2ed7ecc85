//! Retrieval core: encoder, corpus, optional ANN index, search service.

pub mod ann;
pub mod corpus;
pub mod encoder;
pub mod engine;
pub mod model;

pub use ann::AnnSearcher;
pub use corpus::{Corpus, CorpusRecord};
pub use encoder::Encoder;
pub use engine::{SearchResult, SearchService};
