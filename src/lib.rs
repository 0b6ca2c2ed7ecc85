//! learnora - semantic search over a fixed corpus of learning resources.
//!
//! The retrieval core encodes a text query with a sentence-embedding model,
//! ranks corpus records by cosine similarity (through a prebuilt ANN index
//! when one is available, brute force otherwise), and hands the ranked
//! results to the roadmap and fishbone builders.

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod roadmap;
pub mod search;
pub mod storage;
pub mod utils;

pub use error::{LearnoraError, Result};
