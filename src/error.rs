//! Crate-wide error type.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, LearnoraError>;

#[derive(Debug, Error)]
pub enum LearnoraError {
    /// A required artifact (corpus metadata, model, index file) is absent.
    #[error("resource missing: {0}")]
    ResourceMissing(String),

    /// An artifact exists but cannot be read or parsed.
    #[error("resource corrupt: {0}")]
    ResourceCorrupt(String),

    /// Query text rejected before reaching the engine.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// The ANN index returned an ordinal outside the corpus. Only raised in
    /// strict mode; lenient mode drops the candidate instead.
    #[error("index returned id {id} for a corpus of {len} records")]
    IndexMisaligned { id: i64, len: usize },

    #[error("config error: {0}")]
    Config(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    /// Embedding backend failure (model load or encode).
    #[error("embedding error: {0}")]
    Embedding(String),

    #[error("shared roadmap not found: {0}")]
    ShareNotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl LearnoraError {
    /// Stable machine-readable code for robot-mode output.
    pub fn code(&self) -> &'static str {
        match self {
            Self::ResourceMissing(_) => "resource_missing",
            Self::ResourceCorrupt(_) => "resource_corrupt",
            Self::InvalidQuery(_) => "invalid_query",
            Self::IndexMisaligned { .. } => "index_misaligned",
            Self::Config(_) => "config_error",
            Self::Serialization(_) => "serialization_error",
            Self::Embedding(_) => "embedding_error",
            Self::ShareNotFound(_) => "not_found",
            Self::Io(_) => "io_error",
        }
    }
}
