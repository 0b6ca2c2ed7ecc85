//! Corpus metadata loading.
//!
//! The corpus is an ordered sequence of learning-resource records read once
//! from a JSON file. A record's position in the sequence is its ordinal id,
//! the join key shared with any prebuilt ANN index; the two artifacts must
//! only ever be replaced together.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;

use crate::error::{LearnoraError, Result};

/// One learning resource. `title` is required, `summary` optional, and any
/// further metadata fields ride along untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusRecord {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CorpusRecord {
    /// The text form records are embedded under: title, a space, then the
    /// summary (empty when absent). This must match the form the ANN index
    /// was built against.
    pub fn embedding_text(&self) -> String {
        format!("{} {}", self.title, self.summary.as_deref().unwrap_or(""))
    }
}

/// Ordered, immutable record sequence.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    records: Vec<CorpusRecord>,
}

impl Corpus {
    /// Load the corpus from a JSON metadata file. Missing and malformed
    /// files are both fatal; there is no empty-corpus fallback.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(LearnoraError::ResourceMissing(format!(
                "corpus metadata {}",
                path.display()
            )));
        }
        let raw = std::fs::read_to_string(path)?;
        let records: Vec<CorpusRecord> = serde_json::from_str(&raw).map_err(|err| {
            LearnoraError::ResourceCorrupt(format!("parse corpus {}: {err}", path.display()))
        })?;
        info!(records = records.len(), path = %path.display(), "loaded corpus metadata");
        Ok(Self { records })
    }

    /// Build a corpus directly from records (tests and embedded use).
    pub fn from_records(records: Vec<CorpusRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Record at ordinal `id`. Panics on out-of-range ids; callers filter
    /// against `len()` first.
    pub fn record(&self, id: usize) -> &CorpusRecord {
        &self.records[id]
    }

    pub fn records(&self) -> &[CorpusRecord] {
        &self.records
    }

    /// Embedding text for every record, in ordinal order.
    pub fn embedding_texts(&self) -> Vec<String> {
        self.records
            .iter()
            .map(CorpusRecord::embedding_text)
            .collect()
    }
}
