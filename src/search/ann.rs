//! Optional approximate-nearest-neighbor index.
//!
//! The ANN capability is a compile-time feature (`ann`, default on). When
//! the feature is off, or the index artifact is absent on disk, the engine
//! commits to brute-force cosine search for the process lifetime; the
//! decision is made once at service construction, never per query.

use std::path::Path;

use crate::error::Result;

/// Candidate lookup against a prebuilt vector index.
///
/// Returned ids are ordinals into the corpus the index was built from, in
/// the index's own descending-similarity order. Ids are signed because ANN
/// backends emit sentinel ids (e.g. -1) when underfilled; the engine is
/// responsible for dropping anything outside the corpus.
pub trait AnnSearcher: Send + Sync {
    fn search(&self, query: &[f32], k: usize) -> Result<Vec<(i64, f32)>>;
}

#[cfg(feature = "ann")]
mod usearch_index {
    use std::path::Path;

    use tracing::info;
    use usearch::{Index, IndexOptions, MetricKind, ScalarKind};

    use crate::error::{LearnoraError, Result};

    use super::AnnSearcher;

    /// usearch-backed index, loaded once from its serialized artifact.
    pub struct AnnIndex {
        index: Index,
    }

    impl AnnIndex {
        /// Deserialize the index artifact. The artifact must have been built
        /// with the same dimensionality and ordinal order as the corpus.
        pub fn open(path: &Path, dimensions: usize) -> Result<Self> {
            let mut options = IndexOptions::default();
            options.dimensions = dimensions;
            options.metric = MetricKind::IP;
            options.quantization = ScalarKind::F32;

            let index = Index::new(&options).map_err(|err| {
                LearnoraError::ResourceCorrupt(format!("create ann index: {err}"))
            })?;
            let path_str = path.to_string_lossy();
            index.load(&path_str).map_err(|err| {
                LearnoraError::ResourceCorrupt(format!(
                    "load ann index {}: {err}",
                    path.display()
                ))
            })?;
            info!(path = %path.display(), vectors = index.size(), "loaded ann index");
            Ok(Self { index })
        }
    }

    impl AnnSearcher for AnnIndex {
        fn search(&self, query: &[f32], k: usize) -> Result<Vec<(i64, f32)>> {
            let matches = self
                .index
                .search(query, k)
                .map_err(|err| LearnoraError::ResourceCorrupt(format!("ann search: {err}")))?;
            // usearch reports inner-product distance (1 - dot); convert back
            // to similarity so both strategies score on the same scale.
            Ok(matches
                .keys
                .iter()
                .zip(matches.distances.iter())
                .map(|(key, distance)| (*key as i64, 1.0 - distance))
                .collect())
        }
    }
}

#[cfg(feature = "ann")]
pub use usearch_index::AnnIndex;

/// Open the index artifact if the capability and the file are both present.
#[cfg(feature = "ann")]
pub fn open_index(path: &Path, dimensions: usize) -> Result<Option<Box<dyn AnnSearcher>>> {
    if !path.exists() {
        tracing::warn!(path = %path.display(), "no ann index found, using brute-force cosine search");
        return Ok(None);
    }
    Ok(Some(Box::new(AnnIndex::open(path, dimensions)?)))
}

/// Without the `ann` feature the capability is permanently absent.
#[cfg(not(feature = "ann"))]
pub fn open_index(_path: &Path, _dimensions: usize) -> Result<Option<Box<dyn AnnSearcher>>> {
    tracing::warn!("ann capability not compiled in, using brute-force cosine search");
    Ok(None)
}
