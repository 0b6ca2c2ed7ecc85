//! Query answering: encode, retrieve, rank, enrich.
//!
//! `SearchService` owns the encoder, the corpus, and the retrieval strategy.
//! It is built once at startup and searched through `&self`; every resource
//! is immutable after construction, so the service is freely shareable
//! across threads without locking.

use std::cmp::Ordering;

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{LearnoraError, Result};
use crate::search::ann::AnnSearcher;
use crate::search::corpus::{Corpus, CorpusRecord};
use crate::search::encoder::{Encoder, dot};

/// A corpus record enriched with its similarity to the query.
///
/// Serializes flat: the record's own fields plus `similarity_score`.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    #[serde(flatten)]
    pub record: CorpusRecord,
    pub similarity_score: f32,
}

/// Retrieval strategy, fixed at construction for the process lifetime.
enum Strategy {
    /// Prebuilt ANN index, ordinal-aligned with the corpus.
    Approximate(Box<dyn AnnSearcher>),
    /// Exhaustive cosine scan over the cached corpus embedding matrix
    /// (row `i` is the normalized embedding of record `i`).
    BruteForce(Vec<Vec<f32>>),
}

pub struct SearchService {
    encoder: Box<dyn Encoder>,
    corpus: Corpus,
    strategy: Strategy,
    strict_ids: bool,
}

impl SearchService {
    /// Build the service. With an index, candidates come from it directly;
    /// without one, the whole corpus is embedded here, once, so queries
    /// never pay that cost again.
    pub fn new(
        encoder: Box<dyn Encoder>,
        corpus: Corpus,
        index: Option<Box<dyn AnnSearcher>>,
        strict_ids: bool,
    ) -> Result<Self> {
        let strategy = match index {
            Some(index) => {
                info!(model = encoder.model_name(), "using approximate index search");
                Strategy::Approximate(index)
            }
            None => {
                let matrix = encoder.encode_batch(&corpus.embedding_texts())?;
                info!(
                    model = encoder.model_name(),
                    rows = matrix.len(),
                    "using brute-force cosine search"
                );
                Strategy::BruteForce(matrix)
            }
        };

        Ok(Self {
            encoder,
            corpus,
            strategy,
            strict_ids,
        })
    }

    /// Top-`top_k` records most similar to `query`, best first.
    ///
    /// `top_k` larger than the corpus yields every record ranked; an empty
    /// corpus yields an empty result. Equal scores order by lower ordinal.
    pub fn search(&self, query: &str, top_k: usize) -> Result<Vec<SearchResult>> {
        let query_vector = self.encoder.encode(query)?;

        let ranked = match &self.strategy {
            Strategy::Approximate(index) => {
                let candidates = index.search(&query_vector, top_k)?;
                self.keep_in_range(candidates)?
            }
            Strategy::BruteForce(matrix) => {
                let mut scored: Vec<(usize, f32)> = matrix
                    .par_iter()
                    .enumerate()
                    .map(|(ordinal, row)| (ordinal, dot(row, &query_vector)))
                    .collect();
                scored.sort_by(|a, b| {
                    b.1.partial_cmp(&a.1)
                        .unwrap_or(Ordering::Equal)
                        .then_with(|| a.0.cmp(&b.0))
                });
                scored.truncate(top_k);
                scored
            }
        };

        Ok(ranked
            .into_iter()
            .map(|(ordinal, score)| SearchResult {
                record: self.corpus.record(ordinal).clone(),
                similarity_score: score,
            })
            .collect())
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    /// Drop (or, in strict mode, reject) candidate ids outside the corpus.
    /// ANN backends emit sentinel ids when asked for more neighbors than
    /// they hold; those are underfill, not errors. Index order is preserved.
    fn keep_in_range(&self, candidates: Vec<(i64, f32)>) -> Result<Vec<(usize, f32)>> {
        let len = self.corpus.len();
        let mut kept = Vec::with_capacity(candidates.len());
        for (id, score) in candidates {
            if id >= 0 && (id as usize) < len {
                kept.push((id as usize, score));
            } else if self.strict_ids {
                return Err(LearnoraError::IndexMisaligned { id, len });
            } else {
                debug!(id, corpus = len, "dropping out-of-range index candidate");
            }
        }
        Ok(kept)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use serde_json::Map;

    use super::*;
    use crate::search::encoder::l2_normalize;

    /// Encoder with a fixed text-to-vector table.
    struct StubEncoder {
        vectors: HashMap<String, Vec<f32>>,
        dimension: usize,
    }

    impl StubEncoder {
        fn new(pairs: &[(&str, &[f32])]) -> Self {
            let dimension = pairs.first().map_or(2, |(_, v)| v.len());
            Self {
                vectors: pairs
                    .iter()
                    .map(|(text, vector)| (text.to_string(), vector.to_vec()))
                    .collect(),
                dimension,
            }
        }
    }

    impl Encoder for StubEncoder {
        fn encode(&self, text: &str) -> Result<Vec<f32>> {
            let mut vector = self
                .vectors
                .get(text)
                .cloned()
                .unwrap_or_else(|| vec![0.0; self.dimension]);
            l2_normalize(&mut vector);
            Ok(vector)
        }

        fn encode_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            texts.iter().map(|text| self.encode(text)).collect()
        }

        fn model_name(&self) -> &str {
            "stub"
        }
    }

    /// Index returning a canned candidate list regardless of the query.
    struct StubAnn {
        candidates: Vec<(i64, f32)>,
    }

    impl AnnSearcher for StubAnn {
        fn search(&self, _query: &[f32], k: usize) -> Result<Vec<(i64, f32)>> {
            Ok(self.candidates.iter().copied().take(k).collect())
        }
    }

    fn record(title: &str, summary: &str) -> CorpusRecord {
        CorpusRecord {
            title: title.to_string(),
            summary: Some(summary.to_string()),
            extra: Map::new(),
        }
    }

    fn ab_corpus() -> Corpus {
        Corpus::from_records(vec![record("A", "x"), record("B", "y")])
    }

    fn ab_encoder() -> Box<dyn Encoder> {
        Box::new(StubEncoder::new(&[
            ("A x", &[1.0, 0.0]),
            ("B y", &[0.0, 1.0]),
            ("A", &[1.0, 0.0]),
            ("B", &[0.0, 1.0]),
        ]))
    }

    fn brute_force_service() -> SearchService {
        SearchService::new(ab_encoder(), ab_corpus(), None, false).unwrap()
    }

    #[test]
    fn test_brute_force_exact_ranking() {
        let service = brute_force_service();
        let results = service.search("A", 2).unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].record.title, "A");
        assert_eq!(results[0].record.summary.as_deref(), Some("x"));
        assert!((results[0].similarity_score - 1.0).abs() < 1e-6);
        assert_eq!(results[1].record.title, "B");
        assert!(results[1].similarity_score.abs() < 1e-6);
    }

    #[test]
    fn test_results_serialize_flat_with_score() {
        let service = brute_force_service();
        let results = service.search("A", 1).unwrap();
        let json = serde_json::to_value(&results[0]).unwrap();

        assert_eq!(json["title"], "A");
        assert_eq!(json["summary"], "x");
        assert!((json["similarity_score"].as_f64().unwrap() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_top_k_bounds_result_count() {
        let service = brute_force_service();
        assert_eq!(service.search("A", 1).unwrap().len(), 1);
        assert_eq!(service.search("A", 2).unwrap().len(), 2);
        // top_k past the corpus yields all records ranked.
        assert_eq!(service.search("A", 50).unwrap().len(), 2);
        assert_eq!(service.search("A", 0).unwrap().len(), 0);
    }

    #[test]
    fn test_scores_non_increasing() {
        let encoder = Box::new(StubEncoder::new(&[
            ("A x", &[1.0, 0.0]),
            ("B y", &[0.8, 0.6]),
            ("C z", &[0.0, 1.0]),
            ("q", &[1.0, 0.0]),
        ]));
        let corpus = Corpus::from_records(vec![
            record("A", "x"),
            record("B", "y"),
            record("C", "z"),
        ]);
        let service = SearchService::new(encoder, corpus, None, false).unwrap();

        let results = service.search("q", 3).unwrap();
        for pair in results.windows(2) {
            assert!(pair[0].similarity_score >= pair[1].similarity_score);
        }
    }

    #[test]
    fn test_repeated_searches_are_identical() {
        let service = brute_force_service();
        let first = service.search("A", 2).unwrap();
        let second = service.search("A", 2).unwrap();

        let titles = |results: &[SearchResult]| {
            results
                .iter()
                .map(|r| (r.record.title.clone(), r.similarity_score))
                .collect::<Vec<_>>()
        };
        assert_eq!(titles(&first), titles(&second));
    }

    #[test]
    fn test_empty_corpus_returns_empty() {
        let encoder = Box::new(StubEncoder::new(&[("q", &[1.0, 0.0])]));
        let service =
            SearchService::new(encoder, Corpus::from_records(Vec::new()), None, false).unwrap();
        assert!(service.search("q", 10).unwrap().is_empty());
    }

    #[test]
    fn test_equal_scores_order_by_ordinal() {
        // Both records embed identically, so scores tie exactly.
        let encoder = Box::new(StubEncoder::new(&[
            ("A x", &[1.0, 0.0]),
            ("B y", &[1.0, 0.0]),
            ("q", &[1.0, 0.0]),
        ]));
        let service = SearchService::new(encoder, ab_corpus(), None, false).unwrap();

        let results = service.search("q", 2).unwrap();
        assert_eq!(results[0].record.title, "A");
        assert_eq!(results[1].record.title, "B");
    }

    #[test]
    fn test_ann_sentinel_ids_are_dropped() {
        let index = Box::new(StubAnn {
            candidates: vec![(-1, 0.9), (0, 0.7)],
        });
        let service = SearchService::new(ab_encoder(), ab_corpus(), Some(index), false).unwrap();

        let results = service.search("A", 2).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].record.title, "A");
        assert!((results[0].similarity_score - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_ann_overflow_ids_are_dropped() {
        let index = Box::new(StubAnn {
            candidates: vec![(5, 0.9), (1, 0.8)],
        });
        let service = SearchService::new(ab_encoder(), ab_corpus(), Some(index), false).unwrap();

        let results = service.search("A", 2).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].record.title, "B");
    }

    #[test]
    fn test_strict_mode_rejects_out_of_range_ids() {
        let index = Box::new(StubAnn {
            candidates: vec![(-1, 0.9), (0, 0.7)],
        });
        let service = SearchService::new(ab_encoder(), ab_corpus(), Some(index), true).unwrap();

        let err = service.search("A", 2).unwrap_err();
        assert!(matches!(
            err,
            LearnoraError::IndexMisaligned { id: -1, len: 2 }
        ));
    }

    #[test]
    fn test_ann_order_is_preserved() {
        // The index's own ordering wins even when scores disagree with it.
        let index = Box::new(StubAnn {
            candidates: vec![(1, 0.4), (0, 0.9)],
        });
        let service = SearchService::new(ab_encoder(), ab_corpus(), Some(index), false).unwrap();

        let results = service.search("A", 2).unwrap();
        assert_eq!(results[0].record.title, "B");
        assert_eq!(results[1].record.title, "A");
    }

    #[test]
    fn test_ann_and_brute_force_agree_on_top_ids() {
        // Same corpus through both strategies; the ANN stub plays back a
        // plausible approximate ordering. Top-k sets must overlap.
        let corpus = Corpus::from_records(vec![
            record("A", "x"),
            record("B", "y"),
            record("C", "z"),
            record("D", "w"),
        ]);
        let pairs: &[(&str, &[f32])] = &[
            ("A x", &[1.0, 0.0]),
            ("B y", &[0.9, 0.1]),
            ("C z", &[0.1, 0.9]),
            ("D w", &[0.0, 1.0]),
            ("q", &[1.0, 0.0]),
        ];
        let exact =
            SearchService::new(Box::new(StubEncoder::new(pairs)), corpus.clone(), None, false)
                .unwrap();
        let approximate = SearchService::new(
            Box::new(StubEncoder::new(pairs)),
            corpus,
            // Approximate recall: swapped neighbor order, one miss.
            Some(Box::new(StubAnn {
                candidates: vec![(1, 0.95), (0, 0.9)],
            })),
            false,
        )
        .unwrap();

        let top = |service: &SearchService| -> Vec<String> {
            service
                .search("q", 2)
                .unwrap()
                .into_iter()
                .map(|r| r.record.title)
                .collect()
        };
        let exact_top = top(&exact);
        let approx_top = top(&approximate);
        let overlap = approx_top.iter().filter(|t| exact_top.contains(t)).count();
        assert!(overlap * 2 >= exact_top.len(), "top-k sets diverged");
    }
}
