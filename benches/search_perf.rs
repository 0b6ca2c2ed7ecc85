//! Brute-force search throughput over a synthetic corpus.

use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use serde_json::Map;

use learnora::search::encoder::l2_normalize;
use learnora::search::{Corpus, CorpusRecord, Encoder, SearchService};

const DIM: usize = 64;

/// Deterministic token-hash encoder; keeps the bench free of model I/O.
struct TokenHashEncoder;

impl TokenHashEncoder {
    fn vector(text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; DIM];
        for token in text.split_whitespace() {
            let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
            for byte in token.bytes() {
                hash ^= u64::from(byte);
                hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
            }
            vector[(hash % DIM as u64) as usize] += 1.0;
        }
        l2_normalize(&mut vector);
        vector
    }
}

impl Encoder for TokenHashEncoder {
    fn encode(&self, text: &str) -> learnora::Result<Vec<f32>> {
        Ok(Self::vector(text))
    }

    fn encode_batch(&self, texts: &[String]) -> learnora::Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| Self::vector(text)).collect())
    }

    fn model_name(&self) -> &str {
        "token-hash"
    }
}

fn synthetic_corpus(size: usize) -> Corpus {
    let records = (0..size)
        .map(|i| CorpusRecord {
            title: format!("resource {i} on topic {}", i % 37),
            summary: Some(format!("covers subject {} and subject {}", i % 11, i % 7)),
            extra: Map::new(),
        })
        .collect();
    Corpus::from_records(records)
}

fn bench_brute_force_search(c: &mut Criterion) {
    for size in [100usize, 1_000, 10_000] {
        let service =
            SearchService::new(Box::new(TokenHashEncoder), synthetic_corpus(size), None, false)
                .unwrap();
        c.bench_function(&format!("brute_force_top10_{size}"), |b| {
            b.iter(|| {
                let results = service
                    .search(black_box("subject 3 on topic 5"), black_box(10))
                    .unwrap();
                black_box(results)
            });
        });
    }
}

criterion_group!(benches, bench_brute_force_search);
criterion_main!(benches);
