//! Text-to-vector encoder seam.
//!
//! The engine only ever talks to this trait, so the embedding backend can be
//! swapped (or stubbed in tests) without touching ranking logic.

use crate::error::Result;

/// Sentence encoder producing L2-normalized vectors.
///
/// Implementations must return unit-norm vectors so that inner product
/// equals cosine similarity downstream.
pub trait Encoder: Send + Sync {
    /// Encode a single text into a normalized vector.
    fn encode(&self, text: &str) -> Result<Vec<f32>>;

    /// Encode a batch of texts into normalized vectors, one row per input.
    fn encode_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Human-readable identifier of the underlying model.
    fn model_name(&self) -> &str;
}

/// Scale a vector to unit L2 norm in place. Zero vectors are left unchanged.
pub fn l2_normalize(vector: &mut [f32]) {
    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > f32::EPSILON {
        for x in vector.iter_mut() {
            *x /= norm;
        }
    }
}

/// Inner product of two equal-length vectors.
///
/// Equals cosine similarity when both sides are unit-normalized.
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}
