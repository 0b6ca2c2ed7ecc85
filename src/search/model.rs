//! Embedding model loading.
//!
//! Prefers a locally fine-tuned model directory (ONNX export plus tokenizer
//! files); falls back to the configured pretrained model, fetched through
//! fastembed's cache. Neither path has a silent default: whichever one is
//! chosen must load or the error propagates.

use std::path::Path;

use fastembed::{
    EmbeddingModel, InitOptions, InitOptionsUserDefined, Pooling, TextEmbedding, TokenizerFiles,
    UserDefinedEmbeddingModel,
};
use tracing::{info, warn};

use crate::config::SearchConfig;
use crate::error::{LearnoraError, Result};
use crate::search::encoder::{Encoder, l2_normalize};

/// fastembed-backed sentence encoder.
pub struct FastEmbedEncoder {
    model: TextEmbedding,
    name: String,
}

impl std::fmt::Debug for FastEmbedEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FastEmbedEncoder")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl FastEmbedEncoder {
    /// Load a fine-tuned model from a local directory.
    ///
    /// The directory must contain the ONNX export (`model.onnx`) and the
    /// tokenizer files a sentence-transformers export ships with. A
    /// directory that exists but lacks them is corrupt, not absent.
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let onnx = read_model_file(dir, "model.onnx")?;
        let tokenizer_files = TokenizerFiles {
            tokenizer_file: read_model_file(dir, "tokenizer.json")?,
            config_file: read_model_file(dir, "config.json")?,
            special_tokens_map_file: read_model_file(dir, "special_tokens_map.json")?,
            tokenizer_config_file: read_model_file(dir, "tokenizer_config.json")?,
        };
        let user_model =
            UserDefinedEmbeddingModel::new(onnx, tokenizer_files).with_pooling(Pooling::Mean);
        let model =
            TextEmbedding::try_new_from_user_defined(user_model, InitOptionsUserDefined::default())
                .map_err(|err| {
                    LearnoraError::Embedding(format!(
                        "load fine-tuned model {}: {err}",
                        dir.display()
                    ))
                })?;

        Ok(Self {
            model,
            name: dir.display().to_string(),
        })
    }

    /// Load a named pretrained model, downloading into `cache_dir` on first use.
    pub fn pretrained(name: &str, cache_dir: &Path) -> Result<Self> {
        let options = InitOptions::new(parse_model_name(name)?)
            .with_cache_dir(cache_dir.to_path_buf())
            .with_show_download_progress(false);
        let model = TextEmbedding::try_new(options)
            .map_err(|err| LearnoraError::Embedding(format!("load pretrained {name}: {err}")))?;

        Ok(Self {
            model,
            name: name.to_string(),
        })
    }

    fn embed_all(&self, texts: Vec<&str>) -> Result<Vec<Vec<f32>>> {
        let mut vectors = self
            .model
            .embed(texts, None)
            .map_err(|err| LearnoraError::Embedding(format!("encode: {err}")))?;
        for vector in &mut vectors {
            l2_normalize(vector);
        }
        Ok(vectors)
    }
}

impl Encoder for FastEmbedEncoder {
    fn encode(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_all(vec![text])?
            .into_iter()
            .next()
            .ok_or_else(|| LearnoraError::Embedding("encoder returned no vector".to_string()))
    }

    fn encode_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        self.embed_all(texts.iter().map(String::as_str).collect())
    }

    fn model_name(&self) -> &str {
        &self.name
    }
}

/// Load the configured encoder: fine-tuned directory if present, pretrained
/// fallback otherwise.
pub fn load_encoder(config: &SearchConfig, model_dir: &Path, cache_dir: &Path) -> Result<Box<dyn Encoder>> {
    if model_dir.is_dir() {
        info!(path = %model_dir.display(), "loading fine-tuned model");
        Ok(Box::new(FastEmbedEncoder::from_dir(model_dir)?))
    } else {
        warn!(
            fallback = %config.fallback_model,
            "fine-tuned model not found, using pretrained fallback"
        );
        Ok(Box::new(FastEmbedEncoder::pretrained(
            &config.fallback_model,
            cache_dir,
        )?))
    }
}

fn read_model_file(dir: &Path, name: &str) -> Result<Vec<u8>> {
    let path = dir.join(name);
    std::fs::read(&path).map_err(|err| {
        LearnoraError::ResourceCorrupt(format!(
            "fine-tuned model file {}: {err}",
            path.display()
        ))
    })
}

fn parse_model_name(name: &str) -> Result<EmbeddingModel> {
    match name {
        "sentence-transformers/all-MiniLM-L6-v2" | "all-MiniLM-L6-v2" => {
            Ok(EmbeddingModel::AllMiniLML6V2)
        }
        "sentence-transformers/all-MiniLM-L12-v2" | "all-MiniLM-L12-v2" => {
            Ok(EmbeddingModel::AllMiniLML12V2)
        }
        "BAAI/bge-small-en-v1.5" | "bge-small-en-v1.5" => Ok(EmbeddingModel::BGESmallENV15),
        _ => Err(LearnoraError::Config(format!(
            "unsupported fallback model {name}"
        ))),
    }
}
