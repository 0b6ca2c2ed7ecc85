use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{LearnoraError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub share: ShareConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            paths: PathsConfig::default(),
            search: SearchConfig::default(),
            share: ShareConfig::default(),
        }
    }
}

impl Config {
    pub fn load(explicit_path: Option<&Path>, root: &Path) -> Result<Self> {
        let mut config = Self::default();

        let explicit = explicit_path
            .map(PathBuf::from)
            .or_else(|| std::env::var("LEARNORA_CONFIG").ok().map(PathBuf::from));

        if let Some(path) = explicit {
            if let Some(patch) = Self::load_patch(&path)? {
                config.merge_patch(patch);
            }
        } else {
            if let Some(global) = Self::load_global()? {
                config.merge_patch(global);
            }
            if let Some(project) = Self::load_project(root)? {
                config.merge_patch(project);
            }
        }

        config.apply_env_overrides()?;

        Ok(config)
    }

    fn load_global() -> Result<Option<ConfigPatch>> {
        let Some(config_dir) = dirs::config_dir() else {
            return Ok(None);
        };
        Self::load_patch(&config_dir.join("learnora/config.toml"))
    }

    fn load_project(root: &Path) -> Result<Option<ConfigPatch>> {
        Self::load_patch(&root.join("config.toml"))
    }

    fn load_patch(path: &Path) -> Result<Option<ConfigPatch>> {
        if !path.exists() {
            return Ok(None);
        }

        let raw = std::fs::read_to_string(path)
            .map_err(|err| LearnoraError::Config(format!("read config {}: {err}", path.display())))?;
        let patch = toml::from_str(&raw)
            .map_err(|err| LearnoraError::Config(format!("parse config {}: {err}", path.display())))?;
        Ok(Some(patch))
    }

    fn merge_patch(&mut self, patch: ConfigPatch) {
        if let Some(patch) = patch.paths {
            self.paths.merge(patch);
        }
        if let Some(patch) = patch.search {
            self.search.merge(patch);
        }
        if let Some(patch) = patch.share {
            self.share.merge(patch);
        }
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Some(value) = env_string("LEARNORA_MODEL_DIR") {
            self.paths.model_dir = value;
        }
        if let Some(value) = env_string("LEARNORA_METADATA_FILE") {
            self.paths.metadata_file = value;
        }
        if let Some(value) = env_string("LEARNORA_INDEX_FILE") {
            self.paths.index_file = value;
        }
        if let Some(value) = env_string("LEARNORA_FALLBACK_MODEL") {
            self.search.fallback_model = value;
        }
        if let Some(value) = env_usize("LEARNORA_DIMENSIONS")? {
            self.search.dimensions = value;
        }
        if let Some(value) = env_bool("LEARNORA_STRICT_IDS") {
            self.search.strict_ids = value;
        }
        if let Some(value) = env_string("LEARNORA_SHARE_FILE") {
            self.share.file = value;
        }
        Ok(())
    }
}

/// Artifact locations, resolved against the learnora root when relative.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Fine-tuned model directory; absent means pretrained fallback.
    pub model_dir: String,
    /// Corpus metadata JSON file.
    pub metadata_file: String,
    /// Serialized ANN index, ordinal-aligned with the metadata file.
    pub index_file: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            model_dir: "models/learnora_finetuned_stv2".to_string(),
            metadata_file: "datasets/learnora_metadata_final.json".to_string(),
            index_file: "datasets/learnora_resources.usearch".to_string(),
        }
    }
}

impl PathsConfig {
    fn merge(&mut self, patch: PathsPatch) {
        if let Some(model_dir) = patch.model_dir {
            self.model_dir = model_dir;
        }
        if let Some(metadata_file) = patch.metadata_file {
            self.metadata_file = metadata_file;
        }
        if let Some(index_file) = patch.index_file {
            self.index_file = index_file;
        }
    }

    pub fn model_dir(&self, root: &Path) -> PathBuf {
        resolve(root, &self.model_dir)
    }

    pub fn metadata_file(&self, root: &Path) -> PathBuf {
        resolve(root, &self.metadata_file)
    }

    pub fn index_file(&self, root: &Path) -> PathBuf {
        resolve(root, &self.index_file)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Pretrained model used when no fine-tuned directory exists.
    pub fallback_model: String,
    /// Embedding dimensionality the index artifact was built with.
    pub dimensions: usize,
    /// Fail on out-of-range ANN ids instead of dropping them.
    pub strict_ids: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            fallback_model: "sentence-transformers/all-MiniLM-L6-v2".to_string(),
            dimensions: 384,
            strict_ids: false,
        }
    }
}

impl SearchConfig {
    fn merge(&mut self, patch: SearchPatch) {
        if let Some(fallback_model) = patch.fallback_model {
            self.fallback_model = fallback_model;
        }
        if let Some(dimensions) = patch.dimensions {
            self.dimensions = dimensions;
        }
        if let Some(strict_ids) = patch.strict_ids {
            self.strict_ids = strict_ids;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareConfig {
    /// Shared-roadmap store file.
    pub file: String,
}

impl Default for ShareConfig {
    fn default() -> Self {
        Self {
            file: "shared_roadmaps.json".to_string(),
        }
    }
}

impl ShareConfig {
    fn merge(&mut self, patch: SharePatch) {
        if let Some(file) = patch.file {
            self.file = file;
        }
    }

    pub fn file(&self, root: &Path) -> PathBuf {
        resolve(root, &self.file)
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    paths: Option<PathsPatch>,
    search: Option<SearchPatch>,
    share: Option<SharePatch>,
}

#[derive(Debug, Default, Deserialize)]
struct PathsPatch {
    model_dir: Option<String>,
    metadata_file: Option<String>,
    index_file: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct SearchPatch {
    fallback_model: Option<String>,
    dimensions: Option<usize>,
    strict_ids: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct SharePatch {
    file: Option<String>,
}

fn resolve(root: &Path, value: &str) -> PathBuf {
    let path = Path::new(value);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

fn env_bool(key: &str) -> Option<bool> {
    std::env::var(key)
        .ok()
        .map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
}

fn env_usize(key: &str) -> Result<Option<usize>> {
    match std::env::var(key) {
        Ok(value) => value
            .parse::<usize>()
            .map(Some)
            .map_err(|err| LearnoraError::Config(format!("invalid {key} value {value}: {err}"))),
        Err(_) => Ok(None),
    }
}
