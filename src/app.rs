use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::Config;
use crate::error::Result;
use crate::search::{Corpus, SearchService, ann, model};

/// Process-wide context: configuration plus the fully constructed search
/// service. Built once before any command runs, so initialization failures
/// surface up front and every resource lives for the process lifetime.
pub struct AppContext {
    pub root: PathBuf,
    pub config: Config,
    pub service: Arc<SearchService>,
    pub robot_mode: bool,
}

impl AppContext {
    pub fn from_cli(cli: &crate::cli::Cli) -> Result<Self> {
        let root = find_root()?;
        let config = Config::load(cli.config.as_deref(), &root)?;
        let service = Arc::new(build_service(&config, &root)?);

        Ok(Self {
            root,
            config,
            service,
            robot_mode: cli.robot,
        })
    }
}

/// Construct the search service: corpus first (cheapest failure), then the
/// encoder, then the optional ANN index. The strategy is fixed here and
/// never re-evaluated.
pub fn build_service(config: &Config, root: &Path) -> Result<SearchService> {
    let corpus = Corpus::load(&config.paths.metadata_file(root))?;
    let encoder = model::load_encoder(
        &config.search,
        &config.paths.model_dir(root),
        &root.join("models/cache"),
    )?;
    let index = ann::open_index(&config.paths.index_file(root), config.search.dimensions)?;
    SearchService::new(encoder, corpus, index, config.search.strict_ids)
}

/// Resolve the learnora root: `LEARNORA_ROOT`, an upward `.learnora`
/// directory search, then the platform data directory.
pub fn find_root() -> Result<PathBuf> {
    if let Ok(root) = std::env::var("LEARNORA_ROOT") {
        return Ok(PathBuf::from(root));
    }
    let cwd = std::env::current_dir()?;
    if let Some(found) = find_upwards(&cwd, ".learnora") {
        return Ok(found);
    }

    Ok(dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("learnora"))
}

fn find_upwards(start: &Path, name: &str) -> Option<PathBuf> {
    let mut current = Some(start);
    while let Some(dir) = current {
        let candidate = dir.join(name);
        if candidate.is_dir() {
            return Some(candidate);
        }
        current = dir.parent();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_upwards_locates_marker_dir() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join(".learnora");
        std::fs::create_dir_all(&marker).unwrap();
        let nested = dir.path().join("a/b/c");
        std::fs::create_dir_all(&nested).unwrap();

        assert_eq!(find_upwards(&nested, ".learnora"), Some(marker));
    }

    #[test]
    fn test_find_upwards_misses_absent_marker() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(find_upwards(dir.path(), ".learnora"), None);
    }
}
