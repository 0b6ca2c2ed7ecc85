//! File-backed store for shared roadmaps.
//!
//! A single JSON file maps short ids to saved roadmap payloads. Concurrent
//! writers are serialized through an advisory lock on a sibling lock file,
//! and every write lands via temp-file-plus-rename, so readers never see a
//! torn file and two writers never lose each other's entries.

use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tempfile::NamedTempFile;
use tracing::debug;
use uuid::Uuid;

use crate::error::{LearnoraError, Result};
use crate::utils::fs::{ensure_dir, read_optional};

/// Length of generated share ids.
const SHARE_ID_LEN: usize = 8;

/// One saved roadmap.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareEntry {
    pub id: String,
    pub data: Value,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub query: String,
}

pub struct ShareStore {
    path: PathBuf,
    lock_path: PathBuf,
}

impl ShareStore {
    /// Open (or create the directory for) the store at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            ensure_dir(parent)?;
        }
        let lock_path = path.with_extension("lock");
        Ok(Self { path, lock_path })
    }

    /// Save a payload under a fresh short id and return the receipt.
    pub fn save(&self, data: Value) -> Result<ShareEntry> {
        let lock = self.lock_exclusive()?;

        let mut entries = self.read_all()?;
        let mut id = generate_id();
        while entries.contains_key(&id) {
            id = generate_id();
        }

        let query = data
            .get("query")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let entry = ShareEntry {
            id: id.clone(),
            data,
            created_at: Utc::now(),
            query,
        };
        entries.insert(id.clone(), entry.clone());
        self.write_all(&entries)?;
        debug!(%id, "saved shared roadmap");

        drop(lock);
        Ok(entry)
    }

    /// Fetch a saved payload by id.
    pub fn get(&self, id: &str) -> Result<Option<Value>> {
        let lock = self.lock_shared()?;
        let entries = self.read_all()?;
        drop(lock);
        Ok(entries.get(id).map(|entry| entry.data.clone()))
    }

    /// All entries, newest first.
    pub fn list(&self) -> Result<Vec<ShareEntry>> {
        let lock = self.lock_shared()?;
        let entries = self.read_all()?;
        drop(lock);
        let mut entries: Vec<ShareEntry> = entries.into_values().collect();
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(entries)
    }

    fn read_all(&self) -> Result<BTreeMap<String, ShareEntry>> {
        let Some(raw) = read_optional(&self.path)? else {
            return Ok(BTreeMap::new());
        };
        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&raw).map_err(|err| {
            LearnoraError::ResourceCorrupt(format!(
                "parse share store {}: {err}",
                self.path.display()
            ))
        })
    }

    fn write_all(&self, entries: &BTreeMap<String, ShareEntry>) -> Result<()> {
        let parent = self.path.parent().unwrap_or_else(|| Path::new("."));
        let mut tmp = NamedTempFile::new_in(parent)?;
        let payload = serde_json::to_string_pretty(entries)
            .map_err(|err| LearnoraError::Serialization(format!("share store: {err}")))?;
        tmp.write_all(payload.as_bytes())?;
        tmp.persist(&self.path).map_err(|err| err.error)?;
        Ok(())
    }

    fn lock_exclusive(&self) -> Result<File> {
        let file = self.open_lock_file()?;
        file.lock_exclusive()?;
        Ok(file)
    }

    fn lock_shared(&self) -> Result<File> {
        let file = self.open_lock_file()?;
        file.lock_shared()?;
        Ok(file)
    }

    fn open_lock_file(&self) -> Result<File> {
        Ok(OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&self.lock_path)?)
    }
}

fn generate_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(SHARE_ID_LEN);
    id
}
