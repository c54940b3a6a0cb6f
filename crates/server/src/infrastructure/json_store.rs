//! JSON-file-backed box storage.
//!
//! The whole store is loaded per call and written back in full on mutation.
//! Writes go through a temp-file-then-rename sequence so a crash can never
//! leave a truncated store behind, and a process-wide mutex enforces a
//! single-writer discipline.

use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use pokebox_domain::{BoxEntry, EntryId, UserId};
use tokio::sync::Mutex;

use crate::infrastructure::ports::{BoxRepo, RepoError};

const ENTITY: &str = "BoxEntry";

pub struct JsonBoxRepo {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonBoxRepo {
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, RepoError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| RepoError::storage("create_store_dir", e))?;
            }
        }
        Ok(Self {
            path,
            write_lock: Mutex::new(()),
        })
    }

    /// Load the full store. A missing file reads as an empty store.
    fn load(&self) -> Result<Vec<BoxEntry>, RepoError> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(RepoError::storage("read_store", e)),
        };
        serde_json::from_slice(&bytes).map_err(RepoError::serialization)
    }

    /// Write the full store atomically: temp file in the same directory,
    /// flushed, then renamed over the target.
    fn save(&self, entries: &[BoxEntry]) -> Result<(), RepoError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(dir)
            .map_err(|e| RepoError::storage("create_temp_store", e))?;
        let json =
            serde_json::to_vec_pretty(entries).map_err(RepoError::serialization)?;
        tmp.write_all(&json)
            .and_then(|_| tmp.flush())
            .map_err(|e| RepoError::storage("write_store", e))?;
        tmp.persist(&self.path)
            .map_err(|e| RepoError::storage("replace_store", e.error))?;
        Ok(())
    }
}

#[async_trait]
impl BoxRepo for JsonBoxRepo {
    async fn add(&self, entry: &BoxEntry) -> Result<(), RepoError> {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.load()?;
        if entries.iter().any(|e| e.id == entry.id) {
            return Err(RepoError::duplicate(ENTITY, entry.id));
        }
        entries.push(entry.clone());
        self.save(&entries)
    }

    // Reads skip the write lock: the rename in `save` is atomic, so a
    // concurrent reader always sees a complete store.
    async fn get(&self, id: EntryId) -> Result<BoxEntry, RepoError> {
        self.load()?
            .into_iter()
            .find(|e| e.id == id)
            .ok_or_else(|| RepoError::not_found(ENTITY, id))
    }

    async fn list(&self, user_id: &UserId) -> Result<Vec<BoxEntry>, RepoError> {
        let mut entries: Vec<BoxEntry> = self
            .load()?
            .into_iter()
            .filter(|e| &e.user_id == user_id)
            .collect();
        entries.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(entries)
    }

    async fn update(&self, entry: &BoxEntry) -> Result<(), RepoError> {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.load()?;
        let slot = entries
            .iter_mut()
            .find(|e| e.id == entry.id)
            .ok_or_else(|| RepoError::not_found(ENTITY, entry.id))?;
        *slot = entry.clone();
        self.save(&entries)
    }

    async fn remove(&self, id: EntryId) -> Result<BoxEntry, RepoError> {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.load()?;
        let position = entries
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| RepoError::not_found(ENTITY, id))?;
        let removed = entries.remove(position);
        self.save(&entries)?;
        Ok(removed)
    }
}
