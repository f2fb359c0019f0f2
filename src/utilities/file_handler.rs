//! File handler for per-key JSON documents.
//!
//! Each document lives at `<directory>/<key>.json`. Keys are expected to be
//! slugs already; the handler does not normalize them.

use std::io;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

const JSON_EXTENSION: &str = "json";

/// Reads and writes JSON documents keyed by file stem.
#[derive(Debug, Clone)]
pub struct FileHandler {
    /// Directory holding the documents.
    directory: PathBuf,
}

impl FileHandler {
    /// Create a new `FileHandler` for the given directory.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    /// The directory this handler manages.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Full path of the document stored under `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.directory.join(format!("{}.{}", key, JSON_EXTENSION))
    }

    /// Create the directory (and parents) if it does not exist.
    pub async fn ensure_dir(&self) -> io::Result<()> {
        tokio::fs::create_dir_all(&self.directory).await
    }

    /// Load the document stored under `key`.
    ///
    /// Returns `Ok(None)` if the file does not exist.
    pub async fn load<T: DeserializeOwned>(&self, key: &str) -> io::Result<Option<T>> {
        let path = self.path_for(key);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    /// Load a document from an explicit path.
    pub async fn load_path<T: DeserializeOwned>(&self, path: &Path) -> io::Result<T> {
        let content = tokio::fs::read_to_string(path).await?;
        serde_json::from_str(&content).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    /// Save `data` as pretty-printed JSON under `key`.
    ///
    /// Writes a hidden temporary sibling and renames it into place; readers
    /// see either the old document or the new one.
    pub async fn save<T: Serialize>(&self, key: &str, data: &T) -> io::Result<()> {
        self.ensure_dir().await?;
        let content = serde_json::to_string_pretty(data)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        let path = self.path_for(key);
        let tmp = self.directory.join(format!(".{}.{}.tmp", key, JSON_EXTENSION));
        tokio::fs::write(&tmp, content).await?;
        tokio::fs::rename(&tmp, &path).await
    }

    /// Delete the document stored under `key`.
    ///
    /// Returns `Ok(false)` if there was nothing to delete.
    pub async fn remove(&self, key: &str) -> io::Result<bool> {
        match tokio::fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Check if a document exists under `key`.
    pub async fn exists(&self, key: &str) -> bool {
        tokio::fs::try_exists(self.path_for(key))
            .await
            .unwrap_or(false)
    }

    /// List the paths of all `*.json` documents in the directory.
    ///
    /// Hidden files (including in-flight temporaries) are skipped. The result
    /// is sorted for deterministic iteration.
    pub async fn list(&self) -> io::Result<Vec<PathBuf>> {
        let mut entries = tokio::fs::read_dir(&self.directory).await?;
        let mut paths = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let is_file = entry.file_type().await?.is_file();
            let is_json = path
                .extension()
                .map_or(false, |ext| ext == JSON_EXTENSION);
            let hidden = path
                .file_name()
                .and_then(|n| n.to_str())
                .map_or(true, |n| n.starts_with('.'));
            if is_file && is_json && !hidden {
                paths.push(path);
            }
        }
        paths.sort();
        Ok(paths)
    }
}
