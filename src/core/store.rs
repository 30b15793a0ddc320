//! The document store: a flat directory of metadata/content file pairs

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{Duration, Utc};

use super::config::{MalformedPolicy, StoreConfig};
use super::document::{Document, Location};
use super::error::{Result, StoreError};
use super::file_system::{self, FilePair};

/// Document store backed by a single storage directory
///
/// Every call goes straight to the filesystem; there is no cache or index.
/// The store assumes it is the only writer to its directory and does not
/// lock file pairs, so callers must not race operations on the same id.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    config: StoreConfig,
}

impl DocumentStore {
    /// Open the store, creating the storage directory if absent
    pub fn open(config: StoreConfig) -> Result<Self> {
        file_system::ensure_dir(&config.root).map_err(|source| StoreError::StorageUnavailable {
            path: config.root.clone(),
            source,
        })?;
        tracing::debug!("Storage directory: {}", config.root.display());
        Ok(Self { config })
    }

    /// Open the store at the platform default location
    pub fn open_default() -> Result<Self> {
        Self::open(StoreConfig::resolve()?)
    }

    pub fn root(&self) -> &Path {
        &self.config.root
    }

    fn pair(&self, id: &str) -> Result<FilePair> {
        FilePair::new(&self.config.root, id)
    }

    /// List every document's metadata. Content is left empty.
    pub fn list(&self) -> Result<Vec<Document>> {
        let root = &self.config.root;
        let paths = file_system::metadata_files(root).map_err(|source| {
            StoreError::StorageUnavailable {
                path: root.clone(),
                source,
            }
        })?;

        let mut documents = Vec::with_capacity(paths.len());
        for path in paths {
            match read_metadata(&path) {
                Ok(doc) => documents.push(doc),
                Err(e) if self.config.malformed == MalformedPolicy::Skip => {
                    tracing::warn!("Skipping unreadable metadata: {e}");
                }
                Err(e) => return Err(e),
            }
        }

        tracing::debug!("Listed {} documents", documents.len());
        Ok(documents)
    }

    /// Fetch one document including its content
    pub fn get(&self, id: &str) -> Result<Document> {
        let pair = self.pair(id)?;

        let bytes = fs::read(&pair.metadata)
            .map_err(|e| StoreError::from_io(id, pair.metadata.clone(), e))?;
        let mut doc = decode(&pair.metadata, &bytes)?;

        let content = fs::read(&pair.content)
            .map_err(|e| StoreError::from_io(id, pair.content.clone(), e))?;
        doc.content = String::from_utf8(content).map_err(|source| StoreError::InvalidContent {
            id: id.to_string(),
            path: pair.content.clone(),
            source,
        })?;

        tracing::debug!("Loaded document {id}");
        Ok(doc)
    }

    /// Check if both halves of a document's file pair exist
    pub fn exists(&self, id: &str) -> Result<bool> {
        Ok(self.pair(id)?.is_complete())
    }

    /// Create or update a document.
    ///
    /// Content is written before metadata. An existing record's `created_at`
    /// always replaces the caller's value; `updated_at` is set to now and
    /// always moves forward. Returns the metadata record as written.
    pub fn save(&self, mut doc: Document) -> Result<Document> {
        let pair = self.pair(&doc.id)?;
        let previous = self.previous_metadata(&doc.id, &pair.metadata)?;
        if let Some(previous) = &previous {
            doc.created_at = previous.created_at;
        }

        let content = std::mem::take(&mut doc.content);
        file_system::write_atomic(&pair.content, content.as_bytes()).map_err(|source| {
            StoreError::Io {
                path: pair.content.clone(),
                source,
            }
        })?;

        let mut now = Utc::now();
        if let Some(last) = previous.as_ref().and_then(|p| p.updated_at) {
            if now <= last {
                now = last + Duration::microseconds(1);
            }
        }
        doc.created_at.get_or_insert(now);
        doc.updated_at = Some(now);
        doc.location = Location::Local;

        let record = doc.to_metadata().map_err(|source| StoreError::Encode {
            id: doc.id.clone(),
            source,
        })?;
        file_system::write_atomic(&pair.metadata, &record).map_err(|source| StoreError::Io {
            path: pair.metadata.clone(),
            source,
        })?;

        tracing::info!("Saved document {} ({} bytes)", doc.id, content.len());
        Ok(doc)
    }

    /// Existing metadata for `id`, if there is a readable record.
    ///
    /// A record that fails to decode is logged and treated as absent, so the
    /// save goes ahead as if the document were new.
    fn previous_metadata(&self, id: &str, path: &Path) -> Result<Option<Document>> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StoreError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        match Document::from_metadata(&bytes) {
            Ok(doc) => Ok(Some(doc)),
            Err(e) => {
                tracing::warn!(
                    "Existing metadata for {id} is malformed, creation time not preserved: {e}"
                );
                Ok(None)
            }
        }
    }

    /// Remove a document's metadata and content files.
    ///
    /// Metadata goes first. If the content file then cannot be removed for
    /// any reason other than already being gone, the metadata file is
    /// restored so the pair stays intact.
    pub fn delete(&self, id: &str) -> Result<()> {
        let pair = self.pair(id)?;

        let record = fs::read(&pair.metadata)
            .map_err(|e| StoreError::from_io(id, pair.metadata.clone(), e))?;
        fs::remove_file(&pair.metadata)
            .map_err(|e| StoreError::from_io(id, pair.metadata.clone(), e))?;

        if let Err(e) = fs::remove_file(&pair.content) {
            if e.kind() != io::ErrorKind::NotFound {
                if let Err(restore) = file_system::write_atomic(&pair.metadata, &record) {
                    tracing::warn!("Could not restore metadata for {id}: {restore}");
                }
            }
            return Err(StoreError::from_io(id, pair.content.clone(), e));
        }

        tracing::info!("Deleted document {id}");
        Ok(())
    }

    /// Save a copy of a document under a new id.
    ///
    /// The copy is named `name`, or `"<original> (Copy)"` when none is given.
    pub fn duplicate(&self, id: &str, name: Option<&str>) -> Result<Document> {
        let original = self.get(id)?;
        let copy = original.duplicate(name);
        tracing::debug!("Duplicating {id} as {}", copy.id);
        self.save(copy)
    }
}

fn read_metadata(path: &Path) -> Result<Document> {
    let bytes = fs::read(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    decode(path, &bytes)
}

fn decode(path: &Path, bytes: &[u8]) -> Result<Document> {
    let mut doc = Document::from_metadata(bytes).map_err(|source| StoreError::Decode {
        path: PathBuf::from(path),
        source,
    })?;
    doc.content.clear();
    doc.location = Location::Local;
    Ok(doc)
}
