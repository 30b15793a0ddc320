//! Error types for the document store

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors returned by [`DocumentStore`](super::store::DocumentStore) operations
#[derive(Debug, Error)]
pub enum StoreError {
    /// The storage directory could not be located, created, or read
    #[error("storage directory unavailable: {path}")]
    StorageUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The platform offers no user data or config directory
    #[error("could not determine a storage directory for this platform")]
    NoStorageRoot,

    /// The requested document, or one half of its file pair, is missing
    #[error("document {id} not found: {}", path.display())]
    NotFound {
        id: String,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A metadata file exists but is not a valid record
    #[error("failed to decode metadata file {}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A metadata record could not be serialized
    #[error("failed to encode metadata for document {id}")]
    Encode {
        id: String,
        #[source]
        source: serde_json::Error,
    },

    /// A content file holds bytes that are not valid UTF-8
    #[error("content of document {id} is not valid UTF-8: {}", path.display())]
    InvalidContent {
        id: String,
        path: PathBuf,
        #[source]
        source: std::string::FromUtf8Error,
    },

    /// The id cannot be used as a file name stem
    #[error("invalid document id: {0:?}")]
    InvalidId(String),

    /// Any other read, write, or remove failure
    #[error("i/o error on {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl StoreError {
    /// Classify an I/O error on one half of a document's file pair.
    pub(crate) fn from_io(id: &str, path: PathBuf, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            Self::NotFound {
                id: id.to_string(),
                path,
                source,
            }
        } else {
            Self::Io { path, source }
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
