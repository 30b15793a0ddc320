//! On-disk layout of the document store: file naming and file operations

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use super::error::{Result, StoreError};

/// Suffix of a document's metadata file
pub const METADATA_SUFFIX: &str = ".i.json";
/// Suffix of a document's content file
pub const CONTENT_SUFFIX: &str = ".excalidraw";

const TEMP_SUFFIX: &str = ".tmp";

/// Paths of one document's metadata and content files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePair {
    pub metadata: PathBuf,
    pub content: PathBuf,
}

impl FilePair {
    /// Build the pair for `id` under `root`, rejecting ids that are not plain file stems
    pub fn new(root: &Path, id: &str) -> Result<Self> {
        validate_id(id)?;
        Ok(Self {
            metadata: root.join(format!("{id}{METADATA_SUFFIX}")),
            content: root.join(format!("{id}{CONTENT_SUFFIX}")),
        })
    }

    pub fn is_complete(&self) -> bool {
        self.metadata.is_file() && self.content.is_file()
    }
}

fn validate_id(id: &str) -> Result<()> {
    let bad = id.is_empty()
        || id == "."
        || id == ".."
        || id.chars().any(|c| c == '/' || c == '\\' || c == '\0');
    if bad {
        return Err(StoreError::InvalidId(id.to_string()));
    }
    Ok(())
}

/// Check if a path follows the metadata file naming convention
pub fn is_metadata_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.len() > METADATA_SUFFIX.len() && name.ends_with(METADATA_SUFFIX))
        .unwrap_or(false)
}

/// Create the storage directory if it does not exist yet
pub fn ensure_dir(path: &Path) -> io::Result<()> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o755);
    }
    builder.create(path)
}

/// Metadata files directly inside `root`, in directory order.
///
/// Symlinked records are followed. Temporary files left by an interrupted
/// write do not match the naming convention and are skipped. A record whose
/// link cannot be resolved is still returned so reading it reports the error.
pub fn metadata_files(root: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).min_depth(1).max_depth(1).follow_links(true) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() > 0 => {
                if let Some(path) = e.path().filter(|p| is_metadata_file(p)) {
                    files.push(path.to_path_buf());
                }
                continue;
            }
            Err(e) => return Err(io::Error::from(e)),
        };
        if !entry.file_type().is_dir() && is_metadata_file(entry.path()) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Replace the file at `path` with `bytes`.
///
/// The bytes go to a sibling temporary file which is then renamed over the
/// target, so readers see either the old file or the new one in full.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let tmp = temp_path(path);
    let result = (|| {
        let mut file = fs::File::create(&tmp)?;
        file.write_all(bytes)?;
        file.sync_all()?;
        fs::rename(&tmp, path)
    })();
    if result.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    result
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(TEMP_SUFFIX);
    path.with_file_name(name)
}
