//! Store configuration and storage root resolution

use std::path::{Path, PathBuf};

use directories::BaseDirs;

use super::error::{Result, StoreError};

/// Subdirectory created under the user data location
pub const APP_DIR_NAME: &str = "excaliapp";

/// Environment variable that overrides the resolved storage root
pub const STORAGE_DIR_ENV: &str = "EXCALIAPP_DIR";

/// What `list` does when a metadata file fails to decode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MalformedPolicy {
    /// Fail the whole listing with the decode error
    #[default]
    Abort,
    /// Log the decode error and continue with the remaining files
    Skip,
}

/// Store configuration
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Directory holding every document's file pair
    pub root: PathBuf,
    /// Listing behaviour for malformed metadata
    pub malformed: MalformedPolicy,
}

impl StoreConfig {
    /// Use an explicit storage root.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            malformed: MalformedPolicy::default(),
        }
    }

    /// Resolve the storage root from the environment and platform defaults.
    ///
    /// `EXCALIAPP_DIR` wins outright. Otherwise the root is
    /// `$XDG_DATA_HOME/excaliapp`, falling back to the platform user config
    /// directory plus `excaliapp` when `XDG_DATA_HOME` is unset or empty.
    pub fn resolve() -> Result<Self> {
        if let Some(dir) = non_empty_env(STORAGE_DIR_ENV) {
            return Ok(Self::with_root(dir));
        }
        Ok(Self::with_root(user_data_dir()?.join(APP_DIR_NAME)))
    }

    pub fn malformed(mut self, policy: MalformedPolicy) -> Self {
        self.malformed = policy;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

fn non_empty_env(key: &str) -> Option<PathBuf> {
    std::env::var_os(key)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

/// Base directory for application data.
fn user_data_dir() -> Result<PathBuf> {
    if let Some(dir) = non_empty_env("XDG_DATA_HOME") {
        return Ok(dir);
    }
    BaseDirs::new()
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or(StoreError::NoStorageRoot)
}
