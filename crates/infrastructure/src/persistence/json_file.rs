//! A single JSON record kept in one file.

use std::path::{Path, PathBuf};

use gymtrack_application::ports::{FileSystem, FileSystemError, StoreError};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::serialization::{from_json_bytes, to_json_stable_bytes};

/// Converts `FileSystemError` to `StoreError`.
fn to_store_error(e: FileSystemError) -> StoreError {
    match e {
        FileSystemError::Io(io_err) => StoreError::from(io_err),
        other => StoreError::Io(other.to_string()),
    }
}

/// One record serialized as stable JSON at a fixed path.
///
/// A missing file reads as `None`. So does a file that cannot be read or
/// parsed; that case is logged and left on disk for inspection.
#[derive(Debug, Clone)]
pub struct JsonFile<F> {
    fs: F,
    path: PathBuf,
}

impl<F: FileSystem> JsonFile<F> {
    /// Creates a record stored at `path`.
    pub const fn new(fs: F, path: PathBuf) -> Self {
        Self { fs, path }
    }

    /// Location of the record.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the record.
    pub async fn load<T: DeserializeOwned>(&self) -> Option<T> {
        let bytes = match self.fs.read_file(&self.path).await {
            Ok(bytes) => bytes,
            Err(FileSystemError::NotFound(_)) => return None,
            Err(error) => {
                warn!(path = %self.path.display(), %error, "could not read stored record");
                return None;
            }
        };

        match from_json_bytes(&bytes) {
            Ok(value) => Some(value),
            Err(error) => {
                warn!(path = %self.path.display(), %error, "ignoring corrupt stored record");
                None
            }
        }
    }

    /// Replaces the record.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be serialized or written.
    pub async fn save<T: Serialize + Sync>(&self, value: &T) -> Result<(), StoreError> {
        let content =
            to_json_stable_bytes(value).map_err(|e| StoreError::Serialization(e.to_string()))?;
        self.fs
            .write_file(&self.path, &content)
            .await
            .map_err(to_store_error)
    }

    /// Deletes the record. Deleting an absent record succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be removed.
    pub async fn remove(&self) -> Result<(), StoreError> {
        if !self.fs.exists(&self.path).await {
            return Ok(());
        }
        self.fs.remove_file(&self.path).await.map_err(to_store_error)
    }
}
