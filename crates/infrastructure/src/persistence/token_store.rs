//! File-based token store.
//!
//! The pair is stored in `<data_dir>/auth_token.json`:
//! ```json
//! {
//!   "token": "eyJhbGciOi...",
//!   "refresh_token": "3f1c2a9e-..."
//! }
//! ```

use std::path::Path;

use async_trait::async_trait;
use gymtrack_application::ports::{FileSystem, StoreError, TokenStore};
use gymtrack_domain::TokenPair;

use super::JsonFile;

/// File name of the stored token pair.
pub const TOKEN_FILE: &str = "auth_token.json";

/// Token store backed by a JSON file.
#[derive(Debug, Clone)]
pub struct FileTokenStore<F> {
    file: JsonFile<F>,
}

impl<F: FileSystem> FileTokenStore<F> {
    /// Creates a store keeping its file in `data_dir`.
    pub fn new(fs: F, data_dir: &Path) -> Self {
        Self {
            file: JsonFile::new(fs, data_dir.join(TOKEN_FILE)),
        }
    }

    /// Location of the token file.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

#[async_trait]
impl<F: FileSystem> TokenStore for FileTokenStore<F> {
    async fn get(&self) -> Option<TokenPair> {
        self.file.load().await
    }

    async fn save(&self, tokens: &TokenPair) -> Result<(), StoreError> {
        self.file.save(tokens).await
    }

    async fn remove(&self) -> Result<(), StoreError> {
        self.file.remove().await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::TokioFileSystem;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_token_path() {
        let store = FileTokenStore::new(TokioFileSystem::new(), Path::new("/data/gymtrack"));
        assert_eq!(store.path(), Path::new("/data/gymtrack/auth_token.json"));
    }

    #[tokio::test]
    async fn test_save_replace_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(TokioFileSystem::new(), dir.path());
        assert_eq!(store.get().await, None);

        store.save(&TokenPair::new("access-1", "refresh-1")).await.unwrap();
        store.save(&TokenPair::new("access-2", "refresh-2")).await.unwrap();
        assert_eq!(store.get().await, Some(TokenPair::new("access-2", "refresh-2")));
        assert_eq!(store.refresh_token().await.as_deref(), Some("refresh-2"));

        store.remove().await.unwrap();
        store.remove().await.unwrap();
        assert_eq!(store.get().await, None);
    }

    #[tokio::test]
    async fn test_corrupt_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(TOKEN_FILE), "{\"token\": 42").unwrap();
        let store = FileTokenStore::new(TokioFileSystem::new(), dir.path());

        assert_eq!(store.get().await, None);
        assert_eq!(store.refresh_token().await, None);
    }

    #[tokio::test]
    async fn test_file_uses_backend_field_names() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(TokioFileSystem::new(), dir.path());
        store.save(&TokenPair::new("a", "r")).await.unwrap();

        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(raw, "{\n  \"token\": \"a\",\n  \"refresh_token\": \"r\"\n}\n");
    }
}
