//! File-based user store, `<data_dir>/user.json`.

use std::path::Path;

use async_trait::async_trait;
use gymtrack_application::ports::{FileSystem, StoreError, UserStore};
use gymtrack_domain::UserDto;

use super::JsonFile;

/// File name of the stored user record.
pub const USER_FILE: &str = "user.json";

/// User store backed by a JSON file.
#[derive(Debug, Clone)]
pub struct FileUserStore<F> {
    file: JsonFile<F>,
}

impl<F: FileSystem> FileUserStore<F> {
    /// Creates a store keeping its file in `data_dir`.
    pub fn new(fs: F, data_dir: &Path) -> Self {
        Self {
            file: JsonFile::new(fs, data_dir.join(USER_FILE)),
        }
    }
}

#[async_trait]
impl<F: FileSystem> UserStore for FileUserStore<F> {
    async fn get(&self) -> Option<UserDto> {
        self.file.load().await
    }

    async fn save(&self, user: &UserDto) -> Result<(), StoreError> {
        self.file.save(user).await
    }

    async fn remove(&self) -> Result<(), StoreError> {
        self.file.remove().await
    }
}
