use crate::domain_port::*;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Writes uploaded photos into one flat directory served under `/uploads`.
pub struct FsPhotoStore {
    dir: PathBuf,
}

impl FsPhotoStore {
    pub async fn try_new(dir: impl Into<PathBuf>) -> Result<Self, PhotoStoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await?;
        Ok(FsPhotoStore { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait::async_trait]
impl PhotoStore for FsPhotoStore {
    async fn save(&self, original_name: &str, bytes: &[u8]) -> Result<String, PhotoStoreError> {
        let file_name = unique_file_name(original_name)?;
        fs::write(self.dir.join(&file_name), bytes).await?;
        tracing::debug!(file_name = %file_name, size = bytes.len(), "photo stored");
        Ok(file_name)
    }

    async fn remove(&self, file_name: &str) -> Result<(), PhotoStoreError> {
        let file_name = sanitize_file_name(file_name).ok_or(PhotoStoreError::InvalidName)?;
        match fs::remove_file(self.dir.join(file_name)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
