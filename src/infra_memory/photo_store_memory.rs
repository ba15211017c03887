use crate::domain_port::*;
use dashmap::DashMap;

/// Keeps uploaded photos in memory; used with the `fake` user backend.
#[derive(Default)]
pub struct MemoryPhotoStore {
    photos: DashMap<String, Vec<u8>>,
}

impl MemoryPhotoStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, file_name: &str) -> Option<Vec<u8>> {
        self.photos.get(file_name).map(|e| e.value().clone())
    }

    pub fn len(&self) -> usize {
        self.photos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.photos.is_empty()
    }
}

#[async_trait::async_trait]
impl PhotoStore for MemoryPhotoStore {
    async fn save(&self, original_name: &str, bytes: &[u8]) -> Result<String, PhotoStoreError> {
        let file_name = unique_file_name(original_name)?;
        self.photos.insert(file_name.clone(), bytes.to_vec());
        Ok(file_name)
    }

    async fn remove(&self, file_name: &str) -> Result<(), PhotoStoreError> {
        self.photos.remove(file_name);
        Ok(())
    }
}
