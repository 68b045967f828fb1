//! InMemoryImageStore - 開発・テスト用の画像ストア
//!
//! 永続化時に IdGenerator で ImageId を採番します。
//! 一度保存した画像は変更しません（上書き API を持たない）。

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{GeneratedImage, ImageId, PersistError, StoredImage};
use crate::ports::{IdGenerator, ImageStore, SystemClock, UlidGenerator};

pub struct InMemoryImageStore {
    images: Mutex<HashMap<ImageId, StoredImage>>,
    ids: Arc<dyn IdGenerator>,
}

impl InMemoryImageStore {
    pub fn new() -> Self {
        Self::with_id_generator(Arc::new(UlidGenerator::new(SystemClock)))
    }

    pub fn with_id_generator(ids: Arc<dyn IdGenerator>) -> Self {
        Self {
            images: Mutex::new(HashMap::new()),
            ids,
        }
    }

    pub async fn get(&self, id: ImageId) -> Option<StoredImage> {
        self.images.lock().await.get(&id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.images.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.images.lock().await.is_empty()
    }

    pub async fn all(&self) -> Vec<StoredImage> {
        self.images.lock().await.values().cloned().collect()
    }
}

impl Default for InMemoryImageStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageStore for InMemoryImageStore {
    async fn persist(&self, image: GeneratedImage) -> Result<StoredImage, PersistError> {
        if image.payload.is_empty() {
            return Err(PersistError::EmptyPayload);
        }

        let id = self.ids.generate_image_id();
        let stored = StoredImage { id, image };

        let mut images = self.images.lock().await;
        if images.contains_key(&id) {
            return Err(PersistError::Duplicate(id));
        }
        images.insert(id, stored.clone());
        Ok(stored)
    }
}
