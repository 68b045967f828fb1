//! ImageStore port - 生成画像の永続化

use async_trait::async_trait;

use crate::domain::{GeneratedImage, PersistError, StoredImage};

/// Persists generated images and assigns their identifiers.
///
/// A persisted image is never modified afterwards. An image that gets persisted
/// but never linked is an inert leftover, not a corruption.
#[async_trait]
pub trait ImageStore: Send + Sync {
    async fn persist(&self, image: GeneratedImage) -> Result<StoredImage, PersistError>;
}
