//! ImageBackend port - 交換可能な画像生成サービス
//!
//! 生成アルゴリズム自体は不透明なリモートサービスとして扱います。
//! ワーカーはバックエンドごとに 1 つ起動されますが、ループ本体は共通です。

use async_trait::async_trait;

use crate::domain::{Article, BackendName, GeneratedImage, GenerationError};

#[async_trait]
pub trait ImageBackend: Send + Sync {
    fn name(&self) -> &BackendName;

    /// Generate an illustration for the article's content.
    async fn generate(&self, article: &Article) -> Result<GeneratedImage, GenerationError>;
}
