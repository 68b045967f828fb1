//! ArticleSource port - 記事の取得と画像の紐付け
//!
//! リポジトリ/サービス層が実装する外部コラボレータです。
//! 一貫性（トランザクション）は実装側の責務で、この層では追加のロックを取りません。

use async_trait::async_trait;

use crate::domain::{Article, FetchError, LinkError, StoredImage};

#[async_trait]
pub trait ArticleSource: Send + Sync {
    /// Next article that has no image yet.
    ///
    /// Fetching does not consume the article: until a link succeeds,
    /// consecutive calls may return the same article again.
    async fn fetch_next(&self) -> Result<Article, FetchError>;

    /// Associate a persisted image with the article.
    ///
    /// Either the link is written completely or not at all.
    async fn link(&self, image: &StoredImage, article: &Article) -> Result<(), LinkError>;
}
