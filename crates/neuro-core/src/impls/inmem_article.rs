//! InMemoryArticleSource - 開発・テスト用の記事テーブル
//!
//! # 実装詳細
//! - 挿入順を保持する Vec<Article>（取り込み順 = 取得順）
//! - tokio の Mutex で排他制御（await を跨いでロックを持たない）
//! - fetch_next は記事を消費しない。link が成功するまで同じ記事を返し続ける

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{Article, ArticleId, FetchError, LinkError, StoredImage};
use crate::ports::ArticleSource;

#[derive(Default)]
pub struct InMemoryArticleSource {
    articles: Mutex<Vec<Article>>,
}

impl InMemoryArticleSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_articles(articles: impl IntoIterator<Item = Article>) -> Self {
        Self {
            articles: Mutex::new(articles.into_iter().collect()),
        }
    }

    /// Add an article (ingestion side). Articles are fetched in insertion order.
    pub async fn insert(&self, article: Article) {
        self.articles.lock().await.push(article);
    }

    pub async fn get(&self, id: ArticleId) -> Option<Article> {
        self.articles.lock().await.iter().find(|a| a.id == id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.articles.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.articles.lock().await.is_empty()
    }

    pub async fn linked(&self) -> Vec<Article> {
        self.articles
            .lock()
            .await
            .iter()
            .filter(|a| a.has_image())
            .cloned()
            .collect()
    }
}

#[async_trait]
impl ArticleSource for InMemoryArticleSource {
    async fn fetch_next(&self) -> Result<Article, FetchError> {
        self.articles
            .lock()
            .await
            .iter()
            .find(|a| !a.has_image())
            .cloned()
            .ok_or(FetchError::Exhausted)
    }

    async fn link(&self, image: &StoredImage, article: &Article) -> Result<(), LinkError> {
        let mut articles = self.articles.lock().await;
        let stored = articles
            .iter_mut()
            .find(|a| a.id == article.id)
            .ok_or(LinkError::ArticleNotFound(article.id))?;

        if let Some(existing) = stored.image {
            return Err(LinkError::AlreadyLinked {
                article: stored.id,
                image: existing,
            });
        }
        stored.image = Some(image.id);
        Ok(())
    }
}
