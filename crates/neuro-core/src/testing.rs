//! Test doubles shared by the app-level tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use ulid::Ulid;

use crate::app::PipelineStats;
use crate::domain::{
    Article, ArticleId, BackendName, FetchError, GeneratedImage, GenerationError, ImagePayload,
    LinkError, PersistError, Publication, StoredImage,
};
use crate::impls::InMemoryArticleSource;
use crate::ports::{ArticleSource, ImageBackend, ImageStore};

pub fn name(raw: &str) -> BackendName {
    BackendName::new(raw).unwrap()
}

pub fn article(title: &str) -> Article {
    Article {
        id: ArticleId::from_ulid(Ulid::new()),
        title: title.into(),
        body: format!("{title} body"),
        category: "world".into(),
        publication: Publication {
            source_url: format!("https://news.example.com/{title}"),
            published_at: Utc::now(),
        },
        image: None,
    }
}

pub fn articles(n: usize) -> Vec<Article> {
    (0..n).map(|i| article(&format!("article-{i}"))).collect()
}

/// Backend that succeeds or fails on demand and tracks how many calls overlap.
pub struct ScriptedBackend {
    name: BackendName,
    fail: bool,
    jitter_us: u64,
    calls: AtomicUsize,
    active: Arc<AtomicUsize>,
    max_active: Arc<AtomicUsize>,
}

impl ScriptedBackend {
    pub fn ok(raw: &str) -> Self {
        Self::build(raw, false)
    }

    pub fn failing(raw: &str) -> Self {
        Self::build(raw, true)
    }

    fn build(raw: &str, fail: bool) -> Self {
        Self {
            name: name(raw),
            fail,
            jitter_us: 0,
            calls: AtomicUsize::new(0),
            active: Arc::new(AtomicUsize::new(0)),
            max_active: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Random in-call delay up to `max_us`, to shake out overlapping cycles.
    pub fn with_jitter(mut self, max_us: u64) -> Self {
        self.jitter_us = max_us;
        self
    }

    /// Share overlap counters between several backends.
    pub fn sharing(mut self, active: Arc<AtomicUsize>, max_active: Arc<AtomicUsize>) -> Self {
        self.active = active;
        self.max_active = max_active;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageBackend for ScriptedBackend {
    fn name(&self) -> &BackendName {
        &self.name
    }

    async fn generate(&self, article: &Article) -> Result<GeneratedImage, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now, Ordering::SeqCst);

        if self.jitter_us > 0 {
            let delay = rand::random::<u64>() % self.jitter_us;
            tokio::time::sleep(Duration::from_micros(delay)).await;
        } else {
            tokio::task::yield_now().await;
        }

        self.active.fetch_sub(1, Ordering::SeqCst);

        if self.fail {
            return Err(GenerationError::Rejected {
                status: 503,
                message: "backend down".into(),
            });
        }
        Ok(GeneratedImage {
            payload: ImagePayload::Inline {
                bytes: article.id.to_string().into_bytes(),
                content_type: "image/png".into(),
            },
            backend: self.name.clone(),
            created_at: Utc::now(),
        })
    }
}

pub struct FailingStore;

#[async_trait]
impl ImageStore for FailingStore {
    async fn persist(&self, _image: GeneratedImage) -> Result<StoredImage, PersistError> {
        Err(PersistError::Unavailable("disk full".into()))
    }
}

pub struct FailingFetchSource;

#[async_trait]
impl ArticleSource for FailingFetchSource {
    async fn fetch_next(&self) -> Result<Article, FetchError> {
        Err(FetchError::Unavailable("connection refused".into()))
    }

    async fn link(&self, _image: &StoredImage, _article: &Article) -> Result<(), LinkError> {
        unreachable!("link must not be reached after a failed fetch")
    }
}

/// Real in-memory source whose `link` always fails. Remembers what it handed out.
pub struct FailingLinkSource {
    inner: InMemoryArticleSource,
    fetched: Mutex<Vec<ArticleId>>,
}

impl FailingLinkSource {
    pub fn new(articles: Vec<Article>) -> Self {
        Self {
            inner: InMemoryArticleSource::with_articles(articles),
            fetched: Mutex::new(Vec::new()),
        }
    }

    pub fn fetched(&self) -> Vec<ArticleId> {
        self.fetched.lock().unwrap().clone()
    }

    pub fn inner(&self) -> &InMemoryArticleSource {
        &self.inner
    }
}

#[async_trait]
impl ArticleSource for FailingLinkSource {
    async fn fetch_next(&self) -> Result<Article, FetchError> {
        let article = self.inner.fetch_next().await?;
        self.fetched.lock().unwrap().push(article.id);
        Ok(article)
    }

    async fn link(&self, _image: &StoredImage, _article: &Article) -> Result<(), LinkError> {
        Err(LinkError::Unavailable("deadlock detected".into()))
    }
}

/// Poll `stats` until `done` holds; panics after five seconds.
pub async fn wait_for(stats: &PipelineStats, done: impl Fn(&PipelineStats) -> bool) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while !done(stats) {
        assert!(
            tokio::time::Instant::now() < deadline,
            "timed out waiting for pipeline progress: {:?}",
            stats.snapshot()
        );
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
}
