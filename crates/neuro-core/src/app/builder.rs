//! PipelineBuilder - パイプラインの構築とワイヤリング
//!
//! # Fail-fast 設計
//! - register() でバックエンドを登録
//! - config() で有効なバックエンド名と delta を設定
//! - build() 時に「有効集合 ⊆ 登録済み集合」をチェックし、不足があれば BuildError
//!
//! 登録されているが有効でないバックエンドはワーカーを持ちません。

use std::sync::Arc;

use crate::domain::BackendName;
use crate::ports::{ArticleSource, ImageBackend, ImageStore};

use super::config::PipelineConfig;
use super::registry::{BackendRegistry, RegistryError};
use super::status::PipelineStats;
use super::turn::TurnToken;
use super::worker_group::WorkerGroup;
use super::worker_loop::PipelineWorker;

/// # 使用例
/// ```ignore
/// let pipeline = PipelineBuilder::new()
///     .register(Arc::new(kandinsky))?
///     .register(Arc::new(fruity))?
///     .source(source)
///     .store(store)
///     .config(PipelineConfig::new(1, names))
///     .build()?;
/// let workers = pipeline.spawn();
/// ```
pub struct PipelineBuilder {
    registry: BackendRegistry,
    config: Option<PipelineConfig>,
    source: Option<Arc<dyn ArticleSource>>,
    store: Option<Arc<dyn ImageStore>>,
    stats: Option<Arc<PipelineStats>>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    #[error("no backend is enabled")]
    NoBackends,

    #[error("missing backends: {0:?}. These backends were enabled but not registered.")]
    MissingBackends(Vec<BackendName>),

    #[error("article source is not set")]
    MissingSource,

    #[error("image store is not set")]
    MissingStore,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self {
            registry: BackendRegistry::new(),
            config: None,
            source: None,
            store: None,
            stats: None,
        }
    }

    pub fn register(mut self, backend: Arc<dyn ImageBackend>) -> Result<Self, RegistryError> {
        self.registry.register(backend)?;
        Ok(self)
    }

    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn source(mut self, source: Arc<dyn ArticleSource>) -> Self {
        self.source = Some(source);
        self
    }

    pub fn store(mut self, store: Arc<dyn ImageStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Share counters with the caller. A fresh instance is used otherwise.
    pub fn stats(mut self, stats: Arc<PipelineStats>) -> Self {
        self.stats = Some(stats);
        self
    }

    /// Validate the wiring and create one worker per enabled backend, all sharing one TurnToken.
    pub fn build(self) -> Result<Pipeline, BuildError> {
        let config = self.config.unwrap_or_else(|| PipelineConfig::new(1, Vec::new()));
        if config.backends.is_empty() {
            return Err(BuildError::NoBackends);
        }

        let missing: Vec<BackendName> = config
            .backends
            .iter()
            .filter(|name| self.registry.get(name).is_none())
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(BuildError::MissingBackends(missing));
        }

        let source = self.source.ok_or(BuildError::MissingSource)?;
        let store = self.store.ok_or(BuildError::MissingStore)?;
        let stats = self.stats.unwrap_or_default();
        let turn = TurnToken::new();

        for name in self.registry.names() {
            if !config.backends.contains(&name) {
                tracing::debug!(backend = %name, "backend registered but not enabled");
            }
        }

        let workers = config
            .backends
            .iter()
            .filter_map(|name| self.registry.get(name))
            .map(|backend| {
                PipelineWorker::new(
                    backend,
                    Arc::clone(&source),
                    Arc::clone(&store),
                    turn.clone(),
                    config.delta(),
                    Arc::clone(&stats),
                )
            })
            .collect();

        Ok(Pipeline {
            workers,
            turn,
            stats,
        })
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Built pipeline, ready to spawn.
pub struct Pipeline {
    workers: Vec<PipelineWorker>,
    turn: TurnToken,
    stats: Arc<PipelineStats>,
}

impl Pipeline {
    pub fn backends(&self) -> Vec<BackendName> {
        self.workers.iter().map(|w| w.backend_name().clone()).collect()
    }

    pub fn stats(&self) -> Arc<PipelineStats> {
        Arc::clone(&self.stats)
    }

    pub fn turn(&self) -> TurnToken {
        self.turn.clone()
    }

    /// Launch every worker as an independent task.
    pub fn spawn(self) -> WorkerGroup {
        tracing::info!(backends = ?self.backends(), "starting image generation pipeline");
        WorkerGroup::spawn(self.workers)
    }
}
