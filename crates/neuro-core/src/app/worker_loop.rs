//! WorkerLoop - バックエンドごとの生成ループ
//!
//! # 状態遷移
//! `WaitingForTurn → Sleeping → RunningCycle → WaitingForTurn`
//!
//! # サイクル（この順で実行し、失敗した段階で打ち切る）
//! 1. ArticleSource::fetch_next() で画像のない記事を取得
//! 2. ImageBackend::generate() で画像を生成
//! 3. ImageStore::persist() で保存（ID 採番）
//! 4. ArticleSource::link() で記事に紐付け
//!
//! 失敗は warn ログにしてそのサイクルを捨てます。サイクル内のリトライ、
//! バックオフ、サーキットブレーカーはありません。次のターンで再挑戦するだけです。
//! 結果にかかわらずターンは必ず返します（TurnPermit の drop）。

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::Instrument;

use crate::domain::{Article, ArticleId, BackendName, ImageId, StageError, StoredImage};
use crate::ports::{ArticleSource, ImageBackend, ImageStore};

use super::status::PipelineStats;
use super::turn::{TurnClosed, TurnToken};

/// Result of one generation cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    Completed { article: ArticleId, image: ImageId },
    Failed(StageError),
}

impl CycleOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, CycleOutcome::Completed { .. })
    }
}

/// One worker per backend. The loop body is the same for every backend.
pub struct PipelineWorker {
    backend: Arc<dyn ImageBackend>,
    source: Arc<dyn ArticleSource>,
    store: Arc<dyn ImageStore>,
    turn: TurnToken,
    delta: Duration,
    stats: Arc<PipelineStats>,
}

impl PipelineWorker {
    pub fn new(
        backend: Arc<dyn ImageBackend>,
        source: Arc<dyn ArticleSource>,
        store: Arc<dyn ImageStore>,
        turn: TurnToken,
        delta: Duration,
        stats: Arc<PipelineStats>,
    ) -> Self {
        Self {
            backend,
            source,
            store,
            turn,
            delta,
            stats,
        }
    }

    pub fn backend_name(&self) -> &BackendName {
        self.backend.name()
    }

    /// Run one cycle without taking the turn. Callers are expected to hold it.
    pub async fn run_cycle(&self) -> CycleOutcome {
        match self.try_cycle().await {
            Ok((article, image)) => CycleOutcome::Completed {
                article: article.id,
                image: image.id,
            },
            Err(err) => CycleOutcome::Failed(err),
        }
    }

    async fn try_cycle(&self) -> Result<(Article, StoredImage), StageError> {
        let article = self.source.fetch_next().await?;
        let generated = self.backend.generate(&article).await?;
        let stored = self.store.persist(generated).await?;
        self.source.link(&stored, &article).await?;
        Ok((article, stored))
    }

    /// One full turn: wait for the token, sleep `delta`, run a cycle, hand the token back.
    ///
    /// `stop` is only observed while waiting and sleeping, and wins over a ready turn.
    /// `Ok(None)` means it fired before the cycle started; once the cycle runs it is not interrupted.
    pub async fn run_turn_until<F>(&self, stop: F) -> Result<Option<CycleOutcome>, TurnClosed>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(stop);

        let permit = tokio::select! {
            biased;
            _ = &mut stop => return Ok(None),
            permit = self.turn.acquire() => permit?,
        };

        tokio::select! {
            biased;
            _ = &mut stop => return Ok(None),
            _ = tokio::time::sleep(self.delta) => {}
        }

        let outcome = self.run_cycle().await;
        self.report(&outcome);
        permit.release();
        Ok(Some(outcome))
    }

    /// Loop until shutdown is requested.
    ///
    /// If the sender side goes away without requesting shutdown, the worker keeps running.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let span = tracing::info_span!("pipeline_worker", backend = %self.backend_name());
        async move {
            tracing::debug!(delta_secs = self.delta.as_secs(), "worker started");
            while !*shutdown.borrow() {
                match self.run_turn_until(stop_requested(&mut shutdown)).await {
                    Ok(Some(_)) => {}
                    Ok(None) => break,
                    Err(err) => {
                        tracing::error!(error = %err, "turn token unavailable, stopping worker");
                        break;
                    }
                }
            }
            tracing::debug!("worker stopped");
        }
        .instrument(span)
        .await
    }

    fn report(&self, outcome: &CycleOutcome) {
        self.stats.record(self.backend_name(), outcome);
        match outcome {
            CycleOutcome::Completed { article, image } => {
                tracing::info!(
                    backend = %self.backend_name(),
                    %article,
                    %image,
                    "article illustrated through {}",
                    self.backend_name()
                );
            }
            CycleOutcome::Failed(err) => {
                tracing::warn!(
                    backend = %self.backend_name(),
                    stage = %err.stage(),
                    error = %err,
                    "pipeline stage failed"
                );
            }
        }
    }
}

/// Resolves once shutdown is requested. Never resolves if the sender is dropped silently.
async fn stop_requested(shutdown: &mut watch::Receiver<bool>) {
    if shutdown.wait_for(|stop| *stop).await.is_err() {
        std::future::pending::<()>().await;
    }
}
