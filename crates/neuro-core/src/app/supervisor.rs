//! Supervisor - 起動と終了のライフサイクル
//!
//! # 終了トリガ（先に来たほうが勝つ）
//! - プロセス全体のキャンセル（`run_until` に渡す future）
//! - OS シグナル（SIGINT / SIGTERM）
//!
//! # 終了時の動作
//! 1. ワーカーに停止を依頼するが待たない（実行中のサイクルは走りきるか、プロセスと一緒に捨てられる）
//! 2. ShutdownHook を登録と逆順に実行（HTTP サーバ → DB → ログファイル のように後から開いたものから閉じる）
//!
//! フックの失敗はログに残すだけで、残りのフックは必ず実行します。

use std::future::Future;
use std::sync::Arc;

use crate::ports::ShutdownHook;

use super::status::PipelineStats;
use super::worker_group::WorkerGroup;

/// What ended the supervisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    /// The process-wide cancellation fired.
    Cancelled,
    /// Interrupt or terminate signal from the OS.
    Signal(&'static str),
}

pub struct Supervisor {
    workers: WorkerGroup,
    hooks: Vec<Arc<dyn ShutdownHook>>,
    stats: Option<Arc<PipelineStats>>,
}

impl Supervisor {
    pub fn new(workers: WorkerGroup) -> Self {
        Self {
            workers,
            hooks: Vec::new(),
            stats: None,
        }
    }

    /// Register a resource to close on exit. Hooks run in reverse registration order.
    pub fn with_hook(mut self, hook: Arc<dyn ShutdownHook>) -> Self {
        self.hooks.push(hook);
        self
    }

    /// Log a per-backend summary on exit.
    pub fn with_stats(mut self, stats: Arc<PipelineStats>) -> Self {
        self.stats = Some(stats);
        self
    }

    /// Run until an OS termination signal arrives.
    pub async fn run(self) -> ShutdownReason {
        self.run_until(std::future::pending::<()>()).await
    }

    /// Run until `cancel` resolves or an OS termination signal arrives, then shut down.
    pub async fn run_until<F>(self, cancel: F) -> ShutdownReason
    where
        F: Future<Output = ()>,
    {
        let reason = tokio::select! {
            _ = cancel => {
                tracing::warn!("context cancelled, initiating shutdown");
                ShutdownReason::Cancelled
            }
            signal = termination_signal() => {
                tracing::warn!(signal, "signal received, initiating shutdown");
                ShutdownReason::Signal(signal)
            }
        };
        self.shutdown().await;
        reason
    }

    async fn shutdown(self) {
        let Self {
            workers,
            hooks,
            stats,
        } = self;

        workers.abandon();

        for hook in hooks.iter().rev() {
            match hook.shutdown().await {
                Ok(()) => tracing::info!(resource = hook.name(), "resource closed"),
                Err(err) => tracing::error!(resource = hook.name(), error = %err, "failed to close resource"),
            }
        }

        if let Some(stats) = stats {
            for (backend, counts) in stats.snapshot() {
                tracing::info!(
                    %backend,
                    completed = counts.completed,
                    failed = counts.failed(),
                    "pipeline summary"
                );
            }
        }
    }
}

/// Resolves with the signal name on SIGINT or SIGTERM.
/// If no handler can be installed, never resolves.
async fn termination_signal() -> &'static str {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => tokio::select! {
                _ = interrupt() => "interrupt",
                _ = terminate.recv() => "terminate",
            },
            Err(err) => {
                tracing::warn!(error = %err, "cannot listen for SIGTERM, only handling interrupt");
                interrupt().await;
                "interrupt"
            }
        }
    }

    #[cfg(not(unix))]
    {
        interrupt().await;
        "interrupt"
    }
}

async fn interrupt() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "cannot listen for interrupt signal");
        std::future::pending::<()>().await;
    }
}
