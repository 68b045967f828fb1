use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::domain::BackendName;

use super::worker_loop::PipelineWorker;

/// Handle over the spawned pipeline workers.
/// - `request_shutdown()` でターン待ち・スリープ中のワーカーが止まる
/// - `shutdown_and_join()` で全ワーカーの終了を待てる
/// - `abandon()` は停止を依頼するだけで待たない（プロセス終了時用）
pub struct WorkerGroup {
    shutdown_tx: watch::Sender<bool>,
    workers: Vec<(BackendName, JoinHandle<()>)>,
}

impl WorkerGroup {
    /// Spawn each worker as an independent task.
    pub fn spawn(workers: Vec<PipelineWorker>) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let workers = workers
            .into_iter()
            .map(|worker| {
                let name = worker.backend_name().clone();
                let rx = shutdown_rx.clone();
                (name, tokio::spawn(worker.run(rx)))
            })
            .collect();

        Self {
            shutdown_tx,
            workers,
        }
    }

    pub fn backends(&self) -> Vec<BackendName> {
        self.workers.iter().map(|(name, _)| name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    /// Ask every worker to stop taking turns.
    /// This does not interrupt a cycle that is already running.
    pub fn request_shutdown(&self) {
        // ignore send error: every worker may already be gone
        let _ = self.shutdown_tx.send(true);
    }

    /// Shutdown and wait for all workers.
    pub async fn shutdown_and_join(self) {
        self.request_shutdown();
        for (name, join) in self.workers {
            if let Err(err) = join.await {
                tracing::warn!(backend = %name, error = %err, "pipeline worker ended abnormally");
            }
        }
    }

    /// Request shutdown and detach from the workers without waiting.
    pub fn abandon(self) {
        self.request_shutdown();
        // sender を drop しても送信済みの true は受信側から見える
        let Self { workers, .. } = self;
        for (name, join) in workers {
            if !join.is_finished() {
                tracing::debug!(backend = %name, "leaving pipeline worker to finish on its own");
            }
        }
    }
}
