//! Status - バックエンドごとのサイクル集計
//!
//! ワーカーがサイクルを終えるたびに記録します。終了時のログとテストで使います。

use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use crate::domain::{BackendName, Stage};

use super::worker_loop::CycleOutcome;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleCounts {
    pub completed: u64,
    pub failed_fetch: u64,
    pub failed_generate: u64,
    pub failed_persist: u64,
    pub failed_link: u64,
}

impl CycleCounts {
    pub fn failed(&self) -> u64 {
        self.failed_fetch + self.failed_generate + self.failed_persist + self.failed_link
    }

    pub fn total(&self) -> u64 {
        self.completed + self.failed()
    }

    pub fn failed_at(&self, stage: Stage) -> u64 {
        match stage {
            Stage::Fetch => self.failed_fetch,
            Stage::Generate => self.failed_generate,
            Stage::Persist => self.failed_persist,
            Stage::Link => self.failed_link,
        }
    }

    fn record(&mut self, outcome: &CycleOutcome) {
        match outcome {
            CycleOutcome::Completed { .. } => self.completed += 1,
            CycleOutcome::Failed(err) => match err.stage() {
                Stage::Fetch => self.failed_fetch += 1,
                Stage::Generate => self.failed_generate += 1,
                Stage::Persist => self.failed_persist += 1,
                Stage::Link => self.failed_link += 1,
            },
        }
    }
}

/// Per-backend counters shared by all workers.
#[derive(Debug, Default)]
pub struct PipelineStats {
    counts: Mutex<BTreeMap<BackendName, CycleCounts>>,
}

impl PipelineStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, backend: &BackendName, outcome: &CycleOutcome) {
        // カウンタしか持たないので poison されても中身はそのまま使える
        let mut counts = self.counts.lock().unwrap_or_else(PoisonError::into_inner);
        counts.entry(backend.clone()).or_default().record(outcome);
    }

    pub fn snapshot(&self) -> BTreeMap<BackendName, CycleCounts> {
        self.counts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn for_backend(&self, backend: &BackendName) -> CycleCounts {
        self.counts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(backend)
            .copied()
            .unwrap_or_default()
    }

    pub fn totals(&self) -> CycleCounts {
        let counts = self.counts.lock().unwrap_or_else(PoisonError::into_inner);
        counts.values().fold(CycleCounts::default(), |acc, c| CycleCounts {
            completed: acc.completed + c.completed,
            failed_fetch: acc.failed_fetch + c.failed_fetch,
            failed_generate: acc.failed_generate + c.failed_generate,
            failed_persist: acc.failed_persist + c.failed_persist,
            failed_link: acc.failed_link + c.failed_link,
        })
    }
}
