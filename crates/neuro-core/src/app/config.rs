//! PipelineConfig - パイプラインが消費する設定
//!
//! - `delta_minutes`: すべてのバックエンドに一律で適用されるスリープ間隔（分）
//! - `backends`: 有効なバックエンド名（順序はワーカーの起動順）

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::BackendName;

/// デシリアライズも `new` を通すので、重複の除去はどちらの経路でも同じ
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawPipelineConfig")]
pub struct PipelineConfig {
    pub delta_minutes: u64,
    pub backends: Vec<BackendName>,
}

#[derive(Deserialize)]
struct RawPipelineConfig {
    delta_minutes: u64,
    backends: Vec<BackendName>,
}

impl From<RawPipelineConfig> for PipelineConfig {
    fn from(raw: RawPipelineConfig) -> Self {
        Self::new(raw.delta_minutes, raw.backends)
    }
}

impl PipelineConfig {
    /// Duplicate names are dropped, keeping the first occurrence.
    pub fn new(delta_minutes: u64, backends: impl IntoIterator<Item = BackendName>) -> Self {
        let mut unique: Vec<BackendName> = Vec::new();
        for name in backends {
            if !unique.contains(&name) {
                unique.push(name);
            }
        }
        Self {
            delta_minutes,
            backends: unique,
        }
    }

    pub fn delta(&self) -> Duration {
        Duration::from_secs(self.delta_minutes.saturating_mul(60))
    }
}
