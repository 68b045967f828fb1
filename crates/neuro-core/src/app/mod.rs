//! App - アプリケーション層
//!
//! ports を組み合わせてバックグラウンド生成パイプラインを実装します。
//!
//! # 主要コンポーネント
//! - **TurnToken**: 全ワーカーで共有する容量 1 のターン
//! - **PipelineWorker**: バックエンドごとのループ（ターン待ち → スリープ → サイクル）
//! - **PipelineBuilder**: 起動時検証つきのワイヤリング
//! - **WorkerGroup**: 起動したワーカー task のハンドル
//! - **Supervisor**: 終了シグナルとリソースの後片付け

pub mod builder;
pub mod config;
pub mod registry;
pub mod status;
pub mod supervisor;
pub mod turn;
pub mod worker_group;
pub mod worker_loop;

#[cfg(test)]
mod pipeline_tests;

// 主要な型を再エクスポート
pub use self::builder::{BuildError, Pipeline, PipelineBuilder};
pub use self::config::PipelineConfig;
pub use self::registry::{BackendRegistry, RegistryError};
pub use self::status::{CycleCounts, PipelineStats};
pub use self::supervisor::{ShutdownReason, Supervisor};
pub use self::turn::{TurnClosed, TurnPermit, TurnToken};
pub use self::worker_group::WorkerGroup;
pub use self::worker_loop::{CycleOutcome, PipelineWorker};
