//! ShutdownHook port - 終了時に閉じるリソース
//!
//! HTTP サーバ、DB ハンドル、ログファイルなど Supervisor が終了時に片付けるもの。
//! パイプラインのワーカーはここに含めません。

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("{resource}: {message}")]
pub struct ShutdownError {
    pub resource: String,
    pub message: String,
}

impl ShutdownError {
    pub fn new(resource: impl Into<String>, message: impl ToString) -> Self {
        Self {
            resource: resource.into(),
            message: message.to_string(),
        }
    }
}

#[async_trait]
pub trait ShutdownHook: Send + Sync {
    fn name(&self) -> &str;

    async fn shutdown(&self) -> Result<(), ShutdownError>;
}
