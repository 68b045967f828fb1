//! Telemetry - tracing subscriber の初期化
//!
//! - development: コンソール + ログファイル（debug 以上）
//! - production: ログファイルのみ（warn 以上）
//!
//! `RUST_LOG` があればそちらが優先されます。

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use neuro_core::ports::{ShutdownError, ShutdownHook};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::cli::LogMode;

impl LogMode {
    fn default_filter(self) -> &'static str {
        match self {
            LogMode::Development => "debug",
            LogMode::Production => "warn",
        }
    }
}

/// Install the global subscriber. Returns the log file so it can be closed on exit.
pub fn init(mode: LogMode, path: &Path) -> anyhow::Result<LogFile> {
    let log_file = LogFile::open(path)?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(mode.default_filter()));

    let file_layer = fmt::layer()
        .with_ansi(false)
        .with_writer(Arc::clone(&log_file.file));
    let console_layer = (mode == LogMode::Development).then(|| fmt::layer());

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .context("failed to install tracing subscriber")?;

    Ok(log_file)
}

/// Append-only log file shared with the subscriber.
#[derive(Clone)]
pub struct LogFile {
    path: PathBuf,
    file: Arc<File>,
}

impl LogFile {
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("failed to create log directory {}", dir.display()))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("failed to open log file {}", path.display()))?;
        Ok(Self {
            path: path.to_path_buf(),
            file: Arc::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ShutdownHook for LogFile {
    fn name(&self) -> &str {
        "log_file"
    }

    async fn shutdown(&self) -> Result<(), ShutdownError> {
        let file = Arc::clone(&self.file);
        tokio::task::spawn_blocking(move || file.sync_all())
            .await
            .map_err(|e| ShutdownError::new(self.name(), e))?
            .map_err(|e| ShutdownError::new(self.name(), e))
    }
}
