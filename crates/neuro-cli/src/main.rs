//! neuro-news - 記事に挿絵を付けるバックグラウンドパイプライン
//!
//! 設定の読み込み → ログ初期化 → バックエンド構築 → ワーカー起動 → シグナル待ち

mod cli;
mod seed;
mod telemetry;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use clap::Parser;
use neuro_core::app::{PipelineBuilder, PipelineConfig, Supervisor};
use neuro_core::domain::BackendName;
use neuro_core::impls::{
    HttpBackendConfig, HttpImageBackend, InMemoryArticleSource, InMemoryImageStore,
    StaticImageBackend,
};
use neuro_core::ports::{ImageBackend, SystemClock, UlidGenerator};

use crate::cli::{Cli, api_key_env};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let log_file = telemetry::init(cli.log_mode, &cli.log_file)?;

    let config = PipelineConfig::new(cli.delta_minutes, cli.backends.iter().cloned());
    tracing::info!(
        delta_minutes = config.delta_minutes,
        backends = ?config.backends,
        offline = cli.offline,
        log_file = %log_file.path().display(),
        "configuration loaded"
    );

    let source = Arc::new(InMemoryArticleSource::new());
    if let Some(path) = &cli.articles {
        let articles = seed::load(path, &UlidGenerator::new(SystemClock), &SystemClock)?;
        tracing::info!(count = articles.len(), path = %path.display(), "articles seeded");
        for article in articles {
            source.insert(article).await;
        }
    }
    if source.is_empty().await {
        tracing::warn!("article source is empty, every turn will end at the fetch stage");
    }

    let mut builder = PipelineBuilder::new()
        .source(source)
        .store(Arc::new(InMemoryImageStore::new()));
    for name in &config.backends {
        builder = builder
            .register(backend(&cli, name)?)
            .context("backend registration failed")?;
    }

    let pipeline = builder
        .config(config)
        .build()
        .context("pipeline wiring failed")?;
    let stats = pipeline.stats();
    let workers = pipeline.spawn();

    let reason = Supervisor::new(workers)
        .with_hook(Arc::new(log_file))
        .with_stats(stats)
        .run()
        .await;
    tracing::info!(?reason, "shutdown complete");

    Ok(())
}

fn backend(cli: &Cli, name: &BackendName) -> anyhow::Result<Arc<dyn ImageBackend>> {
    if cli.offline {
        return Ok(Arc::new(StaticImageBackend::new(name.clone())));
    }

    let Some(endpoint) = cli.endpoint_for(name) else {
        bail!("no endpoint configured for backend `{name}` (use --endpoint {name}=URL or --offline)");
    };

    let mut config = HttpBackendConfig::for_name(name.clone(), endpoint)
        .with_timeout(Duration::from_secs(cli.timeout_secs));
    match cli.api_key_for(name) {
        Some(key) => config = config.with_api_key(key),
        None => tracing::debug!(
            backend = %name,
            env = %api_key_env(name),
            "no api key configured, sending unauthenticated requests"
        ),
    }

    let backend = HttpImageBackend::new(config)
        .with_context(|| format!("failed to create http backend `{name}`"))?;
    Ok(Arc::new(backend))
}
