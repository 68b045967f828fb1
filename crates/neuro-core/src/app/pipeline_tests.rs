//! End-to-end behaviour of workers sharing one turn.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::domain::Stage;
use crate::impls::{InMemoryArticleSource, InMemoryImageStore};
use crate::ports::{ArticleSource, ImageStore};
use crate::testing::{
    FailingFetchSource, FailingLinkSource, FailingStore, ScriptedBackend, articles, name, wait_for,
};

use super::{PipelineBuilder, PipelineConfig, PipelineStats, PipelineWorker, TurnToken, WorkerGroup};

#[tokio::test]
async fn three_articles_get_three_distinct_images() {
    let source = Arc::new(InMemoryArticleSource::with_articles(articles(3)));
    let store = Arc::new(InMemoryImageStore::new());
    let stats = Arc::new(PipelineStats::new());

    let workers = PipelineBuilder::new()
        .register(Arc::new(ScriptedBackend::ok("kandinsky")))
        .unwrap()
        .source(source.clone())
        .store(store.clone())
        .stats(stats.clone())
        .config(PipelineConfig::new(0, vec![name("kandinsky")]))
        .build()
        .unwrap()
        .spawn();

    wait_for(&stats, |s| s.totals().completed == 3).await;
    workers.shutdown_and_join().await;

    let linked = source.linked().await;
    assert_eq!(linked.len(), 3);

    let images: HashSet<_> = linked.iter().filter_map(|a| a.image).collect();
    assert_eq!(images.len(), 3);
    assert_eq!(store.len().await, 3);
    for image in images {
        assert!(store.get(image).await.is_some());
    }

    // 以降のターンは取得段階で失敗するだけで、余計な画像は作られない
    assert_eq!(stats.totals().completed, 3);
}

#[tokio::test]
async fn failing_backend_never_persists_and_never_starves_the_turn() {
    let source = Arc::new(InMemoryArticleSource::with_articles(articles(2)));
    let store = Arc::new(InMemoryImageStore::new());
    let stats = Arc::new(PipelineStats::new());

    let pipeline = PipelineBuilder::new()
        .register(Arc::new(ScriptedBackend::failing("fruity")))
        .unwrap()
        .source(source.clone())
        .store(store.clone())
        .stats(stats.clone())
        .config(PipelineConfig::new(0, vec![name("fruity")]))
        .build()
        .unwrap();
    let turn = pipeline.turn();
    let workers = pipeline.spawn();

    wait_for(&stats, |s| s.for_backend(&name("fruity")).failed_generate >= 50).await;
    workers.shutdown_and_join().await;

    assert!(store.is_empty().await);
    assert!(source.linked().await.is_empty());
    assert_eq!(stats.totals().completed, 0);
    assert!(!turn.is_held());
}

#[tokio::test]
async fn only_the_healthy_backend_completes_cycles() {
    let source = Arc::new(InMemoryArticleSource::with_articles(articles(40)));
    let store = Arc::new(InMemoryImageStore::new());
    let stats = Arc::new(PipelineStats::new());

    let workers = PipelineBuilder::new()
        .register(Arc::new(ScriptedBackend::ok("kandinsky")))
        .unwrap()
        .register(Arc::new(ScriptedBackend::failing("fruity")))
        .unwrap()
        .source(source.clone())
        .store(store.clone())
        .stats(stats.clone())
        .config(PipelineConfig::new(0, vec![name("kandinsky"), name("fruity")]))
        .build()
        .unwrap()
        .spawn();

    wait_for(&stats, |s| {
        s.for_backend(&name("kandinsky")).completed >= 10
            && s.for_backend(&name("fruity")).failed_generate >= 10
    })
    .await;
    workers.shutdown_and_join().await;

    let healthy = stats.for_backend(&name("kandinsky"));
    let failing = stats.for_backend(&name("fruity"));
    assert_eq!(failing.completed, 0);
    assert_eq!(healthy.failed_generate, 0);

    let images = store.all().await;
    assert_eq!(images.len() as u64, healthy.completed);
    assert!(images.iter().all(|i| i.backend() == &name("kandinsky")));
    assert_eq!(source.linked().await.len() as u64, healthy.completed);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn cycles_never_overlap_across_backends() {
    let active = Arc::new(AtomicUsize::new(0));
    let max_active = Arc::new(AtomicUsize::new(0));
    let stats = Arc::new(PipelineStats::new());

    let mut builder = PipelineBuilder::new()
        .source(Arc::new(InMemoryArticleSource::with_articles(articles(200))))
        .store(Arc::new(InMemoryImageStore::new()))
        .stats(stats.clone());
    let names = ["a", "b", "c", "d"];
    for (i, n) in names.iter().enumerate() {
        let backend = if i % 2 == 0 {
            ScriptedBackend::ok(n)
        } else {
            ScriptedBackend::failing(n)
        };
        builder = builder
            .register(Arc::new(
                backend
                    .with_jitter(500)
                    .sharing(active.clone(), max_active.clone()),
            ))
            .unwrap();
    }

    let workers = builder
        .config(PipelineConfig::new(0, names.iter().map(|n| name(n))))
        .build()
        .unwrap()
        .spawn();

    wait_for(&stats, |s| s.totals().total() >= 100).await;
    workers.shutdown_and_join().await;

    assert_eq!(max_active.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn failures_at_every_stage_keep_the_turn_moving() {
    let turn = TurnToken::new();
    let stats = Arc::new(PipelineStats::new());
    let memory_store = || -> Arc<dyn ImageStore> { Arc::new(InMemoryImageStore::new()) };
    let memory_source =
        || -> Arc<dyn ArticleSource> { Arc::new(InMemoryArticleSource::with_articles(articles(1))) };

    let worker = |backend: ScriptedBackend,
                  source: Arc<dyn ArticleSource>,
                  store: Arc<dyn ImageStore>| {
        PipelineWorker::new(
            Arc::new(backend),
            source,
            store,
            turn.clone(),
            Duration::ZERO,
            stats.clone(),
        )
    };

    let group = WorkerGroup::spawn(vec![
        worker(ScriptedBackend::ok("fetch"), Arc::new(FailingFetchSource), memory_store()),
        worker(ScriptedBackend::failing("generate"), memory_source(), memory_store()),
        worker(ScriptedBackend::ok("persist"), memory_source(), Arc::new(FailingStore)),
        worker(
            ScriptedBackend::ok("link"),
            Arc::new(FailingLinkSource::new(articles(1))),
            memory_store(),
        ),
    ]);

    wait_for(&stats, |s| {
        Stage::ALL
            .iter()
            .all(|stage| s.for_backend(&name(stage.as_str())).failed_at(*stage) >= 10)
    })
    .await;
    group.shutdown_and_join().await;

    assert_eq!(stats.totals().completed, 0);
    assert!(!turn.is_held());
}
