//! Seed - 起動時に InMemoryArticleSource へ入れる記事
//!
//! JSON 配列で、ID はここで採番します（ファイルには書きません）。
//!
//! ```json
//! [{"title": "...", "body": "...", "category": "tech", "source_url": "https://..."}]
//! ```

use std::path::Path;

use anyhow::Context;
use chrono::{DateTime, Utc};
use neuro_core::domain::{Article, Publication};
use neuro_core::ports::{Clock, IdGenerator};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct SeedArticle {
    title: String,
    #[serde(default)]
    body: String,
    #[serde(default)]
    category: String,
    source_url: String,
    /// Defaults to the time of loading.
    #[serde(default)]
    published_at: Option<DateTime<Utc>>,
}

pub fn load(path: &Path, ids: &dyn IdGenerator, clock: &dyn Clock) -> anyhow::Result<Vec<Article>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read articles from {}", path.display()))?;
    parse(&raw, ids, clock).with_context(|| format!("invalid articles file {}", path.display()))
}

fn parse(raw: &str, ids: &dyn IdGenerator, clock: &dyn Clock) -> anyhow::Result<Vec<Article>> {
    let seeds: Vec<SeedArticle> = serde_json::from_str(raw)?;
    let articles = seeds
        .into_iter()
        .map(|seed| Article {
            id: ids.generate_article_id(),
            title: seed.title,
            body: seed.body,
            category: seed.category,
            publication: Publication {
                source_url: seed.source_url,
                published_at: seed.published_at.unwrap_or_else(|| clock.now()),
            },
            image: None,
        })
        .collect();
    Ok(articles)
}
