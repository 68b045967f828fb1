//! StaticImageBackend - オフライン用の決定的なバックエンド
//!
//! プロバイダの認証情報なしでパイプラインを動かすためのものです。
//! 記事 ID から作った小さなプレースホルダ（SVG）を返します。

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{Article, BackendName, GeneratedImage, GenerationError, ImagePayload};
use crate::ports::{Clock, ImageBackend, SystemClock};

pub struct StaticImageBackend {
    name: BackendName,
    clock: Arc<dyn Clock>,
}

impl StaticImageBackend {
    pub fn new(name: BackendName) -> Self {
        Self::with_clock(name, Arc::new(SystemClock))
    }

    pub fn with_clock(name: BackendName, clock: Arc<dyn Clock>) -> Self {
        Self { name, clock }
    }

    fn placeholder(&self, article: &Article) -> Vec<u8> {
        let hue = article.id.as_ulid().0 % 360;
        format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="64" height="64"><rect width="64" height="64" fill="hsl({hue},60%,50%)"/><title>{}</title></svg>"#,
            escape_xml(self.name.as_str())
        )
        .into_bytes()
    }
}

fn escape_xml(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[async_trait]
impl ImageBackend for StaticImageBackend {
    fn name(&self) -> &BackendName {
        &self.name
    }

    async fn generate(&self, article: &Article) -> Result<GeneratedImage, GenerationError> {
        Ok(GeneratedImage {
            payload: ImagePayload::Inline {
                bytes: self.placeholder(article),
                content_type: "image/svg+xml".into(),
            },
            backend: self.name.clone(),
            created_at: self.clock.now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ArticleId, Publication};
    use crate::ports::FixedClock;
    use chrono::{TimeZone, Utc};
    use ulid::Ulid;

    #[tokio::test]
    async fn generates_deterministic_placeholder() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let backend =
            StaticImageBackend::with_clock(BackendName::new("static").unwrap(), Arc::new(FixedClock::new(at)));
        let article = Article {
            id: ArticleId::from_ulid(Ulid::new()),
            title: "t".into(),
            body: "b".into(),
            category: "c".into(),
            publication: Publication {
                source_url: "https://example.com".into(),
                published_at: at,
            },
            image: None,
        };

        let first = backend.generate(&article).await.unwrap();
        let second = backend.generate(&article).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.created_at, at);
        assert_eq!(first.backend.as_str(), "static");
        assert!(!first.payload.is_empty());
    }

    #[tokio::test]
    async fn markup_in_backend_name_is_escaped() {
        let backend = StaticImageBackend::new(BackendName::new("<b>&\"co'").unwrap());
        let article = Article {
            id: ArticleId::from_ulid(Ulid::new()),
            title: "t".into(),
            body: "b".into(),
            category: "c".into(),
            publication: Publication {
                source_url: "https://example.com".into(),
                published_at: Utc::now(),
            },
            image: None,
        };

        let image = backend.generate(&article).await.unwrap();
        let ImagePayload::Inline { bytes, .. } = image.payload else {
            panic!("static backend must return inline bytes");
        };
        let svg = String::from_utf8(bytes).unwrap();

        assert!(svg.contains("<title>&lt;b&gt;&amp;&quot;co&apos;</title>"));
        assert_eq!(svg.matches('<').count(), svg.matches('>').count());
    }
}
