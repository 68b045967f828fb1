//! Article - 画像を付与される記事
//!
//! 記事は外部の取り込み処理（スクレイパー）が作成します。
//! パイプラインは読み取りと画像の紐付けだけを行い、削除はしません。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{ArticleId, ImageId};

/// Upper bound on how much body text goes into a generation prompt.
pub const PROMPT_BODY_CHARS: usize = 400;

/// Where and when the article was published.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Publication {
    pub source_url: String,
    pub published_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub id: ArticleId,
    pub title: String,
    pub body: String,
    pub category: String,
    pub publication: Publication,
    /// Set once a persisted image has been linked.
    #[serde(default)]
    pub image: Option<ImageId>,
}

impl Article {
    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }

    /// Text handed to an image backend.
    ///
    /// Title first, then category, then the beginning of the body
    /// (cut on a char boundary at [`PROMPT_BODY_CHARS`]).
    pub fn prompt(&self) -> String {
        let mut prompt = self.title.trim().to_string();
        let category = self.category.trim();
        if !category.is_empty() {
            prompt.push_str(". ");
            prompt.push_str(category);
        }
        let body: String = self.body.trim().chars().take(PROMPT_BODY_CHARS).collect();
        if !body.is_empty() {
            prompt.push_str(". ");
            prompt.push_str(&body);
        }
        prompt
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use ulid::Ulid;

    fn article(body: &str) -> Article {
        Article {
            id: ArticleId::from_ulid(Ulid::new()),
            title: "Rust 2024 released".into(),
            body: body.into(),
            category: "tech".into(),
            publication: Publication {
                source_url: "https://example.com/rust".into(),
                published_at: Utc.with_ymd_and_hms(2024, 2, 20, 9, 0, 0).unwrap(),
            },
            image: None,
        }
    }

    #[test]
    fn prompt_joins_title_category_and_body() {
        let a = article("  The new edition is out.  ");
        assert_eq!(a.prompt(), "Rust 2024 released. tech. The new edition is out.");
    }

    #[test]
    fn prompt_truncates_long_body_on_char_boundary() {
        let body = "ж".repeat(PROMPT_BODY_CHARS * 2);
        let a = article(&body);
        let prompt = a.prompt();
        assert_eq!(prompt.chars().filter(|c| *c == 'ж').count(), PROMPT_BODY_CHARS);
    }

    #[test]
    fn prompt_skips_empty_parts() {
        let mut a = article("");
        a.category = " ".into();
        assert_eq!(a.prompt(), "Rust 2024 released");
    }

    #[test]
    fn image_field_defaults_to_none_when_missing() {
        let a = article("x");
        let mut json = serde_json::to_value(&a).unwrap();
        json.as_object_mut().unwrap().remove("image");
        let back: Article = serde_json::from_value(json).unwrap();
        assert!(!back.has_image());
    }
}
