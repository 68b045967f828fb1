//! IdGenerator port - ID 生成の抽象化
//!
//! ImageStore が永続化時に ImageId を採番するために使います。
//!
//! # 実装
//! - **UlidGenerator**: ULID ベース（本番用）

use crate::domain::ids::{ArticleId, ImageId};
use crate::ports::Clock;
use ulid::Ulid;

/// IdGenerator は分散環境でも衝突しない ID を生成
///
/// # Thread Safety
/// - `Send + Sync` を要求（複数のワーカーから共有される）
pub trait IdGenerator: Send + Sync {
    fn generate_article_id(&self) -> ArticleId;

    fn generate_image_id(&self) -> ImageId;
}

/// UlidGenerator は Clock の時刻を timestamp 部分に使う ID 生成器
///
/// FixedClock を渡すと timestamp 部分が固定されます（ランダム部分は毎回変わる）。
pub struct UlidGenerator<C> {
    clock: C,
}

impl<C: Clock> UlidGenerator<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }

    fn next_ulid(&self) -> Ulid {
        let timestamp_ms = self.clock.now().timestamp_millis() as u64;
        Ulid::from_parts(timestamp_ms, rand::random())
    }
}

impl<C: Clock> IdGenerator for UlidGenerator<C> {
    fn generate_article_id(&self) -> ArticleId {
        ArticleId::from(self.next_ulid())
    }

    fn generate_image_id(&self) -> ImageId {
        ImageId::from(self.next_ulid())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{FixedClock, SystemClock};
    use chrono::{TimeZone, Utc};

    #[test]
    fn ulid_generator_generates_unique_ids() {
        let id_gen = UlidGenerator::new(SystemClock);

        let id1 = id_gen.generate_image_id();
        let id2 = id_gen.generate_image_id();
        let id3 = id_gen.generate_image_id();

        assert_ne!(id1, id2);
        assert_ne!(id2, id3);
        assert_ne!(id1, id3);
    }

    #[test]
    fn ulid_generator_with_fixed_clock_shares_timestamp() {
        let fixed_time = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let id_gen = UlidGenerator::new(FixedClock::new(fixed_time));

        let id1 = id_gen.generate_image_id();
        let id2 = id_gen.generate_image_id();

        // ランダム部分があるので ID 自体は異なる
        assert_ne!(id1, id2);

        assert_eq!(id1.as_ulid().timestamp_ms(), fixed_time.timestamp_millis() as u64);
        assert_eq!(id2.as_ulid().timestamp_ms(), fixed_time.timestamp_millis() as u64);
    }

    #[test]
    fn different_id_types_are_generated() {
        let id_gen = UlidGenerator::new(SystemClock);

        assert!(id_gen.generate_article_id().to_string().starts_with("article-"));
        assert!(id_gen.generate_image_id().to_string().starts_with("image-"));
    }
}
