//! Ports - 抽象化レイヤー
//!
//! パイプラインが依存する外部コラボレータの境界です（ネットワークプロトコルではなく
//! ライブラリ内部の境界）。各 trait は `Send + Sync` で、`Arc<dyn _>` として
//! 複数のワーカー task から共有されます。

pub mod article_source;
pub mod clock;
pub mod id_generator;
pub mod image_backend;
pub mod image_store;
pub mod shutdown;

pub use self::article_source::ArticleSource;
pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::id_generator::{IdGenerator, UlidGenerator};
pub use self::image_backend::ImageBackend;
pub use self::image_store::ImageStore;
pub use self::shutdown::{ShutdownError, ShutdownHook};
