//! Impls - ports の実装
//!
//! # 含まれる実装
//! - **InMemoryArticleSource / InMemoryImageStore**: 開発・テスト用
//! - **HttpImageBackend**: HTTP 越しのリモート生成サービス（kandinsky, fruity など）
//! - **StaticImageBackend**: オフライン用の決定的なバックエンド

pub mod http_backend;
pub mod inmem_article;
pub mod inmem_image_store;
pub mod static_backend;

pub use self::http_backend::{ClientBuildError, HttpBackendConfig, HttpImageBackend};
pub use self::inmem_article::InMemoryArticleSource;
pub use self::inmem_image_store::InMemoryImageStore;
pub use self::static_backend::StaticImageBackend;
