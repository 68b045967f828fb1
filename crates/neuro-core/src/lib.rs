//! neuro-core
//!
//! ニュース記事に挿絵を生成して付与するバックグラウンドパイプライン。
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ids, article, image, errors）
//! - **ports**: 抽象化レイヤー（ArticleSource, ImageBackend, ImageStore, ShutdownHook, Clock, IdGenerator）
//! - **impls**: 実装（InMemory 系、HTTP バックエンド、オフライン用バックエンド）
//! - **app**: アプリケーションロジック（turn, worker_loop, builder, supervisor）

pub mod app;
pub mod domain;
pub mod impls;
pub mod ports;

#[cfg(test)]
mod testing;
