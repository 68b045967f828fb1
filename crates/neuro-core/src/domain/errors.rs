//! Errors - パイプラインの段階ごとのエラー
//!
//! 各エラーは 1 つの段階（fetch / generate / persist / link）にスコープされます。
//! ワーカーは発生した時点でエラーを吸収し（warn ログ）、そのサイクルを打ち切ります。
//! Supervisor までエラーが伝播することはありません。

use std::fmt;

use thiserror::Error;

use super::ids::{ArticleId, ImageId};

/// The four ordered steps of a generation cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Stage {
    Fetch,
    Generate,
    Persist,
    Link,
}

impl Stage {
    pub const ALL: [Stage; 4] = [Stage::Fetch, Stage::Generate, Stage::Persist, Stage::Link];

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Fetch => "fetch",
            Stage::Generate => "generate",
            Stage::Persist => "persist",
            Stage::Link => "link",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("no article is waiting for an image")]
    Exhausted,

    #[error("article source unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("backend request failed: {0}")]
    Transport(String),

    #[error("backend rejected the request with status {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("backend returned an unusable response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PersistError {
    #[error("image payload is empty")]
    EmptyPayload,

    #[error("image {0} already exists")]
    Duplicate(ImageId),

    #[error("image store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinkError {
    #[error("{0} not found")]
    ArticleNotFound(ArticleId),

    #[error("{article} is already linked to {image}")]
    AlreadyLinked { article: ArticleId, image: ImageId },

    #[error("article source unavailable: {0}")]
    Unavailable(String),
}

/// A failure in one stage of a cycle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StageError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Generate(#[from] GenerationError),

    #[error(transparent)]
    Persist(#[from] PersistError),

    #[error(transparent)]
    Link(#[from] LinkError),
}

impl StageError {
    pub fn stage(&self) -> Stage {
        match self {
            StageError::Fetch(_) => Stage::Fetch,
            StageError::Generate(_) => Stage::Generate,
            StageError::Persist(_) => Stage::Persist,
            StageError::Link(_) => Stage::Link,
        }
    }
}
