//! GeneratedImage - バックエンドが生成した画像
//!
//! # ライフサイクル
//! - `GeneratedImage`: バックエンドが返した直後（ID なし）
//! - `StoredImage`: ImageStore が永続化して ID を採番したもの（以後 immutable）
//!
//! 記事への紐付けは `StoredImage` しか受け取らないので、
//! 永続化されていない画像をリンクすることは型レベルで起こりえません。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::ImageId;

/// Name of an image-generation backend (e.g. "kandinsky", "fruity").
///
/// Names are trimmed and lowercased so config and registry lookups agree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BackendName(String);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("backend name must not be empty")]
pub struct EmptyBackendName;

impl BackendName {
    pub fn new(name: impl AsRef<str>) -> Result<Self, EmptyBackendName> {
        let name = name.as_ref().trim().to_lowercase();
        if name.is_empty() {
            return Err(EmptyBackendName);
        }
        Ok(Self(name))
    }

    /// For names already known to be normalised.
    pub(crate) fn known(name: &str) -> Self {
        Self(name.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for BackendName {
    type Error = EmptyBackendName;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<BackendName> for String {
    fn from(value: BackendName) -> Self {
        value.0
    }
}

impl std::str::FromStr for BackendName {
    type Err = EmptyBackendName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for BackendName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Image content: either the bytes themselves or a reference to them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ImagePayload {
    Inline { bytes: Vec<u8>, content_type: String },
    Remote { url: String },
}

impl ImagePayload {
    pub fn is_empty(&self) -> bool {
        match self {
            ImagePayload::Inline { bytes, .. } => bytes.is_empty(),
            ImagePayload::Remote { url } => url.trim().is_empty(),
        }
    }
}

/// An image as returned by a backend, not yet persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedImage {
    pub payload: ImagePayload,
    pub backend: BackendName,
    pub created_at: DateTime<Utc>,
}

/// A persisted image. Owned by the ImageStore; never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredImage {
    pub id: ImageId,
    pub image: GeneratedImage,
}

impl StoredImage {
    pub fn backend(&self) -> &BackendName {
        &self.image.backend
    }
}
