//! HttpImageBackend - HTTP 越しのリモート画像生成サービス
//!
//! # プロトコル
//! - `POST {endpoint}` に JSON `{prompt, style, width, height}` を送る
//! - API キーがあれば `Authorization: Bearer ...`
//! - 応答は JSON で、base64 の `image` か、生成済み画像の `url` のどちらか
//!
//! リトライはしません。失敗したサイクルは次のターンでやり直されます。

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::domain::{Article, BackendName, GeneratedImage, GenerationError, ImagePayload};
use crate::ports::{Clock, ImageBackend, SystemClock};

const DEFAULT_TIMEOUT_SECS: u64 = 120;
const DEFAULT_CONTENT_TYPE: &str = "image/png";

#[derive(Debug, Clone)]
pub struct HttpBackendConfig {
    pub name: BackendName,
    pub endpoint: String,
    pub api_key: Option<String>,
    pub style: String,
    pub width: u32,
    pub height: u32,
    pub timeout: Duration,
}

impl HttpBackendConfig {
    pub fn new(name: BackendName, endpoint: impl Into<String>) -> Self {
        Self {
            name,
            endpoint: endpoint.into(),
            api_key: None,
            style: "DEFAULT".into(),
            width: 1024,
            height: 1024,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Provider defaults for the Kandinsky text-to-image service.
    pub fn kandinsky(endpoint: impl Into<String>) -> Self {
        Self {
            style: "KANDINSKY".into(),
            width: 1024,
            height: 576,
            ..Self::new(BackendName::known("kandinsky"), endpoint)
        }
    }

    /// Provider defaults for the Fruity API.
    pub fn fruity(endpoint: impl Into<String>) -> Self {
        Self {
            style: "photo".into(),
            width: 768,
            height: 512,
            ..Self::new(BackendName::known("fruity"), endpoint)
        }
    }

    /// Preset for a known provider name, otherwise generic defaults.
    pub fn for_name(name: BackendName, endpoint: impl Into<String>) -> Self {
        match name.as_str() {
            "kandinsky" => Self::kandinsky(endpoint),
            "fruity" => Self::fruity(endpoint),
            _ => Self::new(name, endpoint),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Debug, Serialize)]
struct ImageRequest<'a> {
    prompt: String,
    style: &'a str,
    width: u32,
    height: u32,
}

#[derive(Debug, Deserialize)]
struct ImageResponse {
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    content_type: Option<String>,
}

impl ImageResponse {
    fn into_payload(self) -> Result<ImagePayload, GenerationError> {
        if let Some(encoded) = self.image.filter(|s| !s.trim().is_empty()) {
            let bytes = STANDARD
                .decode(encoded.trim())
                .map_err(|e| GenerationError::InvalidResponse(format!("base64 decode: {e}")))?;
            return Ok(ImagePayload::Inline {
                bytes,
                content_type: self
                    .content_type
                    .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string()),
            });
        }
        if let Some(url) = self.url.filter(|s| !s.trim().is_empty()) {
            return Ok(ImagePayload::Remote { url });
        }
        Err(GenerationError::InvalidResponse(
            "response carries neither image nor url".into(),
        ))
    }
}

/// HTTP クライアントを作れなかった（TLS 初期化など）。起動時のエラーで、生成段階の失敗ではない。
#[derive(Debug, thiserror::Error)]
#[error("failed to build http client for backend {backend}")]
pub struct ClientBuildError {
    pub backend: BackendName,
    #[source]
    pub source: reqwest::Error,
}

pub struct HttpImageBackend {
    client: Client,
    config: HttpBackendConfig,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for HttpImageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // api_key は出さない
        f.debug_struct("HttpImageBackend")
            .field("name", &self.config.name)
            .field("endpoint", &self.config.endpoint)
            .finish()
    }
}

impl HttpImageBackend {
    pub fn new(config: HttpBackendConfig) -> Result<Self, ClientBuildError> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(
        config: HttpBackendConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ClientBuildError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|source| ClientBuildError {
                backend: config.name.clone(),
                source,
            })?;
        Ok(Self {
            client,
            config,
            clock,
        })
    }

    pub fn config(&self) -> &HttpBackendConfig {
        &self.config
    }

    fn request_for<'a>(&'a self, article: &Article) -> ImageRequest<'a> {
        ImageRequest {
            prompt: article.prompt(),
            style: &self.config.style,
            width: self.config.width,
            height: self.config.height,
        }
    }
}

#[async_trait]
impl ImageBackend for HttpImageBackend {
    fn name(&self) -> &BackendName {
        &self.config.name
    }

    async fn generate(&self, article: &Article) -> Result<GeneratedImage, GenerationError> {
        let mut request = self
            .client
            .post(&self.config.endpoint)
            .json(&self.request_for(article));
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| GenerationError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "failed to read error response".to_string());
            return Err(GenerationError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let body: ImageResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::InvalidResponse(e.to_string()))?;

        tracing::debug!(backend = %self.config.name, article = %article.id, "image generated");

        Ok(GeneratedImage {
            payload: body.into_payload()?,
            backend: self.config.name.clone(),
            created_at: self.clock.now(),
        })
    }
}
