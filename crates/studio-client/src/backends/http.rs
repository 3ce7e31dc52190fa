/// HTTP/JSON backend
///
/// Talks to a running studio server. Generation endpoints report failures
/// as a non-2xx status with the error as plain body text; save, trailer and
/// upload endpoints use JSON bodies with an `ok` flag and `error`/`message`.
use super::{BackendType, ClientConfig, StudioBackend};
use crate::api::{
    GenerateRequest, GeneratedPage, RefineRequest, SaveRequest, SaveResponse, TrailerRequest,
    TrailerResponse, UploadRequest, UploadResponse, GENERATE_EDIT_PATH, GENERATE_FULL_PATH,
    GENERATE_SAVE_PATH, TRAILER_GENERATE_PATH, TRAILER_UPLOAD_PATH,
};
use crate::error::{Result, StudioError};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::time::{Duration, Instant};

/// HTTP studio backend
pub struct HttpBackend {
    api_url: String,
    client: reqwest::Client,
}

impl HttpBackend {
    /// Create new HTTP backend
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let api_url = config.api_url.trim().trim_end_matches('/').to_string();
        if api_url.is_empty() {
            return Err(StudioError::Config("api_url is required".to_string()));
        }

        let url = reqwest::Url::parse(&api_url)
            .map_err(|e| StudioError::Config(format!("invalid api_url {api_url}: {e}")))?;

        let mut builder = reqwest::Client::builder();
        // A studio server on this machine is never reached through a proxy
        if matches!(url.host_str(), Some("localhost" | "127.0.0.1" | "[::1]")) {
            builder = builder.no_proxy();
        }
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| StudioError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { api_url, client })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    /// POST to a generation endpoint. A non-2xx status fails with the body
    /// text as the message.
    async fn post_generation<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<GeneratedPage> {
        let start = Instant::now();
        tracing::debug!(target: "studio", "POST {path}");
        let response = self.client.post(self.endpoint(path)).json(body).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            tracing::warn!(target: "studio", "{path} failed with {status}");
            return Err(StudioError::Status {
                status: status.as_u16(),
                message: text_or_status(&text, status),
            });
        }

        let page: GeneratedPage = serde_json::from_str(&text)
            .map_err(|e| StudioError::invalid_response(path, e.to_string()))?;
        tracing::info!(
            target: "studio",
            "{path} completed in {:.2?} ({} bytes of html)",
            start.elapsed(),
            page.html.len()
        );
        Ok(page)
    }

    /// Generic JSON POST shared by save, trailer and upload.
    ///
    /// Unparsable bodies count as an empty object. A non-2xx status or an
    /// explicit `ok: false` fails with the body's `error`, then `message`,
    /// then the raw text.
    async fn post_json<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Value> {
        let start = Instant::now();
        tracing::debug!(target: "studio", "POST {path}");
        let response = self.client.post(self.endpoint(path)).json(body).send().await?;
        let status = response.status();
        let text = response.text().await?;

        let parsed = parse_body(&text);
        let rejected = parsed.get("ok").and_then(Value::as_bool) == Some(false);

        if !status.is_success() || rejected {
            if let Some(details) = parsed.get("details").and_then(Value::as_str) {
                tracing::debug!(target: "studio", "{path} failure details: {details}");
            }
            let message = failure_message(&parsed, &text, status);
            tracing::warn!(target: "studio", "{path} failed with {status}: {message}");
            return Err(if status.is_success() {
                StudioError::Rejected(message)
            } else {
                StudioError::Status {
                    status: status.as_u16(),
                    message,
                }
            });
        }

        tracing::info!(target: "studio", "{path} completed in {:.2?}", start.elapsed());
        Ok(parsed)
    }

    async fn post_typed<B, R>(&self, path: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let value = self.post_json(path, body).await?;
        serde_json::from_value(value).map_err(|e| StudioError::invalid_response(path, e.to_string()))
    }
}

#[async_trait::async_trait]
impl StudioBackend for HttpBackend {
    fn name(&self) -> &str {
        "Studio HTTP"
    }

    fn backend_type(&self) -> BackendType {
        BackendType::Http
    }

    async fn generate(&self, request: &GenerateRequest) -> Result<GeneratedPage> {
        self.post_generation(GENERATE_FULL_PATH, request).await
    }

    async fn refine(&self, request: &RefineRequest) -> Result<GeneratedPage> {
        self.post_generation(GENERATE_EDIT_PATH, request).await
    }

    async fn save(&self, request: &SaveRequest) -> Result<SaveResponse> {
        let saved: SaveResponse = self.post_typed(GENERATE_SAVE_PATH, request).await?;
        saved.into_result()
    }

    async fn generate_trailer(&self, request: &TrailerRequest) -> Result<TrailerResponse> {
        self.post_typed(TRAILER_GENERATE_PATH, request).await
    }

    async fn upload_trailer(&self, request: &UploadRequest) -> Result<UploadResponse> {
        self.post_typed(TRAILER_UPLOAD_PATH, request).await
    }
}

/// Parse a response body, treating anything that is not JSON as `{}`
fn parse_body(text: &str) -> Value {
    serde_json::from_str(text).unwrap_or_else(|_| Value::Object(Map::new()))
}

fn failure_message(body: &Value, text: &str, status: StatusCode) -> String {
    ["error", "message"]
        .iter()
        .filter_map(|key| body.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .find(|msg| !msg.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| text_or_status(text, status))
}

fn text_or_status(text: &str, status: StatusCode) -> String {
    let text = text.trim();
    if text.is_empty() {
        status.to_string()
    } else {
        text.to_string()
    }
}
