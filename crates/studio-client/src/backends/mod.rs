/// Studio backend abstraction
///
/// Provides a unified interface over the generation, save, trailer
/// rendering and upload endpoints:
/// - HTTP/JSON against a running studio server
/// - Scripted mock for tests

pub mod http;
pub mod mock;

use serde::{Deserialize, Serialize};
use std::path::Path;

pub use http::HttpBackend;
pub use mock::{MockBackend, MockCall, MockReply};

use crate::api::{
    GenerateRequest, GeneratedPage, RefineRequest, SaveRequest, SaveResponse, TrailerRequest,
    TrailerResponse, UploadRequest, UploadResponse,
};
use crate::error::{Result, StudioError};

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:5000";

/// Backend type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BackendType {
    /// Live studio server over HTTP
    Http,
    /// In-process scripted replies
    Mock,
}

impl std::fmt::Display for BackendType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Http => write!(f, "http"),
            Self::Mock => write!(f, "mock"),
        }
    }
}

/// One method per endpoint. Implementations normalize every failure,
/// including `ok: false` bodies, into a [`StudioError`].
#[async_trait::async_trait]
pub trait StudioBackend: Send + Sync {
    /// Backend name
    fn name(&self) -> &str;

    /// Backend type
    fn backend_type(&self) -> BackendType;

    /// First generation of a page from a prompt
    async fn generate(&self, request: &GenerateRequest) -> Result<GeneratedPage>;

    /// Apply prompt instructions to an existing page
    async fn refine(&self, request: &RefineRequest) -> Result<GeneratedPage>;

    /// Persist a page; fails unless the backend answers `ok: true`
    async fn save(&self, request: &SaveRequest) -> Result<SaveResponse>;

    /// Render a trailer video
    async fn generate_trailer(&self, request: &TrailerRequest) -> Result<TrailerResponse>;

    /// Upload a rendered trailer to YouTube
    async fn upload_trailer(&self, request: &UploadRequest) -> Result<UploadResponse>;
}

/// Client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the studio server
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Request timeout in seconds; unset waits indefinitely
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// Model override for page generation
    #[serde(default)]
    pub model: Option<String>,

    /// Model override for trailer rendering
    #[serde(default)]
    pub trailer_model: Option<String>,

    /// Open navigation targets in the system browser
    #[serde(default)]
    pub open_browser: bool,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            timeout_secs: None,
            model: None,
            trailer_model: None,
            open_browser: false,
        }
    }
}

impl ClientConfig {
    /// With API endpoint
    pub fn with_api_url(mut self, url: String) -> Self {
        self.api_url = url;
        self
    }

    /// With timeout
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// With generation model
    pub fn with_model(mut self, model: String) -> Self {
        self.model = Some(model);
        self
    }

    /// With trailer model
    pub fn with_trailer_model(mut self, model: String) -> Self {
        self.trailer_model = Some(model);
        self
    }

    /// Save configuration to JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| StudioError::Config(e.to_string()))?;
        std::fs::write(path, json)
            .map_err(|e| StudioError::Config(format!("{}: {e}", path.display())))?;
        Ok(())
    }

    /// Load configuration from JSON
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| StudioError::Config(format!("{}: {e}", path.display())))?;
        let config = serde_json::from_str(&json)
            .map_err(|e| StudioError::Config(format!("{}: {e}", path.display())))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_config() {
        let config = ClientConfig::default()
            .with_api_url("http://localhost:8080".to_string())
            .with_timeout(30)
            .with_model("gpt-4o-mini".to_string());

        assert_eq!(config.api_url, "http://localhost:8080");
        assert_eq!(config.timeout_secs, Some(30));
        assert_eq!(config.model.as_deref(), Some("gpt-4o-mini"));
        assert!(config.trailer_model.is_none());
    }

    #[test]
    fn test_config_roundtrip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("studio.json");
        let config = ClientConfig::default().with_trailer_model("MiniMax-Hailuo-02".to_string());

        config.save(&path).unwrap();
        let loaded = ClientConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_config_gets_defaults() {
        let config: ClientConfig = serde_json::from_str(r#"{"open_browser": true}"#).unwrap();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert!(config.open_browser);
        assert!(config.timeout_secs.is_none());
    }

    #[test]
    fn test_missing_config_file_is_config_error() {
        let err = ClientConfig::load(Path::new("/nonexistent/studio.json")).unwrap_err();
        assert!(matches!(err, StudioError::Config(_)));
    }

    #[test]
    fn test_backend_type_display() {
        assert_eq!(BackendType::Http.to_string(), "http");
        assert_eq!(BackendType::Mock.to_string(), "mock");
    }
}
