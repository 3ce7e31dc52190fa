/// Scripted studio backend
///
/// Replies are queued per endpoint and consumed in order; every request is
/// recorded so callers can assert on exactly what was sent.
use super::{BackendType, StudioBackend};
use crate::api::{
    GenerateRequest, GeneratedPage, RefineRequest, SaveRequest, SaveResponse, TrailerRequest,
    TrailerResponse, UploadRequest, UploadResponse,
};
use crate::error::{Result, StudioError};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Notify;

/// A scripted outcome for one call
#[derive(Debug, Clone)]
pub enum MockReply<T> {
    Ok(T),
    /// Non-2xx status with the given message
    Status(u16, String),
    /// 2xx body flagged `ok: false`
    Rejected(String),
    /// No response at all
    Transport(String),
}

impl<T> MockReply<T> {
    fn into_result(self) -> Result<T> {
        match self {
            MockReply::Ok(value) => Ok(value),
            MockReply::Status(status, message) => Err(StudioError::Status { status, message }),
            MockReply::Rejected(message) => Err(StudioError::Rejected(message)),
            MockReply::Transport(message) => Err(StudioError::Transport(message)),
        }
    }
}

/// A recorded request
#[derive(Debug, Clone, PartialEq)]
pub enum MockCall {
    Generate(GenerateRequest),
    Refine(RefineRequest),
    Save(SaveRequest),
    GenerateTrailer(TrailerRequest),
    UploadTrailer(UploadRequest),
}

#[derive(Default)]
struct Script {
    pages: VecDeque<MockReply<GeneratedPage>>,
    saves: VecDeque<MockReply<SaveResponse>>,
    trailers: VecDeque<MockReply<TrailerResponse>>,
    uploads: VecDeque<MockReply<UploadResponse>>,
}

#[derive(Default)]
pub struct MockBackend {
    script: Mutex<Script>,
    calls: Mutex<Vec<MockCall>>,
    gate: Mutex<Option<Arc<Notify>>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply for the next generate or refine call
    pub fn push_page(&self, reply: MockReply<GeneratedPage>) -> &Self {
        self.script.lock().pages.push_back(reply);
        self
    }

    /// Queue a successful page with the given markup
    pub fn push_html(&self, html: &str) -> &Self {
        self.push_page(MockReply::Ok(GeneratedPage {
            html: html.to_string(),
            ..GeneratedPage::default()
        }))
    }

    pub fn push_save(&self, reply: MockReply<SaveResponse>) -> &Self {
        self.script.lock().saves.push_back(reply);
        self
    }

    pub fn push_trailer(&self, reply: MockReply<TrailerResponse>) -> &Self {
        self.script.lock().trailers.push_back(reply);
        self
    }

    pub fn push_upload(&self, reply: MockReply<UploadResponse>) -> &Self {
        self.script.lock().uploads.push_back(reply);
        self
    }

    /// Hold every subsequent call until `gate` is notified once per call
    pub fn hold_until(&self, gate: Arc<Notify>) {
        *self.gate.lock() = Some(gate);
    }

    /// Requests received so far, in order
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().clone()
    }

    async fn record(&self, call: MockCall) {
        self.calls.lock().push(call);
        let gate = self.gate.lock().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
    }
}

fn unscripted<T>(endpoint: &str) -> MockReply<T> {
    MockReply::Transport(format!("no scripted reply for {endpoint}"))
}

#[async_trait::async_trait]
impl StudioBackend for MockBackend {
    fn name(&self) -> &str {
        "Mock"
    }

    fn backend_type(&self) -> BackendType {
        BackendType::Mock
    }

    async fn generate(&self, request: &GenerateRequest) -> Result<GeneratedPage> {
        self.record(MockCall::Generate(request.clone())).await;
        let reply = self.script.lock().pages.pop_front();
        reply.unwrap_or_else(|| unscripted("generate")).into_result()
    }

    async fn refine(&self, request: &RefineRequest) -> Result<GeneratedPage> {
        self.record(MockCall::Refine(request.clone())).await;
        let reply = self.script.lock().pages.pop_front();
        reply.unwrap_or_else(|| unscripted("refine")).into_result()
    }

    async fn save(&self, request: &SaveRequest) -> Result<SaveResponse> {
        self.record(MockCall::Save(request.clone())).await;
        let reply = self.script.lock().saves.pop_front();
        reply
            .unwrap_or_else(|| unscripted("save"))
            .into_result()?
            .into_result()
    }

    async fn generate_trailer(&self, request: &TrailerRequest) -> Result<TrailerResponse> {
        self.record(MockCall::GenerateTrailer(request.clone())).await;
        let reply = self.script.lock().trailers.pop_front();
        reply.unwrap_or_else(|| unscripted("trailer generate")).into_result()
    }

    async fn upload_trailer(&self, request: &UploadRequest) -> Result<UploadResponse> {
        self.record(MockCall::UploadTrailer(request.clone())).await;
        let reply = self.script.lock().uploads.pop_front();
        reply.unwrap_or_else(|| unscripted("trailer upload")).into_result()
    }
}
