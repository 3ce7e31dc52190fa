/// Prompt workflow controller
///
/// Owns the current generated document and runs the three user actions
/// (submit, save, trailer) against an injected backend and surface. Each
/// action reports its own failures through [`Surface::notify`] and always
/// restores control state on the way out.
use crate::api::{
    GenerateRequest, RefineRequest, SaveRequest, SaveResponse, TrailerRequest, TrailerResponse,
    UploadRequest, UploadResponse,
};
use crate::backends::StudioBackend;
use crate::error::StudioError;
use crate::surface::{Control, Surface};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

pub const GENERATING_LABEL: &str = "Generating…";
pub const REFINING_LABEL: &str = "Refining…";
pub const TRAILER_GENERATING_LABEL: &str = "Generating trailer…";
pub const TRAILER_UPLOADING_LABEL: &str = "Uploading to YouTube…";
pub const TRAILER_DONE_LABEL: &str = "Done";

/// Whether a submission creates a page or edits the current one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Generate,
    Refine,
}

impl Mode {
    fn in_progress_label(self) -> &'static str {
        match self {
            Mode::Generate => GENERATING_LABEL,
            Mode::Refine => REFINING_LABEL,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Generate => write!(f, "generate"),
            Mode::Refine => write!(f, "refine"),
        }
    }
}

/// Trailer pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrailerStage {
    #[default]
    Idle,
    Generating,
    Uploading,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Action {
    Submit,
    Save,
    Trailer,
}

impl Action {
    /// Actions whose in-flight state disables this one's control
    fn blocked_by(self) -> &'static [Action] {
        match self {
            Action::Save => &[Action::Submit],
            Action::Submit | Action::Trailer => &[],
        }
    }
}

/// Result of one user action, after the user has already been notified
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    /// Precondition not met or action already in flight; nothing was sent
    Skipped,
    Done(T),
    /// Failed with the message shown to the user
    Failed(String),
}

impl<T> Outcome<T> {
    pub fn is_done(&self) -> bool {
        matches!(self, Outcome::Done(_))
    }
}

/// Both halves of a finished trailer pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct TrailerUpload {
    pub trailer: TrailerResponse,
    pub upload: UploadResponse,
}

#[derive(Default)]
struct Session {
    document: String,
    title: Option<String>,
    trailer_stage: TrailerStage,
}

/// Options applied to outgoing requests
#[derive(Debug, Clone, Default)]
pub struct ControllerOptions {
    pub model: Option<String>,
    pub trailer_model: Option<String>,
}

pub struct PromptController {
    backend: Arc<dyn StudioBackend>,
    surface: Arc<dyn Surface>,
    options: ControllerOptions,
    session: Mutex<Session>,
    busy: Mutex<HashSet<Action>>,
}

impl PromptController {
    /// Create a controller for a fresh session. Save starts disabled since
    /// there is no document yet.
    pub fn new(backend: Arc<dyn StudioBackend>, surface: Arc<dyn Surface>) -> Self {
        surface.set_enabled(Control::Save, false);
        Self {
            backend,
            surface,
            options: ControllerOptions::default(),
            session: Mutex::new(Session::default()),
            busy: Mutex::new(HashSet::new()),
        }
    }

    pub fn with_options(mut self, options: ControllerOptions) -> Self {
        self.options = options;
        self
    }

    /// Latest generated or refined markup; empty before the first success
    pub fn document(&self) -> String {
        self.session.lock().document.clone()
    }

    pub fn has_document(&self) -> bool {
        !self.session.lock().document.is_empty()
    }

    /// Title reported by the last full generation, if any
    pub fn title(&self) -> Option<String> {
        self.session.lock().title.clone()
    }

    pub fn mode(&self) -> Mode {
        if self.has_document() {
            Mode::Refine
        } else {
            Mode::Generate
        }
    }

    pub fn trailer_stage(&self) -> TrailerStage {
        self.session.lock().trailer_stage
    }

    /// Submit the prompt field: full generation on an empty document,
    /// refinement otherwise.
    pub async fn submit(&self) -> Outcome<Mode> {
        let prompt = self.surface.prompt_text().trim().to_string();
        if prompt.is_empty() {
            return Outcome::Skipped;
        }
        let Some(mut guard) = self.begin(Action::Submit) else {
            return Outcome::Skipped;
        };

        let document = self.document();
        let mode = if document.is_empty() {
            Mode::Generate
        } else {
            Mode::Refine
        };

        for control in Control::FORM {
            self.surface.set_enabled(control, false);
            guard.reenable.push(control);
        }
        self.surface.set_enabled(Control::Save, false);
        guard.relabel(Control::Submit, mode.in_progress_label());

        tracing::info!(target: "studio", "submitting prompt ({mode}, {} chars)", prompt.len());
        let result = match mode {
            Mode::Generate => {
                let request = GenerateRequest {
                    prompt,
                    model: self.options.model.clone(),
                };
                self.backend.generate(&request).await
            }
            Mode::Refine => {
                let request = RefineRequest {
                    prompt,
                    html: document,
                };
                self.backend.refine(&request).await
            }
        };

        match result {
            Ok(page) => {
                {
                    let mut session = self.session.lock();
                    session.document = page.html.clone();
                    if page.title.is_some() {
                        session.title = page.title.clone();
                    }
                }
                if let Some(title) = page.title.as_deref() {
                    tracing::info!(target: "studio", "generated \"{title}\"");
                }
                self.surface.render_preview(&page.html);
                Outcome::Done(mode)
            }
            Err(err) => self.fail("submit", err),
        }
    }

    /// Save the current document and navigate to its page. The save control
    /// is re-enabled afterwards whether or not the request succeeded.
    pub async fn save(&self) -> Outcome<SaveResponse> {
        let html = self.document();
        if html.is_empty() {
            return Outcome::Skipped;
        }
        let Some(mut guard) = self.begin(Action::Save) else {
            return Outcome::Skipped;
        };

        self.surface.set_enabled(Control::Save, false);
        guard.reenable.push(Control::Save);
        let request = SaveRequest {
            html,
            prompt: self.surface.prompt_text().trim().to_string(),
        };

        match self.backend.save(&request).await {
            Ok(saved) => {
                tracing::info!(target: "studio", "saved game at {}", saved.path);
                self.surface.navigate(&saved.path);
                Outcome::Done(saved)
            }
            Err(err) => self.fail("save", err),
        }
    }

    /// Render a trailer from the prompt, then upload it. The upload only
    /// runs once the render has succeeded.
    pub async fn generate_trailer(&self) -> Outcome<TrailerUpload> {
        let Some(mut guard) = self.begin(Action::Trailer) else {
            return Outcome::Skipped;
        };

        self.surface.set_enabled(Control::Trailer, false);
        guard.reenable.push(Control::Trailer);
        guard.relabel(Control::Trailer, TRAILER_GENERATING_LABEL);
        self.set_trailer_stage(TrailerStage::Generating);

        let request = TrailerRequest::for_summary(&self.surface.prompt_text())
            .with_model(self.options.trailer_model.clone());
        tracing::info!(target: "studio", "rendering trailer: {}", request.summary);

        let trailer = match self.backend.generate_trailer(&request).await {
            Ok(trailer) => trailer,
            Err(err) => {
                self.set_trailer_stage(TrailerStage::Idle);
                return self.fail("trailer generate", err);
            }
        };

        self.surface.set_label(Control::Trailer, TRAILER_UPLOADING_LABEL);
        self.set_trailer_stage(TrailerStage::Uploading);
        let upload_request = UploadRequest::for_trailer(&trailer, &request.summary);
        tracing::info!(target: "studio", "uploading {}", upload_request.filename);

        match self.backend.upload_trailer(&upload_request).await {
            Ok(upload) => {
                self.surface.set_label(Control::Trailer, TRAILER_DONE_LABEL);
                self.set_trailer_stage(TrailerStage::Done);
                self.surface
                    .notify(&format!("Uploaded to YouTube: {}", upload.watch_url));
                Outcome::Done(TrailerUpload { trailer, upload })
            }
            Err(err) => {
                self.set_trailer_stage(TrailerStage::Idle);
                self.fail("trailer upload", err)
            }
        }
    }

    fn set_trailer_stage(&self, stage: TrailerStage) {
        self.session.lock().trailer_stage = stage;
    }

    fn fail<T>(&self, action: &str, err: StudioError) -> Outcome<T> {
        let message = err.to_string();
        match err.status() {
            Some(status) => {
                tracing::warn!(target: "studio", "{action} failed ({status}): {message}")
            }
            None => tracing::warn!(target: "studio", "{action} failed: {message}"),
        }
        self.surface.notify(&message);
        Outcome::Failed(message)
    }

    /// Mark `action` busy. `None` means it is already in flight or its
    /// control is disabled by another running action, the equivalent of
    /// clicking a disabled control.
    fn begin(&self, action: Action) -> Option<ActionGuard<'_>> {
        let mut busy = self.busy.lock();
        if let Some(other) = action.blocked_by().iter().find(|a| busy.contains(*a)) {
            tracing::debug!(target: "studio", "{action:?} disabled while {other:?} is in flight");
            return None;
        }
        if !busy.insert(action) {
            tracing::debug!(target: "studio", "{action:?} already in flight, ignoring");
            return None;
        }
        drop(busy);
        Some(ActionGuard {
            controller: self,
            action,
            label: None,
            reenable: Vec::new(),
        })
    }
}

/// Restores labels and enablement and clears the busy flag when an action
/// ends, including when its future is dropped mid-flight.
struct ActionGuard<'a> {
    controller: &'a PromptController,
    action: Action,
    label: Option<(Control, String)>,
    reenable: Vec<Control>,
}

impl ActionGuard<'_> {
    fn relabel(&mut self, control: Control, label: &str) {
        let surface = &self.controller.surface;
        self.label = Some((control, surface.label(control)));
        surface.set_label(control, label);
    }
}

impl Drop for ActionGuard<'_> {
    fn drop(&mut self) {
        let controller = self.controller;
        let surface = &controller.surface;
        if let Some((control, label)) = self.label.take() {
            surface.set_label(control, &label);
        }
        for control in self.reenable.drain(..) {
            surface.set_enabled(control, true);
        }

        let mut busy = controller.busy.lock();
        busy.remove(&self.action);
        if self.action == Action::Submit && !busy.contains(&Action::Save) {
            surface.set_enabled(Control::Save, controller.has_document());
        }
    }
}
