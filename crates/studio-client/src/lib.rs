/// Studio client
///
/// Drives a generative game studio server: submit a prompt to generate or
/// refine a single-page HTML game, preview it in a sandboxed frame, save it
/// to the library, and render plus upload a trailer for it.

pub mod api;
pub mod backends;
pub mod controller;
pub mod error;
pub mod preview;
pub mod surface;

pub use api::{GeneratedPage, SaveResponse, TrailerResponse, UploadResponse};
pub use backends::{BackendType, ClientConfig, HttpBackend, MockBackend, StudioBackend};
pub use controller::{
    ControllerOptions, Mode, Outcome, PromptController, TrailerStage, TrailerUpload,
};
pub use error::{Result, StudioError};
pub use surface::{Control, Surface};

impl From<&ClientConfig> for ControllerOptions {
    fn from(config: &ClientConfig) -> Self {
        Self {
            model: config.model.clone(),
            trailer_model: config.trailer_model.clone(),
        }
    }
}
