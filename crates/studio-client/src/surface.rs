/// UI handles the controller drives
///
/// The controller never looks anything up by itself: the prompt field,
/// control enablement, labels, the preview, notifications and navigation
/// all come through a [`Surface`] injected at construction.
use std::fmt;

/// Interactive controls the controller toggles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    /// Prompt text field
    Prompt,
    /// Submit button of the prompt form
    Submit,
    /// Save button
    Save,
    /// Generate & upload trailer button
    Trailer,
}

impl Control {
    /// Controls that belong to the prompt form
    pub const FORM: [Control; 2] = [Control::Prompt, Control::Submit];
}

impl fmt::Display for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Prompt => write!(f, "prompt"),
            Self::Submit => write!(f, "submit"),
            Self::Save => write!(f, "save"),
            Self::Trailer => write!(f, "trailer"),
        }
    }
}

pub trait Surface: Send + Sync {
    /// Live value of the prompt field, untrimmed
    fn prompt_text(&self) -> String;

    fn set_enabled(&self, control: Control, enabled: bool);

    fn label(&self, control: Control) -> String;

    fn set_label(&self, control: Control, label: &str);

    /// Show a generated document.
    ///
    /// Implementations must render `html` in an isolated context (a
    /// sandboxed frame, see [`crate::preview::host_page`]) and never
    /// evaluate it inside the host page.
    fn render_preview(&self, html: &str);

    /// Blocking, user-visible message
    fn notify(&self, message: &str);

    /// Move to a backend-provided path such as `/games/<slug>/`
    fn navigate(&self, path: &str);
}
