/// Terminal surface
///
/// Stands in for the browser page: the prompt field is an in-memory string,
/// control state is tracked and logged, previews are written to a sandboxed
/// host page on disk, notifications go to stderr.
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use studio_client::preview::host_page;
use studio_client::{Control, Surface};
use tracing::{debug, info, warn};
use url::Url;

const PREVIEW_TITLE: &str = "Studio preview";

pub struct TerminalSurface {
    prompt: Mutex<String>,
    disabled: Mutex<HashSet<Control>>,
    labels: Mutex<HashMap<Control, String>>,
    preview_path: PathBuf,
    base_url: Url,
    open_browser: bool,
    last_navigation: Mutex<Option<Url>>,
}

impl TerminalSurface {
    pub fn new(preview_path: PathBuf, base_url: Url, open_browser: bool) -> Self {
        let labels = HashMap::from([
            (Control::Submit, "Create".to_string()),
            (Control::Save, "Save".to_string()),
            (Control::Trailer, "Generate & Upload Trailer".to_string()),
        ]);
        Self {
            prompt: Mutex::new(String::new()),
            disabled: Mutex::new(HashSet::new()),
            labels: Mutex::new(labels),
            preview_path,
            base_url,
            open_browser,
            last_navigation: Mutex::new(None),
        }
    }

    /// Type into the prompt field
    pub fn set_prompt(&self, text: &str) {
        *self.prompt.lock() = text.to_string();
    }

    pub fn preview_path(&self) -> &Path {
        &self.preview_path
    }

    /// Absolute URL of the last page the controller navigated to
    pub fn last_navigation(&self) -> Option<Url> {
        self.last_navigation.lock().clone()
    }

    fn resolve(&self, path: &str) -> Option<Url> {
        self.base_url.join(path).ok()
    }
}

impl Surface for TerminalSurface {
    fn prompt_text(&self) -> String {
        self.prompt.lock().clone()
    }

    fn set_enabled(&self, control: Control, enabled: bool) {
        let mut disabled = self.disabled.lock();
        let changed = if enabled {
            disabled.remove(&control)
        } else {
            disabled.insert(control)
        };
        if changed {
            debug!("{control} {}", if enabled { "enabled" } else { "disabled" });
        }
    }

    fn label(&self, control: Control) -> String {
        self.labels.lock().get(&control).cloned().unwrap_or_default()
    }

    fn set_label(&self, control: Control, label: &str) {
        self.labels.lock().insert(control, label.to_string());
        info!("[{control}] {label}");
    }

    fn render_preview(&self, html: &str) {
        match std::fs::write(&self.preview_path, host_page(PREVIEW_TITLE, html)) {
            Ok(()) => info!(
                "Preview updated: {} ({} bytes)",
                self.preview_path.display(),
                html.len()
            ),
            Err(e) => warn!(
                "Failed to write preview {}: {}",
                self.preview_path.display(),
                e
            ),
        }
    }

    fn notify(&self, message: &str) {
        eprintln!("\n  {message}\n");
    }

    fn navigate(&self, path: &str) {
        let Some(url) = self.resolve(path) else {
            warn!("Cannot resolve navigation target: {}", path);
            return;
        };
        println!("Saved: {url}");
        if self.open_browser {
            if let Err(e) = webbrowser::open(url.as_str()) {
                warn!("Failed to open browser: {}", e);
            }
        }
        *self.last_navigation.lock() = Some(url);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn surface(dir: &Path) -> TerminalSurface {
        TerminalSurface::new(
            dir.join("preview.html"),
            Url::parse("http://127.0.0.1:5000").unwrap(),
            false,
        )
    }

    #[test]
    fn test_preview_written_as_sandboxed_host_page() {
        let dir = tempfile::tempdir().unwrap();
        let surface = surface(dir.path());

        surface.render_preview("<html><script>alert(1)</script></html>");

        let written = std::fs::read_to_string(surface.preview_path()).unwrap();
        assert!(written.contains("sandbox=\"allow-scripts"));
        assert!(!written.contains("<script>"));
    }

    #[test]
    fn test_navigation_resolves_against_base_url() {
        let dir = tempfile::tempdir().unwrap();
        let surface = surface(dir.path());

        surface.navigate("/games/pong/");
        assert_eq!(
            surface.last_navigation().unwrap().as_str(),
            "http://127.0.0.1:5000/games/pong/"
        );
    }

    #[test]
    fn test_labels_and_enablement() {
        let dir = tempfile::tempdir().unwrap();
        let surface = surface(dir.path());

        assert_eq!(surface.label(Control::Submit), "Create");
        surface.set_label(Control::Submit, "Refining…");
        assert_eq!(surface.label(Control::Submit), "Refining…");

        surface.set_enabled(Control::Save, false);
        assert!(surface.disabled.lock().contains(&Control::Save));
        surface.set_enabled(Control::Save, true);
        assert!(surface.disabled.lock().is_empty());
    }
}
