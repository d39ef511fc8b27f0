//! Preview and code viewer
//!
//! Fetches a generated website once and exposes the read-only operations on
//! it: rendered/source toggle, copy acknowledgement, export to a file and a
//! sandboxed fullscreen document. None of these mutate the artifact; only the
//! edit workflow does.

use crate::api::Backend;
use crate::error::CoreError;
use crate::gate::{format_tokens, TokenGate};
use sitegen_types::WebsiteArtifact;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// How long the "Copied!" acknowledgement stays visible
pub const COPY_ACK_DURATION: Duration = Duration::from_secs(2);

/// Sandbox flags for rendered markup: scripts, same-origin and forms allowed;
/// top-level navigation, popups and downloads are not.
pub const SANDBOX_FLAGS: &str = "allow-scripts allow-same-origin allow-forms";

/// Download file name for a website
pub fn download_file_name(website_id: &str) -> String {
    format!("website-{}.html", website_id)
}

/// Write the stored markup verbatim to `<dir>/website-{id}.html`
pub fn export_to(dir: &Path, artifact: &WebsiteArtifact) -> Result<PathBuf, CoreError> {
    std::fs::create_dir_all(dir).map_err(|source| CoreError::Export {
        path: dir.to_path_buf(),
        source,
    })?;
    let path = dir.join(download_file_name(&artifact.id));
    std::fs::write(&path, artifact.code.as_bytes()).map_err(|source| CoreError::Export {
        path: path.clone(),
        source,
    })?;
    info!(website_id = %artifact.id, path = %path.display(), "Website exported");
    Ok(path)
}

/// Wrap markup in a host page that renders it inside a sandboxed iframe
pub fn sandboxed_document(title: &str, code: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n\
<style>html,body{{margin:0;height:100%;}}iframe{{border:0;width:100%;height:100%;}}</style>\n\
</head>\n<body>\n<iframe title=\"{title}\" sandbox=\"{flags}\" srcdoc=\"{doc}\"></iframe>\n</body>\n</html>\n",
        title = escape_attr(title),
        flags = SANDBOX_FLAGS,
        doc = escape_attr(code),
    )
}

/// Write the sandbox host page to the temp directory for a browser to open
pub fn write_sandbox_file(artifact: &WebsiteArtifact) -> Result<PathBuf, CoreError> {
    let path = std::env::temp_dir().join(format!("sitegen-preview-{}.html", sanitize(&artifact.id)));
    let document = sandboxed_document("Website Fullscreen", &artifact.code);
    std::fs::write(&path, document).map_err(|source| CoreError::Export {
        path: path.clone(),
        source,
    })?;
    debug!(path = %path.display(), "Sandbox document written");
    Ok(path)
}

/// Warning shown on the preview screen when editing is out of reach
pub fn low_balance_warning(gate: &TokenGate, balance: u64) -> Option<String> {
    if gate.allows(balance) {
        return None;
    }
    Some(format!(
        "You need at least {} tokens to edit websites. You currently have {} tokens.",
        format_tokens(gate.minimum()),
        format_tokens(balance)
    ))
}

fn escape_attr(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + raw.len() / 8);
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
    out
}

fn sanitize(id: &str) -> String {
    id.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Preview,
    Code,
}

impl ViewMode {
    pub fn toggle(self) -> Self {
        match self {
            ViewMode::Preview => ViewMode::Code,
            ViewMode::Code => ViewMode::Preview,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ViewMode::Preview => "Preview",
            ViewMode::Code => "Code",
        }
    }
}

/// Preview screen state for one website id
#[derive(Debug, Clone)]
pub struct PreviewState {
    website_id: String,
    artifact: Option<WebsiteArtifact>,
    loading: bool,
    error: Option<String>,
    mode: ViewMode,
    fullscreen: bool,
    copied_at: Option<Instant>,
}

impl PreviewState {
    pub fn new(website_id: impl Into<String>) -> Self {
        Self {
            website_id: website_id.into(),
            artifact: None,
            loading: true,
            error: None,
            mode: ViewMode::default(),
            fullscreen: false,
            copied_at: None,
        }
    }

    pub fn website_id(&self) -> &str {
        &self.website_id
    }

    pub fn artifact(&self) -> Option<&WebsiteArtifact> {
        self.artifact.as_ref()
    }

    /// Mutable access for the edit workflow
    pub fn artifact_mut(&mut self) -> Option<&mut WebsiteArtifact> {
        self.artifact.as_mut()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Surface an error from another flow (edit gate refusal, copy failure)
    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// Apply the result of the single fetch
    pub fn apply_fetch(&mut self, result: Result<WebsiteArtifact, CoreError>) {
        self.loading = false;
        match result {
            Ok(artifact) => {
                debug!(website_id = %artifact.id, lines = artifact.line_count(), "Website loaded");
                self.artifact = Some(artifact);
                self.error = None;
            }
            Err(e) => self.error = Some(e.to_string()),
        }
    }

    /// Fetch the artifact from the backend
    pub async fn load(&mut self, backend: &dyn Backend) {
        let result = backend.fetch_website(&self.website_id).await;
        self.apply_fetch(result);
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: ViewMode) {
        self.mode = mode;
    }

    pub fn toggle_mode(&mut self) {
        self.mode = self.mode.toggle();
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    pub fn enter_fullscreen(&mut self) -> bool {
        if self.artifact.is_some() {
            self.fullscreen = true;
        }
        self.fullscreen
    }

    pub fn exit_fullscreen(&mut self) {
        self.fullscreen = false;
    }

    /// Record a successful clipboard copy
    pub fn mark_copied(&mut self, now: Instant) {
        self.copied_at = Some(now);
    }

    pub fn copied_visible(&self, now: Instant) -> bool {
        self.copied_at
            .is_some_and(|at| now.saturating_duration_since(at) < COPY_ACK_DURATION)
    }

    /// Export to `dir`; `None` until the artifact has loaded
    pub fn export(&self, dir: &Path) -> Option<Result<PathBuf, CoreError>> {
        self.artifact.as_ref().map(|a| export_to(dir, a))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_download_file_name() {
        assert_eq!(download_file_name("abc123"), "website-abc123.html");
    }

    #[test]
    fn test_export_writes_code_verbatim() {
        let dir = tempdir().unwrap();
        let artifact = WebsiteArtifact::new("abc123", "<html>\n<p>hi &amp; bye</p>\n</html>", None);
        let path = export_to(dir.path(), &artifact).unwrap();

        assert_eq!(path.file_name().unwrap(), "website-abc123.html");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), artifact.code);
    }

    #[test]
    fn test_sandboxed_document_escapes_markup() {
        let doc = sandboxed_document("Site", "<p class=\"x\">a & b</p>");
        assert!(doc.contains("sandbox=\"allow-scripts allow-same-origin allow-forms\""));
        assert!(doc.contains("srcdoc=\"&lt;p class=&quot;x&quot;&gt;a &amp; b&lt;/p&gt;\""));
        assert!(!doc.contains("<p class"));
    }

    #[test]
    fn test_low_balance_warning() {
        let gate = TokenGate::default();
        assert_eq!(low_balance_warning(&gate, 35_000), None);
        let warning = low_balance_warning(&gate, 12_000).unwrap();
        assert!(warning.contains("35.0"));
        assert!(warning.contains("12.0"));
    }

    #[test]
    fn test_preview_state_lifecycle() {
        let mut state = PreviewState::new("w1");
        assert!(state.is_loading());
        assert!(!state.enter_fullscreen());

        state.apply_fetch(Ok(WebsiteArtifact::new("w1", "<html></html>", None)));
        assert!(!state.is_loading());
        assert!(state.enter_fullscreen());
        state.exit_fullscreen();

        assert_eq!(state.mode(), ViewMode::Preview);
        state.toggle_mode();
        assert_eq!(state.mode(), ViewMode::Code);

        let now = Instant::now();
        state.mark_copied(now);
        assert!(state.copied_visible(now + Duration::from_millis(1_500)));
        assert!(!state.copied_visible(now + COPY_ACK_DURATION));
    }

    #[test]
    fn test_failed_fetch_surfaces_error() {
        let mut state = PreviewState::new("missing");
        state.apply_fetch(Err(CoreError::Backend {
            status: 404,
            message: "Website not found".to_string(),
        }));
        assert_eq!(state.error(), Some("Website not found"));
        assert!(state.artifact().is_none());
        assert!(state.export(Path::new(".")).is_none());
    }
}
