//! Formatting provider: temp-file round trip through `nginxfmt`.
//!
//! Per request: gate on the document's content type, resolve the
//! formatter, write the effective range to a temp file, run
//! `nginxfmt [--indent <N>] <file>` with the document's directory as
//! cwd, read the rewritten file back, and return one full-range
//! replacement edit. The temp file never outlives the request; it is
//! removed after the read and on every error path.

use std::io::Write;
use std::path::{Path, PathBuf};

use ngxls_env::{EnvProbe, Platform, Tool, resolve_tool};
use ngxls_types::{Document, Range, TextEdit, Ui};

/// Content type this provider accepts.
pub const NGINX_LANGUAGE_ID: &str = "nginx";

#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    /// Wrong content type; rejected before any filesystem side effect.
    #[error("\"nginxfmt\" cannot run, not a nginx file (language id \"{0}\")")]
    NotNginx(String),
    /// No formatter after all three resolution tiers.
    #[error("unable to find the nginxfmt command")]
    FormatterNotFound,
    /// No provider registered with the bridge.
    #[error("no formatting provider is registered")]
    NotRegistered,
    /// The temp file could not be created or written.
    #[error("failed to stage text for nginxfmt: {0}")]
    Stage(#[source] std::io::Error),
    /// The formatter could not be spawned.
    #[error("failed to run nginxfmt: {0}")]
    Spawn(#[source] std::io::Error),
    /// The formatter exited nonzero.
    #[error("nginxfmt exited with {status}: {stderr}")]
    Failed {
        status: std::process::ExitStatus,
        stderr: String,
    },
    /// The rewritten temp file could not be read back.
    #[error("failed to read nginxfmt output: {0}")]
    ReadBack(#[source] std::io::Error),
}

/// Per-request inputs beyond the document itself.
#[derive(Debug, Clone)]
pub struct FormatOptions<'a> {
    /// Explicit formatter path from settings, taken verbatim when set.
    pub configured_path: Option<&'a Path>,
    /// Storage root holding the conventional install location.
    pub storage_root: &'a Path,
    /// Indent width; `0` omits the `--indent` flag entirely.
    pub indent: u32,
}

/// Argument list for the formatter invocation, without the trailing
/// temp-file path.
#[must_use]
pub fn formatter_args(indent: u32) -> Vec<String> {
    if indent == 0 {
        Vec::new()
    } else {
        vec!["--indent".to_string(), indent.to_string()]
    }
}

/// Format `document` (or `range` within it) and return the replacement
/// edit. Temp files are created in the system temp directory.
pub async fn format_document(
    document: &Document,
    range: Option<Range>,
    options: &FormatOptions<'_>,
    ui: &dyn Ui,
    probe: &impl EnvProbe,
) -> Result<TextEdit, FormatError> {
    format_document_in(&std::env::temp_dir(), document, range, options, ui, probe).await
}

/// As [`format_document`], staging the temp file in `tmp_dir` so callers
/// (and tests) can observe cleanup.
pub async fn format_document_in(
    tmp_dir: &Path,
    document: &Document,
    range: Option<Range>,
    options: &FormatOptions<'_>,
    ui: &dyn Ui,
    probe: &impl EnvProbe,
) -> Result<TextEdit, FormatError> {
    if document.language_id() != NGINX_LANGUAGE_ID {
        return Err(FormatError::NotNginx(document.language_id().to_string()));
    }

    let tool = resolve_tool(
        options.configured_path,
        Tool::Formatter,
        options.storage_root,
        Platform::current(),
        probe,
    )
    .ok_or(FormatError::FormatterNotFound)?;

    let range = range.unwrap_or_else(|| document.full_range());
    let text = document.slice(range);

    // Deleted on drop, which covers every exit from here on.
    let mut staged = tempfile::Builder::new()
        .prefix("ngxls-fmt-")
        .suffix(".conf")
        .tempfile_in(tmp_dir)
        .map_err(FormatError::Stage)?;
    staged
        .write_all(text.as_bytes())
        .and_then(|()| staged.flush())
        .map_err(FormatError::Stage)?;

    let args = formatter_args(options.indent);
    let cwd = document
        .path()
        .parent()
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf);

    tracing::info!(
        cwd = %cwd.display(),
        command = %tool.display(),
        args = ?args,
        file = %staged.path().display(),
        "running nginxfmt"
    );

    let invocation = tokio::process::Command::new(&tool)
        .args(&args)
        .arg(staged.path())
        .current_dir(&cwd)
        .kill_on_drop(true)
        .output()
        .await;

    let output = match invocation {
        Ok(output) => output,
        Err(source) => {
            ui.error("There was an error while running nginxfmt.");
            return Err(FormatError::Spawn(source));
        }
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        tracing::warn!(status = %output.status, %stderr, "nginxfmt failed");
        ui.error("There was an error while running nginxfmt.");
        return Err(FormatError::Failed {
            status: output.status,
            stderr,
        });
    }

    // The formatter rewrites the named file in place.
    let new_text = std::fs::read_to_string(staged.path()).map_err(FormatError::ReadBack)?;
    Ok(TextEdit { range, new_text })
}

/// An active formatting-provider registration: the settings snapshot the
/// provider was registered with, resolved once per activation.
#[derive(Debug, Clone)]
pub struct RegisteredFormatter {
    configured_path: Option<PathBuf>,
    indent: u32,
}

impl RegisteredFormatter {
    #[must_use]
    pub fn new(configured_path: Option<PathBuf>, indent: u32) -> Self {
        Self {
            configured_path,
            indent,
        }
    }

    #[must_use]
    pub fn configured_path(&self) -> Option<&Path> {
        self.configured_path.as_deref()
    }

    #[must_use]
    pub fn indent(&self) -> u32 {
        self.indent
    }
}

/// Formatting-provider slot owned by the bridge.
///
/// At most one registration is ever active: registering disposes any
/// previous handle before storing the new one.
#[derive(Debug, Default)]
pub struct FormatterRegistration {
    active: Option<RegisteredFormatter>,
}

impl FormatterRegistration {
    /// Dispose the previous registration, then install the new one.
    pub fn register(&mut self, provider: RegisteredFormatter) {
        self.active.take();
        self.active = Some(provider);
    }

    /// Tear down the active registration, if any.
    pub fn dispose(&mut self) {
        self.active.take();
    }

    #[must_use]
    pub fn active(&self) -> Option<&RegisteredFormatter> {
        self.active.as_ref()
    }
}
