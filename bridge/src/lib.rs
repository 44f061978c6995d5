//! Bridge between the host editor and the external nginx tooling.
//!
//! Activation resolves the language server (installing it on demand),
//! starts it as a child-process session, and registers the formatting
//! provider. Everything here works on the plain value records from
//! `ngxls-types`; host editor types never cross this boundary.

pub mod format;
pub mod session;

pub use format::{
    FormatError, FormatOptions, FormatterRegistration, NGINX_LANGUAGE_ID, RegisteredFormatter,
    format_document, formatter_args,
};
pub use session::Session;

use std::path::{Path, PathBuf};

use ngxls_env::{
    EnvProbe, Platform, ShellRunner, SystemProbe, TokioShellRunner, Tool, install, resolve_python,
    resolve_tool, venv_executable,
};
use ngxls_types::{Document, Range, Settings, TextEdit, Ui};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivateOutcome {
    Started,
    /// The integration is disabled in settings; nothing was probed or
    /// started.
    Disabled,
}

#[derive(Debug, thiserror::Error)]
pub enum ActivateError {
    /// No server after resolution and the install flow. Terminal for
    /// this activation; the integration simply does not start.
    #[error("\"nginx-language-server\" does not exist")]
    ServerMissing,
    /// The resolved server could not be spawned.
    #[error("failed to start language server: {0:#}")]
    Start(#[source] anyhow::Error),
}

/// Owns the session and the formatting-provider registration for one
/// activation.
pub struct Bridge<P = SystemProbe, R = TokioShellRunner> {
    settings: Settings,
    storage_root: PathBuf,
    probe: P,
    runner: R,
    session: Option<Session>,
    formatter: FormatterRegistration,
}

impl Bridge {
    #[must_use]
    pub fn new(settings: Settings, storage_root: PathBuf) -> Self {
        Self::with_parts(settings, storage_root, SystemProbe, TokioShellRunner)
    }
}

impl<P: EnvProbe, R: ShellRunner> Bridge<P, R> {
    #[must_use]
    pub fn with_parts(settings: Settings, storage_root: PathBuf, probe: P, runner: R) -> Self {
        Self {
            settings,
            storage_root,
            probe,
            runner,
            session: None,
            formatter: FormatterRegistration::default(),
        }
    }

    /// Activation: resolve the server (installing on demand), start the
    /// session, and register the formatting provider.
    pub async fn activate(&mut self, ui: &dyn Ui) -> Result<ActivateOutcome, ActivateError> {
        if !self.settings.enable() {
            return Ok(ActivateOutcome::Disabled);
        }

        let server = self.locate_server(ui).await?;
        let session = Session::start(&server).map_err(ActivateError::Start)?;
        self.session = Some(session);
        self.register_formatter();
        Ok(ActivateOutcome::Started)
    }

    /// Resolve the server, falling back to the install flow.
    ///
    /// After an install attempt the conventional location is recomputed
    /// deterministically; full resolution is not re-run.
    async fn locate_server(&self, ui: &dyn Ui) -> Result<PathBuf, ActivateError> {
        if let Some(path) = resolve_tool(
            self.settings.command_path(),
            Tool::LanguageServer,
            &self.storage_root,
            Platform::current(),
            &self.probe,
        ) {
            return Ok(path);
        }

        match resolve_python(self.settings.python_path(), false, &self.probe) {
            Some(python) => {
                if let Err(error) = install(&python, &self.storage_root, true, ui, &self.runner).await
                {
                    tracing::warn!(%error, "install during activation failed");
                }
            }
            None => ui.error("python3/python command not found"),
        }

        let assumed = venv_executable(&self.storage_root, Tool::LanguageServer, Platform::current());
        if self.probe.exists(&assumed) {
            Ok(assumed)
        } else {
            ui.error("Exit because \"nginx-language-server\" does not exist.");
            Err(ActivateError::ServerMissing)
        }
    }

    fn register_formatter(&mut self) {
        self.formatter.register(RegisteredFormatter::new(
            self.settings.formatter_command_path().map(Path::to_path_buf),
            self.settings.formatter_indent(),
        ));
    }

    /// User-invoked install/upgrade: stop the running session if any,
    /// reinstall the tools, then restart the session.
    pub async fn reinstall(&mut self, ui: &dyn Ui) -> anyhow::Result<()> {
        if let Some(session) = self.session.take() {
            session.stop().await;
        }
        self.formatter.dispose();

        let Some(python) = resolve_python(self.settings.python_path(), false, &self.probe) else {
            ui.error("python3/python command not found");
            anyhow::bail!("python3/python command not found");
        };
        install(&python, &self.storage_root, true, ui, &self.runner).await?;

        let server = resolve_tool(
            self.settings.command_path(),
            Tool::LanguageServer,
            &self.storage_root,
            Platform::current(),
            &self.probe,
        )
        .ok_or_else(|| anyhow::anyhow!("\"nginx-language-server\" does not exist"))?;
        self.session = Some(Session::start(&server)?);
        self.register_formatter();
        Ok(())
    }

    /// Format through the registered provider.
    pub async fn format(
        &self,
        document: &Document,
        range: Option<Range>,
        ui: &dyn Ui,
    ) -> Result<TextEdit, FormatError> {
        let provider = self.formatter.active().ok_or(FormatError::NotRegistered)?;
        let options = FormatOptions {
            configured_path: provider.configured_path(),
            storage_root: &self.storage_root,
            indent: provider.indent(),
        };
        format::format_document(document, range, &options, ui, &self.probe).await
    }

    #[must_use]
    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    /// Executable the current session is running, if any.
    #[must_use]
    pub fn session_command(&self) -> Option<&Path> {
        self.session.as_ref().map(Session::command)
    }

    /// Wait for the server to exit on its own.
    pub async fn wait(&mut self) -> anyhow::Result<std::process::ExitStatus> {
        match self.session.as_mut() {
            Some(session) => session.wait().await,
            None => anyhow::bail!("no running language server session"),
        }
    }

    /// Deactivation teardown: dispose the formatter registration and
    /// stop the session.
    pub async fn shutdown(&mut self) {
        self.formatter.dispose();
        if let Some(session) = self.session.take() {
            session.stop().await;
        }
    }
}
