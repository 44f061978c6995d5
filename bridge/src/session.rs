//! Language-server session lifecycle.
//!
//! The session owns the spawned server process and nothing else: the
//! wire protocol runs entirely between the host and the server over the
//! inherited stdio transport, so nothing here reads or writes frames.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use anyhow::{Context, Result};
use tokio::process::{Child, Command};

/// A running language-server process bound to the host transport.
///
/// Dropping the session kills the child (`kill_on_drop`); that drop is
/// the disposal handle the deactivation path relies on.
pub struct Session {
    command: PathBuf,
    child: Child,
}

impl Session {
    /// Spawn `command` with stdio passed through to the host transport.
    ///
    /// A configured-but-wrong executable path fails here, at launch time,
    /// not during resolution.
    pub fn start(command: &Path) -> Result<Self> {
        let child = Command::new(command)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("spawning {}", command.display()))?;

        tracing::info!(command = %command.display(), "language server session started");
        Ok(Self {
            command: command.to_path_buf(),
            child,
        })
    }

    /// Path of the executable this session runs.
    #[must_use]
    pub fn command(&self) -> &Path {
        &self.command
    }

    /// Wait for the server to exit on its own.
    pub async fn wait(&mut self) -> Result<std::process::ExitStatus> {
        self.child
            .wait()
            .await
            .context("waiting on language server")
    }

    /// Stop the session, killing the server if it is still running.
    pub async fn stop(mut self) {
        if let Ok(Some(status)) = self.child.try_wait() {
            tracing::debug!(command = %self.command.display(), %status, "language server already exited");
            return;
        }
        tracing::info!(command = %self.command.display(), "stopping language server session");
        let _ = self.child.kill().await;
    }
}
