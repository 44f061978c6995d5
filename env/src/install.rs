//! Destructive installer for the isolated runtime environment.
//!
//! One composite shell command creates the venv with the resolved
//! interpreter and installs the pinned tools through the venv's own pip.
//! Any pre-existing environment is removed first, whether it was valid
//! or corrupt; a mid-sequence failure leaves whatever the command left
//! behind, to be destroyed again on the next attempt. Failures are never
//! retried here; the caller decides whether to re-offer installation.

use std::path::{Path, PathBuf};
use std::process::Output;

use ngxls_types::{Ui, progress};

use crate::resolve::{Platform, venv_dir, venv_pip};
use crate::shell::host_shell;

/// Versions installed into the environment. Both must refer to packages
/// that exist on PyPI at install time; that is outside this system's
/// control.
pub const NGINX_LS_VERSION: &str = "0.8.0";
pub const NGINXFMT_VERSION: &str = "1.2.2";

/// Seam for running the composite command through the platform shell.
///
/// Tests substitute a recording runner to observe what the installer had
/// already done by the time the command was issued.
pub trait ShellRunner {
    async fn run(&self, command: &str) -> std::io::Result<Output>;
}

/// Runner backed by the platform shell via tokio.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioShellRunner;

impl ShellRunner for TokioShellRunner {
    async fn run(&self, command: &str) -> std::io::Result<Output> {
        let shell = host_shell();
        tokio::process::Command::new(&shell.binary)
            .args(&shell.args)
            .arg(command)
            .kill_on_drop(true)
            .output()
            .await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    Installed,
    /// The user declined the confirmation prompt; nothing was touched.
    Cancelled,
}

#[derive(Debug, thiserror::Error)]
pub enum InstallError {
    /// The pre-existing environment could not be removed.
    #[error("failed to clear {dir}: {source}")]
    Clear {
        dir: PathBuf,
        source: std::io::Error,
    },
    /// The composite command could not be spawned or waited on.
    #[error("failed to run install command: {0}")]
    Exec(#[source] std::io::Error),
    /// The composite command exited nonzero.
    #[error("install command exited with {status}: {stderr}")]
    Failed {
        status: std::process::ExitStatus,
        stderr: String,
    },
}

/// The composite create-then-install command, run through the platform
/// shell so the two stages share one child process.
#[must_use]
pub fn install_command(python: &Path, storage_root: &Path, platform: Platform) -> String {
    let venv = venv_dir(storage_root);
    let pip = venv_pip(storage_root, platform);
    format!(
        "{} -m venv {} && {} install -U pip nginx-language-server=={NGINX_LS_VERSION} nginxfmt=={NGINXFMT_VERSION}",
        python.display(),
        venv.display(),
        pip.display(),
    )
}

/// Provision a fresh isolated environment holding the pinned tools.
///
/// With `confirm`, the user is asked first; cancelling aborts with no
/// side effects. Progress is a transient status indicator shown for the
/// duration of the command. Success and failure are both reported
/// through `ui`; failure is additionally signaled to the caller.
pub async fn install(
    python: &Path,
    storage_root: &Path,
    confirm: bool,
    ui: &dyn Ui,
    runner: &impl ShellRunner,
) -> Result<InstallOutcome, InstallError> {
    if confirm && !ui.confirm("Install \"nginx-language-server\" and \"nginxfmt\"?") {
        return Ok(InstallOutcome::Cancelled);
    }

    let venv = venv_dir(storage_root);
    clear_dir(&venv)?;

    let command = install_command(python, storage_root, Platform::current());
    tracing::info!(%command, "installing nginx tools");

    let _status = progress(ui, "Install nginx-language-server ...");
    ui.warn("Install nginx-language-server...");

    let output = match runner.run(&command).await {
        Ok(output) => output,
        Err(source) => {
            ui.error(&format!("nginx-language-server: install failed. | {source}"));
            return Err(InstallError::Exec(source));
        }
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        ui.error(&format!("nginx-language-server: install failed. | {stderr}"));
        return Err(InstallError::Failed {
            status: output.status,
            stderr,
        });
    }

    ui.warn("nginx-language-server: installed!");
    Ok(InstallOutcome::Installed)
}

/// Clean-slate removal of the environment directory. Absence is fine.
fn clear_dir(dir: &Path) -> Result<(), InstallError> {
    match std::fs::remove_dir_all(dir) {
        Ok(()) => Ok(()),
        Err(source) if source.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(InstallError::Clear {
            dir: dir.to_path_buf(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingUi {
        confirm_answer: bool,
        confirmations: RefCell<u32>,
        errors: RefCell<Vec<String>>,
        progress_open: RefCell<i32>,
    }

    impl RecordingUi {
        fn answering(confirm_answer: bool) -> Self {
            Self {
                confirm_answer,
                ..Self::default()
            }
        }
    }

    impl Ui for RecordingUi {
        fn info(&self, _message: &str) {}
        fn warn(&self, _message: &str) {}
        fn error(&self, message: &str) {
            self.errors.borrow_mut().push(message.to_string());
        }
        fn confirm(&self, _prompt: &str) -> bool {
            *self.confirmations.borrow_mut() += 1;
            self.confirm_answer
        }
        fn begin_progress(&self, _message: &str) {
            *self.progress_open.borrow_mut() += 1;
        }
        fn end_progress(&self) {
            *self.progress_open.borrow_mut() -= 1;
        }
    }

    #[cfg(unix)]
    fn exit_status(code: i32) -> std::process::ExitStatus {
        use std::os::unix::process::ExitStatusExt;
        std::process::ExitStatus::from_raw(code << 8)
    }

    /// Runner that records whether the venv directory still existed when
    /// the composite command was issued.
    struct InspectingRunner {
        venv: PathBuf,
        venv_existed_at_run: Mutex<Option<bool>>,
        exit_code: i32,
    }

    impl InspectingRunner {
        fn new(storage_root: &Path, exit_code: i32) -> Self {
            Self {
                venv: venv_dir(storage_root),
                venv_existed_at_run: Mutex::new(None),
                exit_code,
            }
        }

        fn ran(&self) -> bool {
            self.venv_existed_at_run.lock().unwrap().is_some()
        }
    }

    #[cfg(unix)]
    impl ShellRunner for InspectingRunner {
        async fn run(&self, _command: &str) -> std::io::Result<Output> {
            *self.venv_existed_at_run.lock().unwrap() = Some(self.venv.exists());
            Ok(Output {
                status: exit_status(self.exit_code),
                stdout: Vec::new(),
                stderr: b"boom".to_vec(),
            })
        }
    }

    fn seed_stale_venv(storage_root: &Path) {
        let venv = venv_dir(storage_root);
        std::fs::create_dir_all(venv.join("bin")).unwrap();
        std::fs::write(venv.join("bin").join("stale"), "junk").unwrap();
    }

    #[test]
    fn install_command_composes_both_stages_with_pinned_versions() {
        let command = install_command(
            Path::new("/usr/bin/python3"),
            Path::new("/data/ngxls"),
            Platform::Unix,
        );
        assert!(command.starts_with("/usr/bin/python3 -m venv /data/ngxls/nginx-language-server/venv && "));
        assert!(command.contains("/data/ngxls/nginx-language-server/venv/bin/pip install -U pip"));
        assert!(command.contains(&format!("nginx-language-server=={NGINX_LS_VERSION}")));
        assert!(command.contains(&format!("nginxfmt=={NGINXFMT_VERSION}")));
    }

    #[test]
    fn install_command_uses_scripts_pip_on_windows() {
        let command = install_command(
            Path::new("C:/Python/python.exe"),
            Path::new("C:/data/ngxls"),
            Platform::Windows,
        );
        assert!(command.contains("Scripts"));
        assert!(command.contains("pip.exe"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn stale_environment_is_removed_before_the_command_runs() {
        let storage = tempfile::tempdir().unwrap();
        seed_stale_venv(storage.path());
        let runner = InspectingRunner::new(storage.path(), 0);
        let ui = RecordingUi::answering(true);

        let outcome = install(Path::new("python3"), storage.path(), false, &ui, &runner)
            .await
            .unwrap();

        assert_eq!(outcome, InstallOutcome::Installed);
        assert_eq!(*runner.venv_existed_at_run.lock().unwrap(), Some(false));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn cancellation_leaves_the_environment_untouched() {
        let storage = tempfile::tempdir().unwrap();
        seed_stale_venv(storage.path());
        let runner = InspectingRunner::new(storage.path(), 0);
        let ui = RecordingUi::answering(false);

        let outcome = install(Path::new("python3"), storage.path(), true, &ui, &runner)
            .await
            .unwrap();

        assert_eq!(outcome, InstallOutcome::Cancelled);
        assert_eq!(*ui.confirmations.borrow(), 1);
        assert!(!runner.ran());
        assert!(venv_dir(storage.path()).join("bin").join("stale").exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn nonzero_exit_is_reported_and_signaled() {
        let storage = tempfile::tempdir().unwrap();
        let runner = InspectingRunner::new(storage.path(), 1);
        let ui = RecordingUi::answering(true);

        let result = install(Path::new("python3"), storage.path(), false, &ui, &runner).await;

        match result {
            Err(InstallError::Failed { stderr, .. }) => assert_eq!(stderr, "boom"),
            other => panic!("expected Failed, got {other:?}"),
        }
        assert_eq!(ui.errors.borrow().len(), 1);
        assert!(ui.errors.borrow()[0].contains("install failed"));
        // Status indicator hidden on the failure path too.
        assert_eq!(*ui.progress_open.borrow(), 0);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn spawn_error_is_reported_and_signaled() {
        struct FailingRunner;
        impl ShellRunner for FailingRunner {
            async fn run(&self, _command: &str) -> std::io::Result<Output> {
                Err(std::io::Error::other("no shell"))
            }
        }

        let storage = tempfile::tempdir().unwrap();
        let ui = RecordingUi::answering(true);

        let result = install(
            Path::new("python3"),
            storage.path(),
            false,
            &ui,
            &FailingRunner,
        )
        .await;

        assert!(matches!(result, Err(InstallError::Exec(_))));
        assert_eq!(ui.errors.borrow().len(), 1);
        assert_eq!(*ui.progress_open.borrow(), 0);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn success_runs_once_without_confirmation_when_not_asked() {
        let storage = tempfile::tempdir().unwrap();
        let runner = InspectingRunner::new(storage.path(), 0);
        let ui = RecordingUi::answering(false);

        let outcome = install(Path::new("python3"), storage.path(), false, &ui, &runner)
            .await
            .unwrap();

        assert_eq!(outcome, InstallOutcome::Installed);
        assert_eq!(*ui.confirmations.borrow(), 0);
        assert!(runner.ran());
    }
}
