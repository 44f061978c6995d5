//! Three-tier executable resolution.
//!
//! Order, first success wins with no merging:
//!
//! 1. explicit configured path, returned verbatim with no existence check,
//!    so misconfiguration surfaces at launch time rather than here;
//! 2. the process search path;
//! 3. the conventional location inside the isolated environment.
//!
//! Resolution is repeated in full on every activation. It is not
//! memoized: a prior install may have changed the filesystem since the
//! last run.

use std::path::{Path, PathBuf};

use crate::probe::EnvProbe;

/// Executables this integration locates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    LanguageServer,
    Formatter,
}

impl Tool {
    /// Name of the executable as found on a search path.
    #[must_use]
    pub fn command_name(self) -> &'static str {
        match self {
            Tool::LanguageServer => "nginx-language-server",
            Tool::Formatter => "nginxfmt",
        }
    }
}

/// Host platform family, split only where executable layout differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    Unix,
}

impl Platform {
    #[must_use]
    pub fn current() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else {
            Platform::Unix
        }
    }
}

/// The isolated environment's directory under the storage root.
///
/// The installer may destroy and recreate this wholesale; nothing else
/// owns or writes to it.
#[must_use]
pub fn venv_dir(storage_root: &Path) -> PathBuf {
    storage_root.join("nginx-language-server").join("venv")
}

/// Conventional path of `tool` inside the isolated environment:
/// `venv/Scripts/<name>.exe` on Windows, `venv/bin/<name>` elsewhere.
#[must_use]
pub fn venv_executable(storage_root: &Path, tool: Tool, platform: Platform) -> PathBuf {
    venv_binary(storage_root, tool.command_name(), platform)
}

/// The environment's own pip, used by the installer's composite command.
#[must_use]
pub fn venv_pip(storage_root: &Path, platform: Platform) -> PathBuf {
    venv_binary(storage_root, "pip", platform)
}

fn venv_binary(storage_root: &Path, name: &str, platform: Platform) -> PathBuf {
    let venv = venv_dir(storage_root);
    match platform {
        Platform::Windows => venv.join("Scripts").join(format!("{name}.exe")),
        Platform::Unix => venv.join("bin").join(name),
    }
}

/// Resolve `tool` through the three tiers.
///
/// `None` means "not found" and triggers the install flow; it is not an
/// error here.
pub fn resolve_tool(
    configured: Option<&Path>,
    tool: Tool,
    storage_root: &Path,
    platform: Platform,
    probe: &impl EnvProbe,
) -> Option<PathBuf> {
    if let Some(path) = configured {
        return Some(path.to_path_buf());
    }

    if let Some(path) = probe.lookup(tool.command_name()) {
        return Some(path);
    }

    let conventional = venv_executable(storage_root, tool, platform);
    if probe.exists(&conventional) {
        tracing::debug!(tool = tool.command_name(), path = %conventional.display(), "resolved from venv");
        return Some(conventional);
    }

    None
}

/// Resolve the interpreter used to bootstrap the isolated environment:
/// configured override, then `python3`, then `python` on the search path.
///
/// `None` means the caller cannot proceed to install anything and must
/// surface an error.
pub fn resolve_python(
    configured: Option<&Path>,
    canonicalize: bool,
    probe: &impl EnvProbe,
) -> Option<PathBuf> {
    let found = match configured {
        Some(path) => path.to_path_buf(),
        None => probe
            .lookup("python3")
            .or_else(|| probe.lookup("python"))?,
    };

    if canonicalize {
        Some(probe.canonicalize(&found))
    } else {
        Some(found)
    }
}
