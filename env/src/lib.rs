//! Environment resolution and installation for the nginx tooling.
//!
//! Locates the external `nginx-language-server` and `nginxfmt`
//! executables (configured path, then search path, then the conventional
//! venv location) and provisions the isolated environment when they are
//! missing. Resolution is read-only probing; the installer is the only
//! thing here that writes to the filesystem.

pub mod install;
pub mod probe;
pub mod resolve;
pub mod shell;

pub use install::{
    InstallError, InstallOutcome, NGINX_LS_VERSION, NGINXFMT_VERSION, ShellRunner,
    TokioShellRunner, install, install_command,
};
pub use probe::{EnvProbe, SystemProbe};
pub use resolve::{Platform, Tool, resolve_python, resolve_tool, venv_dir, venv_executable};
