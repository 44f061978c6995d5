//! Platform shell used to run the composite install command.

use std::path::PathBuf;

/// Shell binary plus the arguments that introduce a command string.
#[derive(Debug, Clone)]
pub struct HostShell {
    pub binary: PathBuf,
    pub args: Vec<String>,
}

/// The platform shell: `cmd /C` on Windows, `sh -c` elsewhere.
#[must_use]
pub fn host_shell() -> HostShell {
    if cfg!(windows) {
        HostShell {
            binary: PathBuf::from("cmd"),
            args: vec!["/C".to_string()],
        }
    } else {
        HostShell {
            binary: PathBuf::from("sh"),
            args: vec!["-c".to_string()],
        }
    }
}
