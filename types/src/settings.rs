//! Typed configuration contract.
//!
//! The recognized key set is closed and every key has a documented
//! default; unknown keys are rejected at the deserialization boundary.
//! Raw TOML structs (with string fields and serde defaults) stay private;
//! the public [`Settings`] type holds resolved values: an empty path
//! string in the file becomes "unset" here.
//!
//! | key                      | default | effect                                  |
//! |--------------------------|---------|-----------------------------------------|
//! | `enable`                 | `true`  | gate for the whole integration          |
//! | `command_path`           | unset   | language-server executable override     |
//! | `python_path`            | unset   | interpreter override for installs       |
//! | `formatter.command_path` | unset   | formatter executable override           |
//! | `formatter.indent`       | `4`     | `--indent` width; `0` omits the flag    |

use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawSettings {
    enable: bool,
    command_path: String,
    python_path: String,
    formatter: RawFormatterSettings,
}

impl Default for RawSettings {
    fn default() -> Self {
        Self {
            enable: true,
            command_path: String::new(),
            python_path: String::new(),
            formatter: RawFormatterSettings::default(),
        }
    }
}

#[derive(Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawFormatterSettings {
    command_path: String,
    indent: u32,
}

impl Default for RawFormatterSettings {
    fn default() -> Self {
        Self {
            command_path: String::new(),
            indent: 4,
        }
    }
}

/// Resolved settings, re-read once per activation.
#[derive(Debug, Clone, Deserialize)]
#[serde(from = "RawSettings")]
pub struct Settings {
    enable: bool,
    command_path: Option<PathBuf>,
    python_path: Option<PathBuf>,
    formatter_command_path: Option<PathBuf>,
    formatter_indent: u32,
}

impl From<RawSettings> for Settings {
    fn from(raw: RawSettings) -> Self {
        Self {
            enable: raw.enable,
            command_path: non_empty(raw.command_path),
            python_path: non_empty(raw.python_path),
            formatter_command_path: non_empty(raw.formatter.command_path),
            formatter_indent: raw.formatter.indent,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        RawSettings::default().into()
    }
}

fn non_empty(value: String) -> Option<PathBuf> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(PathBuf::from(trimmed))
    }
}

impl Settings {
    /// Whether the integration is enabled at all.
    #[must_use]
    pub fn enable(&self) -> bool {
        self.enable
    }

    /// Explicit language-server executable path, taken verbatim when set.
    #[must_use]
    pub fn command_path(&self) -> Option<&Path> {
        self.command_path.as_deref()
    }

    /// Interpreter override used only to bootstrap the isolated environment.
    #[must_use]
    pub fn python_path(&self) -> Option<&Path> {
        self.python_path.as_deref()
    }

    /// Explicit formatter executable path, taken verbatim when set.
    #[must_use]
    pub fn formatter_command_path(&self) -> Option<&Path> {
        self.formatter_command_path.as_deref()
    }

    /// Indent width passed to the formatter; `0` omits the flag entirely.
    #[must_use]
    pub fn formatter_indent(&self) -> u32 {
        self.formatter_indent
    }
}
