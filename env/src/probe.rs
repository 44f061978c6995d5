//! Read-only probes against the process environment.
//!
//! Resolution never creates files or directories; this trait is the
//! complete set of filesystem questions it is allowed to ask. Tests
//! substitute a recording implementation to verify that a winning
//! resolution tier short-circuits the later ones.

use std::path::{Path, PathBuf};

pub trait EnvProbe {
    /// Locate `name` on the process's executable search path.
    ///
    /// Absence is the expected case, not an error.
    fn lookup(&self, name: &str) -> Option<PathBuf>;

    /// Whether `path` exists on the filesystem.
    fn exists(&self, path: &Path) -> bool;

    /// Resolve filesystem symlinks in `path`, falling back to the input
    /// when canonicalization fails.
    fn canonicalize(&self, path: &Path) -> PathBuf;
}

/// Probe backed by the real environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemProbe;

impl EnvProbe for SystemProbe {
    fn lookup(&self, name: &str) -> Option<PathBuf> {
        which::which(name).ok()
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn canonicalize(&self, path: &Path) -> PathBuf {
        std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
    }
}
