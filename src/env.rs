// src/env.rs
//
// Process-wide bootstrap values.
//
// `init` runs once per process. It records an optional root directory that
// relative paths are resolved against; the minifier never reads it.

use crate::{Error, Result};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

pub const YES: bool = true;
pub const NO: bool = false;

static ROOT_DIR: OnceLock<Option<PathBuf>> = OnceLock::new();

/// Record the root directory. Fails if called a second time; the first
/// value stays in place.
pub fn init(root: Option<PathBuf>) -> Result<()> {
    ROOT_DIR.set(root).map_err(|_| Error::AlreadyInitialized)?;
    if let Some(dir) = root_dir() {
        tracing::debug!(root = %dir.display(), "root directory recorded");
    }
    Ok(())
}

pub fn root_dir() -> Option<&'static Path> {
    ROOT_DIR.get().and_then(|root| root.as_deref())
}

/// Join a relative path onto the recorded root directory.
pub fn resolve(path: &Path) -> PathBuf {
    resolve_against(root_dir(), path)
}

/// Join a relative path onto `root`; absolute paths pass through.
pub fn resolve_against(root: Option<&Path>, path: &Path) -> PathBuf {
    match root {
        Some(dir) if path.is_relative() => dir.join(path),
        _ => path.to_path_buf(),
    }
}
