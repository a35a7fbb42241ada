//! Path safety checks applied to every file the signer touches.
//!
//! A path is lexically cleaned, checked against a character allow-list,
//! canonicalized (following symlinks) and checked again, so a symlink cannot
//! smuggle the signer into a location the allow-list would have refused.

use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::error::Error;

static ALLOWED_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_./-]+$").expect("path allow-list regex"));

/// Lexically normalize a path: drop `.` components, collapse separators and
/// fold `..` into the preceding component where one exists.
pub fn clean(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                // `/..` is `/`
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        out
    }
}

fn check_allowed(original: &Path, candidate: &Path) -> Result<(), Error> {
    let invalid = |reason: &str| Error::InvalidPath {
        path: original.display().to_string(),
        reason: reason.to_string(),
    };
    let text = candidate
        .to_str()
        .ok_or_else(|| invalid("path is not valid UTF-8"))?;
    if !ALLOWED_PATH.is_match(text) {
        return Err(invalid("path contains characters outside [A-Za-z0-9_./-]"));
    }
    Ok(())
}

/// Clean and allow-list check a path that may not exist yet.
pub fn validate_output_path(path: &Path) -> Result<PathBuf, Error> {
    if path.as_os_str().is_empty() {
        return Err(Error::InvalidPath {
            path: String::new(),
            reason: "path is empty".to_string(),
        });
    }
    let cleaned = clean(path);
    check_allowed(path, &cleaned)?;
    Ok(cleaned)
}

/// Resolve an existing path to its real location.
///
/// A missing file surfaces as [`Error::Io`] so callers can map it to their own
/// load error.
pub fn resolve(path: &Path) -> Result<PathBuf, Error> {
    let cleaned = validate_output_path(path)?;
    let real = cleaned.canonicalize()?;
    check_allowed(path, &real)?;
    tracing::trace!(path = %path.display(), real = %real.display(), "Resolved path");
    Ok(real)
}
