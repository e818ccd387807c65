//! Resource path normalization.
//!
//! The engine resolves resource references against its asset root using
//! lowercase POSIX-style relative paths; everything path-shaped is funneled
//! through here before it reaches the wire.

use crate::util::{Error, Result};

/// True for POSIX absolute paths, Windows drive paths and UNC paths.
pub fn is_absolute_path(path: &str) -> bool {
    if path.starts_with('/') || path.starts_with('\\') {
        return true;
    }
    let mut chars = path.chars();
    matches!(
        (chars.next(), chars.next()),
        (Some(drive), Some(':')) if drive.is_ascii_alphabetic()
    )
}

/// Normalize a resource reference to root-relative lowercase POSIX form.
///
/// Absolute inputs are rejected here rather than silently relativized: the
/// host pipeline owns root resolution and must hand over relative paths.
pub fn normalize_resource_path(path: &str) -> Result<String> {
    if path.is_empty() {
        return Ok(String::new());
    }
    if is_absolute_path(path) {
        return Err(Error::encoding(format!("absolute resource path not allowed: '{path}'")));
    }
    Ok(path.replace('\\', "/").to_lowercase())
}
