// ABOUTME: Utility functions for the impact-slides application
// ABOUTME: Input/output path checks and HTML escaping

use crate::errors::{Result, SlideError};
use log::{debug, warn};
use std::fs;
use std::path::Path;

/// Fail unless `path` names an existing regular file, such as a saved slides.json.
pub fn require_file(path: &Path) -> Result<()> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_file() => Ok(()),
        Ok(_) => Err(SlideError::ValidationError(format!(
            "Expected a file but found a directory: {:?}",
            path
        ))),
        Err(_) => Err(SlideError::PathNotFoundError(path.to_path_buf())),
    }
}

/// Create `dir` (and its parents) unless it already exists as a directory.
pub fn ensure_directory_exists(dir: &Path) -> Result<()> {
    if dir.is_dir() {
        return Ok(());
    }
    if dir.exists() {
        return Err(SlideError::ValidationError(format!(
            "Output path exists but is not a directory: {:?}",
            dir
        )));
    }
    debug!("Creating directory {:?}", dir);
    fs::create_dir_all(dir).map_err(SlideError::FileReadError)
}

/// Make sure the directory a file will be written into exists.
pub fn ensure_parent_directory_exists(file_path: &Path) -> Result<()> {
    match file_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => ensure_directory_exists(parent),
        _ => Ok(()),
    }
}

/// Create the output directory and prove it accepts new files before any
/// generation work is spent.
pub fn prepare_output_dir(dir: &Path) -> Result<()> {
    ensure_directory_exists(dir)?;

    let probe = dir.join(format!(".impact-probe-{}", uuid::Uuid::new_v4()));
    fs::write(&probe, b"").map_err(|e| {
        SlideError::ValidationError(format!("Cannot write into {:?}: {}", dir, e))
    })?;
    if let Err(e) = fs::remove_file(&probe) {
        warn!("Left probe file {:?} behind: {}", probe, e);
    }
    Ok(())
}

/// Escape text for safe inclusion in HTML content and attributes.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
