//! Utility functions for string manipulation, tokens and file system operations.
//!
//! This module provides helper functions used throughout the application:
//! - Character-safe truncation for stored text and log previews
//! - Title sanitization and whitespace collapsing for scraped text
//! - Random session tokens
//! - File system validation for output directories

use itertools::Itertools;
use once_cell::sync::Lazy;
use rand::distr::Alphanumeric;
use rand::{Rng, rng};
use regex::Regex;
use std::fs as stdfs;
use tokio::fs;
use tracing::{info, instrument};

use crate::BoxError;

static NON_TITLE_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s-]").unwrap());

/// Keep at most `max` characters of `s`.
pub fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

/// Keep at most `max` characters of `s`, appending `...` when anything was cut.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_with_ellipsis("abcdef", 3), "abc...");
/// assert_eq!(truncate_with_ellipsis("abc", 3), "abc");
/// ```
pub fn truncate_with_ellipsis(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        format!("{}...", truncate_chars(s, max))
    }
}

/// Truncate a string for logging purposes.
///
/// Long strings are truncated to `max` characters with an ellipsis and
/// byte count indicator appended.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    let kept = truncate_chars(s, max);
    if kept.len() == s.len() {
        kept
    } else {
        format!("{}…(+{} bytes)", kept, s.len() - kept.len())
    }
}

/// Strip everything but word characters, whitespace and hyphens, trim, and
/// cap at `max` characters.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(sanitize_title("Bill Passes!", 200), "Bill Passes");
/// ```
pub fn sanitize_title(title: &str, max: usize) -> String {
    let stripped = NON_TITLE_CHARS.replace_all(title.trim(), "");
    truncate_chars(stripped.trim(), max).trim_end().to_string()
}

/// Collapse runs of whitespace (including newlines from nested markup) to single spaces.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().join(" ")
}

/// A random opaque token of `len` alphanumeric characters.
pub fn random_token(len: usize) -> String {
    rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Ensure a directory exists and is writable.
///
/// This function creates the directory if it doesn't exist, then performs
/// a write test by creating and immediately deleting a probe file.
///
/// # Errors
///
/// Returns an error if:
/// - The directory cannot be created
/// - The directory is not writable (permission denied, read-only filesystem, etc.)
#[instrument(level = "info", skip_all, fields(path = %path))]
pub async fn ensure_writable_dir(path: &str) -> Result<(), BoxError> {
    fs::create_dir_all(path).await?;
    let probe_path = format!("{}/..__probe_write__", path.trim_end_matches('/'));
    stdfs::File::create(&probe_path)?;
    let _ = stdfs::remove_file(&probe_path);
    info!("Output directory is writable");
    Ok(())
}
