//! Workload file discovery by name suffix.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::common::{Error, Result};

fn has_suffix<S: AsRef<str>>(path: &Path, suffixes: &[S]) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy())
        .is_some_and(|name| suffixes.iter().any(|s| name.ends_with(s.as_ref())))
}

/// Recursively collects files under `root` whose name ends with any suffix.
///
/// Symlinked directories are not followed and unreadable directories are
/// skipped. The result is sorted.
pub fn find_files_with_suffix<S: AsRef<str>>(root: &Path, suffixes: &[S]) -> Vec<PathBuf> {
    let mut found = Vec::new();
    let mut pending = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) => {
                debug!(dir = %dir.display(), "skipping unreadable directory: {e}");
                continue;
            }
        };
        for entry in entries.filter_map(std::result::Result::ok) {
            let Ok(file_type) = entry.file_type() else {
                continue;
            };
            let path = entry.path();
            if file_type.is_dir() {
                pending.push(path);
            } else if has_suffix(&path, suffixes) {
                found.push(path);
            }
        }
    }
    found.sort();
    found
}

/// Lists files directly inside `dir` ending with `suffix`.
///
/// If `prefixes` is non-empty, only names starting with one of them are kept.
/// The result is sorted.
///
/// # Errors
///
/// Returns `Io` if `dir` cannot be read.
pub fn list_dir_with_suffix<S: AsRef<str>>(
    dir: &Path,
    suffix: &str,
    prefixes: &[S],
) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|e| Error::io(dir, e))?;
    let mut found: Vec<PathBuf> = entries
        .filter_map(std::result::Result::ok)
        .filter(|entry| entry.file_type().is_ok_and(|t| !t.is_dir()))
        .map(|entry| entry.path())
        .filter(|path| has_suffix(path, &[suffix]))
        .filter(|path| {
            prefixes.is_empty()
                || path
                    .file_name()
                    .map(|name| name.to_string_lossy())
                    .is_some_and(|name| prefixes.iter().any(|p| name.starts_with(p.as_ref())))
        })
        .collect();
    found.sort();
    Ok(found)
}
