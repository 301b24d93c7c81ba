use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::logging;

/// Files found under a root plus the non-fatal problems met on the way
#[derive(Debug, Default)]
pub struct WalkResult {
    pub files: Vec<PathBuf>,
    pub warnings: Vec<String>,
}

/// Recursively list files under `root` whose extension is in `extensions`.
///
/// Extensions are compared case-insensitively and may be given with or without
/// the leading dot. A directory is skipped when its *name* equals one of
/// `exclude_dirs`; the root itself is never excluded. Entries are visited in
/// file-name order so repeated runs produce the same listing.
pub fn walk_files(root: &Path, extensions: &[String], exclude_dirs: &[String]) -> WalkResult {
    let mut result = WalkResult::default();

    if !root.is_dir() {
        let message = format!("Directory does not exist: {}", root.display());
        logging::warn(&message);
        result.warnings.push(message);
        return result;
    }

    let allowed: HashSet<String> = extensions.iter().map(|e| normalize_extension(e)).collect();
    let excluded: HashSet<&str> = exclude_dirs.iter().map(|d| d.as_str()).collect();

    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            if entry.depth() == 0 || !entry.file_type().is_dir() {
                return true;
            }
            entry
                .file_name()
                .to_str()
                .map(|name| !excluded.contains(name))
                .unwrap_or(true)
        });

    for entry in walker {
        match entry {
            Ok(entry) => {
                if entry.file_type().is_file() && has_allowed_extension(entry.path(), &allowed) {
                    result.files.push(entry.into_path());
                }
            }
            Err(e) => {
                let message = format!("Failed to read directory entry: {}", e);
                logging::warn(&message);
                result.warnings.push(message);
            }
        }
    }

    result
}

fn normalize_extension(ext: &str) -> String {
    let lower = ext.trim().to_lowercase();
    if lower.starts_with('.') {
        lower
    } else {
        format!(".{}", lower)
    }
}

fn has_allowed_extension(path: &Path, allowed: &HashSet<String>) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| allowed.contains(&format!(".{}", ext.to_lowercase())))
        .unwrap_or(false)
}
