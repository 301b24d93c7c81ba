use anyhow::{bail, Context, Result};
use std::io::Write;
use std::path::Path;

/// Abstraction over the file operations the replacement step performs
pub trait FileSystem: Send + Sync {
    /// Read file contents as a string
    fn read_to_string(&self, path: &Path) -> Result<String>;

    /// Replace a file's contents; either the full new content lands or the file is untouched
    fn write(&self, path: &Path, contents: &str) -> Result<()>;
}

/// Real file system; writes go through a temp file in the same directory and an atomic rename
#[derive(Debug, Default, Clone)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))
    }

    fn write(&self, path: &Path, contents: &str) -> Result<()> {
        let existing = std::fs::metadata(path).ok();
        if let Some(meta) = &existing {
            if meta.permissions().readonly() {
                bail!("File is read-only: {}", path.display());
            }
        }

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(dir)
            .with_context(|| format!("Failed to create temp file in {}", dir.display()))?;
        tmp.write_all(contents.as_bytes())
            .with_context(|| format!("Failed to write temp file for {}", path.display()))?;
        tmp.as_file()
            .sync_all()
            .with_context(|| format!("Failed to flush temp file for {}", path.display()))?;
        if let Some(meta) = existing {
            tmp.as_file()
                .set_permissions(meta.permissions())
                .with_context(|| format!("Failed to copy permissions of {}", path.display()))?;
        }
        tmp.persist(path)
            .map_err(|e| e.error)
            .with_context(|| format!("Failed to replace file: {}", path.display()))?;
        Ok(())
    }
}
