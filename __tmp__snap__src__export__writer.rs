//! The download boundary: hands the rendered document to the filesystem.

use std::fs;
use std::path::Path;

/// File name offered for the export when none is configured.
pub const DEFAULT_EXPORT_FILE: &str = "dsa.md";

/// Writes the rendered document to `path`, creating parent directories.
///
/// Best effort: failures are logged and reported as `false`, never raised.
/// The store is not touched either way.
pub fn write_document(path: &Path, content: &str) -> bool {
    let _span = tracing::debug_span!("write_document", path = %path.display(), bytes = content.len()).entered();

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(e) = fs::create_dir_all(parent) {
            tracing::warn!(error = %e, "failed to create export directory");
            return false;
        }
    }

    match fs::write(path, content) {
        Ok(()) => {
            tracing::info!("document exported");
            true
        }
        Err(e) => {
            tracing::warn!(error = %e, "failed to write export");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_content_and_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(DEFAULT_EXPORT_FILE);

        assert!(write_document(&path, "# Intro\n"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "# Intro\n");
    }

    #[test]
    fn overwrites_previous_export() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_EXPORT_FILE);

        assert!(write_document(&path, "old"));
        assert!(write_document(&path, "new"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
    }

    #[test]
    fn reports_failure_without_panicking() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be overwritten by a file write.
        assert!(!write_document(dir.path(), "content"));
    }
}


