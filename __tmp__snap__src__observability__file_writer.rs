//! Append-only JSON-lines file with size-based rotation.
//!
//! Trace output must never fill the disk, so once the active file grows past
//! its limit it is renamed with a timestamp suffix and a fresh file is
//! started. Only the newest few rotated files are kept.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Size at which the active file is rotated (10 MB).
const DEFAULT_MAX_BYTES: u64 = 10 * 1024 * 1024;

/// Rotated files kept next to the active one.
const DEFAULT_KEEP: usize = 3;

/// Line writer that rotates its target file by size.
///
/// The file is opened lazily on the first write, so construction never fails.
///
/// # Thread Safety
///
/// The open handle sits behind a `Mutex`; concurrent `write_line` calls are
/// serialized and a line is never interleaved with another.
///
/// # Example
///
/// ```rust,ignore
/// let file = RotatingFile::new("/data/trace.jsonl".into());
/// file.write_line(r#"{"name":"upload"}"#)?;
/// ```
pub struct RotatingFile {
    path: PathBuf,
    max_bytes: u64,
    keep: usize,
    handle: Mutex<Option<File>>,
}

impl RotatingFile {
    pub const fn new(path: PathBuf) -> Self {
        Self::with_limits(path, DEFAULT_MAX_BYTES, DEFAULT_KEEP)
    }

    /// Creates a writer with explicit rotation limits.
    ///
    /// # Parameters
    ///
    /// * `path` - Active file; rotations are written next to it
    /// * `max_bytes` - Size past which the next write rotates first
    /// * `keep` - Rotated files kept; older ones are deleted
    pub const fn with_limits(path: PathBuf, max_bytes: u64, keep: usize) -> Self {
        Self {
            path,
            max_bytes,
            keep,
            handle: Mutex::new(None),
        }
    }

    /// Appends `line` and a newline, rotating first if the file is full.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be rotated, opened or written, or if the
    /// lock was poisoned by a panicking writer.
    pub fn write_line(&self, line: &str) -> io::Result<()> {
        let mut handle = self
            .handle
            .lock()
            .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("trace file lock poisoned: {e}")))?;

        if self.is_full() {
            *handle = None;
            self.rotate()?;
        }

        if handle.is_none() {
            *handle = Some(OpenOptions::new().create(true).append(true).open(&self.path)?);
        }

        if let Some(file) = handle.as_mut() {
            writeln!(file, "{line}")?;
            file.flush()?;
        }
        Ok(())
    }

    fn is_full(&self) -> bool {
        fs::metadata(&self.path).is_ok_and(|m| m.len() > self.max_bytes)
    }

    /// Moves the active file aside as `<name>.<timestamp>` and prunes old
    /// rotations.
    fn rotate(&self) -> io::Result<()> {
        let stamp = chrono::Utc::now().format("%Y%m%dT%H%M%S%.9f");
        let mut rotated = self.path.clone().into_os_string();
        rotated.push(format!(".{stamp}"));

        if self.path.exists() {
            fs::rename(&self.path, PathBuf::from(rotated))?;
        }

        self.prune()
    }

    fn prune(&self) -> io::Result<()> {
        let Some(dir) = self.path.parent() else {
            return Ok(());
        };
        let Some(name) = self.path.file_name().and_then(|n| n.to_str()) else {
            return Ok(());
        };
        let prefix = format!("{name}.");

        let mut rotated: Vec<PathBuf> = fs::read_dir(dir)?
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| file_name_starts_with(path, &prefix))
            .collect();

        // Timestamps sort lexically; newest first.
        rotated.sort_unstable_by(|a, b| b.cmp(a));

        for stale in rotated.iter().skip(self.keep) {
            let _ = fs::remove_file(stale);
        }

        Ok(())
    }
}

fn file_name_starts_with(path: &Path, prefix: &str) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with(prefix))
}

impl std::fmt::Debug for RotatingFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RotatingFile")
            .field("path", &self.path)
            .field("max_bytes", &self.max_bytes)
            .field("keep", &self.keep)
            .finish_non_exhaustive()
    }
}
