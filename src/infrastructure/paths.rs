//! Path translation for the Zellij plugin sandbox.
//!
//! `/host` is the directory Zellij mounted for the plugin: the cwd of the
//! last focused terminal, or the directory Zellij was started from. `~` is
//! treated as an alias for it.

use crate::export::DEFAULT_EXPORT_FILE;
use std::path::PathBuf;

/// Sandbox mount point of the host filesystem.
const HOST_ROOT: &str = "/host";

/// Returns the directory for plugin-private files such as trace exports.
///
/// Resolves to `~/.local/share/zellij/dsanotes` on the host when Zellij was
/// started from the home directory.
#[must_use]
pub fn get_data_dir() -> PathBuf {
    PathBuf::from(HOST_ROOT).join(".local/share/zellij").join("dsanotes")
}

/// Expands `~` and `~/...` to their `/host` equivalents; other paths pass
/// through.
#[must_use]
pub fn expand_tilde(path: &str) -> String {
    if path.starts_with("~/") {
        path.replacen('~', HOST_ROOT, 1)
    } else if path == "~" {
        HOST_ROOT.to_string()
    } else {
        path.to_string()
    }
}

/// Removes the `/host` prefix for display, showing paths as the user typed
/// them relative to the host mount.
#[must_use]
pub fn strip_host_prefix(path: &str) -> String {
    match path.strip_prefix(HOST_ROOT) {
        Some("") => "~".to_string(),
        Some(rest) if rest.starts_with('/') => format!("~{rest}"),
        _ => path.to_string(),
    }
}

/// Maps a user-supplied path into the sandbox.
///
/// Tilde paths and relative paths land under `/host`. Absolute paths are
/// kept, so `/host/...` and the plugin's own `/data` and `/tmp` work as is.
/// Other users' homes (`~user/...`) are not mounted, so such a path is taken
/// literally relative to `/host` like any other relative path.
#[must_use]
pub fn to_sandbox_path(path: &str) -> PathBuf {
    let path = path.trim();
    if path == "~" || path.starts_with("~/") {
        PathBuf::from(expand_tilde(path))
    } else if path.starts_with('/') {
        PathBuf::from(path)
    } else {
        PathBuf::from(HOST_ROOT).join(path)
    }
}

/// Resolves the configured export destination, defaulting to `~/dsa.md`.
///
/// A value ending in `/` names a directory and gets the default file name.
#[must_use]
pub fn resolve_export_path(configured: Option<&str>) -> PathBuf {
    match configured.map(str::trim).filter(|p| !p.is_empty()) {
        None => PathBuf::from(HOST_ROOT).join(DEFAULT_EXPORT_FILE),
        Some(p) if p.ends_with('/') => to_sandbox_path(p).join(DEFAULT_EXPORT_FILE),
        Some(p) => to_sandbox_path(p),
    }
}
