//! dsanotes: a Zellij plugin for assembling data-structures-and-algorithms
//! notes.
//!
//! A note document is an ordered list of sections. Each section holds a
//! title, an algorithm description, two image galleries (problem solving and
//! output) and a C/C++ code block. Images are uploaded to Cloudinary one file
//! at a time; the document exports to a single Markdown file.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │  Zellij Plugin Shim (main.rs)                       │  ← keys, host HTTP, files
//! └─────────────────────────────────────────────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Application Layer (app/)                           │
//! │  - Event handling, upload queue                     │
//! │  - View model computation                           │
//! └─────────────────────────────────────────────────────┘
//!         │                    │                    │
//! ┌───────────────┐   ┌───────────────┐   ┌───────────────┐
//! │ UI Layer      │   │ Upload Layer  │   │ Export Layer  │
//! │ (ui/)         │   │ (upload/)     │   │ (export/)     │
//! │ - Rendering   │   │ - Batches     │   │ - Markdown    │
//! │ - Theming     │   │ - Cloudinary  │   │ - File write  │
//! └───────────────┘   └───────────────┘   └───────────────┘
//!         │                    │                    │
//! ┌─────────────────────────────────────────────────────┐
//! │  Domain (domain/) and sandbox paths (infrastructure/)│
//! └─────────────────────────────────────────────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Observability (observability/)                     │  ← optional
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Configuration
//!
//! ```kdl
//! pane {
//!     plugin location="file:/path/to/dsanotes.wasm" {
//!         cloud_name "my-account"
//!         upload_preset "ml_default"
//!         export_path "~/notes/dsa.md"
//!         theme "catppuccin-mocha"
//!         trace_level "info"
//!     }
//! }
//! ```
//!
//! `cloud_name` is required. Without it the plugin shows the configuration
//! error and nothing else.
//!
//! # Library Usage
//!
//! ```rust,ignore
//! use dsanotes::{handle_event, initialize, Config, Event};
//!
//! let config = Config::from_zellij(&configuration)?;
//! let mut state = initialize(&config);
//! let (render, actions) = handle_event(&mut state, &Event::AddSection)?;
//! ```

#![allow(clippy::multiple_crate_versions)]

pub mod app;
pub mod domain;
pub mod export;
pub mod infrastructure;
pub mod observability;
pub mod ui;
pub mod upload;

pub use app::{handle_event, Action, AppState, Event, InputMode, SearchFocus};
pub use domain::{Document, NotesError, Result, Section, UploadError};
pub use ui::Theme;

use std::collections::BTreeMap;
use std::path::PathBuf;
use upload::cloudinary::DEFAULT_UPLOAD_PRESET;

/// Trace filter used when `trace_level` is not configured.
const DEFAULT_TRACE_LEVEL: &str = "info";

/// Plugin configuration parsed from Zellij's configuration map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Cloudinary account the images are uploaded to.
    pub cloud_name: String,

    /// Unsigned upload preset. Default: `ml_default`.
    pub upload_preset: String,

    /// Sandbox path of the exported Markdown file. Default: `/host/dsa.md`.
    pub export_path: PathBuf,

    /// Built-in theme name. Ignored if `theme_file` loads.
    pub theme_name: Option<String>,

    /// Path to a custom TOML theme file.
    pub theme_file: Option<String>,

    /// `EnvFilter` directive for tracing. Default: `info`.
    pub trace_level: String,
}

impl Config {
    /// Parses and validates the configuration map.
    ///
    /// Blank values count as absent.
    ///
    /// # Errors
    ///
    /// Returns [`NotesError::Configuration`] if `cloud_name` is missing or
    /// blank.
    pub fn from_zellij(config: &BTreeMap<String, String>) -> Result<Self> {
        let value = |key: &str| {
            config
                .get(key)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(String::from)
        };

        let cloud_name = value("cloud_name").ok_or_else(|| {
            NotesError::Configuration(
                "cloud_name is required; set it to your Cloudinary account name in the plugin configuration".to_string(),
            )
        })?;

        Ok(Self {
            cloud_name,
            upload_preset: value("upload_preset").unwrap_or_else(|| DEFAULT_UPLOAD_PRESET.to_string()),
            export_path: infrastructure::resolve_export_path(value("export_path").as_deref()),
            theme_name: value("theme"),
            theme_file: value("theme_file"),
            trace_level: value("trace_level").unwrap_or_else(|| DEFAULT_TRACE_LEVEL.to_string()),
        })
    }

    /// Client for the configured image-hosting account.
    #[must_use]
    pub fn uploader(&self) -> upload::CloudinaryClient {
        upload::CloudinaryClient::new(&self.cloud_name, &self.upload_preset)
    }
}

/// Creates the initial application state: an empty document, the resolved
/// theme and the export destination.
#[must_use]
pub fn initialize(config: &Config) -> AppState {
    tracing::debug!(
        cloud_name = %config.cloud_name,
        export_path = %config.export_path.display(),
        "initializing dsanotes plugin"
    );

    let theme_file = config.theme_file.as_deref().map(infrastructure::to_sandbox_path);
    let theme = Theme::resolve(config.theme_name.as_deref(), theme_file.as_deref());

    AppState::new(theme, config.export_path.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect()
    }

    #[test]
    fn missing_cloud_name_fails_fast() {
        let err = Config::from_zellij(&map(&[("upload_preset", "x")])).unwrap_err();
        assert!(matches!(err, NotesError::Configuration(_)));
        assert!(err.to_string().contains("cloud_name"));
    }

    #[test]
    fn blank_cloud_name_fails_fast() {
        assert!(matches!(
            Config::from_zellij(&map(&[("cloud_name", "   ")])),
            Err(NotesError::Configuration(_))
        ));
    }

    #[test]
    fn defaults_apply() {
        let config = Config::from_zellij(&map(&[("cloud_name", "demo")])).unwrap();
        assert_eq!(config.cloud_name, "demo");
        assert_eq!(config.upload_preset, "ml_default");
        assert_eq!(config.export_path, PathBuf::from("/host/dsa.md"));
        assert_eq!(config.trace_level, "info");
        assert!(config.theme_name.is_none());
        assert_eq!(config.uploader().endpoint(), "https://api.cloudinary.com/v1_1/demo/image/upload");
    }

    #[test]
    fn explicit_values_win() {
        let config = Config::from_zellij(&map(&[
            ("cloud_name", " demo "),
            ("upload_preset", "notes"),
            ("export_path", "~/notes/week1.md"),
            ("theme", "catppuccin-latte"),
            ("trace_level", "debug"),
        ]))
        .unwrap();

        assert_eq!(config.cloud_name, "demo");
        assert_eq!(config.upload_preset, "notes");
        assert_eq!(config.export_path, PathBuf::from("/host/notes/week1.md"));
        assert_eq!(config.trace_level, "debug");

        let state = initialize(&config);
        assert_eq!(state.theme.name, "catppuccin-latte");
        assert_eq!(state.export_path, config.export_path);
        assert!(state.document.is_empty());
    }
}


