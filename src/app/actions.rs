//! Actions representing side effects to be executed by the plugin runtime.
//!
//! The event handler never touches the filesystem or the network. It returns
//! `Action`s and the shim performs them: reading an image and handing the
//! upload request to the host, writing the exported document, or hiding the
//! pane.

use crate::upload::UploadTask;
use std::path::PathBuf;

/// Commands representing side effects to be executed by the plugin runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Hides the plugin pane.
    CloseFocus,

    /// Uploads one file of the running batch.
    ///
    /// The outcome must come back as [`Event::UploadFinished`](super::Event::UploadFinished)
    /// before the next task is issued.
    Upload(UploadTask),

    /// Writes the rendered Markdown document.
    WriteExport {
        /// Destination inside the plugin sandbox.
        path: PathBuf,
        /// Complete document text.
        content: String,
    },
}
