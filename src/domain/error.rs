//! Error types for the dsanotes plugin.
//!
//! Two failure kinds matter to the rest of the crate: [`UploadError`], raised
//! when a single image fails to reach the hosting service, and the
//! configuration failure carried by [`NotesError::Configuration`], which stops
//! the plugin before it presents the form. Everything else the store does is
//! total and never returns an error.

use thiserror::Error;

/// Failure of one file within an upload batch.
///
/// The batch that produced it stops at the failing file. Images appended by
/// earlier files in the same batch are kept.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadError {
    /// The local file could not be read from the sandbox filesystem.
    #[error("could not read {path}: {message}")]
    Read {
        /// Path as the user typed it.
        path: String,
        /// Underlying I/O error text.
        message: String,
    },

    /// The request never produced an HTTP response.
    #[error("upload transport failed: {0}")]
    Transport(String),

    /// The hosting service answered with a non-success status.
    #[error("upload rejected with HTTP {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Error message from the response body, if one was present.
        message: String,
    },

    /// The response body was not the JSON document the service promises.
    #[error("malformed upload response: {0}")]
    MalformedResponse(String),

    /// The response parsed but carried no `secure_url`.
    #[error("upload response did not contain a secure_url")]
    MissingUrl,
}

/// The main error type for dsanotes operations.
#[derive(Debug, Error)]
pub enum NotesError {
    /// Required configuration is missing or malformed.
    ///
    /// Raised at load time; the plugin must not continue to the form UI.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// An image upload failed.
    #[error(transparent)]
    Upload(#[from] UploadError),

    /// Filesystem or I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Theme parsing or loading failed.
    #[error("Theme error: {0}")]
    Theme(String),
}

/// A specialized `Result` type for dsanotes operations.
pub type Result<T> = std::result::Result<T, NotesError>;
