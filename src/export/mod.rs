//! Markdown export.
//!
//! [`generate_document`] is the pure half: sections in, one string out.
//! [`write_document`] is the side-effecting half that stands in for a browser
//! download and writes the string to the configured path.

pub mod markdown;
pub mod writer;

pub use markdown::generate_document;
pub use writer::{write_document, DEFAULT_EXPORT_FILE};
