//! Domain layer for the dsanotes plugin.
//!
//! Core types and the section list store, independent of Zellij APIs and of
//! the upload transport.
//!
//! # Organization
//!
//! - [`error`]: Error types and result alias
//! - [`section`]: Section, image and id types
//! - [`document`]: The ordered section store
//! - [`reorder`]: Move-one-element primitive shared by sections and images

pub mod document;
pub mod error;
pub mod reorder;
pub mod section;

pub use document::Document;
pub use error::{NotesError, Result, UploadError};
pub use section::{CodeBlock, Image, ImageField, ImageId, Language, Section, SectionId, SectionUpdate};
