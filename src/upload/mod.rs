//! Image uploads.
//!
//! - [`batch`]: the sequential task list behind one file selection, plus a
//!   blocking driver for callers that own a synchronous transport
//! - [`cloudinary`]: request building and response parsing for the hosting
//!   service

pub mod batch;
pub mod cloudinary;

pub use batch::{upload_images, BatchStep, ImageUploader, UploadBatch, UploadTask};
pub use cloudinary::{parse_response, CloudinaryClient, UploadRequest};
