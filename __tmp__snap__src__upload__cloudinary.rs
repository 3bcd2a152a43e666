//! Cloudinary unsigned-upload request building and response parsing.
//!
//! The plugin cannot open sockets itself; it asks the host to perform the
//! request. This module therefore stops at bytes: it produces the URL,
//! headers and body of the request and interprets the status and body that
//! come back. Files travel as base64 `data:` URLs inside a JSON body, which
//! the upload endpoint accepts in place of multipart form data.

use crate::domain::UploadError;
use base64::{engine::general_purpose::STANDARD, Engine};
use mime_sniffer::MimeTypeSniffer;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Base of the upload API; the account name is appended as a path segment.
pub const API_BASE: &str = "https://api.cloudinary.com/v1_1";

/// Upload preset used when the configuration does not name one.
pub const DEFAULT_UPLOAD_PRESET: &str = "ml_default";

/// Connection settings for one image-hosting account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloudinaryClient {
    cloud_name: String,
    upload_preset: String,
}

/// A fully built HTTP request, ready to hand to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub body: Vec<u8>,
}

#[derive(Serialize)]
struct UploadBody<'a> {
    file: &'a str,
    upload_preset: &'a str,
}

#[derive(Deserialize)]
struct UploadResponse {
    secure_url: Option<String>,
    error: Option<ErrorBody>,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

impl CloudinaryClient {
    #[must_use]
    pub fn new(cloud_name: impl Into<String>, upload_preset: impl Into<String>) -> Self {
        Self {
            cloud_name: cloud_name.into(),
            upload_preset: upload_preset.into(),
        }
    }

    #[must_use]
    pub fn cloud_name(&self) -> &str {
        &self.cloud_name
    }

    /// Image upload endpoint for this account.
    #[must_use]
    pub fn endpoint(&self) -> String {
        format!("{API_BASE}/{}/image/upload", self.cloud_name)
    }

    /// Builds the upload request for one file's bytes.
    ///
    /// # Errors
    ///
    /// Returns [`UploadError::MalformedResponse`] only if the JSON body cannot
    /// be serialized, which does not happen for string fields.
    pub fn build_request(&self, bytes: &[u8]) -> Result<UploadRequest, UploadError> {
        let file = data_url(bytes);
        let body = serde_json::to_vec(&UploadBody {
            file: &file,
            upload_preset: &self.upload_preset,
        })
        .map_err(|e| UploadError::MalformedResponse(e.to_string()))?;

        let mut headers = BTreeMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        headers.insert("Accept".to_string(), "application/json".to_string());

        tracing::debug!(
            endpoint = %self.endpoint(),
            file_bytes = bytes.len(),
            body_bytes = body.len(),
            "built upload request"
        );

        Ok(UploadRequest {
            url: self.endpoint(),
            headers,
            body,
        })
    }
}

/// Encodes file bytes as a `data:` URL with a sniffed MIME type.
#[must_use]
pub fn data_url(bytes: &[u8]) -> String {
    let mime = bytes
        .sniff_mime_type()
        .unwrap_or("application/octet-stream");
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

/// Extracts the hosted URL from the service's answer.
///
/// # Errors
///
/// - [`UploadError::Transport`] when no HTTP status was received
/// - [`UploadError::Status`] for any non-2xx status
/// - [`UploadError::MalformedResponse`] when a 2xx body is not JSON
/// - [`UploadError::MissingUrl`] when the JSON has no `secure_url`
pub fn parse_response(status: u16, body: &[u8]) -> Result<String, UploadError> {
    if status == 0 {
        return Err(UploadError::Transport(String::from_utf8_lossy(body).into_owned()));
    }

    if !(200..300).contains(&status) {
        let message = serde_json::from_slice::<UploadResponse>(body)
            .ok()
            .and_then(|r| r.error)
            .map_or_else(|| String::from_utf8_lossy(body).into_owned(), |e| e.message);
        return Err(UploadError::Status { status, message });
    }

    let response: UploadResponse =
        serde_json::from_slice(body).map_err(|e| UploadError::MalformedResponse(e.to_string()))?;

    response
        .secure_url
        .filter(|url| !url.is_empty())
        .ok_or(UploadError::MissingUrl)
}
