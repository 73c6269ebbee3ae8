//! Error types for the resume-photo library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`PhotoError`] — **Local**: something on this side of the wire went
//!   wrong (the upload is not an image, a data URL is malformed, the result
//!   could not be written to disk). Returned as `Err(PhotoError)` from the
//!   upload, download and file-level entry points.
//!
//! * [`TransformError`] — **Remote**: the single generative-model call did
//!   not yield an image. A [`crate::session::Session`] never propagates it;
//!   it is folded into the session's `status.error` message so the caller can
//!   offer a manual retry.

use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors raised before or after the model call.
#[derive(Debug, Error)]
pub enum PhotoError {
    // ── Upload errors ─────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Image file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The upload does not carry an `image/*` media type.
    #[error("'{source_name}' is not an image (media type: {media_type})")]
    NotAnImage {
        source_name: String,
        media_type: String,
    },

    /// A new image was offered while a generate call is in flight.
    #[error("A photo is being generated; wait for it to finish before uploading another")]
    Busy,

    // ── Payload errors ────────────────────────────────────────────────────
    /// The string is not a `data:<type>;base64,<data>` URL.
    #[error("Invalid data URL: {0}")]
    InvalidDataUrl(String),

    /// The payload body is not valid base64.
    #[error("Image payload is not valid base64: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    // ── Model errors ──────────────────────────────────────────────────────
    /// The model call produced no image. Only the file-level helpers return
    /// this; a session stores the message in its status instead.
    #[error("Transform failed: {0}")]
    Transform(#[from] TransformError),

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the downloaded result.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Why a transform call produced no image.
///
/// `Display` yields the message shown to the user; for
/// [`TransformError::Transport`] that is the underlying message verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
pub enum TransformError {
    /// The response contained no candidate outputs.
    #[error("No image was generated. Please try again.")]
    NoCandidate,

    /// The first candidate carried no image part (e.g. a text-only refusal).
    #[error("The AI returned a response without an image. This might happen with complex inputs.")]
    NoImagePart,

    /// The call itself failed: network, authentication, quota, bad response.
    #[error("{message}")]
    Transport { message: String },
}

impl TransformError {
    /// Shorthand for building a [`TransformError::Transport`].
    pub fn transport(message: impl Into<String>) -> Self {
        TransformError::Transport {
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for TransformError {
    fn from(e: reqwest::Error) -> Self {
        TransformError::transport(e.to_string())
    }
}
