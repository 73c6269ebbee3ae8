//! Progress-callback trait for transform events.
//!
//! Inject an [`Arc<dyn TransformProgressCallback>`] via
//! [`crate::config::TransformConfigBuilder::progress_callback`] to hear when a
//! generate call starts and how it ends. The CLI uses this to drive its
//! spinner; a GUI could forward the same events to its view layer.
//!
//! # Example
//!
//! ```rust
//! use resume_photo::{TransformConfig, TransformProgressCallback};
//! use std::sync::Arc;
//!
//! struct Printer;
//!
//! impl TransformProgressCallback for Printer {
//!     fn on_transform_start(&self, message: &str) {
//!         eprintln!("{message}");
//!     }
//! }
//!
//! let config = TransformConfig::builder()
//!     .progress_callback(Arc::new(Printer) as Arc<dyn TransformProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the session around each generate call.
///
/// All methods have default no-op implementations so callers only override
/// what they care about.
pub trait TransformProgressCallback: Send + Sync {
    /// Called once the session has entered the processing state.
    ///
    /// # Arguments
    /// * `message` — the progress message now held in the session status
    fn on_transform_start(&self, message: &str) {
        let _ = message;
    }

    /// Called when the model returned an image.
    ///
    /// # Arguments
    /// * `media_type`  — media type of the result, e.g. `image/png`
    /// * `encoded_len` — length of the base64 body
    fn on_transform_complete(&self, media_type: &str, encoded_len: usize) {
        let _ = (media_type, encoded_len);
    }

    /// Called when the transform failed; `error` is the message stored in the status.
    fn on_transform_error(&self, error: &str) {
        let _ = error;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl TransformProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::TransformConfig`].
pub type ProgressCallback = Arc<dyn TransformProgressCallback>;
