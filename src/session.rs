//! The per-session workflow controller.
//!
//! A [`Session`] holds the transient state of one user's visit: the uploaded
//! original, the generated result, the chosen style and a small
//! [`ProcessingStatus`] record. Every mutation goes through a method here.
//!
//! ```text
//! Empty ──upload──▶ HasOriginal ──generate──▶ Processing ──▶ HasResult
//!   ▲                   ▲                                 └─▶ HasError
//!   └──────reset────────┴──────────retry / reset───────────────┘
//! ```
//!
//! [`Session::generate`] takes `&mut self` across the model call, so while a
//! call is outstanding nothing else can touch the session and no second call
//! can be issued. Callers that drive the UI themselves can use the
//! [`Session::begin_generate`] / [`Session::complete_generate`] pair instead;
//! `begin_generate` refuses to start while a call is in flight.

use crate::config::{StylePreference, TransformConfig};
use crate::error::{PhotoError, TransformError};
use crate::payload::{Download, ImagePayload};
use crate::pipeline::encode::encode_upload;
use crate::pipeline::input::Upload;
use crate::prompts::{FALLBACK_ERROR_MESSAGE, PROGRESS_MESSAGE};
use crate::transform::{resolve_model, transform_with_model};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Processing flag, error message and progress text.
///
/// At rest `in_progress` and `error` are never both set.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProcessingStatus {
    pub in_progress: bool,
    pub error: Option<String>,
    pub progress_message: String,
}

/// Where the session is in its workflow, derived from its state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Empty,
    HasOriginal,
    Processing,
    HasResult,
    HasError,
}

/// What a started generate call needs: the image and the style at the
/// moment the trigger was pressed.
#[derive(Debug, Clone)]
pub struct PendingTransform {
    pub image: ImagePayload,
    pub style: StylePreference,
}

/// How a [`Session::generate`] call ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerateOutcome {
    /// No original image, or a call was already in flight; nothing changed.
    Skipped,
    Succeeded,
    Failed(TransformError),
}

/// One user's photo session.
#[derive(Debug)]
pub struct Session {
    config: TransformConfig,
    original: Option<ImagePayload>,
    result: Option<ImagePayload>,
    style: StylePreference,
    status: ProcessingStatus,
}

impl Session {
    pub fn new(config: TransformConfig) -> Self {
        let style = config.style;
        Self {
            config,
            original: None,
            result: None,
            style,
            status: ProcessingStatus::default(),
        }
    }

    pub fn original(&self) -> Option<&ImagePayload> {
        self.original.as_ref()
    }

    pub fn result(&self) -> Option<&ImagePayload> {
        self.result.as_ref()
    }

    pub fn style(&self) -> StylePreference {
        self.style
    }

    pub fn status(&self) -> &ProcessingStatus {
        &self.status
    }

    pub fn phase(&self) -> Phase {
        if self.status.in_progress {
            Phase::Processing
        } else if self.original.is_none() {
            Phase::Empty
        } else if self.status.error.is_some() {
            Phase::HasError
        } else if self.result.is_some() {
            Phase::HasResult
        } else {
            Phase::HasOriginal
        }
    }

    /// Whether the generate trigger is enabled.
    pub fn can_generate(&self) -> bool {
        self.original.is_some() && !self.status.in_progress
    }

    /// Accept a newly selected image.
    ///
    /// Replaces the original, drops any earlier result and error. A
    /// non-image upload, or any upload while a generate call is in flight,
    /// is rejected and leaves the session untouched.
    pub fn accept_upload(&mut self, upload: Upload) -> Result<(), PhotoError> {
        let payload = encode_upload(&upload);
        self.accept_payload(payload)?;
        info!("Accepted upload {} ({})", upload.source_name, upload.media_type);
        Ok(())
    }

    /// Accept an already-encoded image, e.g. a data URL from a browser.
    pub fn accept_payload(&mut self, payload: ImagePayload) -> Result<(), PhotoError> {
        if self.status.in_progress {
            debug!("Upload refused: generate in flight");
            return Err(PhotoError::Busy);
        }
        if !payload.is_image() {
            return Err(PhotoError::NotAnImage {
                source_name: "payload".into(),
                media_type: payload.media_type,
            });
        }
        self.original = Some(payload);
        self.result = None;
        self.status.error = None;
        Ok(())
    }

    pub fn set_style(&mut self, style: StylePreference) {
        self.style = style;
    }

    /// Press the generate trigger.
    ///
    /// Returns `None` (and changes nothing) when there is no original or a
    /// call is already in flight. Otherwise enters the processing state and
    /// hands back what the model call needs.
    pub fn begin_generate(&mut self) -> Option<PendingTransform> {
        if !self.can_generate() {
            debug!("Generate ignored in phase {:?}", self.phase());
            return None;
        }
        let image = self.original.clone()?;

        self.status = ProcessingStatus {
            in_progress: true,
            error: None,
            progress_message: PROGRESS_MESSAGE.to_string(),
        };
        if let Some(ref cb) = self.config.progress_callback {
            cb.on_transform_start(&self.status.progress_message);
        }

        Some(PendingTransform {
            image,
            style: self.style,
        })
    }

    /// Record how the model call ended and leave the processing state.
    ///
    /// A completion arriving when no call is in flight (e.g. after
    /// [`Session::reset`]) is discarded.
    pub fn complete_generate(&mut self, outcome: Result<ImagePayload, TransformError>) {
        if !self.status.in_progress {
            debug!("Discarding completion: no generate in flight");
            return;
        }

        match outcome {
            Ok(image) => {
                if let Some(ref cb) = self.config.progress_callback {
                    cb.on_transform_complete(&image.media_type, image.data.len());
                }
                self.result = Some(image);
                self.status = ProcessingStatus::default();
            }
            Err(e) => {
                let mut message = e.to_string();
                if message.trim().is_empty() {
                    message = FALLBACK_ERROR_MESSAGE.to_string();
                }
                warn!("Generate failed: {}", message);
                if let Some(ref cb) = self.config.progress_callback {
                    cb.on_transform_error(&message);
                }
                self.result = None;
                self.status = ProcessingStatus {
                    in_progress: false,
                    error: Some(message),
                    progress_message: String::new(),
                };
            }
        }
    }

    /// Run one generate call end to end.
    ///
    /// Never retries: a failure is stored in [`Session::status`] and the
    /// caller may simply call `generate` again.
    pub async fn generate(&mut self) -> GenerateOutcome {
        let Some(pending) = self.begin_generate() else {
            return GenerateOutcome::Skipped;
        };

        let outcome = match resolve_model(&self.config) {
            Ok(model) => {
                transform_with_model(model.as_ref(), &pending.image, pending.style, &self.config)
                    .await
            }
            Err(e) => Err(e),
        };

        let report = match outcome {
            Ok(_) => GenerateOutcome::Succeeded,
            Err(ref e) => GenerateOutcome::Failed(e.clone()),
        };
        self.complete_generate(outcome);
        report
    }

    /// The result as a file to save, or `None` when there is no result.
    pub fn download(&self) -> Result<Option<Download>, PhotoError> {
        self.result.as_ref().map(Download::from_payload).transpose()
    }

    /// Back to the initial state. The style preference is kept.
    pub fn reset(&mut self) {
        self.original = None;
        self.result = None;
        self.status = ProcessingStatus::default();
    }
}
