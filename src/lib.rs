//! # resume-photo
//!
//! Turn a casual photo into a studio-style resume headshot using a
//! generative image model.
//!
//! The model receives the photo plus a fixed instruction: swap the clothing
//! for business attire, replace the background with a plain studio backdrop,
//! apply soft studio lighting, keep the face, hairstyle and identity, and
//! crop to a standard head-and-shoulders shot.
//!
//! ## Workflow
//!
//! ```text
//! photo
//!  │
//!  ├─ 1. Upload    read file, insist on an image/* media type
//!  ├─ 2. Encode    bytes → base64 ImagePayload
//!  ├─ 3. Style     male / female / unspecified attire steering
//!  ├─ 4. Generate  one generateContent call, no retry, no cache
//!  ├─ 5. Extract   first image part of the first candidate
//!  └─ 6. Download  professional-resume-photo.png
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use resume_photo::{Session, StylePreference, TransformConfig, Upload};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Credential read from GEMINI_API_KEY / GOOGLE_API_KEY / API_KEY
//!     let mut session = Session::new(TransformConfig::default());
//!     session.accept_upload(Upload::from_path("selfie.jpg")?)?;
//!     session.set_style(StylePreference::Female);
//!     session.generate().await;
//!
//!     match session.download()? {
//!         Some(file) => println!("saved {}", file.save_to_dir(".")?.display()),
//!         None => eprintln!("{}", session.status().error.as_deref().unwrap_or("")),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `resume-photo` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod payload;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod session;
pub mod transform;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{StylePreference, TransformConfig, TransformConfigBuilder};
pub use error::{PhotoError, TransformError};
pub use payload::{Download, ImagePayload, DOWNLOAD_FILE_NAME};
pub use pipeline::gemini::GeminiClient;
pub use pipeline::input::Upload;
pub use pipeline::model::{GenerateContentRequest, GenerateContentResponse, ImageModel};
pub use progress::{NoopProgressCallback, ProgressCallback, TransformProgressCallback};
pub use session::{GenerateOutcome, Phase, ProcessingStatus, Session};
pub use transform::{
    transform_data_url, transform_file, transform_sync, transform_to_professional_photo,
};
