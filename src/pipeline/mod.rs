//! Pipeline stages for a photo transform.
//!
//! Each submodule implements exactly one step, so each can be tested on its
//! own and the model backend can be swapped without touching the others.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ encode ──▶ model ──▶ first image part
//! (file)    (base64)   (HTTP)    (ImagePayload)
//! ```
//!
//! 1. [`input`]  — read the selected file and insist on an `image/*` type
//! 2. [`encode`] — base64-wrap the bytes into an [`crate::payload::ImagePayload`]
//! 3. [`model`]  — the [`model::ImageModel`] seam and its request/response types
//! 4. [`gemini`] — the HTTP implementation; the only stage with network I/O

pub mod encode;
pub mod gemini;
pub mod input;
pub mod model;
