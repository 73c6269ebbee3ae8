//! Transform Service entry points.
//!
//! [`transform_to_professional_photo`] is the single-shot request/response
//! wrapper: one image in, one image (or one [`TransformError`]) out, with no
//! retry and no caching. The file-level helpers drive a
//! [`crate::session::Session`] through the whole upload → generate →
//! download workflow for callers that just want a file on disk.

use crate::config::{StylePreference, TransformConfig};
use crate::error::{PhotoError, TransformError};
use crate::payload::ImagePayload;
use crate::pipeline::gemini::GeminiClient;
use crate::pipeline::input::Upload;
use crate::pipeline::model::{GenerateContentRequest, ImageModel};
use crate::prompts::build_instruction;
use crate::session::{GenerateOutcome, Session};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Transform one image into a professional headshot.
///
/// # Arguments
/// * `image`  — the uploaded image, already base64-encoded
/// * `style`  — attire steering; `Unspecified` lets the model choose
/// * `config` — model, endpoint, credential and instruction override
///
/// # Errors
/// * [`TransformError::NoCandidate`] — the response held no candidates
/// * [`TransformError::NoImagePart`] — the first candidate held no image
/// * [`TransformError::Transport`]  — the call itself failed
pub async fn transform_to_professional_photo(
    image: &ImagePayload,
    style: StylePreference,
    config: &TransformConfig,
) -> Result<ImagePayload, TransformError> {
    let model = resolve_model(config)?;
    transform_with_model(model.as_ref(), image, style, config).await
}

/// Same as [`transform_to_professional_photo`] but with an explicit model.
pub async fn transform_with_model(
    model: &dyn ImageModel,
    image: &ImagePayload,
    style: StylePreference,
    config: &TransformConfig,
) -> Result<ImagePayload, TransformError> {
    let start = Instant::now();
    let instruction = match config.instruction {
        Some(ref text) => text.clone(),
        None => build_instruction(style),
    };
    info!(
        "Transforming {} image via {} (style: {})",
        image.media_type,
        model.name(),
        style
    );

    let request = GenerateContentRequest::image_edit(image, &instruction);
    let response = model.generate_content(&request).await.map_err(|e| {
        warn!("Image model call failed: {}", e);
        e
    })?;

    match response.first_image() {
        Ok(result) => {
            debug!(
                "Received {} ({} bytes base64) in {}ms",
                result.media_type,
                result.data.len(),
                start.elapsed().as_millis()
            );
            Ok(result)
        }
        Err(e) => {
            if let Some(text) = response.text() {
                warn!("Model answered without an image: {}", text);
            }
            Err(e)
        }
    }
}

/// String-level variant: takes a data URL (or bare base64) plus its media
/// type and returns the result as a data URL.
///
/// The header, if present, is stripped at the first comma.
pub async fn transform_data_url(
    encoded: &str,
    media_type: &str,
    style: StylePreference,
    config: &TransformConfig,
) -> Result<String, TransformError> {
    let data = encoded.split_once(',').map_or(encoded, |(_, body)| body);
    let image = ImagePayload::new(media_type, data);
    let result = transform_to_professional_photo(&image, style, config).await?;
    Ok(result.to_data_url())
}

/// Transform an image file and save the result into `output_dir` as
/// [`crate::payload::DOWNLOAD_FILE_NAME`].
///
/// Style comes from `config.style`.
pub async fn transform_file(
    input: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    config: &TransformConfig,
) -> Result<PathBuf, PhotoError> {
    let upload = Upload::from_path(input)?;

    let mut session = Session::new(config.clone());
    session.accept_upload(upload)?;

    match session.generate().await {
        GenerateOutcome::Succeeded => {}
        GenerateOutcome::Failed(e) => return Err(PhotoError::Transform(e)),
        GenerateOutcome::Skipped => {
            return Err(PhotoError::Internal("generate was skipped".into()))
        }
    }

    let download = session
        .download()?
        .ok_or_else(|| PhotoError::Internal("no result after a successful generate".into()))?;
    download.save_to_dir(output_dir)
}

/// Synchronous wrapper around [`transform_file`].
///
/// Creates a temporary tokio runtime internally.
pub fn transform_sync(
    input: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    config: &TransformConfig,
) -> Result<PathBuf, PhotoError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| PhotoError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(transform_file(input, output_dir, config))
}

/// Resolve the model client: a pre-built provider wins, otherwise a
/// [`GeminiClient`] is built from the config.
pub fn resolve_model(config: &TransformConfig) -> Result<Arc<dyn ImageModel>, TransformError> {
    if let Some(ref provider) = config.provider {
        return Ok(Arc::clone(provider));
    }
    Ok(Arc::new(GeminiClient::from_config(config)?))
}
