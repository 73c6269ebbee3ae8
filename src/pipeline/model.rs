//! The image-model seam: the [`ImageModel`] trait and its wire types.
//!
//! The types mirror the Generative Language `generateContent` JSON shape.
//! Responses accept both the camelCase keys the REST API emits and the
//! snake_case keys some proxies rewrite them to.

use crate::error::TransformError;
use crate::payload::ImagePayload;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A generative model that can answer a multi-part image request.
///
/// Implementations must be `Send + Sync` so they can sit behind an
/// `Arc<dyn ImageModel>` in [`crate::config::TransformConfig`].
#[async_trait]
pub trait ImageModel: Send + Sync {
    /// Short provider name for logs, e.g. `"gemini"`.
    fn name(&self) -> &str;

    /// Send one request and return the decoded response.
    ///
    /// Any failure to obtain a well-formed response is a
    /// [`TransformError::Transport`]; inspecting the candidates is the
    /// caller's job.
    async fn generate_content(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, TransformError>;
}

// ── Request ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

impl GenerateContentRequest {
    /// A single user turn carrying the image followed by the instruction.
    pub fn image_edit(image: &ImagePayload, instruction: &str) -> Self {
        Self {
            contents: vec![Content {
                role: Some("user".into()),
                parts: vec![Part::inline(image), Part::text(instruction)],
            }],
            generation_config: Some(GenerationConfig {
                response_modalities: vec!["IMAGE".into(), "TEXT".into()],
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub response_modalities: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

/// One part of a content turn: text, inline binary data, or both absent
/// (parts the client does not understand deserialize to an empty part).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, alias = "inline_data", skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineData>,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            inline_data: None,
        }
    }

    pub fn inline(image: &ImagePayload) -> Self {
        Self {
            text: None,
            inline_data: Some(InlineData {
                mime_type: image.media_type.clone(),
                data: image.data.clone(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    #[serde(alias = "mime_type")]
    pub mime_type: String,
    #[serde(default)]
    pub data: String,
}

// ── Response ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// Absent when the candidate was blocked before producing output.
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default, alias = "finish_reason", skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

impl GenerateContentResponse {
    /// Pull the result image out of the response.
    ///
    /// Only the first candidate is considered; within it the first part
    /// carrying non-empty inline data wins.
    pub fn first_image(&self) -> Result<ImagePayload, TransformError> {
        let candidate = self.candidates.first().ok_or(TransformError::NoCandidate)?;
        candidate
            .content
            .iter()
            .flat_map(|c| c.parts.iter())
            .filter_map(|p| p.inline_data.as_ref())
            .find(|d| !d.data.is_empty())
            .map(|d| ImagePayload::new(d.mime_type.clone(), d.data.clone()))
            .ok_or(TransformError::NoImagePart)
    }

    /// Concatenated text parts of the first candidate, for logging refusals.
    pub fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: Vec<&str> = content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        (!text.is_empty()).then(|| text.join(""))
    }
}
