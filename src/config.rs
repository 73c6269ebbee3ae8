//! Configuration types for resume-photo transforms.
//!
//! All transform behaviour is controlled through [`TransformConfig`], built
//! via its [`TransformConfigBuilder`]. The config is cheap to clone and is
//! shared by the [`crate::session::Session`] and the file-level entry points.

use crate::error::PhotoError;
use crate::pipeline::model::ImageModel;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Default generative image model.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-image";

/// Default Generative Language API base URL.
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Configuration for a photo transform.
///
/// Built via [`TransformConfig::builder()`] or using
/// [`TransformConfig::default()`].
///
/// # Example
/// ```rust
/// use resume_photo::{StylePreference, TransformConfig};
///
/// let config = TransformConfig::builder()
///     .model("gemini-2.5-flash-image")
///     .style(StylePreference::Female)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct TransformConfig {
    /// Model identifier, e.g. `gemini-2.5-flash-image`.
    pub model: String,

    /// API base URL; the request goes to `{api_base}/models/{model}:generateContent`.
    pub api_base: String,

    /// Explicit API key. When `None` the key is read from the environment
    /// (`GEMINI_API_KEY`, `GOOGLE_API_KEY`, `API_KEY`) at call time.
    ///
    /// A missing key is not rejected here: the request goes out without
    /// one and the service's refusal comes back as a transport error.
    pub api_key: Option<String>,

    /// Per-call timeout in seconds. `None` leaves the transport default.
    pub api_timeout_secs: Option<u64>,

    /// Custom instruction text. If None, uses the built-in headshot instruction.
    pub instruction: Option<String>,

    /// Style preference a new session starts with. Default: unspecified.
    pub style: StylePreference,

    /// Pre-constructed model client. Takes precedence over `model`/`api_base`.
    pub provider: Option<Arc<dyn ImageModel>>,

    /// Receives start/complete/error events around each generate call.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            api_key: None,
            api_timeout_secs: None,
            instruction: None,
            style: StylePreference::default(),
            provider: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for TransformConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformConfig")
            .field("model", &self.model)
            .field("api_base", &self.api_base)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("instruction", &self.instruction.as_ref().map(|s| s.len()))
            .field("style", &self.style)
            .field("provider", &self.provider.as_ref().map(|p| p.name().to_string()))
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn TransformProgressCallback>"),
            )
            .finish()
    }
}

impl TransformConfig {
    /// Create a new builder for `TransformConfig`.
    pub fn builder() -> TransformConfigBuilder {
        TransformConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`TransformConfig`].
#[derive(Debug)]
pub struct TransformConfigBuilder {
    config: TransformConfig,
}

impl TransformConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn api_base(mut self, url: impl Into<String>) -> Self {
        self.config.api_base = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = Some(secs.max(1));
        self
    }

    pub fn instruction(mut self, text: impl Into<String>) -> Self {
        self.config.instruction = Some(text.into());
        self
    }

    pub fn style(mut self, style: StylePreference) -> Self {
        self.config.style = style;
        self
    }

    pub fn provider(mut self, provider: Arc<dyn ImageModel>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<TransformConfig, PhotoError> {
        let c = &self.config;
        if c.model.trim().is_empty() {
            return Err(PhotoError::InvalidConfig("model must not be empty".into()));
        }
        if !(c.api_base.starts_with("http://") || c.api_base.starts_with("https://")) {
            return Err(PhotoError::InvalidConfig(format!(
                "api_base must be an http(s) URL, got '{}'",
                c.api_base
            )));
        }
        if c.instruction.as_deref().is_some_and(|s| s.trim().is_empty()) {
            return Err(PhotoError::InvalidConfig(
                "instruction override must not be blank".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Which business attire the model is steered towards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StylePreference {
    /// Men's business wear: suit, crisp shirt.
    Male,
    /// Women's business wear: blazer, blouse.
    Female,
    /// No steering; the model decides. (default)
    #[default]
    Unspecified,
}

impl StylePreference {
    pub fn as_str(&self) -> &'static str {
        match self {
            StylePreference::Male => "male",
            StylePreference::Female => "female",
            StylePreference::Unspecified => "unspecified",
        }
    }
}

impl fmt::Display for StylePreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StylePreference {
    type Err = PhotoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" | "male-business" | "m" => Ok(StylePreference::Male),
            "female" | "female-business" | "f" => Ok(StylePreference::Female),
            "unspecified" | "neutral" | "" => Ok(StylePreference::Unspecified),
            other => Err(PhotoError::InvalidConfig(format!(
                "unknown style preference '{other}' (expected male, female or unspecified)"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = TransformConfig::default();
        assert_eq!(c.model, DEFAULT_MODEL);
        assert_eq!(c.api_base, DEFAULT_API_BASE);
        assert_eq!(c.style, StylePreference::Unspecified);
        assert!(c.api_timeout_secs.is_none());
    }

    #[test]
    fn builder_trims_trailing_slash() {
        let c = TransformConfig::builder()
            .api_base("http://localhost:8080/v1beta/")
            .build()
            .unwrap();
        assert_eq!(c.api_base, "http://localhost:8080/v1beta");
    }

    #[test]
    fn builder_rejects_empty_model() {
        assert!(TransformConfig::builder().model("  ").build().is_err());
    }

    #[test]
    fn builder_rejects_non_http_base() {
        assert!(TransformConfig::builder().api_base("ftp://x").build().is_err());
    }

    #[test]
    fn debug_redacts_key() {
        let c = TransformConfig::builder().api_key("secret").build().unwrap();
        let dbg = format!("{c:?}");
        assert!(!dbg.contains("secret"));
    }

    #[test]
    fn style_parse() {
        assert_eq!("Female".parse::<StylePreference>().unwrap(), StylePreference::Female);
        assert_eq!("male-business".parse::<StylePreference>().unwrap(), StylePreference::Male);
        assert_eq!("neutral".parse::<StylePreference>().unwrap(), StylePreference::Unspecified);
        assert!("pirate".parse::<StylePreference>().is_err());
    }

    #[test]
    fn style_serde_is_lowercase() {
        assert_eq!(serde_json::to_string(&StylePreference::Male).unwrap(), "\"male\"");
    }
}
