//! Encoded image payloads and the downloadable result.
//!
//! An [`ImagePayload`] is an image's bytes held as base64 together with the
//! declared media type. Its transportable form is a self-describing data URL
//! (`data:image/png;base64,iVBOR…`), the same form a browser `FileReader`
//! produces and an `<img src>` accepts.

use crate::error::PhotoError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File name every downloaded result is saved under.
pub const DOWNLOAD_FILE_NAME: &str = "professional-resume-photo.png";

// Media-type parameters (`;charset=utf-8`, `;name=x.png`) may sit before the
// base64 marker; they are dropped.
static DATA_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^data:([^;,]+)(?:;[^;,]*)*;base64,(.*)$").unwrap()
});

/// Image content plus its declared media type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagePayload {
    /// Declared media type, e.g. `image/png`.
    pub media_type: String,
    /// Standard base64 of the image bytes, without any data-URL header.
    pub data: String,
}

impl ImagePayload {
    pub fn new(media_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            media_type: media_type.into(),
            data: data.into(),
        }
    }

    /// Parse a `data:<media type>;base64,<data>` URL.
    pub fn from_data_url(url: &str) -> Result<Self, PhotoError> {
        let caps = DATA_URL.captures(url.trim()).ok_or_else(|| {
            let head: String = url.chars().take(32).collect();
            PhotoError::InvalidDataUrl(format!("expected 'data:<type>;base64,<data>', got '{head}…'"))
        })?;
        Ok(Self::new(&caps[1], &caps[2]))
    }

    /// Render as a self-describing data URL.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.media_type, self.data)
    }

    /// Whether the declared media type is an `image/*` type.
    pub fn is_image(&self) -> bool {
        is_image_media_type(&self.media_type)
    }

    /// Decode the base64 body back to raw bytes.
    pub fn decode(&self) -> Result<Vec<u8>, PhotoError> {
        Ok(STANDARD.decode(self.data.as_bytes())?)
    }
}

/// `true` for any media type beginning with `image/` (case-insensitive).
pub fn is_image_media_type(media_type: &str) -> bool {
    media_type
        .get(..6)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("image/"))
}

/// A result ready to be saved client-side.
#[derive(Debug, Clone)]
pub struct Download {
    pub file_name: &'static str,
    pub media_type: String,
    pub bytes: Vec<u8>,
}

impl Download {
    /// Build a download from a result payload.
    pub fn from_payload(payload: &ImagePayload) -> Result<Self, PhotoError> {
        Ok(Self {
            file_name: DOWNLOAD_FILE_NAME,
            media_type: payload.media_type.clone(),
            bytes: payload.decode()?,
        })
    }

    /// Write the file into `dir` and return its full path.
    ///
    /// Atomic: bytes go to a temp file in `dir` which is then renamed, so a
    /// crash never leaves a truncated photo behind.
    pub fn save_to_dir(&self, dir: impl AsRef<Path>) -> Result<PathBuf, PhotoError> {
        let dir = dir.as_ref();
        let path = dir.join(self.file_name);
        let write_err = |source| PhotoError::OutputWriteFailed {
            path: path.clone(),
            source,
        };

        std::fs::create_dir_all(dir).map_err(write_err)?;
        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(write_err)?;
        tmp.write_all(&self.bytes).map_err(write_err)?;
        tmp.persist(&path).map_err(|e| write_err(e.error))?;

        debug!("Saved {} bytes to {}", self.bytes.len(), path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_url_parse_and_render() {
        let p = ImagePayload::from_data_url("data:image/jpeg;base64,AAEC").unwrap();
        assert_eq!(p.media_type, "image/jpeg");
        assert_eq!(p.data, "AAEC");
        assert_eq!(p.to_data_url(), "data:image/jpeg;base64,AAEC");
    }

    #[test]
    fn data_url_without_header_rejected() {
        let err = ImagePayload::from_data_url("AAEC").unwrap_err();
        assert!(matches!(err, PhotoError::InvalidDataUrl(_)));
    }

    #[test]
    fn data_url_without_base64_marker_rejected() {
        assert!(ImagePayload::from_data_url("data:image/png,AAEC").is_err());
        assert!(ImagePayload::from_data_url("data:image/png;charset=utf-8,AAEC").is_err());
    }

    #[test]
    fn data_url_parameters_are_skipped() {
        let p = ImagePayload::from_data_url("data:image/svg+xml;charset=utf-8;base64,PHN2Zz4=")
            .unwrap();
        assert_eq!(p.media_type, "image/svg+xml");
        assert_eq!(p.data, "PHN2Zz4=");
        assert!(p.is_image());

        let p = ImagePayload::from_data_url("data:image/png;name=me.png;base64,AAEC").unwrap();
        assert_eq!(p.media_type, "image/png");
        assert_eq!(p.data, "AAEC");
    }

    #[test]
    fn image_media_types() {
        assert!(is_image_media_type("image/png"));
        assert!(is_image_media_type("IMAGE/WEBP"));
        assert!(!is_image_media_type("text/plain"));
        assert!(!is_image_media_type("image"));
        assert!(!is_image_media_type(""));
    }

    #[test]
    fn bad_base64_is_reported() {
        let p = ImagePayload::new("image/png", "not base64!!");
        assert!(matches!(p.decode(), Err(PhotoError::InvalidBase64(_))));
    }

    #[test]
    fn download_saves_under_fixed_name() {
        let dir = tempfile::tempdir().unwrap();
        let payload = ImagePayload::new("image/png", STANDARD.encode(b"png-bytes"));
        let dl = Download::from_payload(&payload).unwrap();
        let path = dl.save_to_dir(dir.path()).unwrap();

        assert_eq!(path.file_name().unwrap(), DOWNLOAD_FILE_NAME);
        assert_eq!(std::fs::read(&path).unwrap(), b"png-bytes");
        assert_eq!(dl.media_type, "image/png");
    }
}
