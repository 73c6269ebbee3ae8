//! Upload boundary: turn a user-selected file or buffer into an [`Upload`].
//!
//! Only one check is made: the content must carry an `image/*` media type.
//! The type is taken from the caller when declared, otherwise sniffed from
//! the leading magic bytes and, failing that, guessed from the file
//! extension. Extensions the `image` crate cannot decode (HEIC, SVG, JXL)
//! still resolve through the `mime_guess` table. Size and dimensions are
//! deliberately not validated.

use crate::error::PhotoError;
use crate::payload::is_image_media_type;
use image::ImageFormat;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A user-selected image, not yet encoded.
#[derive(Debug, Clone)]
pub struct Upload {
    /// File name or other label used in error messages.
    pub source_name: String,
    /// Media type, guaranteed to start with `image/`.
    pub media_type: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    /// Read an image file from disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, PhotoError> {
        let path = path.as_ref();
        let bytes = read_local(path)?;
        let source_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let media_type = detect_media_type(&bytes, Some(path)).ok_or_else(|| {
            PhotoError::NotAnImage {
                source_name: source_name.clone(),
                media_type: "unknown".into(),
            }
        })?;

        debug!("Resolved upload {} as {}", path.display(), media_type);
        Self::from_bytes(source_name, bytes, Some(&media_type))
    }

    /// Wrap an in-memory buffer.
    ///
    /// `declared` is the media type reported by whatever picked the file
    /// (a browser, a multipart form). When `None` the bytes are sniffed.
    pub fn from_bytes(
        source_name: impl Into<String>,
        bytes: Vec<u8>,
        declared: Option<&str>,
    ) -> Result<Self, PhotoError> {
        let source_name = source_name.into();
        let media_type = match declared {
            Some(mt) => mt.trim().to_ascii_lowercase(),
            None => detect_media_type(&bytes, None).unwrap_or_else(|| "unknown".into()),
        };

        if !is_image_media_type(&media_type) {
            return Err(PhotoError::NotAnImage {
                source_name,
                media_type,
            });
        }

        Ok(Self {
            source_name,
            media_type,
            bytes,
        })
    }
}

/// Guess a media type from magic bytes, then from the path's extension.
///
/// The result is not necessarily an image type; callers apply the
/// `image/` check themselves.
pub fn detect_media_type(bytes: &[u8], path: Option<&Path>) -> Option<String> {
    if let Some(format) = image::guess_format(bytes)
        .ok()
        .or_else(|| path.and_then(|p| ImageFormat::from_path(p).ok()))
    {
        return Some(format.to_mime_type().to_string());
    }
    path.and_then(|p| mime_guess::from_path(p).first_raw())
        .map(str::to_string)
}

fn read_local(path: &Path) -> Result<Vec<u8>, PhotoError> {
    match std::fs::read(path) {
        Ok(bytes) => Ok(bytes),
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            Err(PhotoError::PermissionDenied {
                path: PathBuf::from(path),
            })
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(PhotoError::FileNotFound {
            path: PathBuf::from(path),
        }),
        Err(e) => Err(PhotoError::Internal(format!(
            "Failed to read '{}': {e}",
            path.display()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";
    const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];

    #[test]
    fn sniffs_png_and_jpeg() {
        assert_eq!(detect_media_type(PNG_MAGIC, None).as_deref(), Some("image/png"));
        assert_eq!(detect_media_type(JPEG_MAGIC, None).as_deref(), Some("image/jpeg"));
    }

    #[test]
    fn falls_back_to_extension() {
        let got = detect_media_type(b"????", Some(Path::new("selfie.webp")));
        assert_eq!(got.as_deref(), Some("image/webp"));
    }

    #[test]
    fn heic_resolved_from_extension_table() {
        let got = detect_media_type(b"\0\0\0\x18ftypheic", Some(Path::new("selfie.heic")));
        assert_eq!(got.as_deref(), Some("image/heic"));
    }

    #[test]
    fn non_image_extension_is_reported_as_is() {
        let got = detect_media_type(b"hello world", Some(Path::new("notes.txt")));
        assert_eq!(got.as_deref(), Some("text/plain"));
    }

    #[test]
    fn unknown_content_without_path_is_none() {
        assert!(detect_media_type(b"hello world", None).is_none());
    }

    #[test]
    fn declared_non_image_rejected() {
        let err = Upload::from_bytes("doc.pdf", b"%PDF".to_vec(), Some("application/pdf"))
            .unwrap_err();
        assert!(matches!(err, PhotoError::NotAnImage { .. }));
    }

    #[test]
    fn declared_type_is_normalised() {
        let up = Upload::from_bytes("a", PNG_MAGIC.to_vec(), Some(" Image/PNG ")).unwrap();
        assert_eq!(up.media_type, "image/png");
    }

    #[test]
    fn missing_file() {
        let err = Upload::from_path("/definitely/not/here.png").unwrap_err();
        assert!(matches!(err, PhotoError::FileNotFound { .. }));
    }

    #[test]
    fn text_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "not an image").unwrap();
        let err = Upload::from_path(&path).unwrap_err();
        assert!(matches!(err, PhotoError::NotAnImage { .. }));
    }

    #[test]
    fn heic_and_svg_files_accepted() {
        let dir = tempfile::tempdir().unwrap();

        let heic = dir.path().join("selfie.heic");
        std::fs::write(&heic, b"\0\0\0\x18ftypheic\0\0\0\0").unwrap();
        assert_eq!(Upload::from_path(&heic).unwrap().media_type, "image/heic");

        let svg = dir.path().join("avatar.svg");
        std::fs::write(&svg, "<svg xmlns=\"http://www.w3.org/2000/svg\"/>").unwrap();
        assert_eq!(Upload::from_path(&svg).unwrap().media_type, "image/svg+xml");
    }

    #[test]
    fn png_file_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("me.png");
        std::fs::write(&path, PNG_MAGIC).unwrap();
        let up = Upload::from_path(&path).unwrap();
        assert_eq!(up.media_type, "image/png");
        assert_eq!(up.source_name, "me.png");
    }
}
