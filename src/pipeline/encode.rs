//! Image encoding: raw upload bytes → base64 [`ImagePayload`].
//!
//! The model API takes images as base64 inside the JSON request body, and the
//! session keeps both images in that same form, so encoding happens exactly
//! once per upload.

use crate::payload::ImagePayload;
use crate::pipeline::input::Upload;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::debug;

/// Encode an accepted upload as a payload ready for the model API.
pub fn encode_upload(upload: &Upload) -> ImagePayload {
    let b64 = STANDARD.encode(&upload.bytes);
    debug!(
        "Encoded {} ({} bytes) → {} bytes base64",
        upload.source_name,
        upload.bytes.len(),
        b64.len()
    );
    ImagePayload::new(upload.media_type.clone(), b64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, Rgba, RgbaImage};
    use std::io::Cursor;

    #[test]
    fn encode_small_png() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 4, Rgba([0, 0, 255, 255])));
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .expect("png encode");

        let upload = Upload::from_bytes("blue.png", buf.clone(), None).unwrap();
        let payload = encode_upload(&upload);

        assert_eq!(payload.media_type, "image/png");
        assert!(payload.to_data_url().starts_with("data:image/png;base64,iVBOR"));
        assert_eq!(payload.decode().unwrap(), buf);
    }
}
