use image::ImageFormat;

/// Container formats the vision models accept.
const VISION_FORMATS: [ImageFormat; 4] = [
    ImageFormat::Png,
    ImageFormat::Jpeg,
    ImageFormat::Gif,
    ImageFormat::WebP,
];

/// Detects the container format from the leading bytes of an image.
pub fn detect_format(bytes: &[u8]) -> Option<ImageFormat> {
    image::guess_format(bytes).ok()
}

/// Media type to tag an uploaded image with, or a reason it can't be sent.
pub fn vision_media_type(bytes: &[u8]) -> Result<&'static str, String> {
    let format = detect_format(bytes).ok_or_else(|| "the upload is not a recognized image".to_string())?;
    if VISION_FORMATS.contains(&format) {
        Ok(format.to_mime_type())
    } else {
        Err(format!(
            "{} images are not accepted, use png, jpeg, gif or webp",
            format.extensions_str().first().copied().unwrap_or("these")
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_HEADER: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";
    const JPEG_HEADER: &[u8] = b"\xff\xd8\xff\xe0\0\x10JFIF\0";

    #[test]
    fn detects_media_type_from_bytes() {
        assert_eq!(vision_media_type(PNG_HEADER), Ok("image/png"));
        assert_eq!(vision_media_type(JPEG_HEADER), Ok("image/jpeg"));
        assert_eq!(vision_media_type(b"GIF89a\x01\0\x01\0"), Ok("image/gif"));
    }

    #[test]
    fn rejects_unknown_bytes() {
        assert!(vision_media_type(b"plain text, not an image").is_err());
    }

    #[test]
    fn rejects_unsupported_container() {
        let err = vision_media_type(b"BM\x3a\0\0\0\0\0\0\0").unwrap_err();
        assert!(err.contains("bmp"));
    }
}
