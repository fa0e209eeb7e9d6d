use crate::error::ValidationError;

/// Upper bound the remote enforces on uploaded binaries.
pub const MAX_ATTACHMENT_BYTES: usize = 50 * 1024 * 1024;
/// Smallest edge the image endpoints accept.
pub const MIN_IMAGE_DIMENSION: u32 = 64;
/// Largest total pixel count the image endpoints accept (about 3072x3072).
pub const MAX_IMAGE_PIXELS: u64 = 9_437_184;
/// Widest edge-to-edge ratio the image endpoints accept.
pub const MAX_IMAGE_ASPECT: f64 = 2.5;

const IMAGE_MIME_TYPES: [&str; 3] = ["image/jpeg", "image/png", "image/webp"];
const AUDIO_MIME_TYPES: [&str; 3] = ["audio/mpeg", "audio/mp3", "audio/wav"];

/// Structural metadata extracted from a valid image upload.
///
/// Informational only: shown to the caller for display/audit, never
/// forwarded to the remote API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    pub format: String,
    pub color_mode: String,
    pub size_bytes: usize,
}

/// An image upload: opaque bytes plus the MIME type the caller declared.
/// Never mutated after capture; consumed by the dispatch that carries it.
#[derive(Debug, Clone)]
pub struct ImageAttachment {
    bytes: Vec<u8>,
    mime: String,
}

impl ImageAttachment {
    pub fn new(bytes: Vec<u8>, mime: impl Into<String>) -> Self {
        Self {
            bytes,
            mime: mime.into(),
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Checks the upload against the remote's documented limits.
    ///
    /// Rules run in a fixed order (size, minimum dimension, pixel count,
    /// aspect ratio) and the first violation wins; nothing is aggregated.
    /// `field` names the form field the attachment is destined for, so the
    /// error reads like the rest of the validation layer.
    pub fn validate(&self, field: &str) -> Result<ImageInfo, ValidationError> {
        if self.bytes.is_empty() {
            return Err(ValidationError::new(field, "no image data supplied"));
        }
        let mime = self.mime.trim().to_ascii_lowercase();
        if !IMAGE_MIME_TYPES.contains(&mime.as_str()) {
            return Err(ValidationError::new(
                field,
                format!("unsupported image type '{}' (expected JPEG, PNG or WebP)", self.mime),
            ));
        }
        if self.bytes.len() > MAX_ATTACHMENT_BYTES {
            return Err(ValidationError::new(field, "image exceeds 50 MiB"));
        }

        let format = image::guess_format(&self.bytes)
            .map_err(|_| ValidationError::new(field, "unreadable image"))?;
        let decoded = image::load_from_memory(&self.bytes)
            .map_err(|_| ValidationError::new(field, "unreadable image"))?;
        let (width, height) = (decoded.width(), decoded.height());

        if width < MIN_IMAGE_DIMENSION || height < MIN_IMAGE_DIMENSION {
            return Err(ValidationError::new(
                field,
                format!("image too small ({width}x{height}, minimum 64x64)"),
            ));
        }
        if u64::from(width) * u64::from(height) > MAX_IMAGE_PIXELS {
            return Err(ValidationError::new(
                field,
                format!("image has too many pixels ({width}x{height}, maximum 9437184)"),
            ));
        }
        let long = f64::from(width.max(height));
        let short = f64::from(width.min(height));
        if long / short > MAX_IMAGE_ASPECT {
            return Err(ValidationError::new(
                field,
                "image aspect ratio exceeds 2.5:1",
            ));
        }

        Ok(ImageInfo {
            width,
            height,
            format: format_label(format),
            color_mode: format!("{:?}", decoded.color()),
            size_bytes: self.bytes.len(),
        })
    }
}

/// An audio upload for the audio-to-audio endpoint.
#[derive(Debug, Clone)]
pub struct AudioAttachment {
    bytes: Vec<u8>,
    mime: String,
}

impl AudioAttachment {
    pub fn new(bytes: Vec<u8>, mime: impl Into<String>) -> Self {
        Self {
            bytes,
            mime: mime.into(),
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn validate(&self, field: &str) -> Result<(), ValidationError> {
        if self.bytes.is_empty() {
            return Err(ValidationError::new(field, "no audio data supplied"));
        }
        let mime = self.mime.trim().to_ascii_lowercase();
        if !AUDIO_MIME_TYPES.contains(&mime.as_str()) {
            return Err(ValidationError::new(
                field,
                format!("unsupported audio type '{}' (expected MP3 or WAV)", self.mime),
            ));
        }
        if self.bytes.len() > MAX_ATTACHMENT_BYTES {
            return Err(ValidationError::new(field, "audio exceeds 50 MiB"));
        }
        Ok(())
    }
}

fn format_label(format: image::ImageFormat) -> String {
    match format {
        image::ImageFormat::Png => "PNG".to_string(),
        image::ImageFormat::Jpeg => "JPEG".to_string(),
        image::ImageFormat::WebP => "WEBP".to_string(),
        other => format!("{other:?}").to_ascii_uppercase(),
    }
}
