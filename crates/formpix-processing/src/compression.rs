use async_trait::async_trait;
use bytes::Bytes;
use formpix_core::constants::{COMPRESSED_NAME_MARKER, DEFAULT_MEDIA_TYPE};
use formpix_core::{CompressedFile, IntakeConfig, RawFile};
use image::{DynamicImage, GenericImageView, ImageFormat};
use std::io::Cursor;

use crate::image::{ImageProcessor, ImageResize};
use crate::traits::ImageCompression;

/// Per-file compression failure. Always ends up as a `CompressionFailed` skip.
#[derive(Debug, thiserror::Error)]
pub enum CompressionError {
    #[error("Failed to decode image: {0}")]
    Decode(#[source] image::ImageError),

    #[error("Failed to encode image: {0}")]
    Encode(String),

    #[error("Encoder produced no output")]
    EmptyOutput,

    #[error("Compression worker failed: {0}")]
    Worker(String),
}

/// Output format for compressed images
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Jpeg,
    Png,
    WebP,
}

impl OutputFormat {
    /// Keep the source's format where we can encode it; JPEG otherwise.
    pub fn from_media_type(media_type: &str) -> Self {
        match media_type.trim().to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" | "image/pjpeg" => OutputFormat::Jpeg,
            "image/png" => OutputFormat::Png,
            "image/webp" => OutputFormat::WebP,
            _ => OutputFormat::Jpeg,
        }
    }

    pub fn to_mime_type(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => DEFAULT_MEDIA_TYPE,
            OutputFormat::Png => "image/png",
            OutputFormat::WebP => "image/webp",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Png => "png",
            OutputFormat::WebP => "webp",
        }
    }

    /// Whether `extension` names one of the formats we encode to.
    fn is_output_extension(extension: &str) -> bool {
        matches!(
            extension.to_ascii_lowercase().as_str(),
            "jpg" | "jpeg" | "jpe" | "png" | "webp"
        )
    }
}

/// Encoder quality in (0, 1] mapped to the 1–100 scale the codecs use.
fn percent_quality(quality: f32) -> f32 {
    (quality * 100.0).round().clamp(1.0, 100.0)
}

/// Format-specific encoders
pub struct ImageEncoder;

impl ImageEncoder {
    pub fn encode(
        img: &DynamicImage,
        format: OutputFormat,
        quality: f32,
    ) -> Result<Bytes, CompressionError> {
        let data = match format {
            OutputFormat::Jpeg => Self::encode_jpeg(img, quality)?,
            OutputFormat::Png => Self::encode_png(img)?,
            OutputFormat::WebP => Self::encode_webp(img, quality),
        };

        if data.is_empty() {
            return Err(CompressionError::EmptyOutput);
        }
        Ok(data)
    }

    /// Compress to JPEG using mozjpeg. Alpha is dropped.
    fn encode_jpeg(img: &DynamicImage, quality: f32) -> Result<Bytes, CompressionError> {
        let rgb_img = img.to_rgb8();
        let (width, height) = rgb_img.dimensions();

        let mut comp = mozjpeg::Compress::new(mozjpeg::ColorSpace::JCS_RGB);
        comp.set_size(width as usize, height as usize);
        comp.set_quality(percent_quality(quality));
        comp.set_progressive_mode();
        comp.set_optimize_coding(true);

        let mut comp = comp
            .start_compress(Vec::new())
            .map_err(|e| CompressionError::Encode(e.to_string()))?;
        comp.write_scanlines(&rgb_img)
            .map_err(|e| CompressionError::Encode(e.to_string()))?;
        let jpeg_data = comp
            .finish()
            .map_err(|e| CompressionError::Encode(e.to_string()))?;

        Ok(Bytes::from(jpeg_data))
    }

    /// Compress to PNG. Lossless, so quality does not apply.
    fn encode_png(img: &DynamicImage) -> Result<Bytes, CompressionError> {
        let mut buffer = Vec::new();
        let mut cursor = Cursor::new(&mut buffer);

        img.write_to(&mut cursor, ImageFormat::Png)
            .map_err(|e| CompressionError::Encode(e.to_string()))?;

        Ok(Bytes::from(buffer))
    }

    /// Compress to WebP
    fn encode_webp(img: &DynamicImage, quality: f32) -> Bytes {
        let (width, height) = img.dimensions();
        let rgba_img = img.to_rgba8();

        let encoder = webp::Encoder::from_rgba(&rgba_img, width, height);
        let webp_data = encoder.encode(percent_quality(quality));

        Bytes::copy_from_slice(&webp_data)
    }
}

/// Insert the compressed marker before the extension: `photo.png` becomes
/// `photo_compressed.png`. An extension naming a format we never write is
/// replaced by `format`'s, so a GIF re-encoded as JPEG becomes
/// `anim_compressed.jpg`.
/// Names without an extension (or dotfiles such as `.png`) get the marker
/// appended.
pub fn compressed_file_name(name: &str, format: OutputFormat) -> String {
    match name.rfind('.') {
        Some(idx) if idx > 0 => {
            let (stem, extension) = (&name[..idx], &name[idx + 1..]);
            let extension = if OutputFormat::is_output_extension(extension) {
                extension
            } else {
                format.extension()
            };
            format!("{}{}.{}", stem, COMPRESSED_NAME_MARKER, extension)
        }
        _ => format!("{}{}", name, COMPRESSED_NAME_MARKER),
    }
}

/// Decode → fit → re-encode, one file at a time.
#[derive(Debug, Clone)]
pub struct Compressor {
    max_dimension: u32,
    quality: f32,
}

impl Compressor {
    pub fn new(max_dimension: u32, quality: f32) -> Self {
        Self {
            max_dimension,
            quality,
        }
    }

    pub fn from_config(config: &IntakeConfig) -> Self {
        Self::new(config.target_max_dimension_px, config.target_quality)
    }

    /// CPU-bound; callers on an async runtime should go through
    /// [`ImageCompression::compress`], which moves this off the async workers.
    pub fn compress_blocking(&self, file: &RawFile) -> Result<CompressedFile, CompressionError> {
        let decoded = ImageProcessor::decode(&file.bytes).map_err(CompressionError::Decode)?;
        tracing::trace!(
            file.name = %file.name,
            width = decoded.width_px(),
            height = decoded.height_px(),
            exif_orientation = decoded.exif_orientation(),
            "Image decoded"
        );
        let resized = ImageResize::fit_image(decoded.into_image(), self.max_dimension);

        let format = OutputFormat::from_media_type(&file.media_type);
        let bytes = ImageEncoder::encode(&resized, format, self.quality)?;
        let (width, height) = resized.dimensions();

        tracing::debug!(
            file.name = %file.name,
            original_size = file.byte_size(),
            compressed_size = bytes.len(),
            width = width,
            height = height,
            format = ?format,
            "Image compressed"
        );

        Ok(CompressedFile {
            id: file.id,
            name: compressed_file_name(&file.name, format),
            media_type: format.to_mime_type().to_string(),
            width,
            height,
            bytes,
        })
    }
}

#[async_trait]
impl ImageCompression for Compressor {
    async fn compress(&self, file: RawFile) -> Result<CompressedFile, CompressionError> {
        let compressor = self.clone();
        // Decode and encode are CPU-bound; run off the async pool. A panic in
        // a codec surfaces as a JoinError and is reported like any other failure.
        tokio::task::spawn_blocking(move || compressor.compress_blocking(&file))
            .await
            .map_err(|e| CompressionError::Worker(e.to_string()))?
    }
}
