//! Image processor - decoding and EXIF orientation

use super::orientation::ImageOrientation;
use image::{DynamicImage, ImageReader};
use std::io::Cursor;

/// A decoded image with its EXIF orientation already applied.
///
/// Only lives for the duration of one compression; never handed to callers.
pub struct DecodedImage {
    image: DynamicImage,
    exif_orientation: u8,
}

impl DecodedImage {
    pub fn width_px(&self) -> u32 {
        self.image.width()
    }

    pub fn height_px(&self) -> u32 {
        self.image.height()
    }

    pub fn exif_orientation(&self) -> u8 {
        self.exif_orientation
    }

    pub fn into_image(self) -> DynamicImage {
        self.image
    }
}

pub struct ImageProcessor;

impl ImageProcessor {
    /// Decode image bytes, sniffing the format from content rather than the
    /// declared media type, and apply any EXIF orientation.
    pub fn decode(data: &[u8]) -> Result<DecodedImage, image::ImageError> {
        let cursor = Cursor::new(data);
        let img = ImageReader::new(cursor).with_guessed_format()?.decode()?;

        let exif_orientation = Self::read_exif_orientation(data);
        let image = ImageOrientation::apply_exif_orientation(img, exif_orientation);

        Ok(DecodedImage {
            image,
            exif_orientation,
        })
    }

    /// Read the EXIF orientation tag (1–8). Returns 1 (normal) when the
    /// container has no EXIF block or the tag is missing or out of range.
    pub fn read_exif_orientation(data: &[u8]) -> u8 {
        let mut cursor = Cursor::new(data);
        let exif = match exif::Reader::new().read_from_container(&mut cursor) {
            Ok(exif) => exif,
            Err(_) => return 1,
        };

        exif.get_field(exif::Tag::Orientation, exif::In::PRIMARY)
            .and_then(|field| field.value.get_uint(0))
            .filter(|value| (1..=8).contains(value))
            .map(|value| value as u8)
            .unwrap_or(1)
    }

    /// Get rotation and flip operations needed for a given EXIF orientation
    /// Returns (rotate_angle, flip_horizontal, flip_vertical)
    pub fn get_orientation_transforms(orientation: u8) -> (Option<u16>, bool, bool) {
        match orientation {
            1 => (None, false, false),      // Normal
            2 => (None, true, false),       // Mirror horizontal
            3 => (Some(180), false, false), // Rotate 180
            4 => (None, false, true),       // Mirror vertical
            5 => (Some(90), true, false),   // Transpose
            6 => (Some(90), false, false),  // Rotate 90 CW
            7 => (Some(270), true, false),  // Transverse
            8 => (Some(270), false, false), // Rotate 270 CW
            _ => (None, false, false),      // Invalid, treat as normal
        }
    }
}
