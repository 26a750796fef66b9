//! Test helpers: in-memory image fixtures and scripted compressors.
//!
//! Run from workspace root: `cargo test -p formpix-processing --test pipeline_test`.

use async_trait::async_trait;
use formpix_core::{CompressedFile, RawFile};
use formpix_processing::{
    compressed_file_name, CompressionError, ImageCompression, OutputFormat,
};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::collections::{HashMap, HashSet};
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Notify;

pub const MIB: usize = 1024 * 1024;

/// Deterministic pseudo-random RGB image. Noise barely compresses, so the
/// encoded size tracks `width * height * 3` closely.
pub fn noise_image(width: u32, height: u32, seed: u32) -> DynamicImage {
    let mut state = seed.wrapping_mul(2_654_435_761).wrapping_add(1);
    let img = RgbImage::from_fn(width, height, |_, _| {
        let mut next = || {
            state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            (state >> 24) as u8
        };
        Rgb([next(), next(), next()])
    });
    DynamicImage::ImageRgb8(img)
}

pub fn encode(img: &DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut buffer = Vec::new();
    img.write_to(&mut Cursor::new(&mut buffer), format)
        .expect("encode fixture");
    buffer
}

/// PNG of random noise, roughly `width * height * 3` bytes.
pub fn noise_png(width: u32, height: u32) -> Vec<u8> {
    encode(&noise_image(width, height, width ^ height), ImageFormat::Png)
}

/// Smooth gradient JPEG; compresses well.
pub fn gradient_jpeg(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 255 / width) as u8, (y * 255 / height) as u8, 96])
    });
    encode(&DynamicImage::ImageRgb8(img), ImageFormat::Jpeg)
}

/// JPEG carrying a minimal big-endian EXIF block with the given orientation.
pub fn jpeg_with_orientation(width: u32, height: u32, orientation: u16) -> Vec<u8> {
    let jpeg = gradient_jpeg(width, height);

    let mut tiff = Vec::new();
    tiff.extend_from_slice(b"MM\x00\x2A");
    tiff.extend_from_slice(&8u32.to_be_bytes()); // IFD0 offset
    tiff.extend_from_slice(&1u16.to_be_bytes()); // entry count
    tiff.extend_from_slice(&0x0112u16.to_be_bytes()); // Orientation
    tiff.extend_from_slice(&3u16.to_be_bytes()); // SHORT
    tiff.extend_from_slice(&1u32.to_be_bytes());
    tiff.extend_from_slice(&orientation.to_be_bytes());
    tiff.extend_from_slice(&[0, 0]);
    tiff.extend_from_slice(&0u32.to_be_bytes()); // no next IFD

    let mut app1 = b"Exif\x00\x00".to_vec();
    app1.extend_from_slice(&tiff);

    let mut out = Vec::with_capacity(jpeg.len() + app1.len() + 4);
    out.extend_from_slice(&jpeg[..2]); // SOI
    out.extend_from_slice(&[0xFF, 0xE1]);
    out.extend_from_slice(&((app1.len() + 2) as u16).to_be_bytes());
    out.extend_from_slice(&app1);
    out.extend_from_slice(&jpeg[2..]);
    out
}

pub fn raw(name: &str, media_type: &str, bytes: Vec<u8>) -> RawFile {
    RawFile::new(name, media_type, bytes)
}

fn passthrough(file: &RawFile) -> CompressedFile {
    CompressedFile {
        id: file.id,
        name: compressed_file_name(
            &file.name,
            OutputFormat::from_media_type(&file.media_type),
        ),
        media_type: file.media_type.clone(),
        width: 1,
        height: 1,
        bytes: file.bytes.clone(),
    }
}

/// Returns the input payload unchanged, after an optional per-file delay.
/// Files registered with `failing` report an encode error.
#[derive(Default)]
pub struct EchoCompressor {
    delays: HashMap<String, Duration>,
    failures: HashSet<String>,
}

impl EchoCompressor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(mut self, name: &str, millis: u64) -> Self {
        self.delays
            .insert(name.to_string(), Duration::from_millis(millis));
        self
    }

    pub fn failing(mut self, name: &str) -> Self {
        self.failures.insert(name.to_string());
        self
    }
}

#[async_trait]
impl ImageCompression for EchoCompressor {
    async fn compress(&self, file: RawFile) -> Result<CompressedFile, CompressionError> {
        if let Some(delay) = self.delays.get(&file.name) {
            tokio::time::sleep(*delay).await;
        }
        if self.failures.contains(&file.name) {
            return Err(CompressionError::Encode("scripted failure".to_string()));
        }
        Ok(passthrough(&file))
    }
}

/// Holds every file until `release` is notified; signals `started` first.
#[derive(Default)]
pub struct GatedCompressor {
    pub started: Notify,
    pub release: Notify,
}

#[async_trait]
impl ImageCompression for GatedCompressor {
    async fn compress(&self, file: RawFile) -> Result<CompressedFile, CompressionError> {
        self.started.notify_one();
        self.release.notified().await;
        Ok(passthrough(&file))
    }
}

/// Records the peak number of concurrent calls.
#[derive(Default)]
pub struct CountingCompressor {
    in_flight: AtomicUsize,
    pub peak: AtomicUsize,
    pub calls: AtomicUsize,
}

#[async_trait]
impl ImageCompression for CountingCompressor {
    async fn compress(&self, file: RawFile) -> Result<CompressedFile, CompressionError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        self.calls.fetch_add(1, Ordering::SeqCst);

        tokio::time::sleep(Duration::from_millis(20)).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(passthrough(&file))
    }
}
