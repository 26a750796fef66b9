//! Helpers shared by the `formpix` binary: file loading, report rendering
//! and tracing setup.

use anyhow::{Context, Result};
use formpix_core::{ErrorMetadata, IntakeConfig, IntakeError, LogLevel, RawFile, SkipReason};
use formpix_processing::BatchReport;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Guess a media type from the file extension. Unknown extensions are
/// reported as `application/octet-stream`, which the intake rejects.
pub fn media_type_for_path(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match extension.as_deref() {
        Some("jpg") | Some("jpeg") | Some("jpe") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("bmp") => "image/bmp",
        Some("tif") | Some("tiff") => "image/tiff",
        Some("ico") => "image/x-icon",
        Some("heic") => "image/heic",
        Some("txt") => "text/plain",
        Some("pdf") => "application/pdf",
        _ => "application/octet-stream",
    }
}

/// Read a file from disk as a user selection.
pub fn load_raw_file(path: &Path) -> Result<RawFile> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read file: {}", path.display()))?;
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload")
        .to_string();

    Ok(RawFile::new(name, media_type_for_path(path), bytes))
}

/// Apply command-line overrides on top of a base configuration.
pub fn apply_overrides(
    mut config: IntakeConfig,
    max_dimension: Option<u32>,
    quality: Option<f32>,
) -> Result<IntakeConfig, IntakeError> {
    if let Some(max_dimension) = max_dimension {
        config.target_max_dimension_px = max_dimension;
    }
    if let Some(quality) = quality {
        config.target_quality = quality;
    }
    config.validate()?;
    Ok(config)
}

#[derive(Debug, Serialize)]
pub struct AcceptedSummary {
    pub name: String,
    pub media_type: String,
    pub byte_size: u64,
    pub width: u32,
    pub height: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// JSON shape printed by the CLI for one batch.
#[derive(Debug, Serialize)]
pub struct BatchSummary {
    pub accepted: Vec<AcceptedSummary>,
    pub skipped: Vec<SkipReason>,
    pub running_total: u64,
    pub max_total_size: u64,
}

impl BatchSummary {
    pub fn from_report(report: &BatchReport, max_total_size: u64) -> Self {
        Self {
            accepted: report
                .accepted
                .iter()
                .map(|f| AcceptedSummary {
                    name: f.name.clone(),
                    media_type: f.media_type.clone(),
                    byte_size: f.byte_size(),
                    width: f.width,
                    height: f.height,
                    path: None,
                })
                .collect(),
            skipped: report.skipped.clone(),
            running_total: report.running_total,
            max_total_size,
        }
    }
}

/// Write every accepted file of `report` into `out_dir`, returning the paths
/// in acceptance order.
pub fn write_accepted(report: &BatchReport, out_dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create output directory: {}", out_dir.display()))?;

    let mut paths = Vec::with_capacity(report.accepted.len());
    for file in &report.accepted {
        let path = out_dir.join(&file.name);
        std::fs::write(&path, &file.bytes)
            .with_context(|| format!("Failed to write file: {}", path.display()))?;
        paths.push(path);
    }
    Ok(paths)
}

/// Log an intake error at its own level.
pub fn log_intake_error(err: &IntakeError) {
    match err.log_level() {
        LogLevel::Debug => tracing::debug!(code = err.error_code(), error = %err, "Request failed"),
        LogLevel::Warn => tracing::warn!(code = err.error_code(), error = %err, "Request failed"),
        LogLevel::Error => tracing::error!(code = err.error_code(), error = %err, "Request failed"),
    }
}

/// Initialize tracing for the CLI. Logs go to stderr so stdout stays JSON.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}
