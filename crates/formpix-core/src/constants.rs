//! Size and encoding constants shared across crates.

pub const MIB: u64 = 1024 * 1024;

/// Pre-compression ceiling; bounds worst-case decode cost.
pub const MAX_RAW_FILE_SIZE: u64 = 10 * MIB;

/// Per-file ceiling after compression.
pub const MAX_COMPRESSED_FILE_SIZE: u64 = 2 * MIB;

/// Cumulative ceiling across all accepted files of one form session.
pub const MAX_TOTAL_SIZE: u64 = 5 * MIB;

/// Cumulative ceiling used by the embroidery site (no per-file cap there).
pub const EMBROIDERY_MAX_TOTAL_SIZE: u64 = 8 * MIB;

pub const TARGET_MAX_DIMENSION_PX: u32 = 800;
pub const TARGET_QUALITY: f32 = 0.6;
pub const MAX_CONCURRENT_COMPRESSIONS: usize = 4;

/// Inserted before the extension of a processed file's name.
pub const COMPRESSED_NAME_MARKER: &str = "_compressed";

pub const DEFAULT_MEDIA_TYPE: &str = "image/jpeg";
pub const IMAGE_MEDIA_TYPE_PREFIX: &str = "image/";
