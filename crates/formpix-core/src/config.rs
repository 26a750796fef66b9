//! Configuration module
//!
//! Size ceilings and encoding targets for the intake pipeline. A config is
//! passed into each session at construction time so every test (and every
//! site) can pick its own limits.

use std::env;

use crate::constants::{
    EMBROIDERY_MAX_TOTAL_SIZE, MAX_COMPRESSED_FILE_SIZE, MAX_CONCURRENT_COMPRESSIONS,
    MAX_RAW_FILE_SIZE, MAX_TOTAL_SIZE, TARGET_MAX_DIMENSION_PX, TARGET_QUALITY,
};
use crate::error::IntakeError;

/// Intake pipeline configuration
#[derive(Clone, Debug, PartialEq)]
pub struct IntakeConfig {
    /// Files above this size are rejected before decoding.
    pub max_raw_file_size: u64,
    /// Per-file ceiling after compression. `None` disables the check.
    pub max_compressed_file_size: Option<u64>,
    /// Ceiling on the sum of accepted file sizes in one session.
    pub max_total_size: u64,
    /// Longest side of a compressed image, in pixels.
    pub target_max_dimension_px: u32,
    /// Encoder quality in (0, 1].
    pub target_quality: f32,
    pub max_concurrent_compressions: usize,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            max_raw_file_size: MAX_RAW_FILE_SIZE,
            max_compressed_file_size: Some(MAX_COMPRESSED_FILE_SIZE),
            max_total_size: MAX_TOTAL_SIZE,
            target_max_dimension_px: TARGET_MAX_DIMENSION_PX,
            target_quality: TARGET_QUALITY,
            max_concurrent_compressions: MAX_CONCURRENT_COMPRESSIONS,
        }
    }
}

impl IntakeConfig {
    /// Limits used by the embroidery site: larger total budget, no per-file cap.
    pub fn embroidery_site() -> Self {
        Self {
            max_compressed_file_size: None,
            max_total_size: EMBROIDERY_MAX_TOTAL_SIZE,
            ..Self::default()
        }
    }

    pub fn from_env() -> Result<Self, IntakeError> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        let max_compressed_file_size = match env::var("INTAKE_MAX_COMPRESSED_FILE_SIZE") {
            Ok(value) => parse_optional_limit(&value, defaults.max_compressed_file_size),
            Err(_) => defaults.max_compressed_file_size,
        };

        let config = Self {
            max_raw_file_size: env::var("INTAKE_MAX_RAW_FILE_SIZE")
                .unwrap_or_else(|_| defaults.max_raw_file_size.to_string())
                .parse()
                .unwrap_or(defaults.max_raw_file_size),
            max_compressed_file_size,
            max_total_size: env::var("INTAKE_MAX_TOTAL_SIZE")
                .unwrap_or_else(|_| defaults.max_total_size.to_string())
                .parse()
                .unwrap_or(defaults.max_total_size),
            target_max_dimension_px: env::var("INTAKE_MAX_DIMENSION_PX")
                .unwrap_or_else(|_| defaults.target_max_dimension_px.to_string())
                .parse()
                .unwrap_or(defaults.target_max_dimension_px),
            target_quality: env::var("INTAKE_QUALITY")
                .unwrap_or_else(|_| defaults.target_quality.to_string())
                .parse()
                .unwrap_or(defaults.target_quality),
            max_concurrent_compressions: env::var("INTAKE_MAX_CONCURRENT_COMPRESSIONS")
                .unwrap_or_else(|_| defaults.max_concurrent_compressions.to_string())
                .parse()
                .unwrap_or(defaults.max_concurrent_compressions),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), IntakeError> {
        if !(self.target_quality > 0.0 && self.target_quality <= 1.0) {
            return Err(IntakeError::InvalidConfig(format!(
                "target quality must be in (0, 1], got {}",
                self.target_quality
            )));
        }

        if self.target_max_dimension_px == 0 {
            return Err(IntakeError::InvalidConfig(
                "target max dimension must be at least 1 pixel".to_string(),
            ));
        }

        if self.max_total_size == 0 {
            return Err(IntakeError::InvalidConfig(
                "max total size must be greater than zero".to_string(),
            ));
        }

        if self.max_concurrent_compressions == 0 {
            return Err(IntakeError::InvalidConfig(
                "max concurrent compressions must be at least 1".to_string(),
            ));
        }

        if let Some(per_file) = self.max_compressed_file_size {
            if per_file > self.max_total_size {
                return Err(IntakeError::InvalidConfig(format!(
                    "per-file limit ({} bytes) exceeds total limit ({} bytes)",
                    per_file, self.max_total_size
                )));
            }
        }

        Ok(())
    }
}

/// `0` and `none` disable the limit; anything unparsable keeps the default.
fn parse_optional_limit(value: &str, default: Option<u64>) -> Option<u64> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("none") {
        return None;
    }
    match value.parse::<u64>() {
        Ok(0) => None,
        Ok(limit) => Some(limit),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_agency_site() {
        let config = IntakeConfig::default();
        assert_eq!(config.max_raw_file_size, 10 * 1024 * 1024);
        assert_eq!(config.max_compressed_file_size, Some(2 * 1024 * 1024));
        assert_eq!(config.max_total_size, 5 * 1024 * 1024);
        assert_eq!(config.target_max_dimension_px, 800);
        assert_eq!(config.target_quality, 0.6);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_embroidery_site_has_no_per_file_cap() {
        let config = IntakeConfig::embroidery_site();
        assert_eq!(config.max_compressed_file_size, None);
        assert_eq!(config.max_total_size, 8 * 1024 * 1024);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_quality() {
        for quality in [0.0, -0.5, 1.01, f32::NAN] {
            let config = IntakeConfig {
                target_quality: quality,
                ..IntakeConfig::default()
            };
            assert!(
                matches!(config.validate(), Err(IntakeError::InvalidConfig(_))),
                "quality {} should be rejected",
                quality
            );
        }

        let config = IntakeConfig {
            target_quality: 1.0,
            ..IntakeConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_limits() {
        let config = IntakeConfig {
            target_max_dimension_px: 0,
            ..IntakeConfig::default()
        };
        assert!(config.validate().is_err());

        let config = IntakeConfig {
            max_total_size: 0,
            ..IntakeConfig::default()
        };
        assert!(config.validate().is_err());

        let config = IntakeConfig {
            max_concurrent_compressions: 0,
            ..IntakeConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_per_file_above_total() {
        let config = IntakeConfig {
            max_compressed_file_size: Some(6 * 1024 * 1024),
            ..IntakeConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_optional_limit() {
        assert_eq!(parse_optional_limit("none", Some(5)), None);
        assert_eq!(parse_optional_limit("NONE", Some(5)), None);
        assert_eq!(parse_optional_limit("0", Some(5)), None);
        assert_eq!(parse_optional_limit(" 1024 ", Some(5)), Some(1024));
        assert_eq!(parse_optional_limit("lots", Some(5)), Some(5));
    }
}
