//! Formpix Core Library
//!
//! This crate provides the domain models, error types and configuration
//! shared by the intake pipeline, the submission client and the CLI.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use config::IntakeConfig;
pub use error::{ErrorMetadata, IntakeError, LogLevel};
pub use models::{CompressedFile, FileId, RawFile, SkipKind, SkipReason};
