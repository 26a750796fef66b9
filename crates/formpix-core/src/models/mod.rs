//! Data models for the intake pipeline
//!
//! `file` holds the artifacts that move through the pipeline, `skip` the
//! per-file rejection records collected into a batch report.

mod file;
mod skip;

pub use file::*;
pub use skip::*;
