//! Intake session: the batch pipeline and its report.

pub mod pipeline;
pub mod types;

pub use pipeline::IntakeSession;
pub use types::BatchReport;
