//! Formpix Processing Library
//!
//! Client-side image intake: screening, compression and the cumulative
//! attachment budget of a form session.

pub mod budget;
pub mod compression;
pub mod image;
pub mod traits;
pub mod upload;
pub mod validator;

pub use budget::{BudgetAccumulator, SessionState};
pub use compression::{compressed_file_name, CompressionError, Compressor, ImageEncoder, OutputFormat};
pub use crate::image::{DecodedImage, ImageOrientation, ImageProcessor, ImageResize, ResizeDimensions};
pub use traits::ImageCompression;
pub use upload::{BatchReport, IntakeSession};
pub use validator::{IntakeValidator, ValidationError};
