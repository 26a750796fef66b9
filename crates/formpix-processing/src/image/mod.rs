//! Image processing module
//!
//! - Decoding and EXIF orientation (processor, orientation)
//! - Aspect-preserving downscale (resize)

pub mod orientation;
pub mod processor;
pub mod resize;

pub use orientation::ImageOrientation;
pub use processor::{DecodedImage, ImageProcessor};
pub use resize::{ImageResize, ResizeDimensions};
