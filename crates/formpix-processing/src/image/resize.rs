use image::{imageops::FilterType, DynamicImage, GenericImageView};

/// Target size of a resize operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeDimensions {
    pub width: u32,
    pub height: u32,
}

/// Image resize operations
pub struct ImageResize;

impl ImageResize {
    /// Fit `orig_width x orig_height` inside a `max_dimension` square,
    /// preserving aspect ratio. Never upscales.
    ///
    /// The longer side becomes `max_dimension`; the shorter side is scaled with
    /// real division and rounded half-up. Square images are treated as
    /// width-constrained.
    pub fn fit_within(orig_width: u32, orig_height: u32, max_dimension: u32) -> ResizeDimensions {
        if orig_width <= max_dimension && orig_height <= max_dimension {
            return ResizeDimensions {
                width: orig_width,
                height: orig_height,
            };
        }

        if orig_width >= orig_height {
            let height = Self::scale_side(orig_height, max_dimension, orig_width);
            ResizeDimensions {
                width: max_dimension,
                height,
            }
        } else {
            let width = Self::scale_side(orig_width, max_dimension, orig_height);
            ResizeDimensions {
                width,
                height: max_dimension,
            }
        }
    }

    /// `round(shorter * max / longer)`, at least one pixel.
    fn scale_side(shorter: u32, max_dimension: u32, longer: u32) -> u32 {
        let scaled = (shorter as f64 * max_dimension as f64 / longer as f64).round();
        (scaled as u32).max(1)
    }

    /// Select appropriate filter type based on resize ratio
    pub fn select_filter(
        orig_width: u32,
        orig_height: u32,
        new_width: u32,
        new_height: u32,
    ) -> FilterType {
        let width_ratio = orig_width as f32 / new_width as f32;
        let height_ratio = orig_height as f32 / new_height as f32;
        let max_ratio = width_ratio.max(height_ratio);

        if max_ratio > 2.0 {
            FilterType::Triangle
        } else if max_ratio > 1.5 {
            FilterType::CatmullRom
        } else {
            FilterType::Lanczos3
        }
    }

    /// Downscale to fit within `max_dimension`; returns the input untouched
    /// when it already fits.
    pub fn fit_image(img: DynamicImage, max_dimension: u32) -> DynamicImage {
        let (orig_width, orig_height) = img.dimensions();
        let target = Self::fit_within(orig_width, orig_height, max_dimension);

        if target.width == orig_width && target.height == orig_height {
            return img;
        }

        let filter = Self::select_filter(orig_width, orig_height, target.width, target.height);
        tracing::debug!(
            from_width = orig_width,
            from_height = orig_height,
            to_width = target.width,
            to_height = target.height,
            filter = ?filter,
            "Resizing image"
        );
        img.resize_exact(target.width, target.height, filter)
    }
}
