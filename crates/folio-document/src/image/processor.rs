// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image processor: downscaling, grayscale, contrast and sharpness for page
// photographs. Operates on in-memory images using the `image` and `imageproc`
// crates.

use folio_core::error::{FolioError, Result};
use image::{DynamicImage, RgbaImage};
use imageproc::filter::gaussian_blur_f32;
use tracing::{debug, info, instrument};

/// Blur radius of the smoothed reference image used by [`ImageProcessor::sharpen`].
const SHARPEN_SIGMA: f32 = 1.0;

/// Image processing pipeline operating on a single in-memory image.
///
/// Each method consumes `self` and returns a new `ImageProcessor` wrapping the
/// transformed image, enabling method chaining.
///
/// ```ignore
/// let page = ImageProcessor::from_bytes(&std::fs::read("IMG_0001.JPG")?)?
///     .fit_width(2000)
///     .adjust_contrast(1.5)
///     .sharpen(1.2)
///     .into_dynamic();
/// ```
pub struct ImageProcessor {
    image: DynamicImage,
}

impl ImageProcessor {
    // -- Construction ---------------------------------------------------------

    /// Create a processor from raw encoded bytes (JPEG, PNG, TIFF).
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let img = image::load_from_memory(data)
            .map_err(|err| FolioError::ImageError(format!("failed to decode image: {}", err)))?;
        debug!(
            width = img.width(),
            height = img.height(),
            "Image decoded from bytes"
        );
        Ok(Self { image: img })
    }

    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self { image }
    }

    // -- Accessors ------------------------------------------------------------

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn into_dynamic(self) -> DynamicImage {
        self.image
    }

    // -- Transformations (consume self, return new Self) -----------------------

    /// Downscale so the width is at most `max_width`, preserving aspect ratio.
    /// Images already narrow enough are returned untouched; nothing is
    /// upscaled. Uses Lanczos3 filtering.
    #[instrument(skip(self), fields(max_width))]
    pub fn fit_width(self, max_width: u32) -> Self {
        let (width, height) = (self.image.width(), self.image.height());
        if width <= max_width || max_width == 0 {
            return self;
        }
        let ratio = f64::from(max_width) / f64::from(width);
        let new_height = ((f64::from(height) * ratio).round() as u32).max(1);
        info!(
            from_w = width,
            from_h = height,
            to_w = max_width,
            to_h = new_height,
            "Downscaling page image"
        );
        let resized =
            self.image
                .resize_exact(max_width, new_height, image::imageops::FilterType::Lanczos3);
        Self { image: resized }
    }

    /// Convert the image to grayscale (luma).
    #[instrument(skip(self))]
    pub fn grayscale(self) -> Self {
        debug!("Converting to grayscale");
        Self {
            image: self.image.grayscale(),
        }
    }

    /// Scale contrast by `factor` around the image's mean grey level.
    /// Values > 1.0 increase contrast; 1.0 is a no-op.
    #[instrument(skip(self), fields(factor))]
    pub fn adjust_contrast(self, factor: f32) -> Self {
        let mean = mean_luma(&self.image);
        debug!(factor, mean, "Adjusting contrast");

        let grayscale = matches!(self.image, DynamicImage::ImageLuma8(_));
        let rgba = self.image.to_rgba8();
        let contrasted = image::ImageBuffer::from_fn(rgba.width(), rgba.height(), |x, y| {
            let image::Rgba([r, g, b, a]) = *rgba.get_pixel(x, y);
            let adjust = |channel: u8| blend(mean, f32::from(channel), factor);
            image::Rgba([adjust(r), adjust(g), adjust(b), a])
        });

        Self {
            image: restore_luma(DynamicImage::ImageRgba8(contrasted), grayscale),
        }
    }

    /// Scale sharpness by `factor` relative to a smoothed copy of the image.
    /// Values > 1.0 sharpen; 1.0 is a no-op.
    #[instrument(skip(self), fields(factor))]
    pub fn sharpen(self, factor: f32) -> Self {
        debug!(factor, "Adjusting sharpness");

        let grayscale = matches!(self.image, DynamicImage::ImageLuma8(_));
        let rgba = self.image.to_rgba8();
        let smoothed: RgbaImage = gaussian_blur_f32(&rgba, SHARPEN_SIGMA);
        let sharpened = image::ImageBuffer::from_fn(rgba.width(), rgba.height(), |x, y| {
            let image::Rgba([r, g, b, a]) = *rgba.get_pixel(x, y);
            let image::Rgba([sr, sg, sb, _]) = *smoothed.get_pixel(x, y);
            let adjust = |channel: u8, soft: u8| blend(f32::from(soft), f32::from(channel), factor);
            image::Rgba([adjust(r, sr), adjust(g, sg), adjust(b, sb), a])
        });

        Self {
            image: restore_luma(DynamicImage::ImageRgba8(sharpened), grayscale),
        }
    }
}

/// `degenerate + factor * (value - degenerate)`, clamped to a byte.
fn blend(degenerate: f32, value: f32, factor: f32) -> u8 {
    (degenerate + factor * (value - degenerate))
        .round()
        .clamp(0.0, 255.0) as u8
}

fn mean_luma(image: &DynamicImage) -> f32 {
    let luma = image.to_luma8();
    let count = u64::from(luma.width()) * u64::from(luma.height());
    if count == 0 {
        return 0.0;
    }
    let sum: u64 = luma.pixels().map(|p| u64::from(p.0[0])).sum();
    (sum as f64 / count as f64).round() as f32
}

fn restore_luma(image: DynamicImage, grayscale: bool) -> DynamicImage {
    if grayscale {
        DynamicImage::ImageLuma8(image.to_luma8())
    } else {
        image
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    fn stripes(width: u32, height: u32) -> DynamicImage {
        let img = GrayImage::from_fn(width, height, |x, _| {
            if (x / 4) % 2 == 0 { Luma([96u8]) } else { Luma([160u8]) }
        });
        DynamicImage::ImageLuma8(img)
    }

    #[test]
    fn fit_width_only_downscales() {
        let wide = ImageProcessor::from_dynamic(stripes(400, 100)).fit_width(200);
        assert_eq!((wide.width(), wide.height()), (200, 50));

        let narrow = ImageProcessor::from_dynamic(stripes(120, 80)).fit_width(200);
        assert_eq!((narrow.width(), narrow.height()), (120, 80));
    }

    #[test]
    fn contrast_spreads_around_mean() {
        let out = ImageProcessor::from_dynamic(stripes(16, 4))
            .adjust_contrast(1.5)
            .into_dynamic()
            .to_luma8();
        // Mean is 128; 96 → 80 and 160 → 176.
        assert_eq!(out.get_pixel(0, 0).0[0], 80);
        assert_eq!(out.get_pixel(4, 0).0[0], 176);
    }

    #[test]
    fn unit_factors_are_identity() {
        let original = stripes(16, 8);
        let out = ImageProcessor::from_dynamic(original.clone())
            .adjust_contrast(1.0)
            .sharpen(1.0)
            .into_dynamic();
        assert_eq!(out.to_luma8(), original.to_luma8());
    }

    #[test]
    fn grayscale_is_preserved_through_adjustments() {
        let out = ImageProcessor::from_dynamic(stripes(8, 8)).sharpen(1.2).into_dynamic();
        assert!(matches!(out, DynamicImage::ImageLuma8(_)));
    }

    #[test]
    fn undecodable_bytes_are_image_errors() {
        let err = ImageProcessor::from_bytes(b"not an image").err().unwrap();
        assert!(matches!(err, FolioError::ImageError(_)));
    }
}
