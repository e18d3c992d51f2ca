//! Image enhancement applied before OCR.

use image::imageops::{self, FilterType};
use image::{DynamicImage, GenericImageView, GrayImage};
use tracing::debug;

use crate::models::config::PreprocessConfig;

/// Smoothing kernel blended against the original to sharpen it.
const SMOOTH_KERNEL: [f32; 9] = [
    1.0 / 13.0,
    1.0 / 13.0,
    1.0 / 13.0,
    1.0 / 13.0,
    5.0 / 13.0,
    1.0 / 13.0,
    1.0 / 13.0,
    1.0 / 13.0,
    1.0 / 13.0,
];

/// Image preprocessor for scanned documents.
pub struct ImagePreprocessor {
    config: PreprocessConfig,
}

impl ImagePreprocessor {
    /// Create a new preprocessor with default settings.
    pub fn new() -> Self {
        Self::with_config(PreprocessConfig::default())
    }

    pub fn with_config(config: PreprocessConfig) -> Self {
        Self { config }
    }

    /// Grayscale, upscale small scans, boost contrast and sharpness,
    /// stretch the histogram and remove speckle noise.
    pub fn enhance(&self, image: &DynamicImage) -> DynamicImage {
        let (width, height) = image.dimensions();
        debug!("Original image size: {}x{}", width, height);

        let mut gray = image.to_luma8();

        let (new_width, new_height) = self.calculate_resize_dimensions(width, height);
        if (new_width, new_height) != (width, height) {
            debug!("Upscaling to {}x{}", new_width, new_height);
            gray = imageops::resize(&gray, new_width, new_height, FilterType::Lanczos3);
        }

        adjust_contrast(&mut gray, self.config.contrast);
        gray = sharpen(&gray, self.config.sharpness);
        autocontrast(&mut gray);

        if self.config.median_radius > 0 {
            gray = imageproc::filter::median_filter(
                &gray,
                self.config.median_radius,
                self.config.median_radius,
            );
        }

        DynamicImage::ImageLuma8(gray)
    }

    fn calculate_resize_dimensions(&self, width: u32, height: u32) -> (u32, u32) {
        if width.max(height) >= self.config.min_long_side {
            return (width, height);
        }

        let scale = self.config.upscale_factor;
        let new_width = (width as f32 * scale) as u32;
        let new_height = (height as f32 * scale) as u32;

        (new_width.max(1), new_height.max(1))
    }
}

impl Default for ImagePreprocessor {
    fn default() -> Self {
        Self::new()
    }
}

/// Blend every pixel with the mean luminance; `factor` 1.0 is the identity.
fn adjust_contrast(image: &mut GrayImage, factor: f32) {
    let count = (image.width() as u64 * image.height() as u64).max(1);
    let sum: u64 = image.pixels().map(|p| p[0] as u64).sum();
    let mean = (sum as f32 / count as f32).round();

    for pixel in image.pixels_mut() {
        let value = mean + factor * (pixel[0] as f32 - mean);
        pixel[0] = value.round().clamp(0.0, 255.0) as u8;
    }
}

/// Blend with a smoothed copy; `factor` above 1.0 sharpens.
fn sharpen(image: &GrayImage, factor: f32) -> GrayImage {
    let smoothed: GrayImage = imageops::filter3x3(image, &SMOOTH_KERNEL);
    let mut result = image.clone();

    for (out, soft) in result.pixels_mut().zip(smoothed.pixels()) {
        let value = soft[0] as f32 + factor * (out[0] as f32 - soft[0] as f32);
        out[0] = value.round().clamp(0.0, 255.0) as u8;
    }

    result
}

/// Stretch the darkest pixel to black and the brightest to white.
fn autocontrast(image: &mut GrayImage) {
    let Some(lo) = image.pixels().map(|p| p[0]).min() else {
        return;
    };
    let hi = image.pixels().map(|p| p[0]).max().unwrap_or(lo);
    if hi <= lo {
        return;
    }

    let span = (hi - lo) as f32;
    for pixel in image.pixels_mut() {
        let value = (pixel[0] - lo) as f32 * 255.0 / span;
        pixel[0] = value.round().clamp(0.0, 255.0) as u8;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn gradient(width: u32, height: u32) -> GrayImage {
        GrayImage::from_fn(width, height, |x, _| Luma([(100 + (x % 50)) as u8]))
    }

    #[test]
    fn test_resize_dimensions() {
        let preprocessor = ImagePreprocessor::new();

        // Small scan gets upscaled
        assert_eq!(preprocessor.calculate_resize_dimensions(1000, 500), (1600, 800));

        // Large scan untouched
        assert_eq!(preprocessor.calculate_resize_dimensions(2000, 1000), (2000, 1000));
    }

    #[test]
    fn test_contrast_identity() {
        let mut image = gradient(20, 4);
        let original = image.clone();
        adjust_contrast(&mut image, 1.0);
        assert_eq!(image, original);
    }

    #[test]
    fn test_autocontrast_stretches_range() {
        let mut image = gradient(50, 2);
        autocontrast(&mut image);
        let min = image.pixels().map(|p| p[0]).min().unwrap();
        let max = image.pixels().map(|p| p[0]).max().unwrap();
        assert_eq!((min, max), (0, 255));
    }

    #[test]
    fn test_enhance_outputs_upscaled_grayscale() {
        let preprocessor = ImagePreprocessor::new();
        let image = DynamicImage::ImageLuma8(gradient(100, 40));

        let enhanced = preprocessor.enhance(&image);
        assert_eq!(enhanced.dimensions(), (160, 64));
        assert!(matches!(enhanced, DynamicImage::ImageLuma8(_)));
    }
}
