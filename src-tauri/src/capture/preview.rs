//! Screenshot preview: pure downscaling and PNG encoding.
//!
//! No infrastructure here besides reading the capture from disk in
//! `load_preview`. Image in, base64 PNG out.

use base64::{engine::general_purpose::STANDARD, Engine};
use image::{imageops::FilterType, DynamicImage, ImageFormat};
use serde::Serialize;
use std::io::Cursor;
use std::path::Path;

/// Downscaled capture ready for display next to the prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Preview {
    pub width: u32,
    pub height: u32,
    pub png_base64: String,
}

#[derive(Debug, thiserror::Error)]
pub enum PreviewError {
    #[error("Could not decode screenshot: {0}")]
    Decode(String),

    #[error("Screenshot has zero width or height")]
    ZeroDimension,

    #[error("PNG encoding failed: {0}")]
    EncodingFailed(String),
}

/// Largest size with the same aspect ratio that fits the box.
///
/// Images already inside the box are returned unchanged (never upscaled).
pub fn fit_within(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    if width <= max_width && height <= max_height {
        return (width, height);
    }
    let scale = f64::min(
        max_width as f64 / width as f64,
        max_height as f64 / height as f64,
    );
    let w = ((width as f64 * scale).round() as u32).clamp(1, max_width);
    let h = ((height as f64 * scale).round() as u32).clamp(1, max_height);
    (w, h)
}

/// Downscale with Lanczos3 to fit the box and encode as base64 PNG.
pub fn make_preview(
    image: &DynamicImage,
    max_width: u32,
    max_height: u32,
) -> Result<Preview, PreviewError> {
    if image.width() == 0 || image.height() == 0 {
        return Err(PreviewError::ZeroDimension);
    }

    let (w, h) = fit_within(image.width(), image.height(), max_width, max_height);
    let scaled = if (w, h) == (image.width(), image.height()) {
        image.clone()
    } else {
        image.resize_exact(w, h, FilterType::Lanczos3)
    };

    let mut png_bytes: Vec<u8> = Vec::new();
    scaled
        .write_to(&mut Cursor::new(&mut png_bytes), ImageFormat::Png)
        .map_err(|e| PreviewError::EncodingFailed(e.to_string()))?;

    Ok(Preview {
        width: w,
        height: h,
        png_base64: STANDARD.encode(&png_bytes),
    })
}

/// Decode the capture at `path` and build its preview.
pub fn load_preview(path: &Path, max_width: u32, max_height: u32) -> Result<Preview, PreviewError> {
    let start = std::time::Instant::now();
    let image = image::open(path).map_err(|e| PreviewError::Decode(e.to_string()))?;
    let preview = make_preview(&image, max_width, max_height)?;
    log::info!(
        "[CAPTURE] Preview {}x{} -> {}x{} in {}ms",
        image.width(),
        image.height(),
        preview.width,
        preview.height,
        start.elapsed().as_millis()
    );
    Ok(preview)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;

    #[test]
    fn small_images_are_not_upscaled() {
        assert_eq!(fit_within(100, 80, 550, 450), (100, 80));
        assert_eq!(fit_within(550, 450, 550, 450), (550, 450));
    }

    #[test]
    fn wide_image_is_width_bound() {
        assert_eq!(fit_within(2200, 900, 550, 450), (550, 225));
    }

    #[test]
    fn tall_image_is_height_bound() {
        assert_eq!(fit_within(900, 1800, 550, 450), (225, 450));
    }

    #[test]
    fn extreme_aspect_keeps_one_pixel() {
        let (w, h) = fit_within(10_000, 1, 550, 450);
        assert_eq!((w, h), (550, 1));
    }

    #[test]
    fn preview_is_png_of_fitted_size() {
        let img = DynamicImage::ImageRgba8(RgbaImage::new(1100, 900));
        let preview = make_preview(&img, 550, 450).unwrap();
        assert_eq!((preview.width, preview.height), (550, 450));

        let bytes = STANDARD.decode(&preview.png_base64).unwrap();
        // PNG magic bytes
        assert_eq!(&bytes[..4], &[0x89, 0x50, 0x4E, 0x47]);
    }

    #[test]
    fn zero_sized_image_fails() {
        let img = DynamicImage::ImageRgba8(RgbaImage::new(0, 10));
        assert!(matches!(
            make_preview(&img, 550, 450),
            Err(PreviewError::ZeroDimension)
        ));
    }

    #[test]
    fn undecodable_file_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("shot.png");
        std::fs::write(&path, "not an image").unwrap();
        assert!(matches!(
            load_preview(&path, 550, 450),
            Err(PreviewError::Decode(_))
        ));
    }
}
