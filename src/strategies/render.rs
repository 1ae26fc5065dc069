//! Shared helpers for strategies that render images.

use super::StrategyError;
use image::{DynamicImage, RgbaImage};
use std::borrow::Cow;
use std::path::{Path, PathBuf};

/// Grow `image` to `width` x `height` with transparent pixels.
///
/// The original content stays anchored at the origin. Returns the input
/// unchanged if it already has those dimensions.
pub(super) fn pad(image: &RgbaImage, width: u32, height: u32) -> Cow<'_, RgbaImage> {
    if image.dimensions() == (width, height) {
        return Cow::Borrowed(image);
    }
    let mut padded = RgbaImage::new(width, height);
    for (x, y, pixel) in image.enumerate_pixels() {
        if x < width && y < height {
            padded.put_pixel(x, y, *pixel);
        }
    }
    Cow::Owned(padded)
}

/// Cut `image` down to `width` x `height` from the origin.
pub(super) fn crop(image: &RgbaImage, width: u32, height: u32) -> Cow<'_, RgbaImage> {
    if image.dimensions() == (width, height) {
        return Cow::Borrowed(image);
    }
    Cow::Owned(image::imageops::crop_imm(image, 0, 0, width, height).to_image())
}

/// Extension of a rendered file derived from its source image.
///
/// JPEG sources render to JPEG, everything else to PNG.
pub(super) fn output_extension(source_extension: &str) -> &'static str {
    match source_extension {
        "jpg" => "jpg",
        "jpeg" => "jpeg",
        _ => "png",
    }
}

/// Write `image` to `path`, creating parent directories.
///
/// JPEG has no alpha channel, so JPEG targets are written as RGB.
pub(super) fn save(image: &RgbaImage, path: &Path) -> Result<PathBuf, StrategyError> {
    let output_error = |message: String| StrategyError::Output {
        path: path.to_path_buf(),
        message,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| output_error(e.to_string()))?;
    }

    let is_jpeg = path
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("jpg") || e.eq_ignore_ascii_case("jpeg"));
    let written = if is_jpeg {
        DynamicImage::ImageRgba8(image.clone()).to_rgb8().save(path)
    } else {
        image.save(path)
    };
    written.map_err(|e| output_error(e.to_string()))?;

    tracing::debug!("Wrote {}", path.display());
    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_pad_keeps_origin() {
        let image = RgbaImage::from_pixel(2, 1, Rgba([9, 9, 9, 255]));
        let padded = pad(&image, 3, 2);
        assert_eq!(padded.dimensions(), (3, 2));
        assert_eq!(padded.get_pixel(1, 0), &Rgba([9, 9, 9, 255]));
        assert_eq!(padded.get_pixel(2, 1), &Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn test_pad_and_crop_borrow_when_unchanged() {
        let image = RgbaImage::new(2, 2);
        assert!(matches!(pad(&image, 2, 2), Cow::Borrowed(_)));
        assert!(matches!(crop(&image, 2, 2), Cow::Borrowed(_)));
        assert_eq!(crop(&image, 1, 2).dimensions(), (1, 2));
    }

    #[test]
    fn test_output_extension() {
        assert_eq!(output_extension("jpg"), "jpg");
        assert_eq!(output_extension("png"), "png");
        assert_eq!(output_extension("bmp"), "png");
    }

    #[test]
    fn test_save_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out.jpg");
        save(&RgbaImage::new(2, 2), &path).unwrap();
        assert!(path.exists());
    }
}
