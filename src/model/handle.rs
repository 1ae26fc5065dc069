//! Lazily loaded image handle.

use image::{ImageFormat, ImageReader, RgbaImage};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use thiserror::Error;

/// Errors raised while materializing an [`Image`].
#[derive(Error, Debug)]
pub enum ImageLoadError {
    #[error("Failed to read image {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode image {path:?}: {message}")]
    Decode { path: PathBuf, message: String },
}

/// Decoded pixel data plus the container format the decoder recognized.
#[derive(Debug)]
pub struct DecodedImage {
    pub pixels: RgbaImage,
    pub format: Option<ImageFormat>,
}

/// Reference to an image on disk.
///
/// Neither the bytes nor the pixels are read until first requested; each is
/// cached for the lifetime of the handle. Handles are created per task and
/// are not shared between concurrent tasks.
#[derive(Debug)]
pub struct Image {
    path: PathBuf,
    bytes: OnceLock<Vec<u8>>,
    decoded: OnceLock<DecodedImage>,
}

impl Image {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            bytes: OnceLock::new(),
            decoded: OnceLock::new(),
        }
    }

    /// Create a handle whose pixels are already materialized.
    pub fn from_pixels(path: impl Into<PathBuf>, pixels: RgbaImage) -> Self {
        let image = Self::open(path);
        let _ = image.decoded.set(DecodedImage {
            pixels,
            format: None,
        });
        image
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name without extension, or an empty string.
    #[must_use]
    pub fn stem(&self) -> String {
        file_stem(&self.path)
    }

    /// Lowercased file extension, or an empty string.
    #[must_use]
    pub fn extension(&self) -> String {
        file_extension(&self.path)
    }

    /// Raw file contents.
    pub fn bytes(&self) -> Result<&[u8], ImageLoadError> {
        if let Some(bytes) = self.bytes.get() {
            return Ok(bytes);
        }
        let bytes = std::fs::read(&self.path).map_err(|source| ImageLoadError::Io {
            path: self.path.clone(),
            source,
        })?;
        Ok(self.bytes.get_or_init(|| bytes))
    }

    /// Decoded image, converted to 8-bit RGBA.
    pub fn decoded(&self) -> Result<&DecodedImage, ImageLoadError> {
        if let Some(decoded) = self.decoded.get() {
            return Ok(decoded);
        }
        let decoded = self.decode()?;
        Ok(self.decoded.get_or_init(|| decoded))
    }

    /// Decoded pixels as 8-bit RGBA.
    pub fn pixels(&self) -> Result<&RgbaImage, ImageLoadError> {
        self.decoded().map(|d| &d.pixels)
    }

    /// Container format detected from the file contents.
    pub fn format(&self) -> Result<Option<ImageFormat>, ImageLoadError> {
        self.decoded().map(|d| d.format)
    }

    fn decode(&self) -> Result<DecodedImage, ImageLoadError> {
        let decode_error = |message: String| ImageLoadError::Decode {
            path: self.path.clone(),
            message,
        };

        let reader = ImageReader::new(Cursor::new(self.bytes()?))
            .with_guessed_format()
            .map_err(|e| decode_error(e.to_string()))?;
        let format = reader.format();
        let pixels = reader
            .decode()
            .map_err(|e| decode_error(e.to_string()))?
            .to_rgba8();

        tracing::debug!(
            "Decoded {:?} ({}x{})",
            self.path,
            pixels.width(),
            pixels.height()
        );

        Ok(DecodedImage { pixels, format })
    }
}

/// File name of `path` without extension, or an empty string.
#[must_use]
pub fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Lowercased extension of `path`, or an empty string.
#[must_use]
pub fn file_extension(path: &Path) -> String {
    path.extension()
        .map(|s| s.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}
