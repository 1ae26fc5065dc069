//! Composite comparator: blends cover and stego into a single image.

use super::{render, Params, StrategyError};
use crate::model::{
    file_extension, file_stem, ComparatorDiff, DiffField, DiffKey, DiffValue, Image,
};
use image::RgbaImage;
use std::borrow::Cow;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

const COMPOSITE: &str = "composite";
const PREPROCESS: &str = "preprocess";
const MODE: &str = "mode";
const IMAGE_DIR: &str = "imageDir";

pub const DEFAULT_IMAGE_DIR: &str = "output/composites";

/// Per-channel blend applied to `base` and `top`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendMode {
    Difference,
    Subtract,
    Overlay,
    Exclusion,
    Darken,
    Lighten,
}

impl BlendMode {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Difference => "difference",
            Self::Subtract => "subtract",
            Self::Overlay => "overlay",
            Self::Exclusion => "exclusion",
            Self::Darken => "darken",
            Self::Lighten => "lighten",
        }
    }

    /// Blend a single 8-bit channel value.
    #[must_use]
    pub fn apply(self, base: u8, top: u8) -> u8 {
        let a = f32::from(base) / 255.0;
        let b = f32::from(top) / 255.0;
        let blended = match self {
            Self::Difference => (a - b).abs(),
            Self::Subtract => (a - b).max(0.0),
            Self::Overlay if a < 0.5 => 2.0 * a * b,
            Self::Overlay => 1.0 - 2.0 * (1.0 - a) * (1.0 - b),
            Self::Exclusion => a + b - 2.0 * a * b,
            Self::Darken => a.min(b),
            Self::Lighten => a.max(b),
        };
        (blended.clamp(0.0, 1.0) * 255.0).round() as u8
    }

    /// Blend `top` onto `base`.
    ///
    /// Color channels are blended where both images overlap; alpha and any
    /// area outside the overlap keep the base pixels.
    #[must_use]
    pub fn compose(self, base: &RgbaImage, top: &RgbaImage) -> RgbaImage {
        let mut out = base.clone();
        let width = base.width().min(top.width());
        let height = base.height().min(top.height());
        for y in 0..height {
            for x in 0..width {
                let t = top.get_pixel(x, y);
                let pixel = out.get_pixel_mut(x, y);
                for i in 0..3 {
                    pixel[i] = self.apply(pixel[i], t[i]);
                }
            }
        }
        out
    }
}

impl FromStr for BlendMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "difference" | "diff" => Ok(Self::Difference),
            "subtract" => Ok(Self::Subtract),
            "overlay" => Ok(Self::Overlay),
            "exclusion" => Ok(Self::Exclusion),
            "darken" => Ok(Self::Darken),
            "lighten" => Ok(Self::Lighten),
            _ => Err("expected one of difference, subtract, overlay, exclusion, darken, lighten"
                .to_string()),
        }
    }
}

impl fmt::Display for BlendMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How two images of different size are aligned before blending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Preprocess {
    #[default]
    None,
    /// Grow both to the larger dimensions
    Pad,
    /// Shrink both to the smaller dimensions
    Crop,
}

impl Preprocess {
    fn apply<'a>(
        self,
        a: &'a RgbaImage,
        b: &'a RgbaImage,
    ) -> (Cow<'a, RgbaImage>, Cow<'a, RgbaImage>) {
        match self {
            Self::None => (Cow::Borrowed(a), Cow::Borrowed(b)),
            Self::Pad => {
                let (w, h) = (a.width().max(b.width()), a.height().max(b.height()));
                (render::pad(a, w, h), render::pad(b, w, h))
            }
            Self::Crop => {
                let (w, h) = (a.width().min(b.width()), a.height().min(b.height()));
                (render::crop(a, w, h), render::crop(b, w, h))
            }
        }
    }
}

impl FromStr for Preprocess {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "pad" => Ok(Self::Pad),
            "crop" => Ok(Self::Crop),
            _ => Err("expected one of none, pad, crop".to_string()),
        }
    }
}

/// Whether each pair is blended on its own or folded into a running composite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SequenceMode {
    #[default]
    Normal,
    /// `previous ⊕ cover`, starting from the first stego image
    ReduceCover,
    /// `previous ⊕ stego`, starting from the first cover image
    ReduceStego,
}

impl SequenceMode {
    #[must_use]
    pub const fn is_reduce(self) -> bool {
        !matches!(self, Self::Normal)
    }
}

impl FromStr for SequenceMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "normal" => Ok(Self::Normal),
            "reduce-cover" => Ok(Self::ReduceCover),
            "reduce-stego" => Ok(Self::ReduceStego),
            _ => Err("expected one of normal, reduce-cover, reduce-stego".to_string()),
        }
    }
}

/// Blends cover and stego and writes the composite to `image_dir`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeComparator {
    pub blend: BlendMode,
    pub preprocess: Preprocess,
    pub mode: SequenceMode,
    pub image_dir: PathBuf,
}

impl Default for CompositeComparator {
    fn default() -> Self {
        Self {
            blend: BlendMode::Difference,
            preprocess: Preprocess::None,
            mode: SequenceMode::Normal,
            image_dir: PathBuf::from(DEFAULT_IMAGE_DIR),
        }
    }
}

impl CompositeComparator {
    pub fn from_params(params: &Params) -> Result<Self, StrategyError> {
        params.ensure_known(&[COMPOSITE, PREPROCESS, MODE, IMAGE_DIR])?;
        let defaults = Self::default();
        Ok(Self {
            blend: params.parse_or(COMPOSITE, defaults.blend)?,
            preprocess: params.parse_or(PREPROCESS, defaults.preprocess)?,
            mode: params.parse_or(MODE, defaults.mode)?,
            image_dir: params
                .get(IMAGE_DIR)
                .map_or(defaults.image_dir, PathBuf::from),
        })
    }

    /// Blend one pair on its own.
    pub fn compare(&self, cover: &Image, stego: &Image) -> Result<ComparatorDiff, StrategyError> {
        ensure_shared_extension(cover, stego)?;
        let (base, top) = self.preprocess.apply(cover.pixels()?, stego.pixels()?);
        let composite = self.blend.compose(&base, &top);

        self.write(&composite, &self.output_path(cover.path(), stego.path()))
    }

    /// Where the composite of one pair is written.
    ///
    /// Normal mode names the file after both images, reduce modes after the
    /// image folded into the running composite.
    #[must_use]
    pub fn output_path(&self, cover: &Path, stego: &Path) -> PathBuf {
        let extension = render::output_extension(&file_extension(cover));
        let name = match self.mode {
            SequenceMode::Normal => {
                format!("{}-{}-{}", file_stem(cover), file_stem(stego), self.blend)
            }
            SequenceMode::ReduceCover => {
                format!("{}-{}-reduce-cover", file_stem(cover), self.blend)
            }
            SequenceMode::ReduceStego => {
                format!("{}-{}-reduce-stego", file_stem(stego), self.blend)
            }
        };
        self.image_dir.join(format!("{name}.{extension}"))
    }

    /// One fold step of a reduce mode.
    ///
    /// `carried` is the composite of the previous step, `None` on the first
    /// pair. Returns the entries of this step and the new composite.
    pub fn reduce(
        &self,
        carried: Option<&RgbaImage>,
        cover: &Image,
        stego: &Image,
    ) -> Result<(ComparatorDiff, RgbaImage), StrategyError> {
        ensure_shared_extension(cover, stego)?;
        let (seed, operand) = match self.mode {
            SequenceMode::ReduceCover => (stego, cover),
            SequenceMode::ReduceStego => (cover, stego),
            SequenceMode::Normal => {
                return Err(StrategyError::Unsupported(
                    "composite is not configured for a reduce mode".to_string(),
                ))
            }
        };

        let previous = match carried {
            Some(previous) => previous,
            None => seed.pixels()?,
        };
        let (base, top) = self.preprocess.apply(previous, operand.pixels()?);
        let composite = self.blend.compose(&base, &top);

        let diff = self.write(&composite, &self.output_path(cover.path(), stego.path()))?;
        Ok((diff, composite))
    }

    fn write(&self, composite: &RgbaImage, path: &Path) -> Result<ComparatorDiff, StrategyError> {
        let written = render::save(composite, path)?;

        Ok(ComparatorDiff::from([(
            DiffKey::from(self.blend.label()),
            DiffValue::derived(DiffField::text(written.display().to_string())),
        )]))
    }
}

fn ensure_shared_extension(cover: &Image, stego: &Image) -> Result<(), StrategyError> {
    if cover.extension() == stego.extension() {
        Ok(())
    } else {
        Err(StrategyError::Unsupported(format!(
            "cover and stego images must share a file extension ({} vs {})",
            cover.path().display(),
            stego.path().display()
        )))
    }
}
