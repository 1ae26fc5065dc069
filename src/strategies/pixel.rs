//! Pixel difference comparator.

use super::params::{parse_channels, ColorChannel};
use super::{render, Params, StrategyError};
use crate::model::{file_extension, ComparatorDiff, DiffField, DiffKey, DiffValue, Image};
use image::{Rgba, RgbaImage};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

const BIT_DEPTH: &str = "bitDepth";
const COLOR_CHANNELS: &str = "colorChannels";
const DIFF_IMAGE_DIR: &str = "diffImageDir";

pub const DEFAULT_DIFF_IMAGE_DIR: &str = "output/diff";

/// Renders the absolute per-channel difference of two images.
///
/// The smaller image is padded to the larger one's dimensions before
/// differencing. Each selected channel's difference is masked to the low
/// `bit_depth` bits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelComparator {
    pub bit_depth: u8,
    pub channels: BTreeSet<ColorChannel>,
    pub diff_image_dir: PathBuf,
}

impl Default for PixelComparator {
    fn default() -> Self {
        Self {
            bit_depth: 8,
            channels: BTreeSet::from([ColorChannel::Red, ColorChannel::Green, ColorChannel::Blue]),
            diff_image_dir: PathBuf::from(DEFAULT_DIFF_IMAGE_DIR),
        }
    }
}

impl PixelComparator {
    pub fn from_params(params: &Params) -> Result<Self, StrategyError> {
        params.ensure_known(&[BIT_DEPTH, COLOR_CHANNELS, DIFF_IMAGE_DIR])?;
        let defaults = Self::default();

        let bit_depth = params.bounded_or(BIT_DEPTH, u32::from(defaults.bit_depth), 1..=8)?;
        let channels = match params.get(COLOR_CHANNELS) {
            Some(raw) => parse_channels(COLOR_CHANNELS, raw, true)?,
            None => defaults.channels,
        };
        let diff_image_dir = params
            .get(DIFF_IMAGE_DIR)
            .map_or(defaults.diff_image_dir, PathBuf::from);

        Ok(Self {
            // bounded to 1..=8 above
            bit_depth: bit_depth as u8,
            channels,
            diff_image_dir,
        })
    }

    pub fn compare(&self, cover: &Image, stego: &Image) -> Result<ComparatorDiff, StrategyError> {
        let rendered = self.render(cover.pixels()?, stego.pixels()?);
        let path = self.output_path(cover.path(), stego.path());
        let written = render::save(&rendered, &path)?;

        Ok(ComparatorDiff::from([(
            DiffKey::from("diff"),
            DiffValue::derived(DiffField::text(written.display().to_string())),
        )]))
    }

    /// Difference image of `cover` and `stego`.
    #[must_use]
    pub fn render(&self, cover: &RgbaImage, stego: &RgbaImage) -> RgbaImage {
        let width = cover.width().max(stego.width());
        let height = cover.height().max(stego.height());
        let cover = render::pad(cover, width, height);
        let stego = render::pad(stego, width, height);

        let mask = ((1u16 << self.bit_depth) - 1) as u8;

        RgbaImage::from_fn(width, height, |x, y| {
            let a = cover.get_pixel(x, y);
            let b = stego.get_pixel(x, y);
            // opaque unless alpha is one of the selected channels
            let mut out = Rgba([0, 0, 0, u8::MAX]);
            for channel in &self.channels {
                let i = channel.rgba_index();
                out[i] = a[i].abs_diff(b[i]) & mask;
            }
            out
        })
    }

    /// Where the diff image of `cover` and `stego` is written.
    #[must_use]
    pub fn output_path(&self, cover: &Path, stego: &Path) -> PathBuf {
        let name = |p: &Path| {
            p.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default()
        };
        self.diff_image_dir.join(format!(
            "{}_{}_diff.{}",
            name(cover),
            name(stego),
            render::output_extension(&file_extension(cover))
        ))
    }
}
