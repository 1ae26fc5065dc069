//! Comparison and extraction strategies.
//!
//! Strategies are a closed set. A [`ComparatorKind`] / [`ExtractorKind`] is
//! turned into a configured [`Comparator`] / [`Extractor`] by parsing its
//! [`Params`] once at setup; afterwards a strategy is immutable and can be
//! shared by every worker.

mod composite;
mod lsb;
mod metadata;
mod params;
mod pixel;
mod registry;
mod render;

pub use composite::{BlendMode, CompositeComparator, Preprocess, SequenceMode};
pub use lsb::LsbExtractor;
pub use metadata::MetadataComparator;
pub use params::{parse_assignment, parse_channels, route_params, ColorChannel, Params};
pub use pixel::PixelComparator;
pub use registry::StrategyRegistry;

use crate::model::{ComparatorDiff, Image, ImageLoadError};
use image::RgbaImage;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Failure of a single strategy call or of strategy setup.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum StrategyError {
    #[error("Unknown parameter '{0}'")]
    UnknownParam(String),

    #[error("Invalid value '{value}' for parameter '{param}': {reason}")]
    InvalidParam {
        param: String,
        value: String,
        reason: String,
    },

    #[error(transparent)]
    Load(#[from] ImageLoadError),

    #[error("Failed to read metadata of {path:?}: {message}")]
    Metadata { path: PathBuf, message: String },

    #[error("Failed to write {path:?}: {message}")]
    Output { path: PathBuf, message: String },

    #[error("{0}")]
    Unsupported(String),

    #[error("Task deadline of {0:?} exceeded")]
    DeadlineExceeded(Duration),
}

impl StrategyError {
    pub fn invalid_param(
        param: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidParam {
            param: param.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }
}

/// Registered comparator kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparatorKind {
    Metadata,
    Pixel,
    Composite,
}

impl ComparatorKind {
    pub const ALL: [Self; 3] = [Self::Metadata, Self::Pixel, Self::Composite];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Metadata => "metadata",
            Self::Pixel => "pixel",
            Self::Composite => "composite",
        }
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Metadata => "Compares format, dimensions and EXIF tags",
            Self::Pixel => "Renders the per-channel absolute pixel difference",
            Self::Composite => "Blends cover and stego into a composite image",
        }
    }

    /// Parse `params` and build a ready-to-run comparator.
    pub fn configure(self, params: &Params) -> Result<Comparator, StrategyError> {
        Ok(match self {
            Self::Metadata => Comparator::Metadata(MetadataComparator::from_params(params)?),
            Self::Pixel => Comparator::Pixel(PixelComparator::from_params(params)?),
            Self::Composite => Comparator::Composite(CompositeComparator::from_params(params)?),
        })
    }
}

/// Registered extractor kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtractorKind {
    Lsb,
}

impl ExtractorKind {
    pub const ALL: [Self; 1] = [Self::Lsb];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Lsb => "lsb",
        }
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Lsb => "Collects the least significant bits of selected channels",
        }
    }

    pub fn configure(self, params: &Params) -> Result<Extractor, StrategyError> {
        Ok(match self {
            Self::Lsb => Extractor::Lsb(LsbExtractor::from_params(params)?),
        })
    }
}

/// A configured comparator.
#[derive(Debug, Clone)]
pub enum Comparator {
    Metadata(MetadataComparator),
    Pixel(PixelComparator),
    Composite(CompositeComparator),
}

impl Comparator {
    /// Namespace under which this comparator's entries are reported.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Metadata(_) => ComparatorKind::Metadata.name(),
            Self::Pixel(_) => ComparatorKind::Pixel.name(),
            Self::Composite(_) => ComparatorKind::Composite.name(),
        }
    }

    /// Whether the result for one pair depends on the pairs before it.
    ///
    /// Sequential comparators must be driven through [`Comparator::fold`]
    /// in resolver order and never run in the worker pool.
    #[must_use]
    pub const fn is_sequential(&self) -> bool {
        match self {
            Self::Composite(c) => c.mode.is_reduce(),
            Self::Metadata(_) | Self::Pixel(_) => false,
        }
    }

    /// File this comparator writes for the pair, if it writes one.
    #[must_use]
    pub fn output_path(&self, cover: &Path, stego: &Path) -> Option<PathBuf> {
        match self {
            Self::Metadata(_) => None,
            Self::Pixel(c) => Some(c.output_path(cover, stego)),
            Self::Composite(c) => Some(c.output_path(cover, stego)),
        }
    }

    /// Compare one pair.
    pub fn compare(&self, cover: &Image, stego: &Image) -> Result<ComparatorDiff, StrategyError> {
        match self {
            Self::Metadata(c) => c.compare(cover, stego),
            Self::Pixel(c) => c.compare(cover, stego),
            Self::Composite(c) => c.compare(cover, stego),
        }
    }

    /// Compare one pair given the image carried over from the previous step.
    ///
    /// Returns the entries and the image to carry into the next step. For a
    /// comparator that is not sequential this is [`Comparator::compare`]
    /// and nothing is carried.
    pub fn fold(
        &self,
        carried: Option<&RgbaImage>,
        cover: &Image,
        stego: &Image,
    ) -> Result<(ComparatorDiff, Option<RgbaImage>), StrategyError> {
        match self {
            Self::Composite(c) if c.mode.is_reduce() => {
                let (diff, next) = c.reduce(carried, cover, stego)?;
                Ok((diff, Some(next)))
            }
            _ => Ok((self.compare(cover, stego)?, None)),
        }
    }
}

/// A configured extractor.
#[derive(Debug, Clone)]
pub enum Extractor {
    Lsb(LsbExtractor),
}

impl Extractor {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Lsb(_) => ExtractorKind::Lsb.name(),
        }
    }

    /// Extract the payload hidden in `image`.
    pub fn extract(&self, image: &Image) -> Result<Vec<u8>, StrategyError> {
        match self {
            Self::Lsb(e) => e.extract(image),
        }
    }
}
