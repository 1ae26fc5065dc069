//! Least-significant-bit extractor.

use super::params::{parse_channels, ColorChannel};
use super::{Params, StrategyError};
use crate::model::Image;
use std::collections::BTreeSet;

const COLOR_CHANNELS: &str = "colorChannels";
const BITS_PER_CHANNEL: &str = "bitsPerChannel";

/// Collects the low bits of the selected channels of every pixel.
///
/// Pixels are visited row by row. Per pixel the channels are read in
/// alpha, red, green, blue order and the low `bits_per_channel` bits of each
/// are appended most significant bit first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LsbExtractor {
    pub channels: BTreeSet<ColorChannel>,
    pub bits_per_channel: u8,
}

impl Default for LsbExtractor {
    fn default() -> Self {
        Self {
            channels: BTreeSet::from([ColorChannel::Red, ColorChannel::Green, ColorChannel::Blue]),
            bits_per_channel: 8,
        }
    }
}

impl LsbExtractor {
    pub fn from_params(params: &Params) -> Result<Self, StrategyError> {
        params.ensure_known(&[COLOR_CHANNELS, BITS_PER_CHANNEL])?;
        let defaults = Self::default();
        let bits = params.bounded_or(
            BITS_PER_CHANNEL,
            u32::from(defaults.bits_per_channel),
            1..=8,
        )?;
        Ok(Self {
            channels: match params.get(COLOR_CHANNELS) {
                Some(raw) => parse_channels(COLOR_CHANNELS, raw, true)?,
                None => defaults.channels,
            },
            bits_per_channel: bits as u8,
        })
    }

    pub fn extract(&self, image: &Image) -> Result<Vec<u8>, StrategyError> {
        let pixels = image.pixels()?;
        let mask = ((1u16 << self.bits_per_channel) - 1) as u8;

        let mut writer = BitWriter::default();
        for pixel in pixels.pixels() {
            for channel in &self.channels {
                writer.push(pixel[channel.rgba_index()] & mask, self.bits_per_channel);
            }
        }
        Ok(writer.finish())
    }
}

/// MSB-first bit packer.
#[derive(Debug, Default)]
struct BitWriter {
    bytes: Vec<u8>,
    current: u8,
    filled: u8,
}

impl BitWriter {
    /// Append the low `bits` bits of `value`, highest first.
    fn push(&mut self, value: u8, bits: u8) {
        for shift in (0..bits).rev() {
            self.current = (self.current << 1) | ((value >> shift) & 1);
            self.filled += 1;
            if self.filled == 8 {
                self.bytes.push(self.current);
                self.current = 0;
                self.filled = 0;
            }
        }
    }

    /// Flush, zero-padding a trailing partial byte.
    fn finish(mut self) -> Vec<u8> {
        if self.filled > 0 {
            self.bytes.push(self.current << (8 - self.filled));
        }
        self.bytes
    }
}
