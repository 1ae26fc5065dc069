//! Strategy parameters.
//!
//! Parameters arrive as flat `strategy.param=value` strings. They are routed
//! to their strategy by prefix and parsed by the strategy itself into a typed
//! argument struct.

use super::StrategyError;
use crate::error::{ImageDiffError, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Display;
use std::str::FromStr;

/// String-keyed parameters of a single strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(BTreeMap<String, String>);

impl Params {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Fail on the first parameter name not in `known`.
    pub fn ensure_known(&self, known: &[&str]) -> std::result::Result<(), StrategyError> {
        match self.0.keys().find(|k| !known.contains(&k.as_str())) {
            Some(unknown) => Err(StrategyError::UnknownParam(unknown.clone())),
            None => Ok(()),
        }
    }

    /// Parse a parameter with [`FromStr`], or return `default` if unset.
    pub fn parse_or<T>(&self, name: &str, default: T) -> std::result::Result<T, StrategyError>
    where
        T: FromStr,
        T::Err: Display,
    {
        match self.get(name) {
            None => Ok(default),
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|e: T::Err| StrategyError::invalid_param(name, raw, e.to_string())),
        }
    }

    /// Parse a boolean parameter (`true/false`, `yes/no`, `1/0`).
    pub fn bool_or(&self, name: &str, default: bool) -> std::result::Result<bool, StrategyError> {
        match self.get(name) {
            None => Ok(default),
            Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "1" | "on" => Ok(true),
                "false" | "no" | "0" | "off" => Ok(false),
                _ => Err(StrategyError::invalid_param(name, raw, "expected a boolean")),
            },
        }
    }

    /// Integer parameter bounded to `range`.
    pub fn bounded_or(
        &self,
        name: &str,
        default: u32,
        range: std::ops::RangeInclusive<u32>,
    ) -> std::result::Result<u32, StrategyError> {
        let value = self.parse_or(name, default)?;
        if range.contains(&value) {
            Ok(value)
        } else {
            Err(StrategyError::invalid_param(
                name,
                value.to_string(),
                format!("must be between {} and {}", range.start(), range.end()),
            ))
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Split `strategy.param=value` assignments into per-strategy [`Params`].
///
/// # Errors
///
/// Fails with a configuration error for keys without a `strategy.` prefix.
pub fn route_params(assignments: &BTreeMap<String, String>) -> Result<BTreeMap<String, Params>> {
    let mut routed: BTreeMap<String, Params> = BTreeMap::new();
    for (key, value) in assignments {
        let (strategy, param) = key
            .split_once('.')
            .filter(|(s, p)| !s.is_empty() && !p.is_empty())
            .ok_or_else(|| {
                ImageDiffError::config(format!(
                    "parameter '{key}' must be written as <strategy>.<param>=<value>"
                ))
            })?;
        routed
            .entry(strategy.to_string())
            .or_default()
            .insert(param, value.clone());
    }
    Ok(routed)
}

/// Parse `key=value` (as given on the command line).
pub fn parse_assignment(raw: &str) -> std::result::Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.trim().to_string(), v.to_string()))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))
}

/// A color channel of an RGBA pixel.
///
/// Ordered alpha, red, green, blue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ColorChannel {
    Alpha,
    Red,
    Green,
    Blue,
}

impl ColorChannel {
    /// Index of the channel inside an `Rgba<u8>` pixel.
    #[must_use]
    pub const fn rgba_index(self) -> usize {
        match self {
            Self::Red => 0,
            Self::Green => 1,
            Self::Blue => 2,
            Self::Alpha => 3,
        }
    }

    const fn from_letter(c: char) -> Option<Self> {
        match c {
            'a' | 'A' => Some(Self::Alpha),
            'r' | 'R' => Some(Self::Red),
            'g' | 'G' => Some(Self::Green),
            'b' | 'B' => Some(Self::Blue),
            _ => None,
        }
    }
}

/// Parse a channel set such as `rgb` or `ga`.
///
/// `allow_alpha` controls whether `a` is accepted.
pub fn parse_channels(
    name: &str,
    raw: &str,
    allow_alpha: bool,
) -> std::result::Result<BTreeSet<ColorChannel>, StrategyError> {
    let mut channels = BTreeSet::new();
    for c in raw.trim().chars() {
        match ColorChannel::from_letter(c) {
            Some(ColorChannel::Alpha) if !allow_alpha => {
                return Err(StrategyError::invalid_param(name, raw, "alpha is not allowed here"));
            }
            Some(channel) => {
                channels.insert(channel);
            }
            None => {
                return Err(StrategyError::invalid_param(
                    name,
                    raw,
                    format!("unknown color channel '{c}'"),
                ));
            }
        }
    }
    if channels.is_empty() {
        return Err(StrategyError::invalid_param(name, raw, "no color channel given"));
    }
    Ok(channels)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_params_by_prefix() {
        let assignments = BTreeMap::from([
            ("pixel.bitDepth".to_string(), "4".to_string()),
            ("pixel.colorChannels".to_string(), "rg".to_string()),
            ("metadata.ignoreNulls".to_string(), "false".to_string()),
        ]);

        let routed = route_params(&assignments).unwrap();
        assert_eq!(routed["pixel"].get("bitDepth"), Some("4"));
        assert_eq!(routed["pixel"].get("colorChannels"), Some("rg"));
        assert_eq!(routed["metadata"].get("ignoreNulls"), Some("false"));
    }

    #[test]
    fn test_route_params_requires_prefix() {
        let assignments = BTreeMap::from([("bitDepth".to_string(), "4".to_string())]);
        assert!(matches!(
            route_params(&assignments),
            Err(ImageDiffError::Config(_))
        ));
    }

    #[test]
    fn test_parse_assignment() {
        assert_eq!(
            parse_assignment("embedding=lsb=1").unwrap(),
            ("embedding".to_string(), "lsb=1".to_string())
        );
        assert!(parse_assignment("novalue").is_err());
        assert!(parse_assignment("=x").is_err());
    }

    #[test]
    fn test_typed_getters() {
        let params = Params::new()
            .with("depth", "3")
            .with("flag", "no")
            .with("bad", "x");

        assert_eq!(params.parse_or("depth", 8u32).unwrap(), 3);
        assert_eq!(params.parse_or("missing", 8u32).unwrap(), 8);
        assert!(!params.bool_or("flag", true).unwrap());
        assert!(params.bool_or("bad", true).is_err());
        assert!(params.bounded_or("depth", 8, 1..=2).is_err());
    }

    #[test]
    fn test_ensure_known() {
        let params = Params::new().with("bitDepth", "3").with("typo", "1");
        match params.ensure_known(&["bitDepth"]) {
            Err(StrategyError::UnknownParam(name)) => assert_eq!(name, "typo"),
            other => panic!("expected UnknownParam, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_channels() {
        let channels = parse_channels("c", "bgr", false).unwrap();
        assert_eq!(
            channels.into_iter().collect::<Vec<_>>(),
            vec![ColorChannel::Red, ColorChannel::Green, ColorChannel::Blue]
        );
        assert!(parse_channels("c", "rgba", false).is_err());
        assert!(parse_channels("c", "rgba", true).is_ok());
        assert!(parse_channels("c", "xyz", true).is_err());
        assert!(parse_channels("c", "", true).is_err());
    }
}
