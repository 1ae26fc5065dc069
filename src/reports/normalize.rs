//! Output-size normalization.
//!
//! Overlong string values (embedded thumbnails, maker notes) are truncated
//! before they reach a report.

use crate::config::OutputConfig;
use crate::model::{DiffField, DiffResult, DiffValue};
use rayon::prelude::*;
use serde_json::Value;
use std::borrow::Cow;

/// Marker appended to truncated strings.
pub const ELLIPSIS: char = '…';

/// Truncate `value` to at most `max` characters.
///
/// A string longer than `max` characters keeps its first `max - 1`
/// characters followed by [`ELLIPSIS`]. `max == 0` disables truncation.
#[must_use]
pub fn truncate_str(value: &str, max: usize) -> Cow<'_, str> {
    if max == 0 {
        return Cow::Borrowed(value);
    }
    match value.char_indices().nth(max) {
        None => Cow::Borrowed(value),
        Some(_) => {
            let cut = value
                .char_indices()
                .nth(max - 1)
                .map_or(value.len(), |(i, _)| i);
            let mut truncated = String::with_capacity(cut + ELLIPSIS.len_utf8());
            truncated.push_str(&value[..cut]);
            truncated.push(ELLIPSIS);
            Cow::Owned(truncated)
        }
    }
}

/// Truncate every string inside `value`, recursing into arrays and objects.
pub fn truncate_value(value: &mut Value, max: usize) {
    match value {
        Value::String(s) => {
            if let Cow::Owned(truncated) = truncate_str(s, max) {
                *s = truncated;
            }
        }
        Value::Array(items) => items.iter_mut().for_each(|v| truncate_value(v, max)),
        Value::Object(map) => map.values_mut().for_each(|v| truncate_value(v, max)),
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
}

/// Applies the configured truncation to diff results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Normalizer {
    max_value_len: Option<usize>,
}

impl Normalizer {
    /// `None` (or `Some(0)`) disables truncation.
    #[must_use]
    pub const fn new(max_value_len: Option<usize>) -> Self {
        match max_value_len {
            Some(0) => Self {
                max_value_len: None,
            },
            other => Self {
                max_value_len: other,
            },
        }
    }

    #[must_use]
    pub const fn disabled() -> Self {
        Self::new(None)
    }

    #[must_use]
    pub const fn from_config(output: &OutputConfig) -> Self {
        Self::new(output.truncation_limit())
    }

    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.max_value_len.is_some()
    }

    #[must_use]
    pub fn normalize_field(&self, field: DiffField) -> DiffField {
        match self.max_value_len {
            Some(max) => field.map_value(|mut v| {
                truncate_value(&mut v, max);
                v
            }),
            None => field,
        }
    }

    #[must_use]
    pub fn normalize_value(&self, value: DiffValue) -> DiffValue {
        DiffValue {
            cover: self.normalize_field(value.cover),
            stego: self.normalize_field(value.stego),
            diff: self.normalize_field(value.diff),
        }
    }

    pub fn normalize_result(&self, mut result: DiffResult) -> DiffResult {
        if !self.is_enabled() {
            return result;
        }
        for entries in result.diff.values_mut() {
            for value in entries.values_mut() {
                *value = self.normalize_value(std::mem::take(value));
            }
        }
        result
    }

    /// Normalized copies of `results`, in the same order.
    #[must_use]
    pub fn normalize(&self, results: &[DiffResult]) -> Vec<DiffResult> {
        results
            .par_iter()
            .map(|r| self.normalize_result(r.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DiffKey;
    use serde_json::json;

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("abcdef", 4), "abc…");
        assert_eq!(truncate_str("abcd", 4), "abcd");
        assert_eq!(truncate_str("abcdef", 0), "abcdef");
        assert_eq!(truncate_str("abcdef", 1), "…");
        assert_eq!(truncate_str("", 3), "");
    }

    #[test]
    fn test_truncate_counts_characters() {
        assert_eq!(truncate_str("äöüßé", 3), "äö…");
        assert_eq!(truncate_str("äöü", 3), "äöü");
    }

    #[test]
    fn test_truncate_is_idempotent() {
        let once = truncate_str("a long maker note", 5).into_owned();
        assert_eq!(truncate_str(&once, 5), once);
    }

    #[test]
    fn test_truncate_value_recurses() {
        let mut value = json!({
            "list": ["short", "much too long"],
            "nested": {"text": "also too long"},
            "number": 123_456_789
        });
        truncate_value(&mut value, 6);
        assert_eq!(
            value,
            json!({
                "list": ["short", "much …"],
                "nested": {"text": "also …"},
                "number": 123_456_789
            })
        );
    }

    #[test]
    fn test_normalizer_leaves_absent_fields() {
        let normalizer = Normalizer::new(Some(3));
        let value = normalizer.normalize_value(DiffValue::changed(
            DiffField::text("abcdef"),
            DiffField::Absent,
        ));
        assert_eq!(value.cover, DiffField::text("ab…"));
        assert_eq!(value.stego, DiffField::Absent);
        assert_eq!(value.diff, DiffField::NotApplicable);
    }

    #[test]
    fn test_normalize_results() {
        let mut result = DiffResult::empty("c.png", "s.png");
        result.diff.entry("metadata".to_string()).or_default().insert(
            DiffKey::from("MakerNote"),
            DiffValue::changed(DiffField::text("x".repeat(500)), DiffField::text("y")),
        );

        let normalized = Normalizer::new(Some(100)).normalize(std::slice::from_ref(&result));
        let cover = normalized[0].diff["metadata"][&DiffKey::from("MakerNote")]
            .cover
            .as_value()
            .and_then(Value::as_str)
            .unwrap()
            .to_string();
        assert_eq!(cover.chars().count(), 100);
        assert!(cover.ends_with(ELLIPSIS));

        let untouched = Normalizer::new(Some(0)).normalize(std::slice::from_ref(&result));
        assert_eq!(untouched[0], result);
    }
}
