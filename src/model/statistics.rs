//! Statistics derived from a complete result set.

use super::diff::{ComparatorName, DiffKey, DiffResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-key change rates and per-pair change counts.
///
/// Always computed wholesale from the full result set with
/// [`Statistics::compute`]; never updated incrementally.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    /// comparator → key → fraction of all compared pairs with that key
    pub rate_of_changes: BTreeMap<ComparatorName, BTreeMap<DiffKey, f64>>,
    /// result id → number of keys across all comparators
    pub changes_per_image: BTreeMap<String, usize>,
}

impl Statistics {
    /// Compute statistics for `results`.
    ///
    /// The denominator of every rate is the total number of results,
    /// regardless of which comparators ran for which pair.
    #[must_use]
    pub fn compute(results: &[DiffResult]) -> Self {
        if results.is_empty() {
            return Self::default();
        }

        let mut counts: BTreeMap<ComparatorName, BTreeMap<DiffKey, usize>> = BTreeMap::new();
        let mut changes_per_image = BTreeMap::new();

        for result in results {
            for (comparator, entries) in &result.diff {
                let per_key = counts.entry(comparator.clone()).or_default();
                for key in entries.keys() {
                    *per_key.entry(key.clone()).or_default() += 1;
                }
            }
            changes_per_image.insert(result.id.clone(), result.change_count());
        }

        let total = results.len() as f64;
        let rate_of_changes = counts
            .into_iter()
            .map(|(comparator, per_key)| {
                let rates = per_key
                    .into_iter()
                    .map(|(key, count)| (key, count as f64 / total))
                    .collect();
                (comparator, rates)
            })
            .collect();

        Self {
            rate_of_changes,
            changes_per_image,
        }
    }

    /// Sum of all per-pair change counts.
    #[must_use]
    pub fn total_changes(&self) -> usize {
        self.changes_per_image.values().sum()
    }

    /// Number of distinct result ids.
    #[must_use]
    pub fn total_images(&self) -> usize {
        self.changes_per_image.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DiffField, DiffValue};

    fn result(cover: &str, stego: &str, keys: &[(&str, &str)]) -> DiffResult {
        let mut result = DiffResult::empty(cover, stego);
        for (comparator, key) in keys {
            result.diff.entry((*comparator).to_string()).or_default().insert(
                DiffKey::from(*key),
                DiffValue::changed(DiffField::text("a"), DiffField::text("b")),
            );
        }
        result
    }

    #[test]
    fn test_empty_results_give_empty_statistics() {
        let stats = Statistics::compute(&[]);
        assert!(stats.rate_of_changes.is_empty());
        assert!(stats.changes_per_image.is_empty());
        assert_eq!(stats.total_changes(), 0);
    }

    #[test]
    fn test_rates_use_total_result_count() {
        let results = vec![
            result("c1.png", "s1.png", &[("metadata", "Make"), ("metadata", "Model")]),
            result("c2.png", "s2.png", &[("metadata", "Make")]),
            result("c3.png", "s3.png", &[("pixel", "diff")]),
            result("c4.png", "s4.png", &[]),
        ];

        let stats = Statistics::compute(&results);
        let metadata = &stats.rate_of_changes["metadata"];
        assert!((metadata[&DiffKey::from("Make")] - 0.5).abs() < f64::EPSILON);
        assert!((metadata[&DiffKey::from("Model")] - 0.25).abs() < f64::EPSILON);
        assert!((stats.rate_of_changes["pixel"][&DiffKey::from("diff")] - 0.25).abs() < f64::EPSILON);

        assert_eq!(stats.changes_per_image["c1_s1"], 2);
        assert_eq!(stats.changes_per_image["c4_s4"], 0);
        assert_eq!(stats.total_changes(), 4);
        assert_eq!(stats.total_images(), 4);
    }

    #[test]
    fn test_single_pair_single_change_rate_is_one() {
        let stats = Statistics::compute(&[result("c.png", "s.png", &[("metadata", "Software")])]);
        assert!((stats.rate_of_changes["metadata"][&DiffKey::from("Software")] - 1.0).abs() < f64::EPSILON);
        assert_eq!(stats.changes_per_image["c_s"], 1);
    }

    #[test]
    fn test_serializes_camel_case() {
        let stats = Statistics::compute(&[result("c.png", "s.png", &[("metadata", "Make")])]);
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["rateOfChanges"]["metadata"]["Make"], 1.0);
        assert_eq!(json["changesPerImage"]["c_s"], 1);
    }
}
