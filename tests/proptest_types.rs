//! Property-based tests for core model types.
//!
//! Ensures merging, truncation and statistics hold their invariants
//! across random inputs.

use imagediff::model::{merge, ComparatorDiff, Diff, DiffField, DiffKey, DiffResult, DiffValue};
use imagediff::reports::{truncate_str, truncate_value, Normalizer, ELLIPSIS};
use imagediff::Statistics;
use proptest::prelude::*;
use serde_json::Value;

fn comparator_diff() -> impl Strategy<Value = ComparatorDiff> {
    prop::collection::btree_map("[A-Za-z]{1,6}", "\\PC{0,12}", 0..6).prop_map(|entries| {
        entries
            .into_iter()
            .map(|(k, v)| {
                (
                    DiffKey::from(k),
                    DiffValue::changed(DiffField::text(v), DiffField::Absent),
                )
            })
            .collect()
    })
}

fn diff() -> impl Strategy<Value = Diff> {
    prop::collection::btree_map("(metadata|pixel|composite)", comparator_diff(), 0..3)
}

/// Arbitrary JSON with strings nested inside arrays and objects.
fn json_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        "\\PC{0,80}".prop_map(Value::String),
    ];
    leaf.prop_recursive(4, 64, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::btree_map("[a-z]{1,4}", inner, 0..6)
                .prop_map(|map| Value::Object(map.into_iter().collect())),
        ]
    })
}

/// Length in characters of the longest string value in `value`.
fn longest_string(value: &Value) -> usize {
    match value {
        Value::String(s) => s.chars().count(),
        Value::Array(items) => items.iter().map(longest_string).max().unwrap_or(0),
        Value::Object(map) => map.values().map(longest_string).max().unwrap_or(0),
        Value::Null | Value::Bool(_) | Value::Number(_) => 0,
    }
}

fn result_with_value(value: Value) -> DiffResult {
    let entry = DiffValue {
        cover: DiffField::Value(value.clone()),
        stego: DiffField::Absent,
        diff: DiffField::Value(Value::Array(vec![value])),
    };
    let diff = Diff::from([(
        "metadata".to_string(),
        ComparatorDiff::from([(DiffKey::from("Tag"), entry)]),
    )]);
    DiffResult::new("c.png", "s.png", diff)
}

fn result_for(id: usize) -> impl Strategy<Value = DiffResult> {
    diff().prop_map(move |d| DiffResult::new(format!("c{id}.png"), format!("s{id}.png"), d))
}

proptest! {
    // Type invariant checks are fast and benefit from broad input coverage.
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn merge_is_associative(a in result_for(0), b in result_for(0), c in result_for(0)) {
        let left = merge(merge(a.clone(), b.clone()).unwrap(), c.clone()).unwrap();
        let right = merge(a, merge(b, c).unwrap()).unwrap();
        prop_assert_eq!(left, right);
    }

    #[test]
    fn merge_with_empty_is_identity(a in result_for(0)) {
        let empty = DiffResult::empty("c0.png", "s0.png");
        prop_assert_eq!(merge(a.clone(), empty.clone()).unwrap(), a.clone());
        prop_assert_eq!(merge(empty, a.clone()).unwrap(), a);
    }

    #[test]
    fn merge_rejects_other_pairs(a in result_for(0), b in result_for(1)) {
        prop_assert!(merge(a, b).is_err());
    }

    #[test]
    fn truncation_respects_limit(s in "\\PC{0,200}", max in 1usize..64) {
        let truncated = truncate_str(&s, max);
        let len = truncated.chars().count();
        prop_assert!(len <= max, "{} chars for max {}", len, max);
        if s.chars().count() > max {
            prop_assert!(truncated.ends_with(ELLIPSIS));
        } else {
            prop_assert_eq!(truncated.as_ref(), s.as_str());
        }
    }

    #[test]
    fn truncation_is_idempotent(s in "\\PC{0,200}", max in 1usize..64) {
        let once = truncate_str(&s, max).into_owned();
        let twice = truncate_str(&once, max).into_owned();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn nested_truncation_is_bounded_and_idempotent(value in json_value(), max in 1usize..32) {
        let mut once = value.clone();
        truncate_value(&mut once, max);
        prop_assert!(longest_string(&once) <= max);

        let mut twice = once.clone();
        truncate_value(&mut twice, max);
        prop_assert_eq!(&once, &twice);

        // nothing but over-long strings changes
        if longest_string(&value) <= max {
            prop_assert_eq!(&once, &value);
        }
    }

    #[test]
    fn normalizing_results_is_idempotent(value in json_value(), max in 1usize..32) {
        let normalizer = Normalizer::new(Some(max));
        let once = normalizer.normalize(&[result_with_value(value)]);
        let twice = normalizer.normalize(&once);
        prop_assert_eq!(&once, &twice);

        let entry = &once[0].diff["metadata"][&DiffKey::from("Tag")];
        for field in [&entry.cover, &entry.diff] {
            prop_assert!(longest_string(field.as_value().unwrap()) <= max);
        }
        prop_assert_eq!(&entry.stego, &DiffField::Absent);
    }

    #[test]
    fn zero_limit_disables_truncation(s in "\\PC{0,200}") {
        let truncated = truncate_str(&s, 0);
        prop_assert_eq!(truncated.as_ref(), s.as_str());
    }

    #[test]
    fn rates_are_fractions_of_results(diffs in prop::collection::vec(diff(), 1..20)) {
        let results: Vec<_> = diffs
            .into_iter()
            .enumerate()
            .map(|(i, d)| DiffResult::new(format!("c{i}.png"), format!("s{i}.png"), d))
            .collect();
        let stats = Statistics::compute(&results);

        for rates in stats.rate_of_changes.values() {
            for rate in rates.values() {
                prop_assert!(*rate > 0.0 && *rate <= 1.0);
            }
        }
        prop_assert_eq!(stats.total_images(), results.len());
        let expected: usize = results.iter().map(DiffResult::change_count).sum();
        prop_assert_eq!(stats.total_changes(), expected);
    }
}
