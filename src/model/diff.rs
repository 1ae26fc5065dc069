//! Diff tree types and the diff aggregator.
//!
//! A [`DiffResult`] identifies one compared (cover, stego) pair and holds a
//! [`Diff`]: comparator name → [`DiffKey`] → [`DiffValue`]. Both levels use
//! ordered maps so serialized output is deterministic.

use crate::error::{ImageDiffError, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Name under which a comparator's entries are grouped.
pub type ComparatorName = String;

/// Entries emitted by a single comparator for one pair.
pub type ComparatorDiff = BTreeMap<DiffKey, DiffValue>;

/// Full diff of one pair, grouped by comparator.
pub type Diff = BTreeMap<ComparatorName, ComparatorDiff>;

/// Identifier of a single comparison fact (tag name, coordinate, blend label).
///
/// Ordered lexicographically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DiffKey(String);

impl DiffKey {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DiffKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DiffKey {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for DiffKey {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// One side of a [`DiffValue`].
///
/// Keeps "value present", "value missing on this side" and "field does not
/// apply to this comparator" apart. `Absent` serializes as JSON `null`,
/// `NotApplicable` is omitted from the output entirely.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DiffField {
    /// The side carries this value
    Value(Value),
    /// The side does not carry the fact at all (e.g. tag removed)
    Absent,
    /// The comparator does not report this field
    #[default]
    NotApplicable,
}

impl DiffField {
    /// Wrap a string value.
    pub fn text(value: impl Into<String>) -> Self {
        Self::Value(Value::String(value.into()))
    }

    /// `Value` for `Some`, `Absent` for `None`.
    pub fn from_option<T: Into<Value>>(value: Option<T>) -> Self {
        value.map_or(Self::Absent, |v| Self::Value(v.into()))
    }

    #[must_use]
    pub const fn is_not_applicable(&self) -> bool {
        matches!(self, Self::NotApplicable)
    }

    #[must_use]
    pub const fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Value(v) => Some(v),
            _ => None,
        }
    }

    /// Apply `f` to the carried value, leaving `Absent`/`NotApplicable` alone.
    #[must_use]
    pub fn map_value(self, f: impl FnOnce(Value) -> Value) -> Self {
        match self {
            Self::Value(v) => Self::Value(f(v)),
            other => other,
        }
    }
}

impl Serialize for DiffField {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Value(v) => v.serialize(serializer),
            // NotApplicable is skipped at the field level; null is the only
            // sensible fallback if it is serialized on its own.
            Self::Absent | Self::NotApplicable => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for DiffField {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        // Missing fields never reach here: they fall back to `Default`.
        match Value::deserialize(deserializer)? {
            Value::Null => Ok(Self::Absent),
            v => Ok(Self::Value(v)),
        }
    }
}

/// Cover, stego and derived values of a single [`DiffKey`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DiffValue {
    #[serde(default, skip_serializing_if = "DiffField::is_not_applicable")]
    pub cover: DiffField,
    #[serde(default, skip_serializing_if = "DiffField::is_not_applicable")]
    pub stego: DiffField,
    #[serde(default, skip_serializing_if = "DiffField::is_not_applicable")]
    pub diff: DiffField,
}

impl DiffValue {
    /// A value that differs between cover and stego.
    #[must_use]
    pub const fn changed(cover: DiffField, stego: DiffField) -> Self {
        Self {
            cover,
            stego,
            diff: DiffField::NotApplicable,
        }
    }

    /// A value that only carries a derived result (e.g. a rendered image path).
    #[must_use]
    pub const fn derived(diff: DiffField) -> Self {
        Self {
            cover: DiffField::NotApplicable,
            stego: DiffField::NotApplicable,
            diff,
        }
    }
}

/// Result of comparing one (cover, stego) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[must_use]
pub struct DiffResult {
    /// `<cover stem>_<stego stem>`
    pub id: String,
    pub cover_path: PathBuf,
    pub stego_path: PathBuf,
    pub diff: Diff,
}

impl DiffResult {
    /// Create a result for a pair with the given diff.
    pub fn new(cover: impl Into<PathBuf>, stego: impl Into<PathBuf>, diff: Diff) -> Self {
        let cover_path = cover.into();
        let stego_path = stego.into();
        Self {
            id: pair_id(&cover_path, &stego_path),
            cover_path,
            stego_path,
            diff,
        }
    }

    /// Create a result for a pair with no entries.
    pub fn empty(cover: impl Into<PathBuf>, stego: impl Into<PathBuf>) -> Self {
        Self::new(cover, stego, Diff::new())
    }

    /// Create a result holding a single comparator's entries.
    pub fn single(
        cover: impl Into<PathBuf>,
        stego: impl Into<PathBuf>,
        comparator: impl Into<ComparatorName>,
        entries: ComparatorDiff,
    ) -> Self {
        let mut diff = Diff::new();
        diff.insert(comparator.into(), entries);
        Self::new(cover, stego, diff)
    }

    /// Whether `other` describes the same (cover, stego) pair.
    #[must_use]
    pub fn same_identity(&self, other: &Self) -> bool {
        self.cover_path == other.cover_path && self.stego_path == other.stego_path
    }

    /// Total number of keys across every comparator namespace.
    #[must_use]
    pub fn change_count(&self) -> usize {
        self.diff.values().map(BTreeMap::len).sum()
    }

    /// Whether no comparator reported anything for this pair.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.change_count() == 0
    }

    /// File name used when each result is written to its own document.
    #[must_use]
    pub fn output_file_name(&self) -> String {
        report_file_name(&self.cover_path, &self.stego_path)
    }
}

/// `<cover file name>_<stego file name>.json`
///
/// Only the file names take part, so pairs from different directories can
/// share a report name.
#[must_use]
pub fn report_file_name(cover: &Path, stego: &Path) -> String {
    format!("{}_{}.json", file_name_lossy(cover), file_name_lossy(stego))
}

/// Derive the result id of a pair from the file stems.
#[must_use]
pub fn pair_id(cover: &Path, stego: &Path) -> String {
    format!("{}_{}", file_stem_lossy(cover), file_stem_lossy(stego))
}

fn file_stem_lossy(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn file_name_lossy(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Merge two results of the same pair.
///
/// Comparator namespaces are unioned. Inside a namespace present in both,
/// keys are unioned and `b` wins on an exact key collision.
///
/// # Errors
///
/// Returns [`ImageDiffError::IdentityMismatch`] if `a` and `b` reference
/// different cover or stego images.
pub fn merge(a: DiffResult, b: DiffResult) -> Result<DiffResult> {
    if !a.same_identity(&b) {
        return Err(ImageDiffError::IdentityMismatch {
            left: format!("{} | {}", a.cover_path.display(), a.stego_path.display()),
            right: format!("{} | {}", b.cover_path.display(), b.stego_path.display()),
        });
    }

    let DiffResult {
        id,
        cover_path,
        stego_path,
        mut diff,
    } = a;

    for (comparator, entries) in b.diff {
        diff.entry(comparator).or_default().extend(entries);
    }

    Ok(DiffResult {
        id,
        cover_path,
        stego_path,
        diff,
    })
}
