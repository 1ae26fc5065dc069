//! Name → strategy kind lookup.

use super::params::route_params;
use super::{Comparator, ComparatorKind, Extractor, ExtractorKind, Params};
use crate::error::{ImageDiffError, Result};
use indexmap::IndexMap;
use std::collections::BTreeMap;

/// Registered comparators and extractors, in registration order.
///
/// Built once at startup. Resolution parses every selected strategy's
/// parameters, so any configuration problem surfaces before work starts.
#[derive(Debug, Clone)]
pub struct StrategyRegistry {
    comparators: IndexMap<&'static str, ComparatorKind>,
    extractors: IndexMap<&'static str, ExtractorKind>,
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl StrategyRegistry {
    /// Registry holding every built-in strategy.
    #[must_use]
    pub fn new() -> Self {
        Self {
            comparators: ComparatorKind::ALL.iter().map(|k| (k.name(), *k)).collect(),
            extractors: ExtractorKind::ALL.iter().map(|k| (k.name(), *k)).collect(),
        }
    }

    pub fn comparators(&self) -> impl Iterator<Item = ComparatorKind> + '_ {
        self.comparators.values().copied()
    }

    pub fn extractors(&self) -> impl Iterator<Item = ExtractorKind> + '_ {
        self.extractors.values().copied()
    }

    pub fn comparator(&self, name: &str) -> Result<ComparatorKind> {
        self.comparators
            .get(name)
            .copied()
            .ok_or_else(|| ImageDiffError::UnknownComparator(name.to_string()))
    }

    pub fn extractor(&self, name: &str) -> Result<ExtractorKind> {
        self.extractors
            .get(name)
            .copied()
            .ok_or_else(|| ImageDiffError::UnknownExtractor(name.to_string()))
    }

    /// Resolve and configure the selected comparators.
    ///
    /// An empty selection means every registered comparator. Duplicates are
    /// dropped, keeping the first occurrence. `params` holds raw
    /// `comparator.param=value` assignments.
    pub fn resolve_comparators(
        &self,
        names: &[String],
        params: &BTreeMap<String, String>,
    ) -> Result<Vec<Comparator>> {
        let kinds = select(names, &self.comparators, |name| self.comparator(name))?;
        let mut routed = route_for(params, &self.comparators, ImageDiffError::UnknownComparator)?;

        let comparators = kinds
            .into_iter()
            .map(|kind| {
                let params = routed.remove(kind.name()).unwrap_or_default();
                kind.configure(&params).map_err(|source| ImageDiffError::StrategyParams {
                    strategy: kind.name().to_string(),
                    source,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        warn_unused(&routed);
        Ok(comparators)
    }

    /// Resolve and configure the selected extractors.
    ///
    /// Same rules as [`StrategyRegistry::resolve_comparators`].
    pub fn resolve_extractors(
        &self,
        names: &[String],
        params: &BTreeMap<String, String>,
    ) -> Result<Vec<Extractor>> {
        let kinds = select(names, &self.extractors, |name| self.extractor(name))?;
        let mut routed = route_for(params, &self.extractors, ImageDiffError::UnknownExtractor)?;

        let extractors = kinds
            .into_iter()
            .map(|kind| {
                let params = routed.remove(kind.name()).unwrap_or_default();
                kind.configure(&params).map_err(|source| ImageDiffError::StrategyParams {
                    strategy: kind.name().to_string(),
                    source,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        warn_unused(&routed);
        Ok(extractors)
    }
}

fn select<K: Copy + PartialEq>(
    names: &[String],
    registered: &IndexMap<&'static str, K>,
    lookup: impl Fn(&str) -> Result<K>,
) -> Result<Vec<K>> {
    if names.is_empty() {
        return Ok(registered.values().copied().collect());
    }
    let mut kinds = Vec::with_capacity(names.len());
    for name in names {
        let kind = lookup(name.trim())?;
        if !kinds.contains(&kind) {
            kinds.push(kind);
        }
    }
    Ok(kinds)
}

fn route_for<K>(
    params: &BTreeMap<String, String>,
    registered: &IndexMap<&'static str, K>,
    unknown: fn(String) -> ImageDiffError,
) -> Result<BTreeMap<String, Params>> {
    let routed = route_params(params)?;
    if let Some(prefix) = routed.keys().find(|p| !registered.contains_key(p.as_str())) {
        return Err(unknown(prefix.clone()));
    }
    Ok(routed)
}

fn warn_unused(routed: &BTreeMap<String, Params>) {
    for strategy in routed.keys() {
        tracing::warn!("Ignoring parameters for '{strategy}': strategy is not selected");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategies::StrategyError;

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_empty_selection_means_all() {
        let registry = StrategyRegistry::new();
        let comparators = registry.resolve_comparators(&[], &BTreeMap::new()).unwrap();
        let resolved: Vec<_> = comparators.iter().map(Comparator::name).collect();
        assert_eq!(resolved, vec!["metadata", "pixel", "composite"]);
    }

    #[test]
    fn test_selection_keeps_order_and_dedupes() {
        let registry = StrategyRegistry::new();
        let comparators = registry
            .resolve_comparators(&names(&["pixel", "metadata", "pixel"]), &BTreeMap::new())
            .unwrap();
        let resolved: Vec<_> = comparators.iter().map(Comparator::name).collect();
        assert_eq!(resolved, vec!["pixel", "metadata"]);
    }

    #[test]
    fn test_unknown_names_fail() {
        let registry = StrategyRegistry::new();
        assert!(matches!(
            registry.resolve_comparators(&names(&["sharpness"]), &BTreeMap::new()),
            Err(ImageDiffError::UnknownComparator(name)) if name == "sharpness"
        ));
        assert!(matches!(
            registry.resolve_extractors(&names(&["dct"]), &BTreeMap::new()),
            Err(ImageDiffError::UnknownExtractor(name)) if name == "dct"
        ));
    }

    #[test]
    fn test_params_are_parsed_at_resolution() {
        let registry = StrategyRegistry::new();
        let params = BTreeMap::from([("pixel.bitDepth".to_string(), "12".to_string())]);
        match registry.resolve_comparators(&names(&["pixel"]), &params) {
            Err(ImageDiffError::StrategyParams { strategy, source }) => {
                assert_eq!(strategy, "pixel");
                assert!(matches!(source, StrategyError::InvalidParam { .. }));
            }
            other => panic!("expected StrategyParams, got {other:?}"),
        }
    }

    #[test]
    fn test_params_for_unknown_prefix_fail() {
        let registry = StrategyRegistry::new();
        let params = BTreeMap::from([("blur.radius".to_string(), "2".to_string())]);
        assert!(matches!(
            registry.resolve_comparators(&[], &params),
            Err(ImageDiffError::UnknownComparator(_))
        ));
    }

    #[test]
    fn test_params_for_unselected_strategy_are_ignored() {
        let registry = StrategyRegistry::new();
        let params = BTreeMap::from([("pixel.bitDepth".to_string(), "2".to_string())]);
        let comparators = registry
            .resolve_comparators(&names(&["metadata"]), &params)
            .unwrap();
        assert_eq!(comparators.len(), 1);
    }

    #[test]
    fn test_extractor_params() {
        let registry = StrategyRegistry::new();
        let params = BTreeMap::from([("lsb.bitsPerChannel".to_string(), "2".to_string())]);
        let extractors = registry.resolve_extractors(&[], &params).unwrap();
        match &extractors[..] {
            [Extractor::Lsb(lsb)] => assert_eq!(lsb.bits_per_channel, 2),
            other => panic!("unexpected extractors {other:?}"),
        }
    }
}
