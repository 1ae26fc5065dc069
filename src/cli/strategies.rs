//! Strategy listing.

use crate::strategies::StrategyRegistry;
use std::fmt::Write as _;

/// Human-readable listing of every registered strategy.
#[must_use]
pub fn render_strategies(registry: &StrategyRegistry) -> String {
    let mut out = String::from("Comparators:\n");
    for kind in registry.comparators() {
        let _ = writeln!(out, "  {:<12} {}", kind.name(), kind.description());
    }
    out.push_str("\nExtractors:\n");
    for kind in registry.extractors() {
        let _ = writeln!(out, "  {:<12} {}", kind.name(), kind.description());
    }
    out
}

/// Print the registered strategies to stdout.
pub fn run_strategies() {
    print!("{}", render_strategies(&StrategyRegistry::new()));
}
