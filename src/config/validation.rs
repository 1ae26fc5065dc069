//! Configuration validation.

use super::types::{AppConfig, ExecutionConfig, StrategyConfig};
use crate::strategies::StrategyRegistry;

// ============================================================================
// Configuration Error
// ============================================================================

/// A single failed validation check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    /// The field that failed validation
    pub field: String,
    /// Description of the validation error
    pub message: String,
}

impl ConfigError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Validation Trait
// ============================================================================

/// Trait for validatable configuration types.
pub trait Validatable {
    /// Validate the configuration, returning any errors found.
    fn validate(&self) -> Vec<ConfigError>;

    /// Check if the configuration is valid.
    fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

// ============================================================================
// Validation Implementations
// ============================================================================

impl Validatable for AppConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        errors.extend(self.execution.validate());
        errors.extend(self.strategies.validate());
        errors
    }
}

impl Validatable for ExecutionConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        if self.worker_multiplier == 0 {
            errors.push(ConfigError::new(
                "execution.worker_multiplier",
                "Worker multiplier must be at least 1",
            ));
        }
        if self.max_workers == Some(0) {
            errors.push(ConfigError::new(
                "execution.max_workers",
                "Worker cap must be at least 1",
            ));
        }
        if self.task_deadline_secs == Some(0) {
            errors.push(ConfigError::new(
                "execution.task_deadline_secs",
                "Task deadline must be at least one second",
            ));
        }
        errors
    }
}

impl Validatable for StrategyConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let registry = StrategyRegistry::new();
        let mut errors = Vec::new();

        for name in &self.comparators {
            if let Err(e) = registry.comparator(name) {
                errors.push(ConfigError::new("strategies.comparators", e.to_string()));
            }
        }
        for name in &self.extractors {
            if let Err(e) = registry.extractor(name) {
                errors.push(ConfigError::new("strategies.extractors", e.to_string()));
            }
        }
        for key in self.params.keys() {
            let known = key.split_once('.').is_some_and(|(strategy, param)| {
                !param.is_empty()
                    && (registry.comparator(strategy).is_ok()
                        || registry.extractor(strategy).is_ok())
            });
            if !known {
                errors.push(ConfigError::new(
                    "strategies.params",
                    format!("'{key}' does not name a registered strategy as <strategy>.<param>"),
                ));
            }
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_default_config_is_valid() {
        assert!(AppConfig::default().is_valid());
    }

    #[test]
    fn test_execution_ranges() {
        let execution = ExecutionConfig {
            worker_multiplier: 0,
            max_workers: Some(0),
            task_deadline_secs: Some(0),
            ..ExecutionConfig::default()
        };
        let errors = execution.validate();
        assert_eq!(errors.len(), 3);
        assert_eq!(errors[0].field, "execution.worker_multiplier");
    }

    #[test]
    fn test_unknown_strategies_reported() {
        let strategies = StrategyConfig {
            comparators: vec!["metadata".to_string(), "blur".to_string()],
            extractors: vec!["dct".to_string()],
            params: BTreeMap::from([
                ("pixel.bitDepth".to_string(), "2".to_string()),
                ("lsb.bitsPerChannel".to_string(), "2".to_string()),
                ("nope.x".to_string(), "1".to_string()),
                ("flat".to_string(), "1".to_string()),
            ]),
        };
        let errors = strategies.validate();
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "strategies.comparators",
                "strategies.extractors",
                "strategies.params",
                "strategies.params"
            ]
        );
    }
}
