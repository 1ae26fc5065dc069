//! Unified error types for imagediff.
//!
//! Fatal errors abort a run before any work is dispatched (malformed
//! correspondence tables, unknown strategies, invalid parameters). Per-pair
//! strategy failures are not represented here: they are reported as
//! [`StrategyError`](crate::strategies::StrategyError) values and isolated by
//! the executor.

use crate::strategies::StrategyError;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for imagediff operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ImageDiffError {
    /// Errors while reading or interpreting a correspondence table
    #[error("Invalid correspondence list: {context}")]
    Correspondence {
        context: String,
        #[source]
        source: CorrespondenceErrorKind,
    },

    /// A comparator name that is not registered was requested
    #[error("Unknown comparator: {0}")]
    UnknownComparator(String),

    /// An extractor name that is not registered was requested
    #[error("Unknown extractor: {0}")]
    UnknownExtractor(String),

    /// A strategy rejected its parameters during setup
    #[error("Invalid parameters for '{strategy}'")]
    StrategyParams {
        strategy: String,
        #[source]
        source: StrategyError,
    },

    /// Two diff results for different image pairs were merged
    #[error("Cannot merge diff results of different image pairs: {left} vs {right}")]
    IdentityMismatch { left: String, right: String },

    /// Errors during report generation
    #[error("Report generation failed: {context}")]
    Report {
        context: String,
        #[source]
        source: ReportErrorKind,
    },

    /// IO errors with context
    #[error("IO error at {path:?}: {message}")]
    Io {
        path: Option<PathBuf>,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Configuration errors
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Specific correspondence table error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum CorrespondenceErrorKind {
    #[error("The correspondence list is malformed. The following column is missing: {column}")]
    MalformedCorrespondenceList { column: String },

    #[error("CSV syntax error: {0}")]
    Csv(String),
}

/// Specific report error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ReportErrorKind {
    #[error("Split output requires an output directory")]
    SplitWithoutDirectory,
}

/// Convenient Result type for imagediff operations
pub type Result<T> = std::result::Result<T, ImageDiffError>;

impl ImageDiffError {
    /// Create a correspondence error with context
    pub fn correspondence(context: impl Into<String>, source: CorrespondenceErrorKind) -> Self {
        Self::Correspondence {
            context: context.into(),
            source,
        }
    }

    /// Create a correspondence error for a missing required column
    pub fn missing_column(column: impl Into<String>, table: impl Into<String>) -> Self {
        Self::correspondence(
            table,
            CorrespondenceErrorKind::MalformedCorrespondenceList {
                column: column.into(),
            },
        )
    }

    /// Create an IO error with path context
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        let message = format!("{source}");
        Self::Io {
            path: Some(path),
            message,
            source,
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a report error
    pub fn report(context: impl Into<String>, source: ReportErrorKind) -> Self {
        Self::Report {
            context: context.into(),
            source,
        }
    }

    /// Whether this error belongs to the configuration category (bad table,
    /// unknown strategy, bad parameters) rather than I/O or internal wiring.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::Correspondence { .. }
                | Self::UnknownComparator(_)
                | Self::UnknownExtractor(_)
                | Self::StrategyParams { .. }
                | Self::Config(_)
        )
    }
}

impl From<std::io::Error> for ImageDiffError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            path: None,
            message: format!("{err}"),
            source: err,
        }
    }
}

impl From<csv::Error> for ImageDiffError {
    fn from(err: csv::Error) -> Self {
        Self::correspondence("reading CSV", CorrespondenceErrorKind::Csv(err.to_string()))
    }
}

// ============================================================================
// Error context extension trait
// ============================================================================

/// Extension trait for adding context to errors.
///
/// Context strings are prepended to the existing context, so the final
/// message reads outermost-first:
///
/// ```ignore
/// use imagediff::error::ErrorContext;
///
/// let table = CorrespondenceTable::from_path(&path)
///     .with_context(|| format!("loading {}", path.display()))?;
/// ```
pub trait ErrorContext<T> {
    /// Add context to an error.
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context from a closure, evaluated only on error.
    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>;
}

impl<T, E: Into<ImageDiffError>> ErrorContext<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.into().prefixed(&context.into()))
    }

    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>,
    {
        self.map_err(|e| e.into().prefixed(&f().into()))
    }
}

impl ImageDiffError {
    /// Put `outer` in front of the message this error carries.
    ///
    /// Variants that name a strategy or a pair are returned unchanged.
    fn prefixed(self, outer: &str) -> Self {
        let join = |inner: String| match inner.as_str() {
            "" => outer.to_string(),
            _ => format!("{outer}: {inner}"),
        };
        match self {
            Self::Correspondence { context, source } => Self::Correspondence {
                context: join(context),
                source,
            },
            Self::Report { context, source } => Self::Report {
                context: join(context),
                source,
            },
            Self::Io {
                path,
                message,
                source,
            } => Self::Io {
                path,
                message: join(message),
                source,
            },
            Self::Config(message) => Self::Config(join(message)),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_column_names_column() {
        let err = ImageDiffError::missing_column("cover_image_filename", "pairs.csv");
        let chain = format!("{err}: {}", std::error::Error::source(&err).unwrap());
        assert!(chain.contains("pairs.csv"), "{chain}");
        assert!(chain.contains("cover_image_filename"), "{chain}");
        assert!(err.is_configuration());
    }

    #[test]
    fn test_unknown_comparator_display() {
        let err = ImageDiffError::UnknownComparator("sharpness".to_string());
        assert_eq!(err.to_string(), "Unknown comparator: sharpness");
        assert!(err.is_configuration());
    }

    #[test]
    fn test_io_error_has_path() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = ImageDiffError::io("/data/cover/001.png", io_err);

        assert!(err.to_string().contains("/data/cover/001.png"));
        assert!(!err.is_configuration());
    }

    #[test]
    fn test_identity_mismatch_is_not_configuration() {
        let err = ImageDiffError::IdentityMismatch {
            left: "a_b".to_string(),
            right: "a_c".to_string(),
        };
        assert!(!err.is_configuration());
        assert!(err.to_string().contains("a_b vs a_c"));
    }

    #[test]
    fn test_context_chaining_multiple_levels() {
        fn inner() -> Result<()> {
            Err(ImageDiffError::missing_column("stego_image_filename", "base"))
        }

        fn middle() -> Result<()> {
            inner().context("middle layer")
        }

        fn outer() -> Result<()> {
            middle().context("outer layer")
        }

        match outer() {
            Err(ImageDiffError::Correspondence { context, .. }) => {
                assert_eq!(context, "outer layer: middle layer: base");
            }
            other => panic!("Expected Correspondence error, got {other:?}"),
        }
    }

    #[test]
    fn test_with_context_lazy_evaluation() {
        let mut called = false;

        let ok_result: Result<i32> = Ok(42);
        let _ = ok_result.with_context(|| {
            called = true;
            "should not be called"
        });
        assert!(!called, "Closure should not be called for Ok result");

        let err_result: Result<i32> = Err(ImageDiffError::config("error"));
        let _ = err_result.with_context(|| {
            called = true;
            "should be called"
        });
        assert!(called, "Closure should be called for Err result");
    }

    #[test]
    fn test_context_on_empty_message() {
        let err = Err::<(), _>(ImageDiffError::config(""))
            .context("loading pairs.csv")
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid configuration: loading pairs.csv");
    }

    #[test]
    fn test_context_keeps_named_variants() {
        let err = Err::<(), _>(ImageDiffError::UnknownExtractor("dct".to_string()))
            .context("setting up extractors")
            .unwrap_err();
        assert_eq!(err.to_string(), "Unknown extractor: dct");
    }

    #[test]
    fn test_csv_error_becomes_correspondence_error() {
        let err: ImageDiffError = csv::ReaderBuilder::new()
            .from_reader("a,b\n1,2,3\n".as_bytes())
            .records()
            .find_map(std::result::Result::err)
            .unwrap()
            .into();
        assert!(matches!(
            err,
            ImageDiffError::Correspondence {
                source: CorrespondenceErrorKind::Csv(_),
                ..
            }
        ));
    }
}
