//! Extraction executor.

use super::pool::WorkerPool;
use super::Deadline;
use crate::config::ExecutionConfig;
use crate::error::Result;
use crate::model::{ExtractedData, Image};
use crate::strategies::{Extractor, StrategyError};
use std::fmt;
use std::path::{Path, PathBuf};

/// An extractor call that failed for one image.
#[derive(Debug)]
pub struct ExtractionFailure {
    pub extractor: String,
    pub image: PathBuf,
    pub error: StrategyError,
}

impl fmt::Display for ExtractionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} failed for {}: {}",
            self.extractor,
            self.image.display(),
            self.error
        )
    }
}

/// Payloads extracted from one image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedImage {
    pub path: PathBuf,
    pub data: ExtractedData,
}

#[derive(Debug, Default)]
pub struct ExtractionOutcome {
    pub extracted: Vec<ExtractedImage>,
    pub failures: Vec<ExtractionFailure>,
}

impl ExtractionOutcome {
    #[must_use]
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Runs the selected extractors over a list of images.
pub struct ExtractionExecutor {
    extractors: Vec<Extractor>,
    execution: ExecutionConfig,
}

impl ExtractionExecutor {
    #[must_use]
    pub fn new(extractors: Vec<Extractor>, execution: ExecutionConfig) -> Self {
        Self {
            extractors,
            execution,
        }
    }

    pub fn execute(&self, images: &[PathBuf]) -> Result<ExtractionOutcome> {
        let stage = if self.execution.parallel && images.len() > 1 {
            let pool = WorkerPool::new(self.execution.worker_count())?;
            tracing::info!(
                "Extracting from {} images on {} workers",
                images.len(),
                pool.threads()
            );
            pool.map_ordered(images, |_, path| self.extract_image(path))
        } else {
            tracing::info!("Extracting from {} images", images.len());
            images.iter().map(|path| self.extract_image(path)).collect()
        };

        let mut outcome = ExtractionOutcome::default();
        for (extracted, failures) in stage {
            outcome.extracted.push(extracted);
            outcome.failures.extend(failures);
        }
        for failure in &outcome.failures {
            tracing::warn!("{failure}");
        }
        Ok(outcome)
    }

    fn extract_image(&self, path: &Path) -> (ExtractedImage, Vec<ExtractionFailure>) {
        tracing::debug!("Extracting from {}", path.display());
        let image = Image::open(path);
        let deadline = Deadline::start(self.execution.task_deadline());

        let mut data = ExtractedData::new();
        let mut failures = Vec::new();
        for extractor in &self.extractors {
            let payload = deadline
                .check()
                .and_then(|()| extractor.extract(&image))
                .and_then(|payload| deadline.check().map(|()| payload));
            match payload {
                Ok(payload) => {
                    data.insert(extractor.name().to_string(), payload);
                }
                Err(error) => failures.push(ExtractionFailure {
                    extractor: extractor.name().to_string(),
                    image: path.to_path_buf(),
                    error,
                }),
            }
        }

        (
            ExtractedImage {
                path: path.to_path_buf(),
                data,
            },
            failures,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategies::LsbExtractor;
    use image::{Rgba, RgbaImage};

    #[test]
    fn test_extract_in_order_with_failures() {
        let dir = tempfile::tempdir().unwrap();
        let mut images = Vec::new();
        for i in 0..5u8 {
            let path = dir.path().join(format!("s{i}.png"));
            RgbaImage::from_pixel(8, 1, Rgba([i, i, i, 255])).save(&path).unwrap();
            images.push(path);
        }
        let broken = dir.path().join("broken.png");
        std::fs::write(&broken, b"junk").unwrap();
        images.insert(2, broken.clone());

        let executor = ExtractionExecutor::new(
            vec![Extractor::Lsb(LsbExtractor::default())],
            ExecutionConfig::parallel(),
        );
        let outcome = executor.execute(&images).unwrap();

        let paths: Vec<_> = outcome.extracted.iter().map(|e| e.path.clone()).collect();
        assert_eq!(paths, images);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].image, broken);
        assert!(outcome.extracted[2].data.is_empty());
        // all 8 bits of each channel: 8 pixels x 3 channels
        assert_eq!(outcome.extracted[1].data["lsb"], vec![1; 24]);
        assert_eq!(outcome.extracted[0].data["lsb"], vec![0; 24]);
    }
}
