//! Pair resolution.
//!
//! Turns the user's inputs (cover and stego paths, an optional
//! correspondence table and filters) into the ordered list of image pairs
//! to compare, or of stego images to extract from.

mod table;

pub use table::{CorrespondenceTable, Filters, Row, COVER_COLUMN, STEGO_COLUMN};

use crate::error::{ImageDiffError, Result};
use crate::model::ImagePair;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputKind {
    File,
    Directory,
}

fn input_kind(path: &Path) -> Result<InputKind> {
    let metadata = std::fs::metadata(path).map_err(|e| ImageDiffError::io(path, e))?;
    if metadata.is_dir() {
        Ok(InputKind::Directory)
    } else {
        Ok(InputKind::File)
    }
}

/// Resolve the ordered (cover, stego) pairs to compare.
///
/// - Two files: exactly that pair.
/// - Two directories with a table: one pair per filtered row, file names
///   joined to the respective base directory.
/// - Two directories without a table: the recursively gathered files of
///   both directories zipped by position.
///
/// # Errors
///
/// Fails if an input does not exist, if one input is a file and the other a
/// directory, or if a kept table row lacks a file name.
pub fn resolve_pairs(
    cover: &Path,
    stego: &Path,
    table: Option<&CorrespondenceTable>,
    filters: &Filters,
) -> Result<Vec<ImagePair>> {
    let pairs = match (input_kind(cover)?, input_kind(stego)?) {
        (InputKind::File, InputKind::File) => {
            if table.is_some() {
                tracing::debug!("Both inputs are files; ignoring the correspondence table");
            }
            vec![ImagePair::new(0, cover, stego)]
        }
        (InputKind::Directory, InputKind::Directory) => match table {
            Some(table) => pairs_from_table(cover, stego, table, filters)?,
            None => {
                if !filters.is_empty() {
                    tracing::warn!("Filters have no effect without a correspondence table");
                }
                pairs_by_position(cover, stego)?
            }
        },
        _ => {
            return Err(ImageDiffError::config(format!(
                "cover ({}) and stego ({}) must both be files or both be directories",
                cover.display(),
                stego.display()
            )))
        }
    };

    tracing::info!("Resolved {} image pairs", pairs.len());
    Ok(pairs)
}

fn pairs_from_table(
    cover_dir: &Path,
    stego_dir: &Path,
    table: &CorrespondenceTable,
    filters: &Filters,
) -> Result<Vec<ImagePair>> {
    table
        .filtered(filters)
        .enumerate()
        .map(|(index, row)| {
            let stego = row.required(STEGO_COLUMN)?;
            let cover = row.required(COVER_COLUMN)?;
            Ok(ImagePair::new(
                index,
                cover_dir.join(cover),
                stego_dir.join(stego),
            ))
        })
        .collect()
}

fn pairs_by_position(cover_dir: &Path, stego_dir: &Path) -> Result<Vec<ImagePair>> {
    tracing::info!("No correspondence table given; pairing images by position");
    let covers = gather_files(cover_dir)?;
    let stegos = gather_files(stego_dir)?;

    if covers.len() != stegos.len() {
        tracing::warn!(
            "Found {} cover and {} stego images; dropping {} unpaired images",
            covers.len(),
            stegos.len(),
            covers.len().abs_diff(stegos.len())
        );
    }

    Ok(covers
        .into_iter()
        .zip(stegos)
        .enumerate()
        .map(|(index, (cover, stego))| ImagePair::new(index, cover, stego))
        .collect())
}

/// Resolve the stego images of the extract pipeline.
///
/// A single file yields itself. A directory with a table yields one path
/// per filtered row (only the stego column is required); without a table
/// every file under the directory.
pub fn resolve_stego_images(
    stego: &Path,
    table: Option<&CorrespondenceTable>,
    filters: &Filters,
) -> Result<Vec<PathBuf>> {
    let images = match (input_kind(stego)?, table) {
        (InputKind::File, _) => vec![stego.to_path_buf()],
        (InputKind::Directory, Some(table)) => table
            .filtered(filters)
            .map(|row| Ok(stego.join(row.required(STEGO_COLUMN)?)))
            .collect::<Result<Vec<_>>>()?,
        (InputKind::Directory, None) => gather_files(stego)?,
    };

    tracing::info!("Resolved {} stego images", images.len());
    Ok(images)
}

/// Every regular file below `root`, sorted by file name at each level.
pub fn gather_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|e| ImageDiffError::io(root, e.into()))?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}
