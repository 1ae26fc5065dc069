//! Metadata comparator.

use super::{Params, StrategyError};
use crate::model::{ComparatorDiff, DiffField, DiffKey, DiffValue, Image};
use crate::reports::truncate_str;
use image::{ImageFormat, ImageReader};
use std::collections::BTreeMap;
use std::io::Cursor;
use std::path::Path;

const IGNORE_NULLS: &str = "ignoreNulls";
const MAX_VALUE_LEN: &str = "maxValueLen";

/// Compares the container format, dimensions and EXIF tags of two images.
///
/// A key is reported when its value differs between cover and stego. Tags
/// present only on the stego side are always reported; tags present only on
/// the cover side are reported unless `ignoreNulls` is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataComparator {
    pub ignore_nulls: bool,
    /// 0 disables truncation
    pub max_value_len: usize,
}

impl Default for MetadataComparator {
    fn default() -> Self {
        Self {
            ignore_nulls: true,
            max_value_len: crate::config::DEFAULT_MAX_VALUE_LEN,
        }
    }
}

impl MetadataComparator {
    pub fn from_params(params: &Params) -> Result<Self, StrategyError> {
        params.ensure_known(&[IGNORE_NULLS, MAX_VALUE_LEN])?;
        let defaults = Self::default();
        Ok(Self {
            ignore_nulls: params.bool_or(IGNORE_NULLS, defaults.ignore_nulls)?,
            max_value_len: params.parse_or(MAX_VALUE_LEN, defaults.max_value_len)?,
        })
    }

    pub fn compare(&self, cover: &Image, stego: &Image) -> Result<ComparatorDiff, StrategyError> {
        let cover_tags = read_tags(cover)?;
        let stego_tags = read_tags(stego)?;
        Ok(self.diff_tags(&cover_tags, &stego_tags))
    }

    fn diff_tags(
        &self,
        cover: &BTreeMap<String, String>,
        stego: &BTreeMap<String, String>,
    ) -> ComparatorDiff {
        let mut diff = ComparatorDiff::new();

        for (tag, cover_value) in cover {
            let stego_field = match stego.get(tag) {
                Some(stego_value) if stego_value == cover_value => continue,
                Some(stego_value) => self.field(stego_value),
                None if self.ignore_nulls => continue,
                None => DiffField::Absent,
            };
            diff.insert(
                DiffKey::new(tag.as_str()),
                DiffValue::changed(self.field(cover_value), stego_field),
            );
        }

        for (tag, stego_value) in stego {
            if !cover.contains_key(tag) {
                diff.insert(
                    DiffKey::new(tag.as_str()),
                    DiffValue::changed(DiffField::Absent, self.field(stego_value)),
                );
            }
        }

        diff
    }

    fn field(&self, value: &str) -> DiffField {
        if self.max_value_len == 0 {
            DiffField::text(value)
        } else {
            DiffField::text(truncate_str(value, self.max_value_len))
        }
    }
}

/// Read the tag map of one image.
fn read_tags(image: &Image) -> Result<BTreeMap<String, String>, StrategyError> {
    let bytes = image.bytes()?;
    let path = image.path();
    let metadata_error = |message: String| StrategyError::Metadata {
        path: path.to_path_buf(),
        message,
    };

    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| metadata_error(e.to_string()))?;
    let format = reader
        .format()
        .ok_or_else(|| metadata_error("unrecognized image format".to_string()))?;
    let (width, height) = reader
        .into_dimensions()
        .map_err(|e| metadata_error(e.to_string()))?;

    let mut tags = BTreeMap::new();
    tags.insert("Format".to_string(), format!("{format:?}").to_uppercase());
    tags.insert("Width".to_string(), width.to_string());
    tags.insert("Height".to_string(), height.to_string());

    if carries_exif(format) {
        read_exif(bytes, path, &mut tags)?;
    }
    Ok(tags)
}

const fn carries_exif(format: ImageFormat) -> bool {
    matches!(
        format,
        ImageFormat::Jpeg | ImageFormat::Png | ImageFormat::Tiff | ImageFormat::WebP
    )
}

fn read_exif(
    bytes: &[u8],
    path: &Path,
    tags: &mut BTreeMap<String, String>,
) -> Result<(), StrategyError> {
    let exif = match exif::Reader::new().read_from_container(&mut Cursor::new(bytes)) {
        Ok(exif) => exif,
        Err(exif::Error::NotFound(_)) => return Ok(()),
        Err(e) => {
            return Err(StrategyError::Metadata {
                path: path.to_path_buf(),
                message: e.to_string(),
            })
        }
    };

    for field in exif.fields() {
        let name = if field.ifd_num == exif::In::THUMBNAIL {
            format!("Thumbnail{}", field.tag)
        } else {
            field.tag.to_string()
        };
        let value = field.display_value().with_unit(&exif).to_string();
        tags.insert(name, value);
    }
    Ok(())
}
