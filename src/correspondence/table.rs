//! CSV correspondence table.

use crate::error::{ErrorContext, ImageDiffError, Result};
use csv::{ReaderBuilder, StringRecord, Trim};
use indexmap::IndexMap;
use std::io::Read;
use std::path::Path;

/// Column holding the cover image file name.
pub const COVER_COLUMN: &str = "cover_image_filename";
/// Column holding the stego image file name.
pub const STEGO_COLUMN: &str = "stego_image_filename";

/// Column → required value. All filters must match (exact, case-sensitive).
pub type Filters = IndexMap<String, String>;

/// A parsed correspondence table with a header row.
#[derive(Debug, Clone)]
pub struct CorrespondenceTable {
    source: String,
    headers: StringRecord,
    rows: Vec<StringRecord>,
}

impl CorrespondenceTable {
    /// Parse a table from CSV text. `source` names the table in errors.
    ///
    /// Header names are trimmed; cell values are kept verbatim so filters
    /// and file names match exactly.
    pub fn from_reader<R: Read>(reader: R, source: impl Into<String>) -> Result<Self> {
        let source = source.into();
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(Trim::Headers)
            .from_reader(reader);

        let headers = reader.headers().context(source.as_str())?.clone();
        let rows = reader
            .records()
            .collect::<std::result::Result<Vec<_>, _>>()
            .context(source.as_str())?;

        tracing::debug!("Read {} correspondence rows from {source}", rows.len());
        Ok(Self {
            source,
            headers,
            rows,
        })
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path).map_err(|e| ImageDiffError::io(path, e))?;
        Self::from_reader(file, path.display().to_string())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn has_column(&self, column: &str) -> bool {
        self.column_index(column).is_some()
    }

    fn column_index(&self, column: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == column)
    }

    /// Rows matching every filter, in table order.
    ///
    /// A filter on a column the table does not have matches no row.
    pub fn filtered<'a>(&'a self, filters: &'a Filters) -> impl Iterator<Item = Row<'a>> + 'a {
        if let Some(column) = filters.keys().find(|column| !self.has_column(column)) {
            tracing::warn!(
                "Filter column '{column}' not present in {}; no rows match",
                self.source
            );
        }

        let resolved: Option<Vec<(usize, &str)>> = filters
            .iter()
            .map(|(column, value)| self.column_index(column).map(|i| (i, value.as_str())))
            .collect();

        self.rows
            .iter()
            .filter(move |record| {
                resolved.as_ref().is_some_and(|checks| {
                    checks.iter().all(|(i, value)| record.get(*i) == Some(*value))
                })
            })
            .map(move |record| Row {
                table: self,
                record,
            })
    }
}

/// One row of a [`CorrespondenceTable`].
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    table: &'a CorrespondenceTable,
    record: &'a StringRecord,
}

impl<'a> Row<'a> {
    /// Raw cell value; `None` if the column or cell is missing.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&'a str> {
        self.table
            .column_index(column)
            .and_then(|i| self.record.get(i))
    }

    /// Non-empty cell value of a required column.
    pub fn required(&self, column: &str) -> Result<&'a str> {
        self.get(column)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ImageDiffError::missing_column(column, self.table.source.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CorrespondenceErrorKind;

    const TABLE: &str = "\
cover_image_filename,stego_image_filename,embedding,rate
c1.png,s1.png,lsb,0.1
c2.png,s2.png,dct,0.1
c3.png,s3.png,lsb,0.4
";

    fn filters(entries: &[(&str, &str)]) -> Filters {
        entries
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_parse_and_filter() {
        let table = CorrespondenceTable::from_reader(TABLE.as_bytes(), "pairs.csv").unwrap();
        assert_eq!(table.len(), 3);

        let f = filters(&[("embedding", "lsb")]);
        let covers: Vec<_> = table
            .filtered(&f)
            .map(|r| r.required(COVER_COLUMN).unwrap())
            .collect();
        assert_eq!(covers, vec!["c1.png", "c3.png"]);
    }

    #[test]
    fn test_filters_are_conjunctive_and_case_sensitive() {
        let table = CorrespondenceTable::from_reader(TABLE.as_bytes(), "pairs.csv").unwrap();
        let f = filters(&[("embedding", "lsb"), ("rate", "0.4")]);
        assert_eq!(table.filtered(&f).count(), 1);

        let f = filters(&[("embedding", "LSB")]);
        assert_eq!(table.filtered(&f).count(), 0);
    }

    #[test]
    fn test_filter_on_missing_column_matches_nothing() {
        let table = CorrespondenceTable::from_reader(TABLE.as_bytes(), "pairs.csv").unwrap();
        let f = filters(&[("quality", "90")]);
        assert_eq!(table.filtered(&f).count(), 0);
    }

    #[test]
    fn test_has_column_ignores_header_padding() {
        let csv = " cover_image_filename , stego_image_filename\nc1.png,s1.png\n";
        let table = CorrespondenceTable::from_reader(csv.as_bytes(), "pairs.csv").unwrap();
        assert!(table.has_column(COVER_COLUMN));
        assert!(table.has_column(STEGO_COLUMN));
        assert!(!table.has_column("embedding"));
    }

    #[test]
    fn test_filter_values_are_not_trimmed() {
        let csv = "cover_image_filename,stego_image_filename,embedding\n\
c1.png,s1.png,lsb\n\
c2.png,s2.png, lsb\n";
        let table = CorrespondenceTable::from_reader(csv.as_bytes(), "pairs.csv").unwrap();
        let f = filters(&[("embedding", "lsb")]);
        let covers: Vec<_> = table
            .filtered(&f)
            .map(|r| r.required(COVER_COLUMN).unwrap())
            .collect();
        assert_eq!(covers, vec!["c1.png"]);
    }

    #[test]
    fn test_no_filters_keeps_every_row() {
        let table = CorrespondenceTable::from_reader(TABLE.as_bytes(), "pairs.csv").unwrap();
        assert_eq!(table.filtered(&Filters::new()).count(), 3);
    }

    #[test]
    fn test_missing_or_empty_cell_is_malformed() {
        let csv = "cover_image_filename,stego_image_filename\nc1.png,\n";
        let table = CorrespondenceTable::from_reader(csv.as_bytes(), "pairs.csv").unwrap();
        let f = Filters::new();
        let row = table.filtered(&f).next().unwrap();
        assert_eq!(row.required(COVER_COLUMN).unwrap(), "c1.png");

        match row.required(STEGO_COLUMN) {
            Err(ImageDiffError::Correspondence {
                source: CorrespondenceErrorKind::MalformedCorrespondenceList { column },
                ..
            }) => assert_eq!(column, STEGO_COLUMN),
            other => panic!("expected malformed table, got {other:?}"),
        }
    }

    #[test]
    fn test_short_row_is_tolerated_until_read() {
        let csv = "cover_image_filename,stego_image_filename,tag\nc1.png\n";
        let table = CorrespondenceTable::from_reader(csv.as_bytes(), "pairs.csv").unwrap();
        let f = Filters::new();
        let row = table.filtered(&f).next().unwrap();
        assert!(row.get(STEGO_COLUMN).is_none());
        assert!(row.required(STEGO_COLUMN).is_err());
    }
}
