//! JSON report generator.

use super::ReportError;
use serde::Serialize;
use std::io::Write;

/// JSON report generator
#[derive(Debug, Clone, Copy)]
pub struct JsonReporter {
    /// Pretty print output
    pretty: bool,
}

impl JsonReporter {
    /// Create a new JSON reporter
    #[must_use]
    pub const fn new() -> Self {
        Self { pretty: true }
    }

    /// Set pretty printing
    #[must_use]
    pub const fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Render `document` as a JSON string.
    pub fn render<T: Serialize>(&self, document: &T) -> Result<String, ReportError> {
        let rendered = if self.pretty {
            serde_json::to_string_pretty(document)
        } else {
            serde_json::to_string(document)
        };
        rendered.map_err(|e| ReportError::SerializationError(e.to_string()))
    }

    /// Write `document` to `writer`.
    pub fn write_to<T: Serialize, W: Write>(
        &self,
        document: &T,
        writer: &mut W,
    ) -> Result<(), ReportError> {
        let written = if self.pretty {
            serde_json::to_writer_pretty(&mut *writer, document)
        } else {
            serde_json::to_writer(&mut *writer, document)
        };
        written.map_err(|e| ReportError::SerializationError(e.to_string()))?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

impl Default for JsonReporter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DiffData, DiffResult};

    #[test]
    fn test_render_report_shape() {
        let data = DiffData::from_results(vec![DiffResult::empty("c.png", "s.png")]);
        let json = JsonReporter::new().render(&data).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["version"], "1.0");
        assert!(value["timestamp"].is_i64());
        assert!(value["statistics"]["rateOfChanges"].is_object());
        assert_eq!(value["results"][0]["id"], "c_s");
    }

    #[test]
    fn test_compact_output() {
        let data = DiffData::from_results(Vec::new());
        let json = JsonReporter::new().pretty(false).render(&data).unwrap();
        assert!(!json.contains('\n'));
    }

    #[test]
    fn test_write_to_appends_newline() {
        let mut buffer = Vec::new();
        JsonReporter::new()
            .pretty(false)
            .write_to(&serde_json::json!({"a": 1}), &mut buffer)
            .unwrap();
        assert_eq!(buffer, b"{\"a\":1}\n");
    }
}
