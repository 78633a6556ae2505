//! Manifest loader
//!
//! A manifest is the table a curator fills in for one component. Columns
//! without a header and rows without any content are dropped; every other
//! cell is kept, with empty cells as empty strings.

use indexmap::IndexMap;
use schematic_core::prelude::*;
use serde_json::Value;
use std::path::Path;
use tracing::{debug, info};

use super::{CsvOptions, read_headers, read_rows};

/// Loads CSV manifests into records keyed by column header
#[derive(Debug, Clone, Default)]
pub struct ManifestLoader {
    options: CsvOptions,
}

impl ManifestLoader {
    /// Create a loader with default options
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a loader with custom options
    #[must_use]
    pub fn with_options(options: CsvOptions) -> Self {
        Self { options }
    }

    /// Read and parse a manifest file
    ///
    /// # Errors
    ///
    /// Returns `SchematicError::IoError` if the file cannot be read and
    /// `SchematicError::ParseError` if it is not valid CSV.
    pub async fn load_file(&self, path: &Path) -> Result<Vec<Record>> {
        let content = tokio::fs::read_to_string(path).await?;
        let records = self.parse_str(&content)?;
        info!(path = %path.display(), records = records.len(), "Loaded manifest");
        Ok(records)
    }

    /// Parse manifest CSV text
    ///
    /// # Errors
    ///
    /// Returns `SchematicError::ParseError` if the text is not valid CSV.
    pub fn parse_str(&self, content: &str) -> Result<Vec<Record>> {
        let mut reader = self.options.reader(content);
        let headers = read_headers(&mut reader)?;
        let columns: Vec<(usize, &str)> = headers
            .iter()
            .enumerate()
            .filter(|(_, header)| !header.is_empty())
            .map(|(i, header)| (i, header.as_str()))
            .collect();
        if columns.len() < headers.len() {
            debug!(
                dropped = headers.len() - columns.len(),
                "Dropping columns without a header"
            );
        }

        let mut records = Vec::new();
        for (row, record) in read_rows(&mut reader)? {
            if record.iter().all(|cell| cell.trim().is_empty()) {
                debug!(row, "Dropping empty manifest row");
                continue;
            }
            let values: IndexMap<String, Value> = columns
                .iter()
                .map(|&(i, header)| {
                    let cell = record.get(i).unwrap_or_default();
                    (header.to_string(), Value::String(cell.to_string()))
                })
                .collect();
            records.push(values);
        }

        Ok(records)
    }
}
