//! CSV loaders for data models and manifests
//!
//! - [`DataModelLoader`] reads a tabular data model into a [`RelationshipGraph`]
//! - [`ManifestLoader`] reads a filled-in manifest into [`Record`]s
//!
//! [`RelationshipGraph`]: schematic_core::RelationshipGraph
//! [`Record`]: schematic_core::Record

pub mod data_model;
pub mod manifest;

use csv::{Reader, ReaderBuilder, StringRecord};
use schematic_core::prelude::*;

pub use data_model::{DataModelLoader, columns};
pub use manifest::ManifestLoader;

/// Options shared by the CSV loaders
#[derive(Debug, Clone)]
pub struct CsvOptions {
    /// Field delimiter (default: ',')
    pub delimiter: u8,

    /// Quote character (default: '"')
    pub quote: u8,

    /// Whether to trim whitespace from cells
    pub trim: bool,

    /// Whether rows may have fewer cells than the header
    pub flexible: bool,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            quote: b'"',
            trim: true,
            flexible: true,
        }
    }
}

impl CsvOptions {
    /// Create options for TSV format
    #[must_use]
    pub fn tsv() -> Self {
        Self {
            delimiter: b'\t',
            ..Default::default()
        }
    }

    fn reader<'a>(&self, content: &'a str) -> Reader<&'a [u8]> {
        ReaderBuilder::new()
            .delimiter(self.delimiter)
            .quote(self.quote)
            .has_headers(true)
            .trim(if self.trim { csv::Trim::All } else { csv::Trim::Headers })
            .flexible(self.flexible)
            .from_reader(content.as_bytes())
    }
}

/// Header row with trimmed names
fn read_headers(reader: &mut Reader<&[u8]>) -> Result<Vec<String>> {
    reader
        .headers()
        .map(|headers| headers.iter().map(|h| h.trim().to_string()).collect())
        .map_err(|e| SchematicError::parse_at(format!("Failed to read header: {e}"), "row 1"))
}

/// Data rows paired with their 1-based row number in the file
fn read_rows(reader: &mut Reader<&[u8]>) -> Result<Vec<(usize, StringRecord)>> {
    reader
        .records()
        .enumerate()
        .map(|(i, record)| {
            let row = i + FIRST_DATA_ROW;
            record
                .map(|record| (row, record))
                .map_err(|e| SchematicError::parse_at(e.to_string(), format!("row {row}")))
        })
        .collect()
}

/// Split a comma-separated cell into trimmed, non-empty entries
fn split_list(cell: &str) -> Vec<String> {
    cell.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_list() {
        assert_eq!(split_list(" a, b ,,c "), vec!["a", "b", "c"]);
        assert!(split_list("  ").is_empty());
    }

    #[test]
    fn test_row_numbers_start_after_header() {
        let mut reader = CsvOptions::default().reader("A,B\n1,2\n3,4\n");
        assert_eq!(read_headers(&mut reader).unwrap(), vec!["A", "B"]);
        let rows = read_rows(&mut reader).unwrap();
        assert_eq!(rows.iter().map(|(row, _)| *row).collect::<Vec<_>>(), vec![2, 3]);
    }
}
