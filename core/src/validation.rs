//! Structured validation diagnostics
//!
//! A [`Diagnostic`] is data, not an error: the record validator collects one
//! per violation and returns them all.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// A flat record (one table row) keyed by column header
pub type Record = IndexMap<String, Value>;

/// Row number of the first data row; row 1 holds the header
pub const FIRST_DATA_ROW: usize = 2;

/// Category of a constraint violation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// An unconditionally required field is empty
    MissingRequired,
    /// A field required by a conditional clause is empty
    ConditionalRequirement,
    /// Value outside the allowed-value set
    InvalidValue,
    /// Value does not match the field's pattern
    PatternMismatch,
    /// Value does not have the field's lexical format
    FormatMismatch,
    /// Numeric value outside the field's bounds
    OutOfRange,
    /// List has the wrong shape
    ArityMismatch,
    /// Value repeats a value from an earlier row
    DuplicateValue,
}

impl DiagnosticKind {
    /// Stable code for programmatic handling
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::MissingRequired => "MISSING_REQUIRED",
            Self::ConditionalRequirement => "CONDITIONAL_REQUIREMENT_NOT_MET",
            Self::InvalidValue => "INVALID_VALUE",
            Self::PatternMismatch => "PATTERN_MISMATCH",
            Self::FormatMismatch => "FORMAT_MISMATCH",
            Self::OutOfRange => "OUT_OF_RANGE",
            Self::ArityMismatch => "ARITY_MISMATCH",
            Self::DuplicateValue => "DUPLICATE_VALUE",
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// One constraint violation in one record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Row number as the table author sees it (first data row is 2)
    pub row: usize,
    /// Offending field names
    pub fields: Vec<String>,
    /// Zero-based position of the offending item in a list field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item: Option<usize>,
    /// The value that was supplied (empty when the field was missing)
    pub supplied_value: String,
    /// Allowed values; non-empty only for enumeration violations
    #[serde(default)]
    pub allowed_values: Vec<String>,
    /// Violation category
    pub kind: DiagnosticKind,
    /// Human-readable message
    pub message: String,
}

impl Diagnostic {
    /// Create a diagnostic for the record at zero-based `index`
    pub fn new(
        index: usize,
        kind: DiagnosticKind,
        field: impl Into<String>,
        supplied_value: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            row: index + FIRST_DATA_ROW,
            fields: vec![field.into()],
            item: None,
            supplied_value: supplied_value.into(),
            allowed_values: Vec::new(),
            kind,
            message: message.into(),
        }
    }

    /// Attach the allowed values of an enumeration
    #[must_use]
    pub fn with_allowed_values(mut self, values: &[String]) -> Self {
        self.allowed_values = values.to_vec();
        self
    }

    /// Narrow the location to one list item
    #[must_use]
    pub fn at_item(mut self, item: usize) -> Self {
        self.item = Some(item);
        self
    }

    /// The offending field name
    #[must_use]
    pub fn field(&self) -> &str {
        self.fields.first().map_or("", String::as_str)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "At row {}", self.row)?;
        if let Some(item) = self.item {
            write!(f, ", item {item}")?;
        }
        write!(f, ": [{}] {}", self.kind, self.message)?;
        if !self.allowed_values.is_empty() {
            write!(f, " (allowed: {})", self.allowed_values.join(", "))?;
        }
        Ok(())
    }
}

/// Render a value the way it was typed into the table
#[must_use]
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
