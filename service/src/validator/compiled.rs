//! Constraint document compiled for repeated record evaluation

use chrono::{DateTime, NaiveDate};
use regex::Regex;
use schematic_core::prelude::*;
use schematic_core::validation::display_value;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use url::Url;

/// Delimiter between items of a list-valued cell
pub const LIST_DELIMITER: char = ',';

/// One field's constraint with its regex compiled and allowed values hashed
#[derive(Debug, Clone)]
pub struct CompiledField {
    /// Field name (column header)
    pub name: String,
    constraint: PropertyConstraint,
    pattern: Option<Regex>,
    allowed: Option<HashSet<String>>,
}

impl CompiledField {
    fn compile(name: &str, constraint: &PropertyConstraint) -> Result<Self> {
        let pattern = constraint
            .pattern
            .as_deref()
            .map(Regex::new)
            .transpose()
            .map_err(|e| {
                SchematicError::malformed_schema_at(
                    format!("Pattern of field '{name}' does not compile: {e}"),
                    name,
                )
            })?;

        if constraint.enumeration.as_ref().is_some_and(Vec::is_empty) {
            return Err(SchematicError::malformed_schema_at(
                format!("Field '{name}' has an empty enumeration"),
                name,
            ));
        }

        if let Some(ValueRange {
            minimum: Some(min),
            maximum: Some(max),
        }) = constraint.range
            && min > max
        {
            return Err(SchematicError::malformed_schema_at(
                format!("Field '{name}' has an inverted range {min} > {max}"),
                name,
            ));
        }

        Ok(Self {
            name: name.to_string(),
            constraint: constraint.clone(),
            pattern,
            allowed: constraint
                .enumeration
                .as_ref()
                .map(|values| values.iter().cloned().collect()),
        })
    }

    /// Whether values must not repeat across records
    #[must_use]
    pub fn is_unique(&self) -> bool {
        self.constraint.unique
    }

    fn allows(&self, value: &str) -> bool {
        self.allowed.as_ref().is_none_or(|allowed| allowed.contains(value))
    }

    /// Value checks for a non-empty cell
    fn check_value(&self, index: usize, value: &str, out: &mut Vec<Diagnostic>) {
        if !self.constraint.is_array() {
            self.check_item(index, value, None, out);
            return;
        }

        let items: Vec<&str> = value.split(LIST_DELIMITER).map(str::trim).collect();
        for (i, item) in items.iter().enumerate() {
            if item.is_empty() {
                out.push(
                    Diagnostic::new(
                        index,
                        DiagnosticKind::ArityMismatch,
                        &self.name,
                        value,
                        format!("{} has an empty list item at position {i}", self.name),
                    )
                    .at_item(i),
                );
            } else {
                self.check_item(index, item, Some(i), out);
            }
        }

        if let Some(min_items) = self.constraint.min_items {
            let present = items.iter().filter(|item| !item.is_empty()).count();
            if present < min_items {
                out.push(Diagnostic::new(
                    index,
                    DiagnosticKind::ArityMismatch,
                    &self.name,
                    value,
                    format!(
                        "{} has {present} items but at least {min_items} are required",
                        self.name
                    ),
                ));
            }
        }
    }

    fn check_item(&self, index: usize, value: &str, item: Option<usize>, out: &mut Vec<Diagnostic>) {
        let locate = |diagnostic: Diagnostic| match item {
            Some(i) => diagnostic.at_item(i),
            None => diagnostic,
        };

        let mut format_ok = true;
        if let Some(format) = self.constraint.format
            && !matches_format(format, value)
        {
            format_ok = false;
            out.push(locate(Diagnostic::new(
                index,
                DiagnosticKind::FormatMismatch,
                &self.name,
                value,
                format!("'{value}' is not a valid {format} for {}", self.name),
            )));
        }

        if !self.allows(value) {
            let allowed = self.constraint.enumeration.as_deref().unwrap_or_default();
            out.push(locate(
                Diagnostic::new(
                    index,
                    DiagnosticKind::InvalidValue,
                    &self.name,
                    value,
                    format!("'{value}' is not one of the allowed values of {}", self.name),
                )
                .with_allowed_values(allowed),
            ));
        }

        if let Some(pattern) = &self.pattern
            && !pattern.is_match(value)
        {
            out.push(locate(Diagnostic::new(
                index,
                DiagnosticKind::PatternMismatch,
                &self.name,
                value,
                format!(
                    "'{value}' does not match the pattern '{}' of {}",
                    pattern.as_str(),
                    self.name
                ),
            )));
        }

        if let Some(range) = self.constraint.range {
            match parse_number(value) {
                Some(number) if !range.contains(number) => {
                    out.push(locate(Diagnostic::new(
                        index,
                        DiagnosticKind::OutOfRange,
                        &self.name,
                        value,
                        format!("{value} is outside the range {range} of {}", self.name),
                    )));
                }
                None if format_ok => {
                    out.push(locate(Diagnostic::new(
                        index,
                        DiagnosticKind::FormatMismatch,
                        &self.name,
                        value,
                        format!("'{value}' is not a number; {} has a numeric range", self.name),
                    )));
                }
                _ => {}
            }
        }
    }
}

fn parse_number(value: &str) -> Option<f64> {
    value.parse::<f64>().ok().filter(|n| n.is_finite())
}

fn matches_format(format: ValueFormat, value: &str) -> bool {
    match format {
        ValueFormat::Integer => value.parse::<i64>().is_ok(),
        ValueFormat::Float | ValueFormat::Number => parse_number(value).is_some(),
        ValueFormat::String => true,
        ValueFormat::Boolean => {
            value.eq_ignore_ascii_case("true") || value.eq_ignore_ascii_case("false")
        }
        ValueFormat::Date => {
            NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
                || DateTime::parse_from_rfc3339(value).is_ok()
        }
        ValueFormat::Url => Url::parse(value).is_ok(),
    }
}

/// Compiled conditional clause
#[derive(Debug, Clone)]
struct CompiledClause {
    on_field: String,
    on_value: String,
    trigger_is_array: bool,
    then_requires: Vec<String>,
    /// Constraints that differ from the field's base constraint
    then_fields: Vec<CompiledField>,
}

/// A [`ConstraintDocument`] ready to evaluate records
#[derive(Debug, Clone)]
pub struct CompiledSchema {
    fields: Vec<CompiledField>,
    required: Vec<String>,
    clauses: Vec<CompiledClause>,
}

impl CompiledSchema {
    /// Compile and structurally check a constraint document
    ///
    /// # Errors
    ///
    /// Returns `SchematicError::MalformedSchema` for a pattern that does not
    /// compile, an empty enumeration, an inverted range, a required or
    /// conditional field that is not a property, or a conditional trigger
    /// value outside its field's enumeration.
    pub fn compile(document: &ConstraintDocument) -> Result<Self> {
        let fields = document
            .properties
            .iter()
            .map(|(name, constraint)| CompiledField::compile(name, constraint))
            .collect::<Result<Vec<_>>>()?;

        let declared = |field: &str, role: &str| -> Result<()> {
            if document.properties.contains_key(field) {
                Ok(())
            } else {
                Err(SchematicError::malformed_schema_at(
                    format!("{role} field '{field}' is not a property of '{}'", document.title),
                    field,
                ))
            }
        };

        for field in &document.required {
            declared(field.as_str(), "Required")?;
        }

        let mut clauses = Vec::with_capacity(document.conditional.len());
        for clause in &document.conditional {
            declared(clause.on_field.as_str(), "Conditional trigger")?;
            let trigger = &document.properties[clause.on_field.as_str()];
            if let Some(values) = &trigger.enumeration
                && !values.contains(&clause.on_value)
            {
                return Err(SchematicError::malformed_schema_at(
                    format!(
                        "Conditional value '{}' is not an allowed value of '{}'",
                        clause.on_value, clause.on_field
                    ),
                    clause.on_field.clone(),
                ));
            }

            for field in &clause.then_requires {
                declared(field.as_str(), "Conditionally required")?;
            }

            let mut then_fields = Vec::new();
            for (field, constraint) in &clause.then_constrains {
                declared(field.as_str(), "Conditionally constrained")?;
                if document.properties.get(field) != Some(constraint) {
                    then_fields.push(CompiledField::compile(field, constraint)?);
                }
            }

            clauses.push(CompiledClause {
                on_field: clause.on_field.clone(),
                on_value: clause.on_value.clone(),
                trigger_is_array: trigger.is_array(),
                then_requires: clause.then_requires.clone(),
                then_fields,
            });
        }

        Ok(Self {
            fields,
            required: document.required.clone(),
            clauses,
        })
    }

    /// All diagnostics for the record at zero-based `index`, except
    /// cross-record uniqueness
    #[must_use]
    pub fn check_record(&self, index: usize, record: &Record) -> Vec<Diagnostic> {
        let mut out = Vec::new();

        for field in &self.required {
            if cell(record, field).is_none() {
                out.push(Diagnostic::new(
                    index,
                    DiagnosticKind::MissingRequired,
                    field,
                    "",
                    format!("{field} is a required field"),
                ));
            }
        }

        for field in &self.fields {
            if let Some(value) = cell(record, &field.name) {
                field.check_value(index, &value, &mut out);
            }
        }

        for clause in &self.clauses {
            if !clause.is_triggered(record) {
                continue;
            }
            for field in &clause.then_requires {
                if cell(record, field).is_none() {
                    out.push(Diagnostic::new(
                        index,
                        DiagnosticKind::ConditionalRequirement,
                        field,
                        "",
                        format!(
                            "{field} is required when {} is '{}'",
                            clause.on_field, clause.on_value
                        ),
                    ));
                }
            }
            for field in &clause.then_fields {
                if let Some(value) = cell(record, &field.name) {
                    field.check_value(index, &value, &mut out);
                }
            }
        }

        out
    }

    /// Diagnostics for values of `unique` fields that repeat an earlier row
    #[must_use]
    pub fn check_unique(&self, records: &[Record]) -> Vec<Diagnostic> {
        let mut out = Vec::new();

        for field in self.fields.iter().filter(|field| field.is_unique()) {
            let mut first_seen: HashMap<String, usize> = HashMap::new();
            for (index, record) in records.iter().enumerate() {
                let Some(value) = cell(record, &field.name) else {
                    continue;
                };
                match first_seen.get(&value) {
                    Some(&first) => out.push(Diagnostic::new(
                        index,
                        DiagnosticKind::DuplicateValue,
                        &field.name,
                        value.as_str(),
                        format!(
                            "'{value}' in {} repeats the value of row {}",
                            field.name,
                            first + FIRST_DATA_ROW
                        ),
                    )),
                    None => {
                        first_seen.insert(value, index);
                    }
                }
            }
        }

        out
    }

    /// Whether any field needs the cross-record pass
    #[must_use]
    pub fn has_unique_fields(&self) -> bool {
        self.fields.iter().any(CompiledField::is_unique)
    }
}

impl CompiledClause {
    fn is_triggered(&self, record: &Record) -> bool {
        let Some(value) = cell(record, &self.on_field) else {
            return false;
        };
        if self.trigger_is_array {
            value
                .split(LIST_DELIMITER)
                .map(str::trim)
                .any(|item| item == self.on_value)
        } else {
            value == self.on_value
        }
    }
}

/// The trimmed cell text, or `None` when the cell is empty
#[must_use]
pub fn cell(record: &Record, field: &str) -> Option<String> {
    match record.get(field) {
        None | Some(Value::Null) => None,
        Some(value) => {
            let text = display_value(value);
            let trimmed = text.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
    }
}
