//! Tabular data-model loader
//!
//! Each row of the data model declares one term. Comma-separated cells
//! reference other terms by display name and become typed edges:
//!
//! | Column | Edge |
//! |---|---|
//! | `Valid Values` | term `rangeIncludes` value |
//! | `DependsOn` | term `requiresDependency` attribute |
//! | `Parent` | term `subClassOf` parent |
//! | `DependsOn Component` | term `requiresComponent` component |
//! | `Properties` | property `domainIncludes` term |
//!
//! Terms that are referenced but never declared get an implicit node.

use schematic_core::prelude::*;
use schematic_core::utils::{EntryType, LabelStyle, label_from_display_name};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::{debug, info};

use super::{CsvOptions, read_headers, read_rows, split_list};

/// Column names of a data-model table
pub mod columns {
    /// Display name of the term
    pub const ATTRIBUTE: &str = "Attribute";
    /// Free-text description
    pub const DESCRIPTION: &str = "Description";
    /// Allowed values
    pub const VALID_VALUES: &str = "Valid Values";
    /// Attributes required by the term
    pub const DEPENDS_ON: &str = "DependsOn";
    /// Properties whose domain includes the term
    pub const PROPERTIES: &str = "Properties";
    /// Required flag
    pub const REQUIRED: &str = "Required";
    /// Parent classes
    pub const PARENT: &str = "Parent";
    /// Components required by the term
    pub const DEPENDS_ON_COMPONENT: &str = "DependsOn Component";
    /// Raw validation rules
    pub const VALIDATION_RULES: &str = "Validation Rules";
}

/// One parsed data-model row
#[derive(Debug, Default)]
struct ModelRow {
    row: usize,
    attribute: String,
    description: String,
    valid_values: Vec<String>,
    depends_on: Vec<String>,
    properties: Vec<String>,
    required: bool,
    parents: Vec<String>,
    depends_on_component: Vec<String>,
    validation_rules: String,
}

fn parse_required(cell: &str, row: usize) -> Result<bool> {
    match cell.to_ascii_lowercase().as_str() {
        "" | "false" | "no" | "0" => Ok(false),
        "true" | "yes" | "1" => Ok(true),
        other => Err(SchematicError::parse_at(
            format!("'{other}' is not a valid {} flag", columns::REQUIRED),
            format!("row {row}"),
        )),
    }
}

/// Loads a CSV data model into a [`RelationshipGraph`]
#[derive(Debug, Clone, Default)]
pub struct DataModelLoader {
    options: CsvOptions,
    label_style: LabelStyle,
    strict_camel_case: bool,
}

impl DataModelLoader {
    /// Create a loader with default options
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use custom CSV options
    #[must_use]
    pub fn with_options(mut self, options: CsvOptions) -> Self {
        self.options = options;
        self
    }

    /// Choose how labels are derived from display names
    #[must_use]
    pub fn with_label_style(mut self, label_style: LabelStyle, strict_camel_case: bool) -> Self {
        self.label_style = label_style;
        self.strict_camel_case = strict_camel_case;
        self
    }

    /// Read and parse a data-model file
    ///
    /// # Errors
    ///
    /// Returns `SchematicError::IoError` if the file cannot be read and the
    /// errors of [`Self::parse_str`] otherwise.
    pub async fn load_file(&self, path: &Path) -> Result<RelationshipGraph> {
        let content = tokio::fs::read_to_string(path).await?;
        let graph = self.parse_str(&content)?;
        info!(
            path = %path.display(),
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "Loaded data model"
        );
        Ok(graph)
    }

    /// Parse data-model CSV text
    ///
    /// # Errors
    ///
    /// Returns `SchematicError::ParseError` for unreadable CSV, a missing
    /// `Attribute` column, an empty or repeated attribute, or a bad
    /// `Required` flag, and `SchematicError::MalformedGraph` if the
    /// resulting graph is inconsistent.
    pub fn parse_str(&self, content: &str) -> Result<RelationshipGraph> {
        let rows = self.parse_rows(content)?;

        let property_names: HashSet<&str> = rows
            .iter()
            .flat_map(|row| row.properties.iter().map(String::as_str))
            .collect();
        let entry_type = |name: &str| {
            if property_names.contains(name) {
                EntryType::Property
            } else {
                EntryType::Class
            }
        };

        let mut labels: HashMap<String, String> = HashMap::new();
        let mut label_of = |name: &str| -> String {
            labels
                .entry(name.to_string())
                .or_insert_with(|| {
                    label_from_display_name(
                        name,
                        entry_type(name),
                        self.strict_camel_case,
                        self.label_style,
                    )
                })
                .clone()
        };

        let mut builder = SchemaGraphBuilder::new();
        for row in &rows {
            let label = label_of(&row.attribute);
            let kind = match entry_type(&row.attribute) {
                EntryType::Class => NodeKind::Class,
                EntryType::Property => NodeKind::Property,
            };
            let mut node = Node::new(label.as_str(), kind)
                .with_display_name(row.attribute.as_str())
                .required(row.required);
            if !row.description.is_empty() {
                node = node.with_description(row.description.as_str());
            }
            if !row.validation_rules.is_empty() {
                node = node.with_rules([row.validation_rules.as_str()]);
            }
            if builder.contains_node(&label) {
                return Err(SchematicError::parse_at(
                    format!(
                        "Attribute '{}' maps to label '{label}' which is already declared",
                        row.attribute
                    ),
                    format!("row {}", row.row),
                ));
            }
            builder.add_node(node);
        }

        for row in &rows {
            let source = label_of(&row.attribute);
            let references = [
                (&row.valid_values, Relationship::RangeIncludes),
                (&row.depends_on, Relationship::RequiresDependency),
                (&row.parents, Relationship::SubClassOf),
                (&row.depends_on_component, Relationship::RequiresComponent),
            ];
            for (names, relationship) in references {
                for name in names {
                    let target = label_of(name);
                    upsert_implicit(&mut builder, &target, name, entry_type(name));
                    builder.add_edge(source.as_str(), target, relationship);
                }
            }
            for name in &row.properties {
                let property = label_of(name);
                upsert_implicit(&mut builder, &property, name, EntryType::Property);
                builder.add_edge(property, source.as_str(), Relationship::DomainIncludes);
            }
        }

        builder.build()
    }

    fn parse_rows(&self, content: &str) -> Result<Vec<ModelRow>> {
        let mut reader = self.options.reader(content);
        let headers = read_headers(&mut reader)?;
        let position: HashMap<&str, usize> = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.as_str(), i))
            .collect();
        if !position.contains_key(columns::ATTRIBUTE) {
            return Err(SchematicError::parse_at(
                format!("Data model has no '{}' column", columns::ATTRIBUTE),
                "row 1",
            ));
        }

        let mut seen: HashSet<String> = HashSet::new();
        let mut rows = Vec::new();
        for (row, record) in read_rows(&mut reader)? {
            let get = |column: &str| {
                position
                    .get(column)
                    .and_then(|&i| record.get(i))
                    .map_or("", str::trim)
            };

            let attribute = get(columns::ATTRIBUTE);
            if attribute.is_empty() {
                if record.iter().all(|cell| cell.trim().is_empty()) {
                    continue;
                }
                return Err(SchematicError::parse_at(
                    format!("Empty '{}' cell", columns::ATTRIBUTE),
                    format!("row {row}"),
                ));
            }
            if !seen.insert(attribute.to_string()) {
                return Err(SchematicError::parse_at(
                    format!("Attribute '{attribute}' is declared more than once"),
                    format!("row {row}"),
                ));
            }

            rows.push(ModelRow {
                row,
                attribute: attribute.to_string(),
                description: get(columns::DESCRIPTION).to_string(),
                valid_values: split_list(get(columns::VALID_VALUES)),
                depends_on: split_list(get(columns::DEPENDS_ON)),
                properties: split_list(get(columns::PROPERTIES)),
                required: parse_required(get(columns::REQUIRED), row)?,
                parents: split_list(get(columns::PARENT)),
                depends_on_component: split_list(get(columns::DEPENDS_ON_COMPONENT)),
                validation_rules: get(columns::VALIDATION_RULES).to_string(),
            });
        }

        debug!(rows = rows.len(), "Parsed data model rows");
        Ok(rows)
    }
}

fn upsert_implicit(builder: &mut SchemaGraphBuilder, label: &str, name: &str, entry_type: EntryType) {
    if builder.contains_node(label) {
        return;
    }
    let kind = match entry_type {
        EntryType::Class => NodeKind::Class,
        EntryType::Property => NodeKind::Property,
    };
    debug!(label, "Adding implicit term '{name}'");
    builder.upsert_node(label, || Node::new(label, kind).with_display_name(name));
}
