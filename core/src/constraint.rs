//! Constraint documents synthesized for a root term
//!
//! A [`ConstraintDocument`] is the evaluation-ready description of what a
//! record for one component must contain: per-field constraints, the
//! unconditionally required fields and value-gated conditional clauses.
//! The validator works on these types directly; [`ConstraintDocument::to_json_schema`]
//! exists only for interoperability with external validators.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::fmt;

/// JSON Schema dialect emitted by [`ConstraintDocument::to_json_schema`]
pub const JSON_SCHEMA_DIALECT: &str = "http://json-schema.org/draft-07/schema#";

/// Arity of a field
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Single value
    #[default]
    String,
    /// Delimited list of values
    Array,
}

/// Lexical format a value must have
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueFormat {
    /// Whole number
    Integer,
    /// Number with a decimal point
    Float,
    /// Any number
    Number,
    /// Any string
    String,
    /// `true` / `false`
    Boolean,
    /// ISO 8601 calendar date or date-time
    Date,
    /// Absolute URL
    Url,
}

impl ValueFormat {
    /// Name used in diagnostics and JSON Schema output
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Number => "number",
            Self::String => "string",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::Url => "uri",
        }
    }
}

impl fmt::Display for ValueFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inclusive numeric bounds
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    /// Lower bound
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    /// Upper bound
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
}

impl ValueRange {
    /// Whether `value` lies within the bounds
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        self.minimum.is_none_or(|min| value >= min) && self.maximum.is_none_or(|max| value <= max)
    }
}

impl fmt::Display for ValueRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.minimum, self.maximum) {
            (Some(min), Some(max)) => write!(f, "[{min}, {max}]"),
            (Some(min), None) => write!(f, ">= {min}"),
            (None, Some(max)) => write!(f, "<= {max}"),
            (None, None) => f.write_str("any"),
        }
    }
}

/// Constraints on a single field
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyConstraint {
    /// Arity of the field
    #[serde(rename = "type", default)]
    pub field_type: FieldType,

    /// Allowed values
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enumeration: Option<Vec<String>>,

    /// Regular expression every value must match
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    /// Lexical format
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<ValueFormat>,

    /// Numeric bounds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<ValueRange>,

    /// Minimum number of list items
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_items: Option<usize>,

    /// Values must not repeat across records
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub unique: bool,

    /// Rule tokens that were kept but are not enforced
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub opaque_rules: Vec<String>,
}

impl PropertyConstraint {
    /// Unconstrained single-valued field
    #[must_use]
    pub fn string() -> Self {
        Self::default()
    }

    /// Unconstrained list field
    #[must_use]
    pub fn array() -> Self {
        Self {
            field_type: FieldType::Array,
            ..Self::default()
        }
    }

    /// Restrict to an allowed-value set
    #[must_use]
    pub fn with_enum<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enumeration = Some(values.into_iter().map(Into::into).collect());
        self
    }

    /// Require a regular-expression match
    #[must_use]
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    /// Whether the field holds a list
    #[must_use]
    pub fn is_array(&self) -> bool {
        self.field_type == FieldType::Array
    }

    /// Render as a JSON Schema property
    #[must_use]
    pub fn to_json_schema(&self) -> Value {
        let mut value_schema = Map::new();
        value_schema.insert("type".into(), json!("string"));
        if let Some(values) = &self.enumeration {
            value_schema.insert("enum".into(), json!(values));
        }
        if let Some(pattern) = &self.pattern {
            value_schema.insert("pattern".into(), json!(pattern));
        }
        if let Some(format) = self.format {
            value_schema.insert("format".into(), json!(format.as_str()));
        }
        if let Some(range) = self.range {
            if let Some(min) = range.minimum {
                value_schema.insert("minimum".into(), json!(min));
            }
            if let Some(max) = range.maximum {
                value_schema.insert("maximum".into(), json!(max));
            }
        }

        if !self.is_array() {
            return Value::Object(value_schema);
        }

        let mut array_schema = Map::new();
        array_schema.insert("type".into(), json!("array"));
        array_schema.insert("items".into(), Value::Object(value_schema));
        if let Some(min_items) = self.min_items {
            array_schema.insert("minItems".into(), json!(min_items));
        }
        Value::Object(array_schema)
    }
}

/// "If `on_field` equals `on_value` then ..." clause
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConditionalClause {
    /// Trigger field
    pub on_field: String,
    /// Trigger value
    pub on_value: String,
    /// Fields that become required
    #[serde(default)]
    pub then_requires: Vec<String>,
    /// Constraints that apply to gated fields
    #[serde(default)]
    pub then_constrains: IndexMap<String, PropertyConstraint>,
}

/// Nested constraint document for one root term
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConstraintDocument {
    /// Schema title
    pub title: String,

    /// Label of the root term the document was synthesized for
    pub root: String,

    /// Field constraints keyed by field name, in dependency order
    #[serde(default)]
    pub properties: IndexMap<String, PropertyConstraint>,

    /// Unconditionally required fields, in property order
    #[serde(default)]
    pub required: Vec<String>,

    /// Value-gated clauses
    #[serde(default)]
    pub conditional: Vec<ConditionalClause>,
}

impl ConstraintDocument {
    /// Create an empty document for `root`
    pub fn new(root: impl Into<String>) -> Self {
        let root = root.into();
        Self {
            title: format!("{root}_validation"),
            root,
            ..Self::default()
        }
    }

    /// Look up a field's constraint
    #[must_use]
    pub fn property(&self, field: &str) -> Option<&PropertyConstraint> {
        self.properties.get(field)
    }

    /// Whether the field is unconditionally required
    #[must_use]
    pub fn is_required(&self, field: &str) -> bool {
        self.required.iter().any(|f| f == field)
    }

    /// Render as a draft-07 JSON Schema
    #[must_use]
    pub fn to_json_schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .properties
            .iter()
            .map(|(field, constraint)| (field.clone(), constraint.to_json_schema()))
            .collect();

        let all_of: Vec<Value> = self
            .conditional
            .iter()
            .map(|clause| self.clause_to_json_schema(clause))
            .collect();

        let mut schema = Map::new();
        schema.insert("$schema".into(), json!(JSON_SCHEMA_DIALECT));
        schema.insert(
            "$id".into(),
            json!(format!("http://example.com/{}", self.title)),
        );
        schema.insert("title".into(), json!(self.title));
        schema.insert("type".into(), json!("object"));
        schema.insert("properties".into(), Value::Object(properties));
        schema.insert("required".into(), json!(self.required));
        if !all_of.is_empty() {
            schema.insert("allOf".into(), Value::Array(all_of));
        }
        Value::Object(schema)
    }

    fn clause_to_json_schema(&self, clause: &ConditionalClause) -> Value {
        let trigger = if self
            .property(&clause.on_field)
            .is_some_and(PropertyConstraint::is_array)
        {
            json!({ "contains": { "const": clause.on_value } })
        } else {
            json!({ "enum": [clause.on_value] })
        };

        let then_properties: Map<String, Value> = clause
            .then_constrains
            .iter()
            .map(|(field, constraint)| (field.clone(), constraint.to_json_schema()))
            .collect();

        json!({
            "if": {
                "properties": { clause.on_field.clone(): trigger },
                "required": [clause.on_field],
            },
            "then": {
                "properties": then_properties,
                "required": clause.then_requires,
            },
        })
    }
}
