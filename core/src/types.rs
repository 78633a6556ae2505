//! Node, edge and relationship types for the schema graph

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::SchematicError;

/// Whether a term is a class or a property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    /// A class term (components, value terms)
    Class,
    /// A property term (attributes)
    Property,
}

/// Typed relationship between two terms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Relationship {
    /// Class hierarchy; never traversed by the resolvers
    SubClassOf,
    /// Property applies to the target class
    DomainIncludes,
    /// Property accepts the target term as a value
    RangeIncludes,
    /// Target attribute is required when the source is present or selected
    RequiresDependency,
    /// Target component must also be described when the source is used
    RequiresComponent,
}

impl Relationship {
    /// All relationship kinds
    pub const ALL: [Relationship; 5] = [
        Self::SubClassOf,
        Self::DomainIncludes,
        Self::RangeIncludes,
        Self::RequiresDependency,
        Self::RequiresComponent,
    ];

    /// Serialized name of the relationship
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SubClassOf => "subClassOf",
            Self::DomainIncludes => "domainIncludes",
            Self::RangeIncludes => "rangeIncludes",
            Self::RequiresDependency => "requiresDependency",
            Self::RequiresComponent => "requiresComponent",
        }
    }
}

impl fmt::Display for Relationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Relationship {
    type Err = SchematicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| SchematicError::parse(format!("Unknown relationship '{s}'")))
    }
}

/// A labeled term in the schema graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Unique identity key
    pub label: String,

    /// Human-readable name; used as the record field name
    pub display_name: String,

    /// Class or property
    pub kind: NodeKind,

    /// Allowed literal values, in declaration order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub valid_values: Vec<String>,

    /// Raw validation-rule tokens
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validation_rules: Vec<String>,

    /// Whether the attribute is unconditionally mandatory for its declaring component
    #[serde(default)]
    pub required: bool,

    /// Free-text description carried from the data model
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Node {
    /// Create a node whose display name equals its label
    pub fn new(label: impl Into<String>, kind: NodeKind) -> Self {
        let label = label.into();
        Self {
            display_name: label.clone(),
            label,
            kind,
            valid_values: Vec::new(),
            validation_rules: Vec::new(),
            required: false,
            description: None,
        }
    }

    /// Create a class node
    pub fn class(label: impl Into<String>) -> Self {
        Self::new(label, NodeKind::Class)
    }

    /// Create a property node
    pub fn property(label: impl Into<String>) -> Self {
        Self::new(label, NodeKind::Property)
    }

    /// Set the display name
    #[must_use]
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    /// Set the allowed values
    #[must_use]
    pub fn with_valid_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.valid_values = values.into_iter().map(Into::into).collect();
        self
    }

    /// Set the raw validation-rule tokens
    #[must_use]
    pub fn with_rules<I, S>(mut self, rules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.validation_rules = rules.into_iter().map(Into::into).collect();
        self
    }

    /// Set the required flag
    #[must_use]
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Set the description
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Whether the node carries an allowed-value set
    #[must_use]
    pub fn is_enumerated(&self) -> bool {
        !self.valid_values.is_empty()
    }
}

/// A typed edge between two labels
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    /// Source label
    pub source: String,
    /// Target label
    pub target: String,
    /// Relationship kind
    pub relationship: Relationship,
}

impl Edge {
    /// Create a new edge
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        relationship: Relationship,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            relationship,
        }
    }
}
