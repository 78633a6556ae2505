//! Error types for schema-graph operations

use crate::types::Relationship;
use thiserror::Error;

/// Main error type for resolution, synthesis and validation
#[derive(Error, Debug)]
pub enum SchematicError {
    /// A root or referenced label is absent from the graph
    #[error("Term '{label}' not found in schema graph")]
    NotFound {
        /// The missing label
        label: String,
    },

    /// The subgraph along a relationship contains a cycle
    #[error("Cycle detected along '{relationship}' edges at term '{label}'")]
    CycleDetected {
        /// Relationship kind being traversed
        relationship: Relationship,
        /// A term that lies on the cycle
        label: String,
    },

    /// A node lacks data required to synthesize a constraint it declares
    #[error("Malformed schema graph: {message}")]
    MalformedGraph {
        /// Error message
        message: String,
        /// Offending term if known
        label: Option<String>,
    },

    /// A constraint document cannot be evaluated
    #[error("Malformed constraint document: {message}")]
    MalformedSchema {
        /// Error message
        message: String,
        /// Offending field if known
        field: Option<String>,
    },

    /// Input parsing errors (data models, manifests)
    #[error("Failed to parse input: {message}")]
    ParseError {
        /// Error message
        message: String,
        /// Location in the input if available
        location: Option<String>,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// IO errors
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// Result type alias for schema-graph operations
pub type Result<T> = std::result::Result<T, SchematicError>;

impl SchematicError {
    /// Create a not-found error
    #[must_use]
    pub fn not_found(label: impl Into<String>) -> Self {
        Self::NotFound {
            label: label.into(),
        }
    }

    /// Create a cycle error
    #[must_use]
    pub fn cycle(relationship: Relationship, label: impl Into<String>) -> Self {
        Self::CycleDetected {
            relationship,
            label: label.into(),
        }
    }

    /// Create a malformed graph error
    #[must_use]
    pub fn malformed_graph(message: impl Into<String>) -> Self {
        Self::MalformedGraph {
            message: message.into(),
            label: None,
        }
    }

    /// Create a malformed graph error naming the offending term
    #[must_use]
    pub fn malformed_graph_at(message: impl Into<String>, label: impl Into<String>) -> Self {
        Self::MalformedGraph {
            message: message.into(),
            label: Some(label.into()),
        }
    }

    /// Create a malformed schema error
    #[must_use]
    pub fn malformed_schema(message: impl Into<String>) -> Self {
        Self::MalformedSchema {
            message: message.into(),
            field: None,
        }
    }

    /// Create a malformed schema error naming the offending field
    #[must_use]
    pub fn malformed_schema_at(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::MalformedSchema {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create a new parse error
    #[must_use]
    pub fn parse(message: impl Into<String>) -> Self {
        Self::ParseError {
            message: message.into(),
            location: None,
        }
    }

    /// Create a new parse error with location
    #[must_use]
    pub fn parse_at(message: impl Into<String>, location: impl Into<String>) -> Self {
        Self::ParseError {
            message: message.into(),
            location: Some(location.into()),
        }
    }

    /// Create a new configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError(message.into())
    }

    /// Create a serialization error
    #[must_use]
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::SerializationError(message.into())
    }

    /// Whether this error reports a schema-authoring problem
    /// (missing term, cycle, or incomplete node) rather than bad input or I/O
    #[must_use]
    pub fn is_authoring_error(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. } | Self::CycleDetected { .. } | Self::MalformedGraph { .. }
        )
    }
}

impl From<serde_json::Error> for SchematicError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = SchematicError::not_found("Patient");
        assert!(matches!(err, SchematicError::NotFound { .. }));

        let err = SchematicError::malformed_schema_at("bad pattern", "Sex");
        match err {
            SchematicError::MalformedSchema { field, .. } => {
                assert_eq!(field.as_deref(), Some("Sex"));
            }
            _ => panic!("Wrong error type"),
        }
    }

    #[test]
    fn test_error_display() {
        let err = SchematicError::cycle(Relationship::RequiresComponent, "Biospecimen");
        let display = err.to_string();
        assert!(display.contains("requiresComponent"));
        assert!(display.contains("Biospecimen"));
    }

    #[test]
    fn test_authoring_errors() {
        assert!(SchematicError::not_found("x").is_authoring_error());
        assert!(SchematicError::malformed_graph("x").is_authoring_error());
        assert!(!SchematicError::malformed_schema("x").is_authoring_error());
        assert!(!SchematicError::config("x").is_authoring_error());
    }

    #[test]
    fn test_error_conversions() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid").unwrap_err();
        let err: SchematicError = json_err.into();
        assert!(matches!(err, SchematicError::SerializationError(_)));
    }
}
