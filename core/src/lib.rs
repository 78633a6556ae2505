//! # Schematic Core
//!
//! Core types for curating metadata against a declarative schema graph.
//!
//! This crate provides the building blocks shared by the resolver, synthesizer
//! and validator in `schematic-service`:
//!
//! - **Graph model**: [`Node`], [`Edge`], [`Relationship`] and the read-only
//!   [`SchemaGraph`] query interface with its index-based implementation
//!   [`RelationshipGraph`]
//! - **Snapshots**: [`SharedSchemaGraph`] for atomically replacing a graph
//!   while readers keep working on the previous one
//! - **Constraint documents**: the nested [`ConstraintDocument`] synthesized
//!   for a root term, renderable as JSON Schema
//! - **Diagnostics**: the structured [`Diagnostic`] produced for every
//!   constraint violation
//! - **Errors**: the [`SchematicError`] taxonomy

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Error taxonomy for resolution, synthesis and validation
pub mod error;

/// Node, edge and relationship types
pub mod types;

/// Schema graph query interface and adjacency-table implementation
pub mod graph;

/// Arc-based graph snapshots
pub mod snapshot;

/// Constraint documents synthesized from the graph
pub mod constraint;

/// Structured validation diagnostics
pub mod validation;

/// Label derivation and rule-token helpers
pub mod utils;

pub use constraint::{ConditionalClause, ConstraintDocument, FieldType, PropertyConstraint, ValueFormat, ValueRange};
pub use error::{Result, SchematicError};
pub use graph::{RelationshipGraph, SchemaGraph, SchemaGraphBuilder};
pub use snapshot::SharedSchemaGraph;
pub use types::{Edge, Node, NodeKind, Relationship};
pub use validation::{Diagnostic, DiagnosticKind, Record};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::constraint::*;
    pub use crate::error::{Result, SchematicError};
    pub use crate::graph::{RelationshipGraph, SchemaGraph, SchemaGraphBuilder};
    pub use crate::snapshot::SharedSchemaGraph;
    pub use crate::types::*;
    pub use crate::validation::{Diagnostic, DiagnosticKind, FIRST_DATA_ROW, Record};
}
