//! # Schematic Service
//!
//! Dependency resolution, validation-schema synthesis and record validation
//! over a metadata data model.
//!
//! ## Overview
//!
//! A data model is a graph of terms connected by typed relationships
//! (see [`schematic_core`]). This crate answers two questions about it:
//!
//! - **What must be filled in, and in what order?** [`resolver`] orders the
//!   attributes a component depends on and lists the components it requires.
//! - **Does a record satisfy those requirements?** [`synthesizer`] builds a
//!   [`ConstraintDocument`](schematic_core::ConstraintDocument) for a root
//!   term and [`validator`] turns every violation in a batch of records into
//!   a [`Diagnostic`](schematic_core::Diagnostic).
//!
//! ## Quick Start
//!
//! ```rust
//! use schematic_service::prelude::*;
//! use serde_json::json;
//!
//! let graph = SchemaGraphBuilder::new()
//!     .node(Node::class("Patient"))
//!     .node(Node::property("Diagnosis").required(true))
//!     .node(Node::class("Cancer"))
//!     .node(Node::class("Healthy"))
//!     .node(Node::property("CancerType").with_display_name("Cancer Type"))
//!     .edge("Patient", "Diagnosis", Relationship::RequiresDependency)
//!     .edge("Diagnosis", "Cancer", Relationship::RangeIncludes)
//!     .edge("Diagnosis", "Healthy", Relationship::RangeIncludes)
//!     .edge("Cancer", "CancerType", Relationship::RequiresDependency)
//!     .build()?;
//!
//! let schema = build_schema(&graph, "Patient")?;
//! let record = Record::from([
//!     ("Diagnosis".to_string(), json!("Cancer")),
//!     ("Cancer Type".to_string(), json!("")),
//! ]);
//!
//! let diagnostics = validate(&[record], &schema)?;
//! assert_eq!(diagnostics.len(), 1);
//! assert_eq!(diagnostics[0].row, 2);
//! # Ok::<(), SchematicError>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_panics_doc)] // panics only in tests

/// Dependency and component resolution
pub mod resolver;

/// Validation-schema synthesis
pub mod synthesizer;

/// Record validation
pub mod validator;

/// CSV data-model and manifest loaders
pub mod loader;

/// Configuration loading
pub mod config;

/// Metadata model facade
pub mod model;

/// Command-line front end
pub mod cli;

/// Prelude module for convenient imports
pub mod prelude;

pub use config::SchematicConfig;
pub use model::MetadataModel;
pub use resolver::{ComponentRequirementResolver, DependencyResolver, ordered_descendants, required_components};
pub use synthesizer::{ValidationSchemaSynthesizer, build_schema};
pub use validator::{RecordValidator, ValidationOptions, validate};
