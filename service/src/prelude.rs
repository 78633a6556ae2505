//! Prelude module for the schematic service
//!
//! This module re-exports commonly used types and functions for convenient import.

pub use schematic_core::prelude::*;

pub use crate::config::SchematicConfig;
pub use crate::loader::{CsvOptions, DataModelLoader, ManifestLoader};
pub use crate::model::MetadataModel;
pub use crate::resolver::{
    ComponentRequirementResolver, DependencyResolver, ordered_descendants, required_components,
};
pub use crate::synthesizer::{ValidationSchemaSynthesizer, build_schema};
pub use crate::validator::{RecordValidator, ValidationOptions, validate};
