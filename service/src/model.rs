//! Metadata model facade
//!
//! [`MetadataModel`] ties a data-model snapshot to the configuration and
//! exposes the resolver, synthesizer and validator operations against it.

use schematic_core::prelude::*;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use crate::config::SchematicConfig;
use crate::loader::{DataModelLoader, ManifestLoader};
use crate::resolver::{ComponentRequirementResolver, DependencyResolver};
use crate::synthesizer::ValidationSchemaSynthesizer;
use crate::validator::RecordValidator;

/// A loaded data model plus the services that operate on it
#[derive(Debug)]
pub struct MetadataModel {
    graph: SharedSchemaGraph,
    config: SchematicConfig,
    validator: RecordValidator,
}

impl MetadataModel {
    /// Wrap an already built graph
    ///
    /// # Errors
    ///
    /// Returns `SchematicError::ConfigError` if the configuration is invalid.
    pub fn new(graph: RelationshipGraph, config: SchematicConfig) -> Result<Self> {
        config.validate()?;
        let validator = RecordValidator::with_options(config.validation_options())?;
        Ok(Self {
            graph: SharedSchemaGraph::new(graph),
            config,
            validator,
        })
    }

    /// Load the data model named by `config.model.location`, or by `path`
    /// when given
    ///
    /// # Errors
    ///
    /// Returns `SchematicError::ConfigError` if no location is known and the
    /// loader's errors otherwise.
    pub async fn load(config: SchematicConfig, path: Option<&Path>) -> Result<Self> {
        let location = path
            .map(Path::to_path_buf)
            .or_else(|| config.model.location.clone())
            .ok_or_else(|| SchematicError::config("No data model location configured"))?;

        let graph = DataModelLoader::new()
            .with_options(config.csv_options()?)
            .with_label_style(config.model.label_style, config.model.strict_camel_case)
            .load_file(&location)
            .await?;
        Self::new(graph, config)
    }

    /// The active configuration
    #[must_use]
    pub fn config(&self) -> &SchematicConfig {
        &self.config
    }

    /// The current graph snapshot
    #[must_use]
    pub fn graph(&self) -> Arc<RelationshipGraph> {
        self.graph.snapshot()
    }

    /// Terms `root` depends on along `relationship`, dependents first
    ///
    /// # Errors
    ///
    /// Returns `SchematicError::NotFound` or `SchematicError::CycleDetected`.
    pub fn ordered_model_nodes(&self, root: &str, relationship: Relationship) -> Result<Vec<String>> {
        let graph = self.graph();
        DependencyResolver::new(graph.as_ref()).ordered_descendants(root, relationship)
    }

    /// Components `source` transitively requires
    ///
    /// # Errors
    ///
    /// Returns `SchematicError::NotFound` or `SchematicError::CycleDetected`.
    pub fn component_requirements(&self, source: &str) -> Result<Vec<String>> {
        let graph = self.graph();
        ComponentRequirementResolver::new(graph.as_ref()).required_components(source)
    }

    /// Constraint document for records of `root`
    ///
    /// # Errors
    ///
    /// Returns `SchematicError::NotFound`, `SchematicError::CycleDetected` or
    /// `SchematicError::MalformedGraph`.
    pub fn validation_schema(&self, root: &str) -> Result<ConstraintDocument> {
        let graph = self.graph();
        ValidationSchemaSynthesizer::new(graph.as_ref())
            .with_component_marker(self.config.model.component_marker.as_str())
            .build_schema(root)
    }

    /// Validate records against a constraint document
    ///
    /// # Errors
    ///
    /// Returns `SchematicError::MalformedSchema` if `schema` is unusable.
    pub fn validate_records(&self, records: &[Record], schema: &ConstraintDocument) -> Result<Vec<Diagnostic>> {
        self.validator.validate(records, schema)
    }

    /// Load a manifest and validate it against `schema`, or against the
    /// document synthesized for `root` when no schema is given
    ///
    /// # Errors
    ///
    /// Returns loader, synthesis or schema errors; data problems are
    /// reported as diagnostics.
    pub async fn validate_manifest(
        &self,
        path: &Path,
        root: &str,
        schema: Option<&ConstraintDocument>,
    ) -> Result<Vec<Diagnostic>> {
        let records = ManifestLoader::with_options(self.config.csv_options()?)
            .load_file(path)
            .await?;

        let synthesized;
        let schema = match schema {
            Some(schema) => schema,
            None => {
                synthesized = self.validation_schema(root)?;
                &synthesized
            }
        };

        let diagnostics = self.validate_records(&records, schema)?;
        info!(
            path = %path.display(),
            root,
            diagnostics = diagnostics.len(),
            "Validated manifest"
        );
        Ok(diagnostics)
    }

    /// Swap in a new graph; calls already running keep the previous snapshot
    pub fn reload(&self, graph: RelationshipGraph) -> Arc<RelationshipGraph> {
        info!(nodes = graph.node_count(), "Reloading data model");
        self.graph.replace(graph)
    }
}
