//! `schematic` CLI application

use clap::Parser;
use schematic_core::{Relationship, Result};
use std::path::Path;
use std::process::ExitCode;
use tokio::fs;
use tracing::{error, info};

use super::types::{SchematicCli, SchematicCommand};
use crate::config::SchematicConfig;
use crate::model::MetadataModel;

/// Main `schematic` CLI application
pub struct SchematicApp {
    cli: SchematicCli,
}

impl SchematicApp {
    /// Create the application from command line arguments
    #[must_use]
    pub fn from_args() -> Self {
        Self::new(SchematicCli::parse())
    }

    /// Create the application from parsed arguments
    #[must_use]
    pub fn new(cli: SchematicCli) -> Self {
        Self { cli }
    }

    /// Run the application
    ///
    /// # Errors
    ///
    /// Returns error if the configuration, data model or manifest cannot be
    /// loaded, or if resolution fails.
    pub async fn run(self) -> Result<ExitCode> {
        self.init_logging();
        info!("Starting schematic CLI");

        match self.execute_command().await {
            Ok(code) => {
                info!("Command completed");
                Ok(code)
            }
            Err(err) => {
                if err.is_authoring_error() {
                    error!("Data model needs fixing: {}", err);
                } else {
                    error!("Command failed: {}", err);
                }
                Err(err)
            }
        }
    }

    /// Configure tracing subscriber based on CLI flags
    fn init_logging(&self) {
        let level = if self.cli.quiet {
            tracing::Level::ERROR
        } else if self.cli.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        };
        tracing_subscriber::fmt()
            .with_max_level(level)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }

    async fn load_model(&self) -> Result<MetadataModel> {
        let config = match &self.cli.config {
            Some(path) => SchematicConfig::from_file(path)?,
            None => SchematicConfig::default(),
        };
        MetadataModel::load(config, self.cli.model.as_deref()).await
    }

    async fn execute_command(&self) -> Result<ExitCode> {
        let model = self.load_model().await?;

        match &self.cli.command {
            SchematicCommand::Order { root, relationship } => {
                Self::order_command(&model, root, *relationship)
            }
            SchematicCommand::Components { source } => Self::components_command(&model, source),
            SchematicCommand::Schema { root, output } => {
                Self::schema_command(&model, root, output.as_deref()).await
            }
            SchematicCommand::Validate { manifest, root } => {
                Self::validate_command(&model, manifest, root).await
            }
        }
    }

    fn order_command(model: &MetadataModel, root: &str, relationship: Relationship) -> Result<ExitCode> {
        for label in model.ordered_model_nodes(root, relationship)? {
            println!("{label}");
        }
        Ok(ExitCode::SUCCESS)
    }

    fn components_command(model: &MetadataModel, source: &str) -> Result<ExitCode> {
        for label in model.component_requirements(source)? {
            println!("{label}");
        }
        Ok(ExitCode::SUCCESS)
    }

    async fn schema_command(model: &MetadataModel, root: &str, output: Option<&Path>) -> Result<ExitCode> {
        let schema = model.validation_schema(root)?.to_json_schema();
        let rendered = serde_json::to_string_pretty(&schema)?;

        match output {
            Some(path) => {
                fs::write(path, rendered).await?;
                info!(path = %path.display(), "Wrote validation schema");
            }
            None => println!("{rendered}"),
        }
        Ok(ExitCode::SUCCESS)
    }

    async fn validate_command(model: &MetadataModel, manifest: &Path, root: &str) -> Result<ExitCode> {
        let diagnostics = model.validate_manifest(manifest, root, None).await?;
        println!("{}", serde_json::to_string_pretty(&diagnostics)?);

        if diagnostics.is_empty() {
            info!("Manifest is valid");
            Ok(ExitCode::SUCCESS)
        } else {
            info!(count = diagnostics.len(), "Manifest has errors");
            Ok(ExitCode::FAILURE)
        }
    }
}
