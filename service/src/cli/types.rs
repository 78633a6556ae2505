//! CLI type definitions

use clap::{Parser, Subcommand};
use schematic_core::Relationship;
use std::path::PathBuf;

/// `schematic` command-line interface
#[derive(Parser, Debug)]
#[command(name = "schematic", version, about = "Metadata model resolution and manifest validation")]
pub struct SchematicCli {
    /// Configuration file (YAML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Data model CSV; overrides `model.location` from the configuration
    #[arg(short, long, global = true)]
    pub model: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Quiet mode - suppress non-essential output
    #[arg(short, long)]
    pub quiet: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: SchematicCommand,
}

/// `schematic` subcommands
#[derive(Subcommand, Debug)]
pub enum SchematicCommand {
    /// List the terms a root depends on, dependents first
    Order {
        /// Root term label
        root: String,
        /// Relationship to follow
        #[arg(short, long, default_value = "requiresDependency")]
        relationship: Relationship,
    },

    /// List the components a component transitively requires
    Components {
        /// Source component label
        source: String,
    },

    /// Print the JSON Schema synthesized for a root term
    Schema {
        /// Root term label
        root: String,
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate a manifest; exits non-zero when any diagnostic is produced
    Validate {
        /// Manifest CSV
        manifest: PathBuf,
        /// Root term the manifest describes
        root: String,
    },
}
