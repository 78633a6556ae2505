//! `schematic` command-line interface
//!
//! This binary resolves data-model dependencies, prints synthesized
//! validation schemas and validates manifests.

use schematic_core::Result;
use schematic_service::cli;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    cli::run().await
}
