//! Command-line front end for the schematic service

mod app;
mod types;

pub use app::SchematicApp;
pub use types::{SchematicCli, SchematicCommand};

/// Main entry point for the CLI
///
/// # Errors
/// Returns error if CLI execution fails or encounters invalid arguments.
pub async fn run() -> schematic_core::Result<std::process::ExitCode> {
    SchematicApp::from_args().run().await
}
