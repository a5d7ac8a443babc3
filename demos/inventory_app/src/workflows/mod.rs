// demos/inventory_app/src/workflows/mod.rs

//! Workflows offered by the inventory application.

use crate::errors::Result;
use bindery::WorkflowRegistry;

pub mod inventory;

/// Registers every workflow with the application's registry.
///
/// Called once at startup.
pub fn register_all_workflows(registry: &WorkflowRegistry) -> Result<()> {
  tracing::info!("Registering workflows...");

  registry.register(inventory::NAME, || inventory::FileInventoryWorkflow)?;

  tracing::info!(workflows = ?registry.names(), "All application workflows registered.");
  Ok(())
}
