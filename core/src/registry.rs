// bindery/src/registry.rs

//! Defines `WorkflowRegistry`, an explicit name -> constructor mapping built by the caller
//! at startup and used to create jobs for a selected workflow.

use crate::error::{BinderyError, BinderyResult};
use crate::job::Job;
use crate::options::{OptionValueModel, UserArgs};
use crate::workflow::Workflow;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{event, instrument, Level};

/// Builds a fresh workflow instance for each job.
pub type WorkflowConstructor = Arc<dyn Fn() -> Arc<dyn Workflow> + Send + Sync>;

/// The set of workflows a caller offers, keyed by name.
#[derive(Default)]
pub struct WorkflowRegistry {
  registry: RwLock<BTreeMap<String, WorkflowConstructor>>,
}

impl WorkflowRegistry {
  pub fn new() -> Self {
    Self::default()
  }

  /// Registers a constructor under `name`. Names are unique.
  pub fn register<W, F>(&self, name: impl Into<String>, constructor: F) -> BinderyResult<()>
  where
    W: Workflow,
    F: Fn() -> W + Send + Sync + 'static,
  {
    let name = name.into();
    let mut registry = self.registry.write();
    if registry.contains_key(&name) {
      return Err(BinderyError::DuplicateWorkflow { name });
    }
    event!(Level::DEBUG, %name, workflow_type = %std::any::type_name::<W>(), "Registering workflow.");
    let constructor: WorkflowConstructor = Arc::new(move || Arc::new(constructor()) as Arc<dyn Workflow>);
    registry.insert(name, constructor);
    Ok(())
  }

  pub fn contains(&self, name: &str) -> bool {
    self.registry.read().contains_key(name)
  }

  /// Registered names in sorted order.
  pub fn names(&self) -> Vec<String> {
    self.registry.read().keys().cloned().collect()
  }

  pub fn len(&self) -> usize {
    self.registry.read().len()
  }

  pub fn is_empty(&self) -> bool {
    self.registry.read().is_empty()
  }

  /// Instantiates the workflow registered under `name`.
  pub fn create(&self, name: &str) -> BinderyResult<Arc<dyn Workflow>> {
    let constructor = self.registry.read().get(name).cloned().ok_or_else(|| {
      event!(Level::ERROR, %name, "No workflow registered under this name.");
      BinderyError::WorkflowNotFound { name: name.to_string() }
    })?;
    Ok(constructor())
  }

  /// Creates a job for `name` with its options loaded from a typed mapping.
  #[instrument(name = "WorkflowRegistry::create_job", skip(self, values), err(Display))]
  pub fn create_job(&self, name: &str, values: &UserArgs) -> BinderyResult<Job> {
    let workflow = self.create(name)?;
    let mut options = OptionValueModel::new(workflow.job_options())?;
    options.load_data(values)?;
    Ok(Job::with_options(workflow, options))
  }

  /// Creates a job for `name` with its options loaded from a plain JSON object.
  #[instrument(name = "WorkflowRegistry::create_job_from_json", skip(self, values), err(Display))]
  pub fn create_job_from_json(
    &self,
    name: &str,
    values: &serde_json::Map<String, serde_json::Value>,
  ) -> BinderyResult<Job> {
    let workflow = self.create(name)?;
    let mut options = OptionValueModel::new(workflow.job_options())?;
    options.load_json(values)?;
    Ok(Job::with_options(workflow, options))
  }
}
