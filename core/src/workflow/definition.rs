// bindery/src/workflow/definition.rs

//! The `Workflow` trait: how user options become work and how work results become a report.

use crate::options::validation;
use crate::options::{JobOption, UserArgs};
use crate::task::{Task, TaskDescriptor, TaskResults};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The caller's answer to an `InfoRequest`.
pub type AdditionalData = serde_json::Map<String, Value>;

/// A request for information only the caller can supply before discovery can finish,
/// e.g. which page is the title page of each book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfoRequest {
  /// Human-readable question for the frontend.
  pub prompt: String,
  /// Workflow-defined payload describing what is being asked about.
  pub payload: Value,
}

impl InfoRequest {
  pub fn new(prompt: impl Into<String>, payload: Value) -> Self {
    Self {
      prompt: prompt.into(),
      payload,
    }
  }
}

/// The job's final, user-facing summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
  pub summary: String,
  #[serde(default)]
  pub data: Value,
}

impl Report {
  pub fn text(summary: impl Into<String>) -> Self {
    Self {
      summary: summary.into(),
      data: Value::Null,
    }
  }

  pub fn with_data(mut self, data: Value) -> Self {
    self.data = data;
    self
  }
}

/// One category of batch job.
///
/// The optional capabilities (`initial_tasks`, `additional_info_request`, `completion_task`,
/// `generate_report`) have defaults that report "not supported" (an empty list or `None`),
/// so every implementation is total. Planning methods are synchronous; only tasks do work.
pub trait Workflow: Send + Sync + 'static {
  /// Registry name of the workflow.
  fn name(&self) -> &str;

  fn description(&self) -> &str {
    ""
  }

  /// The configuration schema. Must be the same on every call.
  fn job_options(&self) -> Vec<JobOption>;

  /// Checks user options before any task runs. `Err` carries human-readable problems.
  ///
  /// The default reports every required option that is empty.
  fn validate_user_options(&self, args: &UserArgs) -> Result<(), Vec<String>> {
    let errors = validation::required_options(&self.job_options(), args);
    if errors.is_empty() {
      Ok(())
    } else {
      Err(errors)
    }
  }

  /// Tasks that gather what discovery needs (e.g. walking a directory tree).
  /// All of them finish before discovery starts.
  fn initial_tasks(&self, _args: &UserArgs) -> anyhow::Result<Vec<Box<dyn Task>>> {
    Ok(Vec::new())
  }

  /// Declares that the caller must supply more information before discovery.
  /// Asked at most once per job.
  fn additional_info_request(
    &self,
    _args: &UserArgs,
    _initial_results: &[Value],
  ) -> anyhow::Result<Option<InfoRequest>> {
    Ok(None)
  }

  /// Expands user input and initial results into a flat list of independent work items.
  ///
  /// Pure planning: deterministic for its inputs and performs none of the work.
  /// An empty list is a valid, no-op job.
  fn discover_task_metadata(
    &self,
    initial_results: &[Value],
    additional: &AdditionalData,
    args: &UserArgs,
  ) -> anyhow::Result<Vec<TaskDescriptor>>;

  /// Materializes one descriptor. Must not rely on descriptor order or on other descriptors.
  fn create_new_task(&self, descriptor: &TaskDescriptor) -> anyhow::Result<Box<dyn Task>>;

  /// A final task that may use the aggregate of all task results.
  fn completion_task(&self, _results: &TaskResults) -> anyhow::Result<Option<Box<dyn Task>>> {
    Ok(None)
  }

  /// Summarises the job. Receives successes and failures, and must cope with partial results.
  fn generate_report(&self, _results: &TaskResults) -> anyhow::Result<Option<Report>> {
    Ok(None)
  }
}
