// bindery/src/job/definition.rs

//! Contains the `Job` aggregate: one workflow, its option model, and everything a run
//! accumulates until it is archived into a `JobOutcome`.

use crate::error::BinderyResult;
use crate::job::state::JobState;
use crate::options::OptionValueModel;
use crate::task::ResultArena;
use crate::workflow::{AdditionalData, Workflow};
use serde_json::Value;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// One end-to-end run of a workflow against an option set.
///
/// A job starts in `Configuring`; fill in its options, then hand it to
/// `Orchestrator::run`.
pub struct Job {
  pub(crate) workflow: Arc<dyn Workflow>,
  pub(crate) options: OptionValueModel,
  pub(crate) state: JobState,
  pub(crate) cancellation_token: CancellationToken,
  pub(crate) initial_results: Vec<Value>,
  pub(crate) additional: Arc<AdditionalData>,
  pub(crate) tasks_discovered: usize,
  pub(crate) results: Option<Arc<ResultArena>>,
  pub(crate) completion_result: Option<Value>,
}

impl Job {
  /// Creates a job whose option model is the workflow's declared schema, unmodified.
  pub fn new(workflow: Arc<dyn Workflow>) -> BinderyResult<Self> {
    let options = OptionValueModel::new(workflow.job_options())?;
    Ok(Self::with_options(workflow, options))
  }

  /// Creates a job from an already filled-in option model.
  pub fn with_options(workflow: Arc<dyn Workflow>, options: OptionValueModel) -> Self {
    Self {
      workflow,
      options,
      state: JobState::Configuring,
      cancellation_token: CancellationToken::new(),
      initial_results: Vec::new(),
      additional: Arc::new(AdditionalData::new()),
      tasks_discovered: 0,
      results: None,
      completion_result: None,
    }
  }

  pub fn workflow(&self) -> &Arc<dyn Workflow> {
    &self.workflow
  }

  pub fn workflow_name(&self) -> &str {
    self.workflow.name()
  }

  pub fn options(&self) -> &OptionValueModel {
    &self.options
  }

  pub fn options_mut(&mut self) -> &mut OptionValueModel {
    &mut self.options
  }

  pub fn state(&self) -> JobState {
    self.state
  }

  /// A handle that cancels this job from anywhere, before or during its run.
  pub fn cancel_handle(&self) -> CancelHandle {
    CancelHandle {
      token: self.cancellation_token.clone(),
    }
  }
}

impl std::fmt::Debug for Job {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Job")
      .field("workflow", &self.workflow.name())
      .field("state", &self.state)
      .field("options", &self.options.row_count())
      .field("tasks_discovered", &self.tasks_discovered)
      .finish_non_exhaustive()
  }
}

/// Cooperative cancellation for one job.
///
/// Cancelling stops dispatch of tasks that have not started; running tasks see the flag
/// through `TaskContext::is_cancelled` and finish on their own.
#[derive(Debug, Clone)]
pub struct CancelHandle {
  token: CancellationToken,
}

impl CancelHandle {
  pub fn cancel(&self) {
    tracing::info!("Job cancellation requested.");
    self.token.cancel();
  }

  pub fn is_cancelled(&self) -> bool {
    self.token.is_cancelled()
  }
}
