// bindery/src/job/outcome.rs

//! What a caller gets back from a run: a report, or a structured reason there is none,
//! always alongside whatever results were produced.

use crate::error::BinderyError;
use crate::job::state::JobState;
use crate::task::{TaskRecord, TaskResults};
use crate::workflow::Report;
use serde_json::Value;

/// Terminal status of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
  /// Every phase ran. Individual tasks may still have failed.
  Completed,
  /// A phase failed; see `JobOutcome::error`.
  Failed,
  /// The caller cancelled the job; results hold the tasks that had started.
  Cancelled,
}

#[derive(Debug)]
pub struct JobOutcome {
  pub workflow: String,
  pub status: JobStatus,
  /// `Done`, `Failed` or `Cancelled`.
  pub final_state: JobState,
  /// The state the job was in when it failed or was cancelled.
  pub stopped_in: Option<JobState>,
  pub report: Option<Report>,
  pub error: Option<BinderyError>,
  pub initial_results: Vec<Value>,
  pub tasks_discovered: usize,
  pub results: TaskResults,
  pub completion_result: Option<Value>,
}

impl JobOutcome {
  pub fn is_completed(&self) -> bool {
    self.status == JobStatus::Completed
  }

  pub fn is_failed(&self) -> bool {
    self.status == JobStatus::Failed
  }

  pub fn is_cancelled(&self) -> bool {
    self.status == JobStatus::Cancelled
  }

  /// Records of tasks that ended in failure.
  pub fn task_failures(&self) -> Vec<&TaskRecord> {
    self.results.failures().map(|(record, _)| record).collect()
  }

  /// Validation messages, if validation is what stopped the job.
  pub fn validation_errors(&self) -> Option<&[String]> {
    self.error.as_ref().and_then(BinderyError::validation_errors)
  }

  /// One line describing why there is no report, or `None` when the job completed cleanly.
  pub fn failure_summary(&self) -> Option<String> {
    match self.status {
      JobStatus::Failed => self.error.as_ref().map(ToString::to_string),
      JobStatus::Cancelled => Some(format!(
        "Job cancelled with {} of {} tasks finished",
        self.results.len(),
        self.tasks_discovered
      )),
      JobStatus::Completed if self.results.failure_count() > 0 => Some(format!(
        "{} of {} tasks failed",
        self.results.failure_count(),
        self.results.len()
      )),
      JobStatus::Completed => None,
    }
  }
}
