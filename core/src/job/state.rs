// bindery/src/job/state.rs

//! The job state machine.

use crate::error::{BinderyError, BinderyResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Phases of a job, in the order a successful run visits them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobState {
  Configuring,
  Validating,
  RunningInitialTasks,
  Discovering,
  AwaitingAdditionalInfo,
  MaterializingAndRunningTasks,
  Completing,
  Reporting,
  Done,
  Failed,
  Cancelled,
}

impl JobState {
  pub fn is_terminal(self) -> bool {
    matches!(self, JobState::Done | JobState::Failed | JobState::Cancelled)
  }

  /// Cancellation is honoured until the job starts reporting.
  pub fn is_cancellable(self) -> bool {
    !self.is_terminal() && self != JobState::Reporting
  }

  pub fn can_transition_to(self, next: JobState) -> bool {
    use JobState::*;
    match next {
      Failed => !self.is_terminal(),
      Cancelled => self.is_cancellable(),
      _ => matches!(
        (self, next),
        (Configuring, Validating)
          | (Validating, RunningInitialTasks)
          | (RunningInitialTasks, Discovering)
          | (Discovering, AwaitingAdditionalInfo)
          | (AwaitingAdditionalInfo, Discovering)
          | (Discovering, MaterializingAndRunningTasks)
          | (Discovering, Completing)
          | (MaterializingAndRunningTasks, Completing)
          | (Completing, Reporting)
          | (Reporting, Done)
      ),
    }
  }

  /// Moves to `next` if the table allows it.
  pub fn advance(&mut self, next: JobState) -> BinderyResult<()> {
    if !self.can_transition_to(next) {
      return Err(BinderyError::InvalidTransition {
        from: self.to_string(),
        to: next.to_string(),
      });
    }
    *self = next;
    Ok(())
  }
}

impl fmt::Display for JobState {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      JobState::Configuring => "configuring",
      JobState::Validating => "validating",
      JobState::RunningInitialTasks => "running initial tasks",
      JobState::Discovering => "discovering",
      JobState::AwaitingAdditionalInfo => "awaiting additional info",
      JobState::MaterializingAndRunningTasks => "materializing and running tasks",
      JobState::Completing => "completing",
      JobState::Reporting => "reporting",
      JobState::Done => "done",
      JobState::Failed => "failed",
      JobState::Cancelled => "cancelled",
    };
    f.write_str(name)
  }
}
