// bindery/src/task/state.rs

//! Task lifecycle.

use crate::error::{BinderyError, BinderyResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// `Pending -> Running -> Succeeded | Failed`. Terminal states are final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskState {
  Pending,
  Running,
  Succeeded,
  Failed,
}

impl TaskState {
  pub fn is_terminal(self) -> bool {
    matches!(self, TaskState::Succeeded | TaskState::Failed)
  }

  pub fn can_transition_to(self, next: TaskState) -> bool {
    matches!(
      (self, next),
      (TaskState::Pending, TaskState::Running)
        | (TaskState::Running, TaskState::Succeeded)
        | (TaskState::Running, TaskState::Failed)
    )
  }

  /// Moves to `next`, rejecting anything the lifecycle does not allow.
  pub fn advance(&mut self, next: TaskState) -> BinderyResult<()> {
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

impl fmt::Display for TaskState {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      TaskState::Pending => "pending",
      TaskState::Running => "running",
      TaskState::Succeeded => "succeeded",
      TaskState::Failed => "failed",
    };
    f.write_str(name)
  }
}
