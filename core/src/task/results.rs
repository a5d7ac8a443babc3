// bindery/src/task/results.rs

//! Write-once result slots for discovered tasks, and the read-only snapshot handed to
//! `completion_task` / `generate_report`.

use crate::error::{BinderyError, BinderyResult};
use crate::task::descriptor::{TaskDescriptor, TaskId};
use crate::task::state::TaskState;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::OnceLock;

/// Terminal result of one task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TaskOutcome {
  Succeeded { value: Value },
  Failed { error: String },
}

impl TaskOutcome {
  pub fn succeeded(value: Value) -> Self {
    TaskOutcome::Succeeded { value }
  }

  pub fn failed(error: impl Into<String>) -> Self {
    TaskOutcome::Failed { error: error.into() }
  }

  pub fn is_success(&self) -> bool {
    matches!(self, TaskOutcome::Succeeded { .. })
  }

  pub fn value(&self) -> Option<&Value> {
    match self {
      TaskOutcome::Succeeded { value } => Some(value),
      TaskOutcome::Failed { .. } => None,
    }
  }

  pub fn error(&self) -> Option<&str> {
    match self {
      TaskOutcome::Failed { error } => Some(error),
      TaskOutcome::Succeeded { .. } => None,
    }
  }

  fn terminal_state(&self) -> TaskState {
    if self.is_success() {
      TaskState::Succeeded
    } else {
      TaskState::Failed
    }
  }
}

struct ResultSlot {
  descriptor: TaskDescriptor,
  state: Mutex<TaskState>,
  outcome: OnceLock<TaskOutcome>,
}

/// One slot per discovered descriptor, indexed by `TaskId`.
///
/// Each slot is written at most once, by the task that owns it, so concurrent tasks never
/// contend on anything but their own slot.
pub struct ResultArena {
  slots: Vec<ResultSlot>,
}

impl ResultArena {
  pub fn new(descriptors: Vec<TaskDescriptor>) -> Self {
    let slots = descriptors
      .into_iter()
      .map(|descriptor| ResultSlot {
        descriptor,
        state: Mutex::new(TaskState::Pending),
        outcome: OnceLock::new(),
      })
      .collect();
    Self { slots }
  }

  pub fn len(&self) -> usize {
    self.slots.len()
  }

  pub fn is_empty(&self) -> bool {
    self.slots.is_empty()
  }

  pub fn descriptor(&self, id: TaskId) -> Option<&TaskDescriptor> {
    self.slots.get(id.index()).map(|s| &s.descriptor)
  }

  pub fn state(&self, id: TaskId) -> Option<TaskState> {
    self.slots.get(id.index()).map(|s| *s.state.lock())
  }

  /// `Pending -> Running` for the slot's task.
  pub fn mark_running(&self, id: TaskId) -> BinderyResult<()> {
    self.slot(id)?.state.lock().advance(TaskState::Running)
  }

  /// Stores the task's terminal outcome. A second write to the same slot is an error.
  pub fn record(&self, id: TaskId, outcome: TaskOutcome) -> BinderyResult<()> {
    let slot = self.slot(id)?;
    let mut state = slot.state.lock();
    if state.is_terminal() {
      return Err(BinderyError::SlotAlreadyFilled { task_id: id.index() });
    }
    state.advance(outcome.terminal_state())?;
    slot
      .outcome
      .set(outcome)
      .map_err(|_| BinderyError::SlotAlreadyFilled { task_id: id.index() })
  }

  /// Number of slots holding a terminal outcome.
  pub fn filled(&self) -> usize {
    self.slots.iter().filter(|s| s.outcome.get().is_some()).count()
  }

  /// Copies every filled slot into a `TaskResults`.
  pub fn snapshot(&self) -> TaskResults {
    let records = self
      .slots
      .iter()
      .enumerate()
      .filter_map(|(idx, slot)| {
        slot.outcome.get().map(|outcome| TaskRecord {
          id: TaskId(idx),
          descriptor: slot.descriptor.clone(),
          outcome: outcome.clone(),
        })
      })
      .collect();
    TaskResults { records }
  }

  fn slot(&self, id: TaskId) -> BinderyResult<&ResultSlot> {
    self
      .slots
      .get(id.index())
      .ok_or_else(|| BinderyError::Internal(format!("No result slot for task {}", id)))
  }
}

/// A finished task: its identity, the descriptor it ran from, and its outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
  pub id: TaskId,
  pub descriptor: TaskDescriptor,
  pub outcome: TaskOutcome,
}

/// Results of the task phase, keyed by descriptor identity.
///
/// Iteration runs in `TaskId` order; that order says nothing about when tasks finished.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskResults {
  records: Vec<TaskRecord>,
}

impl TaskResults {
  pub fn len(&self) -> usize {
    self.records.len()
  }

  pub fn is_empty(&self) -> bool {
    self.records.is_empty()
  }

  pub fn get(&self, id: TaskId) -> Option<&TaskRecord> {
    self.records.iter().find(|r| r.id == id)
  }

  pub fn contains(&self, id: TaskId) -> bool {
    self.get(id).is_some()
  }

  pub fn iter(&self) -> impl Iterator<Item = &TaskRecord> {
    self.records.iter()
  }

  pub fn successes(&self) -> impl Iterator<Item = (&TaskRecord, &Value)> {
    self.records.iter().filter_map(|r| r.outcome.value().map(|v| (r, v)))
  }

  pub fn failures(&self) -> impl Iterator<Item = (&TaskRecord, &str)> {
    self.records.iter().filter_map(|r| r.outcome.error().map(|e| (r, e)))
  }

  pub fn success_count(&self) -> usize {
    self.successes().count()
  }

  pub fn failure_count(&self) -> usize {
    self.failures().count()
  }
}
