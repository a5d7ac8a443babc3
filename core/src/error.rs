// bindery/src/error.rs
use anyhow::Error as AnyhowError;
use thiserror::Error;

use crate::job::state::JobState;

#[derive(Debug, Error)]
pub enum BinderyError {
  #[error("Required options have no value: {}", .missing.join(", "))]
  IncompleteConfiguration { missing: Vec<String> },

  #[error("Option validation failed: {}", .0.join("; "))]
  Validation(Vec<String>),

  #[error("Unknown option: {label}")]
  UnknownOption { label: String },

  #[error("Option '{label}' is declared more than once")]
  DuplicateOption { label: String },

  #[error("Type mismatch for option '{label}' (expected {expected}, got {actual})")]
  OptionTypeMismatch {
    label: String,
    expected: String,
    actual: String,
  },

  #[error("Value '{value}' is not a valid choice for option '{label}' (choices: {})", .choices.join(", "))]
  InvalidChoice {
    label: String,
    value: String,
    choices: Vec<String>,
  },

  #[error("Value '{value}' is not a valid flag for option '{label}'")]
  InvalidFlag { label: String, value: String },

  #[error("Cell ({row}, {column}) is outside the option model ({rows} rows, 1 column)")]
  CellOutOfRange { row: usize, column: usize, rows: usize },

  #[error("Workflow not found: {name}")]
  WorkflowNotFound { name: String },

  #[error("Workflow already registered: {name}")]
  DuplicateWorkflow { name: String },

  #[error("Workflow '{workflow}' requested additional information but none was supplied")]
  MissingAdditionalInfo { workflow: String },

  #[error("Job failed during {phase}. Source: {source}")]
  PhaseFailure {
    phase: JobState,
    #[source]
    source: AnyhowError,
  },

  #[error("Result slot for task {task_id} was already filled")]
  SlotAlreadyFilled { task_id: usize },

  #[error("Invalid state transition from {from} to {to}")]
  InvalidTransition { from: String, to: String },

  #[error("Configuration error: {0}")]
  Config(String),

  #[error("Error in workflow or task code. Source: {source}")]
  WorkflowError {
    #[source]
    source: AnyhowError,
  },

  #[error("Internal bindery error: {0}")]
  Internal(String),
}

impl BinderyError {
  /// The phase the job was in when this error stopped it, if it is a phase failure.
  pub fn phase(&self) -> Option<JobState> {
    match self {
      BinderyError::PhaseFailure { phase, .. } => Some(*phase),
      _ => None,
    }
  }

  /// Validation messages exactly as the workflow returned them.
  pub fn validation_errors(&self) -> Option<&[String]> {
    match self {
      BinderyError::Validation(errors) => Some(errors),
      _ => None,
    }
  }
}

impl From<AnyhowError> for BinderyError {
  fn from(err: AnyhowError) -> Self {
    BinderyError::WorkflowError { source: err }
  }
}

pub type BinderyResult<T, E = BinderyError> = std::result::Result<T, E>;
