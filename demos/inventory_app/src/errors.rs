// demos/inventory_app/src/errors.rs

use bindery::BinderyError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Bindery Error: {source}")]
  Bindery {
    #[from] // Registry and option errors surface here
    source: BinderyError,
  },

  #[error("I/O Error: {0}")]
  Io(#[from] std::io::Error),

  #[error("Report could not be serialized: {0}")]
  Serialize(#[from] serde_json::Error),

  #[error("Job did not complete: {0}")]
  JobNotCompleted(String),
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
