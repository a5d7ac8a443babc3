// bindery/src/config.rs

use crate::error::{BinderyError, BinderyResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::num::NonZeroUsize;

/// Environment variable read by `RunnerConfig::from_env`.
pub const MAX_WORKERS_ENV: &str = "BINDERY_MAX_WORKERS";

/// Sizing of the orchestrator's worker pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunnerConfig {
  /// Number of tasks allowed to run at the same time.
  #[serde(default = "default_max_workers")]
  pub max_workers: usize,
}

fn default_max_workers() -> usize {
  std::thread::available_parallelism().map(NonZeroUsize::get).unwrap_or(1)
}

impl Default for RunnerConfig {
  fn default() -> Self {
    Self {
      max_workers: default_max_workers(),
    }
  }
}

impl RunnerConfig {
  pub fn with_max_workers(max_workers: usize) -> BinderyResult<Self> {
    let config = Self { max_workers };
    config.validate()?;
    Ok(config)
  }

  /// Reads `BINDERY_MAX_WORKERS`, falling back to the machine's available parallelism.
  pub fn from_env() -> BinderyResult<Self> {
    let config = match env::var(MAX_WORKERS_ENV) {
      Ok(raw) => Self {
        max_workers: raw
          .trim()
          .parse::<usize>()
          .map_err(|e| BinderyError::Config(format!("Invalid {}: {}", MAX_WORKERS_ENV, e)))?,
      },
      Err(env::VarError::NotPresent) => Self::default(),
      Err(e) => return Err(BinderyError::Config(format!("Unreadable {}: {}", MAX_WORKERS_ENV, e))),
    };
    config.validate()?;
    tracing::debug!(max_workers = config.max_workers, "Runner configuration loaded.");
    Ok(config)
  }

  pub fn validate(&self) -> BinderyResult<()> {
    if self.max_workers == 0 {
      return Err(BinderyError::Config("max_workers must be at least 1".to_string()));
    }
    Ok(())
  }
}
