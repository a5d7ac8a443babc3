// demos/inventory_app/src/config.rs

use crate::errors::{AppError, Result};
use bindery::RunnerConfig;
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct AppConfig {
  /// Folder to inventory.
  pub input_dir: PathBuf,
  /// Comma separated extensions to include; empty means every file.
  pub extensions: String,
  pub include_hidden: bool,
  /// Where to write the JSON report, if anywhere.
  pub report_path: Option<PathBuf>,
  pub runner: RunnerConfig,
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present

    let get_env = |var_name: &str| {
      env::var(var_name).map_err(|e| AppError::Config(format!("Missing environment variable '{}': {}", var_name, e)))
    };

    // A path on the command line wins over the environment.
    let input_dir = match env::args().nth(1) {
      Some(arg) => PathBuf::from(arg),
      None => PathBuf::from(get_env("INVENTORY_INPUT_DIR")?),
    };
    let extensions = get_env("INVENTORY_EXTENSIONS").unwrap_or_default();
    let include_hidden = get_env("INVENTORY_INCLUDE_HIDDEN")
      .unwrap_or_else(|_| "false".to_string())
      .parse::<bool>()
      .map_err(|e| AppError::Config(format!("Invalid INVENTORY_INCLUDE_HIDDEN value: {}", e)))?;
    let report_path = get_env("INVENTORY_REPORT").ok().map(PathBuf::from);
    let runner = RunnerConfig::from_env()?;

    tracing::info!(input_dir = %input_dir.display(), max_workers = runner.max_workers, "Application configuration loaded.");

    Ok(Self {
      input_dir,
      extensions,
      include_hidden,
      report_path,
      runner,
    })
  }

  /// Job option values for the inventory workflow, as the plain mapping a frontend would send.
  pub fn job_values(&self) -> serde_json::Map<String, serde_json::Value> {
    let mut values = serde_json::Map::new();
    values.insert(
      crate::workflows::inventory::INPUT_FOLDER.to_string(),
      self.input_dir.display().to_string().into(),
    );
    values.insert(
      crate::workflows::inventory::EXTENSIONS.to_string(),
      self.extensions.clone().into(),
    );
    values.insert(
      crate::workflows::inventory::INCLUDE_HIDDEN.to_string(),
      self.include_hidden.into(),
    );
    values
  }
}
