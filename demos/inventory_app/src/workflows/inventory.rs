// demos/inventory_app/src/workflows/inventory.rs

//! The "file inventory" workflow: walk a folder, size every matching file in parallel,
//! and report the totals.

use anyhow::Context;
use bindery::options::validation;
use bindery::{task_fn, AdditionalData, JobOption, Report, Task, TaskDescriptor, TaskResults, UserArgs, Workflow};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const NAME: &str = "file inventory";

pub const INPUT_FOLDER: &str = "input folder";
pub const EXTENSIONS: &str = "extensions";
pub const INCLUDE_HIDDEN: &str = "include hidden";

/// One file to size.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct FileEntry {
  root: PathBuf,
  path: String,
}

#[derive(Debug, Default)]
pub struct FileInventoryWorkflow;

impl Workflow for FileInventoryWorkflow {
  fn name(&self) -> &str {
    NAME
  }

  fn description(&self) -> &str {
    "Lists every file under a folder together with its size"
  }

  fn job_options(&self) -> Vec<JobOption> {
    vec![
      JobOption::path(INPUT_FOLDER).required(),
      JobOption::text(EXTENSIONS),
      JobOption::flag(INCLUDE_HIDDEN),
    ]
  }

  fn validate_user_options(&self, args: &UserArgs) -> Result<(), Vec<String>> {
    validation::collect_errors([
      validation::require_value(args, INPUT_FOLDER),
      validation::require_directory(args, INPUT_FOLDER),
    ])
  }

  fn initial_tasks(&self, args: &UserArgs) -> anyhow::Result<Vec<Box<dyn Task>>> {
    let root = args
      .path(INPUT_FOLDER)
      .context("input folder option missing")?
      .to_path_buf();
    let include_hidden = args.flag(INCLUDE_HIDDEN).unwrap_or(false);
    Ok(vec![task_fn("scan input folder", move |_ctx| {
      let root = root.clone();
      async move {
        let files = tokio::task::spawn_blocking(move || walk_files(&root, include_hidden)).await??;
        debug!(count = files.len(), "Folder scanned.");
        Ok(json!(files))
      }
    })])
  }

  fn discover_task_metadata(
    &self,
    initial_results: &[Value],
    _additional: &AdditionalData,
    args: &UserArgs,
  ) -> anyhow::Result<Vec<TaskDescriptor>> {
    let root = args.path(INPUT_FOLDER).context("input folder option missing")?;
    let wanted = parse_extensions(args.text(EXTENSIONS).unwrap_or_default());
    let mut descriptors = Vec::new();
    for listing in initial_results {
      let files: Vec<String> = serde_json::from_value(listing.clone()).context("folder listing is not a list of paths")?;
      for path in files.into_iter().filter(|p| matches_extension(p, &wanted)) {
        descriptors.push(TaskDescriptor::from_serializable(&FileEntry {
          root: root.to_path_buf(),
          path,
        })?);
      }
    }
    info!(files = descriptors.len(), "Files selected for inventory.");
    Ok(descriptors)
  }

  fn create_new_task(&self, descriptor: &TaskDescriptor) -> anyhow::Result<Box<dyn Task>> {
    let entry: FileEntry = descriptor.parse()?;
    Ok(task_fn(format!("size {}", entry.path), move |ctx| {
      let entry = entry.clone();
      async move {
        if ctx.is_cancelled() {
          anyhow::bail!("cancelled before {} was read", entry.path);
        }
        let metadata = tokio::fs::metadata(entry.root.join(&entry.path))
          .await
          .with_context(|| format!("cannot stat {}", entry.path))?;
        Ok(json!({ "path": entry.path, "bytes": metadata.len() }))
      }
    }))
  }

  fn completion_task(&self, results: &TaskResults) -> anyhow::Result<Option<Box<dyn Task>>> {
    // Manifest lines in path order, the format of a package's file list.
    let mut lines: Vec<String> = results
      .successes()
      .filter_map(|(_, value)| Some(format!("{}\t{}", value["bytes"].as_u64()?, value["path"].as_str()?)))
      .collect();
    lines.sort();
    Ok(Some(task_fn("build manifest", move |_ctx| {
      let manifest = lines.join("\n");
      async move { Ok(Value::String(manifest)) }
    })))
  }

  fn generate_report(&self, results: &TaskResults) -> anyhow::Result<Option<Report>> {
    let total_bytes: u64 = results
      .successes()
      .filter_map(|(_, value)| value["bytes"].as_u64())
      .sum();
    let failures: Vec<Value> = results
      .failures()
      .map(|(record, error)| json!({ "task": record.id.index(), "error": error }))
      .collect();
    let mut summary = format!("{} files, {} bytes", results.success_count(), total_bytes);
    if !failures.is_empty() {
      summary.push_str(&format!(", {} could not be read", failures.len()));
    }
    Ok(Some(Report::text(summary).with_data(json!({
      "files": results.success_count(),
      "total_bytes": total_bytes,
      "failures": failures,
    }))))
  }
}

/// Relative paths of every regular file under `root`, sorted, with `/` separators.
fn walk_files(root: &Path, include_hidden: bool) -> std::io::Result<Vec<String>> {
  let mut files = Vec::new();
  let mut pending = vec![root.to_path_buf()];
  while let Some(dir) = pending.pop() {
    for entry in std::fs::read_dir(&dir)? {
      let entry = entry?;
      let hidden = entry.file_name().to_string_lossy().starts_with('.');
      if hidden && !include_hidden {
        continue;
      }
      let file_type = entry.file_type()?;
      if file_type.is_dir() {
        pending.push(entry.path());
      } else if file_type.is_file() {
        if let Ok(relative) = entry.path().strip_prefix(root) {
          let parts: Vec<String> = relative.iter().map(|p| p.to_string_lossy().into_owned()).collect();
          files.push(parts.join("/"));
        }
      }
    }
  }
  files.sort();
  Ok(files)
}

fn parse_extensions(raw: &str) -> BTreeSet<String> {
  raw
    .split(',')
    .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
    .filter(|e| !e.is_empty())
    .collect()
}

fn matches_extension(path: &str, wanted: &BTreeSet<String>) -> bool {
  if wanted.is_empty() {
    return true;
  }
  Path::new(path)
    .extension()
    .map(|e| wanted.contains(&e.to_string_lossy().to_ascii_lowercase()))
    .unwrap_or(false)
}
