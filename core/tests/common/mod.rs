// tests/common/mod.rs
#![allow(dead_code)] // Allow unused code in this common test module

use anyhow::anyhow;
use bindery::{
  task_fn, AdditionalData, InfoRequest, JobOption, Report, Task, TaskDescriptor, TaskResults, UserArgs, Workflow,
};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::sync::{
  atomic::{AtomicUsize, Ordering},
  Arc,
};
use std::time::Duration;
use tracing::Level;

// --- Concurrency probe ---
#[derive(Debug, Default)]
pub struct ConcurrencyProbe {
  current: AtomicUsize,
  pub max_seen: AtomicUsize,
}

impl ConcurrencyProbe {
  fn enter(&self) {
    let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
    self.max_seen.fetch_max(now, Ordering::SeqCst);
  }

  fn exit(&self) {
    self.current.fetch_sub(1, Ordering::SeqCst);
  }
}

// --- Configurable workflow used across the test suite ---
#[derive(Clone)]
pub struct TestWorkflow {
  pub name: String,
  pub options: Vec<JobOption>,
  pub descriptor_count: usize,
  pub failing_tasks: Vec<usize>,
  pub panicking_tasks: Vec<usize>,
  pub initial_values: Vec<Value>,
  pub failing_initial_task: Option<usize>,
  pub initial_delay: Duration,
  pub task_delay: Duration,
  pub block_until_cancelled: bool,
  pub validation_errors: Vec<String>,
  pub info_request: Option<InfoRequest>,
  pub fail_discovery: bool,
  pub fail_create: bool,
  pub fail_report: bool,
  pub with_completion_task: bool,
  pub fail_completion: bool,
  pub probe: Option<Arc<ConcurrencyProbe>>,

  // Observations
  pub created: Arc<AtomicUsize>,
  pub finished: Arc<AtomicUsize>,
  pub initial_runs: Arc<AtomicUsize>,
  pub discovery_saw: Arc<Mutex<Option<(Vec<Value>, AdditionalData)>>>,
  pub report_saw: Arc<Mutex<Option<TaskResults>>>,
  pub completion_saw: Arc<Mutex<Option<TaskResults>>>,
}

impl TestWorkflow {
  pub fn new(name: &str) -> Self {
    Self {
      name: name.to_string(),
      options: Vec::new(),
      descriptor_count: 0,
      failing_tasks: Vec::new(),
      panicking_tasks: Vec::new(),
      initial_values: Vec::new(),
      failing_initial_task: None,
      initial_delay: Duration::ZERO,
      task_delay: Duration::ZERO,
      block_until_cancelled: false,
      validation_errors: Vec::new(),
      info_request: None,
      fail_discovery: false,
      fail_create: false,
      fail_report: false,
      with_completion_task: false,
      fail_completion: false,
      probe: None,
      created: Arc::new(AtomicUsize::new(0)),
      finished: Arc::new(AtomicUsize::new(0)),
      initial_runs: Arc::new(AtomicUsize::new(0)),
      discovery_saw: Arc::new(Mutex::new(None)),
      report_saw: Arc::new(Mutex::new(None)),
      completion_saw: Arc::new(Mutex::new(None)),
    }
  }

  pub fn with_options(mut self, options: Vec<JobOption>) -> Self {
    self.options = options;
    self
  }

  pub fn with_descriptors(mut self, count: usize) -> Self {
    self.descriptor_count = count;
    self
  }

  pub fn created_count(&self) -> usize {
    self.created.load(Ordering::SeqCst)
  }
}

impl Workflow for TestWorkflow {
  fn name(&self) -> &str {
    &self.name
  }

  fn description(&self) -> &str {
    "Configurable workflow for tests"
  }

  fn job_options(&self) -> Vec<JobOption> {
    self.options.clone()
  }

  fn validate_user_options(&self, args: &UserArgs) -> Result<(), Vec<String>> {
    if !self.validation_errors.is_empty() {
      return Err(self.validation_errors.clone());
    }
    bindery::options::validation::collect_errors(
      self
        .options
        .iter()
        .filter(|o| o.required)
        .map(|o| bindery::options::validation::require_value(args, &o.label)),
    )
  }

  fn initial_tasks(&self, _args: &UserArgs) -> anyhow::Result<Vec<Box<dyn Task>>> {
    let tasks = self
      .initial_values
      .iter()
      .cloned()
      .enumerate()
      .map(|(idx, value)| {
        let delay = self.initial_delay;
        let fail = self.failing_initial_task == Some(idx);
        let runs = self.initial_runs.clone();
        task_fn(format!("initial-{}", idx), move |_ctx| {
          let value = value.clone();
          let runs = runs.clone();
          async move {
            if !delay.is_zero() {
              tokio::time::sleep(delay).await;
            }
            runs.fetch_add(1, Ordering::SeqCst);
            if fail {
              return Err(anyhow!("initial task {} could not read its input", idx));
            }
            Ok(value)
          }
        })
      })
      .collect();
    Ok(tasks)
  }

  fn additional_info_request(&self, _args: &UserArgs, _initial_results: &[Value]) -> anyhow::Result<Option<InfoRequest>> {
    Ok(self.info_request.clone())
  }

  fn discover_task_metadata(
    &self,
    initial_results: &[Value],
    additional: &AdditionalData,
    _args: &UserArgs,
  ) -> anyhow::Result<Vec<TaskDescriptor>> {
    *self.discovery_saw.lock() = Some((initial_results.to_vec(), additional.clone()));
    if self.fail_discovery {
      return Err(anyhow!("discovery could not plan the job"));
    }
    let count = additional
      .get("count")
      .and_then(Value::as_u64)
      .map(|c| c as usize)
      .unwrap_or(self.descriptor_count);
    Ok(
      (0..count)
        .map(|index| TaskDescriptor::new(json!({ "index": index })))
        .collect(),
    )
  }

  fn create_new_task(&self, descriptor: &TaskDescriptor) -> anyhow::Result<Box<dyn Task>> {
    if self.fail_create {
      return Err(anyhow!("cannot materialize {}", descriptor.data()));
    }
    self.created.fetch_add(1, Ordering::SeqCst);
    let index = descriptor
      .get("index")
      .and_then(Value::as_u64)
      .ok_or_else(|| anyhow!("descriptor without index"))? as usize;
    let fail = self.failing_tasks.contains(&index);
    let panic_now = self.panicking_tasks.contains(&index);
    let block = self.block_until_cancelled;
    let delay = self.task_delay;
    let probe = self.probe.clone();
    let finished = self.finished.clone();
    Ok(task_fn(format!("task-{}", index), move |ctx| {
      let probe = probe.clone();
      let finished = finished.clone();
      async move {
        if let Some(p) = &probe {
          p.enter();
        }
        if block {
          ctx.cancelled().await;
        }
        if !delay.is_zero() {
          tokio::time::sleep(delay).await;
        }
        if let Some(p) = &probe {
          p.exit();
        }
        if panic_now {
          panic!("task {} blew up", index);
        }
        finished.fetch_add(1, Ordering::SeqCst);
        if fail {
          return Err(anyhow!("task {} failed", index));
        }
        Ok(json!({ "index": index, "args": ctx.args.len() }))
      }
    }))
  }

  fn completion_task(&self, results: &TaskResults) -> anyhow::Result<Option<Box<dyn Task>>> {
    *self.completion_saw.lock() = Some(results.clone());
    if !self.with_completion_task {
      return Ok(None);
    }
    let total = results.len();
    let fail = self.fail_completion;
    Ok(Some(task_fn("write-index", move |_ctx| async move {
      if fail {
        return Err(anyhow!("index write failed"));
      }
      Ok(json!({ "indexed": total }))
    })))
  }

  fn generate_report(&self, results: &TaskResults) -> anyhow::Result<Option<Report>> {
    *self.report_saw.lock() = Some(results.clone());
    if self.fail_report {
      return Err(anyhow!("report template missing"));
    }
    Ok(Some(
      Report::text(format!(
        "{} succeeded, {} failed",
        results.success_count(),
        results.failure_count()
      ))
      .with_data(json!({ "total": results.len() })),
    ))
  }
}

// --- Helper for Tracing Setup (call once per test run if needed) ---
use once_cell::sync::Lazy;
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer() // Important for tests to capture output
    .try_init()
    .ok(); // Allow multiple initializations in tests (ok if fails)
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}
