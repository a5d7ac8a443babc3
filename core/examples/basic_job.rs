// bindery/examples/basic_job.rs

use bindery::{
  task_fn, AdditionalData, ChannelSink, Job, JobEvent, JobOption, Orchestrator, Report, RunnerConfig, Task,
  TaskDescriptor, TaskResults, UserArgs, Workflow,
};
use serde_json::{json, Value};
use tracing::info;

// 1. A workflow that "checksums" a fixed list of file names.
struct ChecksumWorkflow;

impl Workflow for ChecksumWorkflow {
  fn name(&self) -> &str {
    "make checksum batch"
  }

  fn description(&self) -> &str {
    "Computes a checksum for every file of a package"
  }

  fn job_options(&self) -> Vec<JobOption> {
    vec![
      JobOption::text("package").required(),
      JobOption::choice("algorithm", ["md5", "sha1"]).with_default(bindery::OptionValue::Choice("md5".into())),
    ]
  }

  // 2. Discovery plans the work; it does none of it.
  fn discover_task_metadata(
    &self,
    _initial_results: &[Value],
    _additional: &AdditionalData,
    args: &UserArgs,
  ) -> anyhow::Result<Vec<TaskDescriptor>> {
    let package = args.text("package").unwrap_or_default();
    Ok(
      ["00000001.tif", "00000002.tif", "00000003.tif"]
        .iter()
        .map(|file| TaskDescriptor::new(json!({ "package": package, "file": file })))
        .collect(),
    )
  }

  // 3. Each descriptor becomes one independent task.
  fn create_new_task(&self, descriptor: &TaskDescriptor) -> anyhow::Result<Box<dyn Task>> {
    let file = descriptor
      .get_str("file")
      .ok_or_else(|| anyhow::anyhow!("descriptor has no file"))?
      .to_string();
    Ok(task_fn(format!("checksum {}", file), move |ctx| {
      let file = file.clone();
      async move {
        let algorithm = ctx.args.choice("algorithm").unwrap_or("md5").to_string();
        let digest = file.bytes().fold(0u32, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u32));
        info!(%file, %algorithm, "Checksum computed.");
        Ok(json!({ "file": file, "algorithm": algorithm, "digest": format!("{:08x}", digest) }))
      }
    }))
  }

  // 4. The report sees every result.
  fn generate_report(&self, results: &TaskResults) -> anyhow::Result<Option<Report>> {
    let lines: Vec<String> = results
      .successes()
      .map(|(_, value)| format!("{} {}", value["digest"].as_str().unwrap_or("?"), value["file"].as_str().unwrap_or("?")))
      .collect();
    Ok(Some(Report::text(lines.join("\n"))))
  }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

  info!("--- Basic Job Example ---");

  let mut job = Job::new(std::sync::Arc::new(ChecksumWorkflow))?;
  job.options_mut().set_text("package", "39015012345678")?;

  let (sink, mut events) = ChannelSink::new();
  let orchestrator = Orchestrator::new(RunnerConfig::with_max_workers(2)?)?.with_event_sink(sink);
  let outcome = orchestrator.run_unattended(job).await;

  while let Ok(event) = events.try_recv() {
    if let JobEvent::TaskSucceeded { completed, total, .. } = event {
      info!("Progress: {}/{}", completed, total);
    }
  }

  match outcome.report {
    Some(report) => println!("{}", report.summary),
    None => println!("No report: {:?}", outcome.failure_summary()),
  }
  Ok(())
}
