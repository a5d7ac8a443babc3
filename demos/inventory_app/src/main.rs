// demos/inventory_app/src/main.rs

mod config;
mod errors;
mod workflows;

use crate::config::AppConfig;
use crate::errors::{AppError, Result as AppResult};

use bindery::{ChannelSink, JobEvent, Orchestrator, WorkflowRegistry};
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan; // For span events in tracing

#[tokio::main]
async fn main() {
  tracing_subscriber::fmt()
    .with_max_level(Level::INFO) // Default level
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env()) // Allow RUST_LOG override
    .with_span_events(FmtSpan::CLOSE) // Log when spans close, showing duration
    .init();

  if let Err(e) = run().await {
    tracing::error!(error = %e, "Inventory failed.");
    std::process::exit(1);
  }
}

async fn run() -> AppResult<()> {
  let app_config = AppConfig::from_env()?;

  let registry = WorkflowRegistry::new();
  workflows::register_all_workflows(&registry)?;

  let job = registry.create_job_from_json(workflows::inventory::NAME, &app_config.job_values())?;
  let cancel = job.cancel_handle();

  // Ctrl-C stops dispatching; files already being read still finish.
  tokio::spawn(async move {
    if tokio::signal::ctrl_c().await.is_ok() {
      tracing::warn!("Interrupt received, cancelling job.");
      cancel.cancel();
    }
  });

  let (sink, mut events) = ChannelSink::new();
  let progress = tokio::spawn(async move {
    while let Some(event) = events.recv().await {
      match event {
        JobEvent::PhaseChanged { to, .. } => tracing::info!(phase = %to, "Phase changed."),
        JobEvent::TaskSucceeded { completed, total, .. } if completed % 100 == 0 || completed == total => {
          tracing::info!(completed, total, "Progress.")
        }
        JobEvent::TaskFailed { id, error, .. } => tracing::warn!(task = %id, %error, "File could not be read."),
        _ => {}
      }
    }
  });

  let orchestrator = Orchestrator::new(app_config.runner.clone())?.with_event_sink(sink);
  let outcome = orchestrator.run_unattended(job).await;
  // Dropping the orchestrator closes the event channel so the progress logger ends.
  drop(orchestrator);
  if let Err(e) = progress.await {
    tracing::warn!(error = %e, "Progress logger stopped unexpectedly.");
  }

  let Some(report) = outcome.report.as_ref() else {
    return Err(AppError::JobNotCompleted(
      outcome.failure_summary().unwrap_or_else(|| "no report produced".to_string()),
    ));
  };
  println!("{}", report.summary);
  if let Some(manifest) = outcome.completion_result.as_ref().and_then(|v| v.as_str()) {
    println!("{}", manifest);
  }

  if let Some(path) = &app_config.report_path {
    let json = serde_json::to_string_pretty(report)?;
    tokio::fs::write(path, json).await?;
    tracing::info!(path = %path.display(), "Report written.");
  }
  Ok(())
}
