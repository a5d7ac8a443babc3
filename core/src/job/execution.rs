// bindery/src/job/execution.rs

//! Contains the `Orchestrator`, which drives a `Job` through its phases, runs tasks on a
//! bounded worker pool, and always hands back a `JobOutcome`.

use crate::config::RunnerConfig;
use crate::error::{BinderyError, BinderyResult};
use crate::job::definition::Job;
use crate::job::events::{EventSink, JobEvent, NoopSink};
use crate::job::outcome::{JobOutcome, JobStatus};
use crate::job::state::JobState;
use crate::options::UserArgs;
use crate::task::{ResultArena, Task, TaskContext, TaskId, TaskOutcome};
use crate::workflow::{AdditionalInfoProvider, NoAdditionalInfo, Report};
use anyhow::anyhow;
use parking_lot::Mutex;
use serde_json::Value;
use std::any::Any;
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::{JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{event, instrument, span, Instrument, Level};

/// Why `drive` stopped before `Done`.
enum Interruption {
  Cancelled,
  Failed(BinderyError),
}

impl From<BinderyError> for Interruption {
  fn from(err: BinderyError) -> Self {
    Interruption::Failed(err)
  }
}

fn phase_failure(phase: JobState) -> impl FnOnce(anyhow::Error) -> Interruption {
  move |source| Interruption::Failed(BinderyError::PhaseFailure { phase, source })
}

/// Runs jobs. Holds the worker pool size and the event sink; owns no job state between runs.
pub struct Orchestrator {
  config: RunnerConfig,
  sink: Arc<dyn EventSink>,
}

impl Default for Orchestrator {
  fn default() -> Self {
    Self {
      config: RunnerConfig::default(),
      sink: Arc::new(NoopSink),
    }
  }
}

impl Orchestrator {
  pub fn new(config: RunnerConfig) -> BinderyResult<Self> {
    config.validate()?;
    Ok(Self {
      config,
      sink: Arc::new(NoopSink),
    })
  }

  /// Routes progress events to `sink`.
  pub fn with_event_sink(mut self, sink: impl EventSink + 'static) -> Self {
    self.sink = Arc::new(sink);
    self
  }

  pub fn config(&self) -> &RunnerConfig {
    &self.config
  }

  /// Runs `job` to a terminal state.
  ///
  /// Never fails outright: the outcome carries either a report or the reason there is
  /// none, together with every initial and task result produced before the job stopped.
  #[instrument(
    name = "Orchestrator::run",
    skip_all,
    fields(
      workflow = %job.workflow_name(),
      max_workers = self.config.max_workers,
    )
  )]
  pub async fn run(&self, mut job: Job, info: &dyn AdditionalInfoProvider) -> JobOutcome {
    event!(Level::INFO, "Job starting.");
    let result = self.drive(&mut job, info).await;
    self.finish(job, result)
  }

  /// Runs a job whose workflow never asks for additional information.
  pub async fn run_unattended(&self, job: Job) -> JobOutcome {
    self.run(job, &NoAdditionalInfo).await
  }

  async fn drive(&self, job: &mut Job, info: &dyn AdditionalInfoProvider) -> Result<Option<Report>, Interruption> {
    let workflow = job.workflow.clone();

    // Configuring -> Validating needs every required option filled in.
    let missing = job.options.missing_required();
    if !missing.is_empty() {
      event!(Level::WARN, ?missing, "Required options have no value.");
      return Err(BinderyError::IncompleteConfiguration { missing }.into());
    }
    self.check_cancelled(job)?;
    self.transition(job, JobState::Validating)?;

    let args = Arc::new(job.options.final_data());
    match workflow.validate_user_options(&args) {
      Err(errors) if !errors.is_empty() => {
        event!(Level::WARN, count = errors.len(), "Option validation failed.");
        return Err(BinderyError::Validation(errors).into());
      }
      _ => {}
    }

    self.check_cancelled(job)?;
    self.transition(job, JobState::RunningInitialTasks)?;
    let initial_tasks = workflow
      .initial_tasks(&args)
      .map_err(phase_failure(JobState::RunningInitialTasks))?;
    self.run_initial_tasks(job, initial_tasks, &args).await?;

    self.check_cancelled(job)?;
    self.transition(job, JobState::Discovering)?;
    let request = workflow
      .additional_info_request(&args, &job.initial_results)
      .map_err(phase_failure(JobState::Discovering))?;
    if let Some(request) = request {
      self.transition(job, JobState::AwaitingAdditionalInfo)?;
      event!(Level::INFO, prompt = %request.prompt, "Waiting for additional information.");
      self.sink.emit(JobEvent::InfoRequested {
        request: request.clone(),
      });
      let token = job.cancellation_token.clone();
      let reply = tokio::select! {
        biased;
        _ = token.cancelled() => return Err(Interruption::Cancelled),
        reply = info.provide(workflow.name(), &args, request) => reply,
      };
      job.additional = Arc::new(reply.map_err(phase_failure(JobState::AwaitingAdditionalInfo))?);
      self.transition(job, JobState::Discovering)?;
    }

    let descriptors = workflow
      .discover_task_metadata(&job.initial_results, &job.additional, &args)
      .map_err(phase_failure(JobState::Discovering))?;
    job.tasks_discovered = descriptors.len();
    event!(Level::INFO, tasks = descriptors.len(), "Discovery finished.");

    self.check_cancelled(job)?;
    if descriptors.is_empty() {
      event!(Level::INFO, "No tasks discovered, skipping to completion.");
      self.transition(job, JobState::Completing)?;
    } else {
      self.transition(job, JobState::MaterializingAndRunningTasks)?;
      let tasks = descriptors
        .iter()
        .map(|descriptor| workflow.create_new_task(descriptor))
        .collect::<anyhow::Result<Vec<_>>>()
        .map_err(phase_failure(JobState::MaterializingAndRunningTasks))?;
      let arena = Arc::new(ResultArena::new(descriptors));
      job.results = Some(arena.clone());
      self.run_discovered_tasks(job, tasks, arena, &args).await?;
      self.check_cancelled(job)?;
      self.transition(job, JobState::Completing)?;
    }

    let results = job.results.as_ref().map(|arena| arena.snapshot()).unwrap_or_default();
    let completion = workflow
      .completion_task(&results)
      .map_err(phase_failure(JobState::Completing))?;
    if let Some(task) = completion {
      event!(Level::DEBUG, task_name = %task.name(), "Running completion task.");
      self.sink.emit(JobEvent::CompletionTaskStarted {
        name: task.name().to_string(),
      });
      let ctx = TaskContext::new(
        None,
        args.clone(),
        job.additional.clone(),
        job.cancellation_token.clone(),
      );
      match run_guarded(Arc::from(task), ctx).await {
        Ok(value) => {
          self.sink.emit(JobEvent::CompletionTaskSucceeded);
          job.completion_result = Some(value);
        }
        Err(error) => {
          self.sink.emit(JobEvent::CompletionTaskFailed { error: error.clone() });
          return Err(phase_failure(JobState::Completing)(anyhow!(error)));
        }
      }
    }

    self.check_cancelled(job)?;
    self.transition(job, JobState::Reporting)?;
    let report = workflow
      .generate_report(&results)
      .map_err(phase_failure(JobState::Reporting))?;
    self.transition(job, JobState::Done)?;
    Ok(report)
  }

  /// Runs every initial task to completion before returning.
  async fn run_initial_tasks(
    &self,
    job: &mut Job,
    tasks: Vec<Box<dyn Task>>,
    args: &Arc<UserArgs>,
  ) -> Result<(), Interruption> {
    if tasks.is_empty() {
      return Ok(());
    }
    let total = tasks.len();
    event!(Level::DEBUG, total, "Running initial tasks.");

    let semaphore = Arc::new(Semaphore::new(self.config.max_workers));
    let completed = Arc::new(Mutex::new(0usize));
    let mut join_set = JoinSet::new();
    let mut dispatch_stopped = false;
    for (idx, task) in tasks.into_iter().enumerate() {
      let Some(permit) = acquire_slot(&semaphore, &job.cancellation_token).await else {
        dispatch_stopped = true;
        break;
      };
      let task: Arc<dyn Task> = Arc::from(task);
      {
        let _order = completed.lock();
        self.sink.emit(JobEvent::InitialTaskStarted {
          index: idx,
          name: task.name().to_string(),
          total,
        });
      }
      let ctx = TaskContext::new(
        None,
        args.clone(),
        job.additional.clone(),
        job.cancellation_token.clone(),
      );
      let sink = self.sink.clone();
      let completed = completed.clone();
      let task_span = span!(Level::DEBUG, "initial_task", index = idx, task_name = %task.name());
      join_set.spawn(
        async move {
          let _permit = permit;
          let result = run_guarded(task, ctx).await;
          let mut done = completed.lock();
          *done += 1;
          sink.emit(match &result {
            Ok(_) => JobEvent::InitialTaskSucceeded {
              index: idx,
              completed: *done,
              total,
            },
            Err(error) => JobEvent::InitialTaskFailed {
              index: idx,
              error: error.clone(),
              completed: *done,
              total,
            },
          });
          (idx, result)
        }
        .instrument(task_span),
      );
    }

    let mut outputs: Vec<Option<Value>> = vec![None; total];
    let mut first_error: Option<(usize, String)> = None;
    while let Some(joined) = join_set.join_next().await {
      match joined {
        Ok((idx, Ok(value))) => outputs[idx] = Some(value),
        Ok((idx, Err(error))) => {
          event!(Level::ERROR, index = idx, %error, "Initial task failed.");
          if first_error.as_ref().map_or(true, |(first, _)| idx < *first) {
            first_error = Some((idx, error));
          }
        }
        Err(join_err) => {
          event!(Level::ERROR, error = %join_err, "Initial task runner failed.");
          first_error.get_or_insert((usize::MAX, join_err.to_string()));
        }
      }
    }
    job.initial_results = outputs.into_iter().flatten().collect();

    if let Some((idx, error)) = first_error {
      return Err(phase_failure(JobState::RunningInitialTasks)(anyhow!(
        "initial task {} failed: {}",
        idx,
        error
      )));
    }
    if dispatch_stopped {
      return Err(Interruption::Cancelled);
    }
    Ok(())
  }

  /// Dispatches materialized tasks onto the pool and waits for every started one.
  ///
  /// Individual failures land in their result slot and never stop siblings.
  async fn run_discovered_tasks(
    &self,
    job: &Job,
    tasks: Vec<Box<dyn Task>>,
    arena: Arc<ResultArena>,
    args: &Arc<UserArgs>,
  ) -> Result<(), Interruption> {
    let total = tasks.len();
    let semaphore = Arc::new(Semaphore::new(self.config.max_workers));
    // Serializes slot writes with event emission so `completed` counts arrive in order.
    let completed = Arc::new(Mutex::new(0usize));
    let mut join_set = JoinSet::new();
    let mut fatal: Option<BinderyError> = None;

    for (idx, task) in tasks.into_iter().enumerate() {
      let Some(permit) = acquire_slot(&semaphore, &job.cancellation_token).await else {
        event!(
          Level::WARN,
          started = idx,
          total,
          "Cancellation requested, remaining tasks will not start."
        );
        break;
      };
      let id = TaskId(idx);
      let task: Arc<dyn Task> = Arc::from(task);
      {
        let _order = completed.lock();
        if let Err(e) = arena.mark_running(id) {
          fatal = Some(e);
          break;
        }
        event!(Level::DEBUG, task_id = idx, task_name = %task.name(), "Task dispatched.");
        self.sink.emit(JobEvent::TaskStarted {
          id,
          name: task.name().to_string(),
          total,
        });
      }

      let ctx = TaskContext::new(
        Some(id),
        args.clone(),
        job.additional.clone(),
        job.cancellation_token.clone(),
      );
      let arena = arena.clone();
      let sink = self.sink.clone();
      let completed = completed.clone();
      let task_span = span!(Level::INFO, "task_execution", task_id = idx, task_name = %task.name());
      join_set.spawn(
        async move {
          let _permit = permit;
          let outcome = match run_guarded(task, ctx).await {
            Ok(value) => TaskOutcome::succeeded(value),
            Err(error) => TaskOutcome::failed(error),
          };

          let mut done = completed.lock();
          *done += 1;
          let event = match &outcome {
            TaskOutcome::Succeeded { .. } => {
              event!(Level::DEBUG, "Task succeeded.");
              JobEvent::TaskSucceeded {
                id,
                completed: *done,
                total,
              }
            }
            TaskOutcome::Failed { error } => {
              event!(Level::WARN, %error, "Task failed.");
              JobEvent::TaskFailed {
                id,
                error: error.clone(),
                completed: *done,
                total,
              }
            }
          };
          if let Err(e) = arena.record(id, outcome) {
            event!(Level::ERROR, error = %e, "Could not record task result.");
          }
          sink.emit(event);
        }
        .instrument(task_span),
      );
    }

    while let Some(joined) = join_set.join_next().await {
      if let Err(join_err) = joined {
        event!(Level::ERROR, error = %join_err, "Task runner failed.");
      }
    }
    event!(
      Level::INFO,
      finished = arena.filled(),
      total,
      "Task phase finished."
    );

    match fatal {
      Some(err) => Err(err.into()),
      None => Ok(()),
    }
  }

  fn transition(&self, job: &mut Job, next: JobState) -> Result<(), Interruption> {
    let from = job.state;
    job.state.advance(next)?;
    event!(Level::DEBUG, %from, to = %next, "Job phase changed.");
    self.sink.emit(JobEvent::PhaseChanged { from, to: next });
    Ok(())
  }

  fn check_cancelled(&self, job: &Job) -> Result<(), Interruption> {
    if job.cancellation_token.is_cancelled() && job.state.is_cancellable() {
      Err(Interruption::Cancelled)
    } else {
      Ok(())
    }
  }

  fn finish(&self, mut job: Job, result: Result<Option<Report>, Interruption>) -> JobOutcome {
    let workflow = job.workflow.name().to_string();
    let (status, stopped_in, report, error) = match result {
      Ok(report) => {
        event!(Level::INFO, "Job completed.");
        (JobStatus::Completed, None, report, None)
      }
      Err(Interruption::Cancelled) => {
        let stopped_in = job.state;
        self.settle(&mut job, JobState::Cancelled);
        event!(Level::WARN, %stopped_in, "Job cancelled.");
        (JobStatus::Cancelled, Some(stopped_in), None, None)
      }
      Err(Interruption::Failed(error)) => {
        let stopped_in = job.state;
        self.settle(&mut job, JobState::Failed);
        event!(Level::ERROR, %stopped_in, %error, "Job failed.");
        (JobStatus::Failed, Some(stopped_in), None, Some(error))
      }
    };

    let results = job.results.as_ref().map(|arena| arena.snapshot()).unwrap_or_default();
    JobOutcome {
      workflow,
      status,
      final_state: job.state,
      stopped_in,
      report,
      error,
      initial_results: job.initial_results,
      tasks_discovered: job.tasks_discovered,
      results,
      completion_result: job.completion_result,
    }
  }

  fn settle(&self, job: &mut Job, terminal: JobState) {
    if self.transition(job, terminal).is_err() {
      event!(Level::ERROR, from = %job.state, to = %terminal, "Unexpected terminal transition.");
      job.state = terminal;
    }
  }
}

/// Waits for a free worker slot unless the job is cancelled first.
async fn acquire_slot(semaphore: &Arc<Semaphore>, token: &CancellationToken) -> Option<OwnedSemaphorePermit> {
  if token.is_cancelled() {
    return None;
  }
  tokio::select! {
    biased;
    _ = token.cancelled() => None,
    permit = semaphore.clone().acquire_owned() => permit.ok().filter(|_| !token.is_cancelled()),
  }
}

/// Aborts the wrapped task when dropped, so a task never outlives the run that started it.
struct AbortOnDrop<T>(JoinHandle<T>);

impl<T> Drop for AbortOnDrop<T> {
  fn drop(&mut self) {
    self.0.abort();
  }
}

/// Runs a task on its own tokio task so a panic becomes an ordinary failure.
async fn run_guarded(task: Arc<dyn Task>, ctx: TaskContext) -> Result<Value, String> {
  let mut handle = AbortOnDrop(tokio::spawn(async move { task.run(ctx).await }));
  match (&mut handle.0).await {
    Ok(Ok(value)) => Ok(value),
    Ok(Err(e)) => Err(format!("{:#}", e)),
    Err(join_err) if join_err.is_panic() => Err(format!("task panicked: {}", panic_message(join_err.into_panic()))),
    Err(join_err) => Err(format!("task aborted: {}", join_err)),
  }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
  if let Some(s) = payload.downcast_ref::<&str>() {
    (*s).to_string()
  } else if let Some(s) = payload.downcast_ref::<String>() {
    s.clone()
  } else {
    "unknown panic payload".to_string()
  }
}
