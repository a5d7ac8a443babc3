// bindery/src/task/context.rs

//! Defines the `Task` trait, the `TaskContext` handed to every task, and closure-backed tasks.

use crate::options::UserArgs;
use crate::task::descriptor::TaskId;
use crate::workflow::AdditionalData;
use async_trait::async_trait;
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Everything a task may see of its job.
///
/// Tasks communicate with the rest of the job only through their own descriptor (captured
/// when the workflow materialized them), this read-only context, and their result.
#[derive(Clone)]
pub struct TaskContext {
  /// Slot identity for discovered tasks; `None` for initial and completion tasks.
  pub task_id: Option<TaskId>,
  /// Job arguments. Read-only for the whole task phase.
  pub args: Arc<UserArgs>,
  /// Data supplied by the caller in answer to an additional-info request.
  pub additional: Arc<AdditionalData>,
  cancellation_token: CancellationToken,
}

impl TaskContext {
  pub fn new(
    task_id: Option<TaskId>,
    args: Arc<UserArgs>,
    additional: Arc<AdditionalData>,
    cancellation_token: CancellationToken,
  ) -> Self {
    Self {
      task_id,
      args,
      additional,
      cancellation_token,
    }
  }

  /// A context outside any job, with its own token. Handy for driving a task directly.
  pub fn detached(args: UserArgs) -> Self {
    Self::new(
      None,
      Arc::new(args),
      Arc::new(AdditionalData::new()),
      CancellationToken::new(),
    )
  }

  /// Whether the job was cancelled. Long-running tasks should poll this and stop promptly.
  pub fn is_cancelled(&self) -> bool {
    self.cancellation_token.is_cancelled()
  }

  /// Completes once the job is cancelled.
  pub async fn cancelled(&self) {
    self.cancellation_token.cancelled().await
  }

  pub fn child_token(&self) -> CancellationToken {
    self.cancellation_token.child_token()
  }
}

impl std::fmt::Debug for TaskContext {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("TaskContext")
      .field("task_id", &self.task_id)
      .field("cancelled", &self.is_cancelled())
      .finish_non_exhaustive()
  }
}

/// One executable unit of work.
///
/// `run` performs the work and returns the value stored in the task's result slot.
/// Blocking work (external tools, large file reads) belongs in `tokio::task::spawn_blocking`
/// or `tokio::process` so it only occupies this task's worker slot.
#[async_trait]
pub trait Task: Send + Sync {
  fn name(&self) -> &str;

  async fn run(&self, ctx: TaskContext) -> anyhow::Result<Value>;
}

/// Type alias for the boxed closure behind an `FnTask`.
pub type TaskHandler =
  Box<dyn Fn(TaskContext) -> Pin<Box<dyn Future<Output = anyhow::Result<Value>> + Send>> + Send + Sync>;

/// A task backed by an async closure.
pub struct FnTask {
  name: String,
  handler: TaskHandler,
}

#[async_trait]
impl Task for FnTask {
  fn name(&self) -> &str {
    &self.name
  }

  async fn run(&self, ctx: TaskContext) -> anyhow::Result<Value> {
    (self.handler)(ctx).await
  }
}

/// Wraps an async closure as a boxed `Task`.
pub fn task_fn<F, Fut>(name: impl Into<String>, handler_fn: F) -> Box<dyn Task>
where
  F: Fn(TaskContext) -> Fut + Send + Sync + 'static,
  Fut: Future<Output = anyhow::Result<Value>> + Send + 'static,
{
  let handler: TaskHandler = Box::new(move |ctx| Box::pin(handler_fn(ctx)));
  Box::new(FnTask {
    name: name.into(),
    handler,
  })
}
