// bindery/src/job/events.rs

//! Progress events and the sinks that deliver them to a caller.

use crate::job::state::JobState;
use crate::task::TaskId;
use crate::workflow::InfoRequest;
use serde::Serialize;
use tokio::sync::mpsc;

/// A phase or task transition, emitted in the order it happened.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum JobEvent {
  PhaseChanged {
    from: JobState,
    to: JobState,
  },
  InfoRequested {
    request: InfoRequest,
  },
  TaskStarted {
    id: TaskId,
    name: String,
    total: usize,
  },
  TaskSucceeded {
    id: TaskId,
    completed: usize,
    total: usize,
  },
  TaskFailed {
    id: TaskId,
    error: String,
    completed: usize,
    total: usize,
  },
  /// Initial tasks are numbered by their position in `Workflow::initial_tasks`.
  InitialTaskStarted {
    index: usize,
    name: String,
    total: usize,
  },
  InitialTaskSucceeded {
    index: usize,
    completed: usize,
    total: usize,
  },
  InitialTaskFailed {
    index: usize,
    error: String,
    completed: usize,
    total: usize,
  },
  CompletionTaskStarted {
    name: String,
  },
  CompletionTaskSucceeded,
  CompletionTaskFailed {
    error: String,
  },
}

/// Receives job events. Called from the orchestrator and from worker tasks, so it must not block.
pub trait EventSink: Send + Sync {
  fn emit(&self, event: JobEvent);
}

/// Drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl EventSink for NoopSink {
  fn emit(&self, _event: JobEvent) {}
}

/// Forwards events into an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelSink {
  tx: mpsc::UnboundedSender<JobEvent>,
}

impl ChannelSink {
  pub fn new() -> (Self, mpsc::UnboundedReceiver<JobEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Self { tx }, rx)
  }
}

impl EventSink for ChannelSink {
  fn emit(&self, event: JobEvent) {
    // A closed receiver means nobody is watching progress any more.
    let _ = self.tx.send(event);
  }
}

impl<F> EventSink for F
where
  F: Fn(JobEvent) + Send + Sync,
{
  fn emit(&self, event: JobEvent) {
    self(event)
  }
}
