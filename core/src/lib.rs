// bindery/src/lib.rs

//! Bindery: a workflow/task job pipeline for batch processing of digitized library materials.
//!
//! A `Workflow` declares its options, turns validated user input into a flat list of
//! independent task descriptors, materializes each descriptor into a `Task`, and summarises
//! the results into a report. The `Orchestrator` drives a `Job` through those phases:
//!  - Validation of the option set before any work starts.
//!  - Initial tasks that gather what discovery needs, run to completion first.
//!  - An optional pause for information only the caller can supply.
//!  - Parallel task execution on a bounded worker pool, with isolated task failures.
//!  - Cooperative cancellation that keeps every result produced so far.
//!  - Progress events for every phase and task transition.

pub mod config;
pub mod error;
pub mod job;
pub mod options;
pub mod registry;
pub mod task;
pub mod workflow;

// --- Re-exports for the Public API ---

pub use crate::config::RunnerConfig;
pub use crate::error::{BinderyError, BinderyResult};

pub use crate::options::{JobOption, OptionKind, OptionValue, OptionValueModel, UserArgs};

pub use crate::task::{task_fn, Task, TaskContext, TaskDescriptor, TaskId, TaskOutcome, TaskRecord, TaskResults, TaskState};

pub use crate::workflow::{
  AdditionalData, AdditionalInfoProvider, ChannelInfoProvider, InfoPrompt, InfoRequest, NoAdditionalInfo, Report,
  StaticInfo, Workflow,
};

pub use crate::job::{
  CancelHandle, ChannelSink, EventSink, Job, JobEvent, JobOutcome, JobState, JobStatus, NoopSink, Orchestrator,
};

pub use crate::registry::WorkflowRegistry;

/*
    Typical use:
    1. Implement `Workflow` for each kind of batch job.
    2. Register constructors in a `WorkflowRegistry` at startup.
    3. Create a `Job` for the selected workflow and fill in its `OptionValueModel`.
    4. Keep the job's `CancelHandle` if the run may need stopping.
    5. `orchestrator.run(job, &info_provider).await` and inspect the `JobOutcome`.
*/
