// bindery/src/job/mod.rs

//! Defines the `Job` aggregate, its state machine, progress events, and the `Orchestrator`
//! that runs it.

pub mod definition;
pub mod events;
pub mod execution;
pub mod outcome;
pub mod state;

pub use definition::{CancelHandle, Job};
pub use events::{ChannelSink, EventSink, JobEvent, NoopSink};
pub use execution::Orchestrator;
pub use outcome::{JobOutcome, JobStatus};
pub use state::JobState;
