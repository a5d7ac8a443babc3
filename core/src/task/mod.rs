// bindery/src/task/mod.rs

//! Units of work: descriptors, the `Task` trait, lifecycle and result slots.

pub mod context;
pub mod descriptor;
pub mod results;
pub mod state;

pub use context::{task_fn, FnTask, Task, TaskContext, TaskHandler};
pub use descriptor::{TaskDescriptor, TaskId};
pub use results::{ResultArena, TaskOutcome, TaskRecord, TaskResults};
pub use state::TaskState;
