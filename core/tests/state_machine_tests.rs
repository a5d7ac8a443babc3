// tests/state_machine_tests.rs
use bindery::task::ResultArena;
use bindery::{BinderyError, JobState, TaskDescriptor, TaskId, TaskOutcome, TaskState};
use serde_json::json;

#[test]
fn test_successful_job_path_is_allowed() {
  let mut state = JobState::Configuring;
  for next in [
    JobState::Validating,
    JobState::RunningInitialTasks,
    JobState::Discovering,
    JobState::AwaitingAdditionalInfo,
    JobState::Discovering,
    JobState::MaterializingAndRunningTasks,
    JobState::Completing,
    JobState::Reporting,
    JobState::Done,
  ] {
    state.advance(next).unwrap();
  }
  assert!(state.is_terminal());
}

#[test]
fn test_phases_cannot_be_skipped() {
  assert!(!JobState::Configuring.can_transition_to(JobState::Discovering));
  assert!(!JobState::Validating.can_transition_to(JobState::MaterializingAndRunningTasks));
  assert!(!JobState::Completing.can_transition_to(JobState::Done));
  assert!(JobState::Discovering.can_transition_to(JobState::Completing));

  let mut state = JobState::Validating;
  let err = state.advance(JobState::Reporting).unwrap_err();
  assert!(matches!(err, BinderyError::InvalidTransition { .. }));
  assert_eq!(err.to_string(), "Invalid state transition from validating to reporting");
  assert_eq!(state, JobState::Validating);
}

#[test]
fn test_terminal_states_are_final() {
  for terminal in [JobState::Done, JobState::Failed, JobState::Cancelled] {
    assert!(!terminal.can_transition_to(JobState::Failed));
    assert!(!terminal.can_transition_to(JobState::Cancelled));
    assert!(!terminal.can_transition_to(JobState::Validating));
  }
}

#[test]
fn test_cancellation_is_not_honoured_while_reporting() {
  assert!(JobState::MaterializingAndRunningTasks.can_transition_to(JobState::Cancelled));
  assert!(JobState::AwaitingAdditionalInfo.can_transition_to(JobState::Cancelled));
  assert!(!JobState::Reporting.can_transition_to(JobState::Cancelled));
  assert!(JobState::Reporting.can_transition_to(JobState::Failed));
}

#[test]
fn test_task_lifecycle() {
  let mut state = TaskState::Pending;
  assert!(state.advance(TaskState::Succeeded).is_err());
  state.advance(TaskState::Running).unwrap();
  state.advance(TaskState::Failed).unwrap();
  assert!(state.is_terminal());
  assert!(state.advance(TaskState::Running).is_err());
}

#[test]
fn test_result_slots_are_write_once() {
  let arena = ResultArena::new(vec![
    TaskDescriptor::new(json!({ "file": "a.tif" })),
    TaskDescriptor::new(json!({ "file": "b.tif" })),
  ]);
  assert_eq!(arena.len(), 2);
  assert_eq!(arena.state(TaskId(0)), Some(TaskState::Pending));

  arena.mark_running(TaskId(0)).unwrap();
  arena.record(TaskId(0), TaskOutcome::succeeded(json!(42))).unwrap();
  assert_eq!(arena.state(TaskId(0)), Some(TaskState::Succeeded));

  let second = arena.record(TaskId(0), TaskOutcome::failed("late"));
  assert!(matches!(second, Err(BinderyError::SlotAlreadyFilled { task_id: 0 })));

  // A slot that never started cannot be filled.
  assert!(arena.record(TaskId(1), TaskOutcome::succeeded(json!(1))).is_err());
  assert!(arena.record(TaskId(5), TaskOutcome::succeeded(json!(1))).is_err());

  let results = arena.snapshot();
  assert_eq!(results.len(), 1);
  assert_eq!(arena.filled(), 1);
  let record = results.get(TaskId(0)).unwrap();
  assert_eq!(record.descriptor.get_str("file"), Some("a.tif"));
  assert_eq!(record.outcome.value(), Some(&json!(42)));
}

#[test]
fn test_task_outcome_serializes_with_status_tag() {
  let outcome = TaskOutcome::failed("disk full");
  assert_eq!(
    serde_json::to_value(&outcome).unwrap(),
    json!({ "status": "failed", "error": "disk full" })
  );
}
