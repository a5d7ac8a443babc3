// tests/registry_tests.rs
mod common;

use bindery::{BinderyError, JobOption, JobState, OptionValue, Orchestrator, UserArgs, Workflow, WorkflowRegistry};
use common::*;
use serde_json::json;
use serial_test::serial;

fn registry() -> WorkflowRegistry {
  let registry = WorkflowRegistry::new();
  registry
    .register("make checksum", || {
      TestWorkflow::new("make checksum")
        .with_options(vec![JobOption::text("source").required(), JobOption::flag("overwrite")])
        .with_descriptors(2)
    })
    .unwrap();
  registry
    .register("verify", || TestWorkflow::new("verify").with_descriptors(1))
    .unwrap();
  registry
}

#[test]
fn test_names_are_sorted_and_unique() {
  let registry = registry();
  assert_eq!(registry.len(), 2);
  assert_eq!(registry.names(), vec!["make checksum".to_string(), "verify".to_string()]);
  assert!(registry.contains("verify"));

  let duplicate = registry.register("verify", || TestWorkflow::new("verify"));
  assert!(matches!(duplicate, Err(BinderyError::DuplicateWorkflow { name }) if name == "verify"));
  assert_eq!(registry.len(), 2);
}

#[test]
fn test_unknown_workflow_is_reported() {
  let registry = registry();
  assert!(matches!(
    registry.create("zip packages"),
    Err(BinderyError::WorkflowNotFound { name }) if name == "zip packages"
  ));
}

#[test]
fn test_each_create_builds_a_fresh_instance() {
  let registry = registry();
  let a = registry.create("verify").unwrap();
  let b = registry.create("verify").unwrap();
  assert!(!std::sync::Arc::ptr_eq(&a, &b));
  assert_eq!(a.name(), "verify");
}

#[test]
fn test_create_job_loads_typed_values() {
  let registry = registry();
  let args: UserArgs = [
    ("source", OptionValue::Text("/scans".into())),
    ("overwrite", OptionValue::Flag(true)),
  ]
  .into_iter()
  .collect();
  let job = registry.create_job("make checksum", &args).unwrap();
  assert_eq!(job.state(), JobState::Configuring);
  assert_eq!(job.workflow_name(), "make checksum");
  assert!(job.options().is_complete());
  assert_eq!(job.options().final_data().flag("overwrite"), Some(true));
}

#[test]
fn test_create_job_from_json_rejects_unknown_options() {
  let registry = registry();
  let values = json!({ "source": "/scans", "colour": "red" });
  let result = registry.create_job_from_json("make checksum", values.as_object().unwrap());
  assert!(matches!(result, Err(BinderyError::UnknownOption { label }) if label == "colour"));
}

#[tokio::test]
#[serial]
async fn test_registered_workflow_runs_end_to_end() {
  setup_tracing();
  let registry = registry();
  let values = json!({ "source": "/scans" });
  let job = registry.create_job_from_json("make checksum", values.as_object().unwrap()).unwrap();
  let outcome = Orchestrator::default().run_unattended(job).await;

  assert!(outcome.is_completed(), "Job failed: {:?}", outcome.error);
  assert_eq!(outcome.workflow, "make checksum");
  assert_eq!(outcome.results.len(), 2);
}
