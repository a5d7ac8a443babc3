// tests/option_model_tests.rs
mod common;

use bindery::options::title_case;
use bindery::{BinderyError, JobOption, OptionKind, OptionValue, OptionValueModel, UserArgs, Workflow};
use common::*;
use serde_json::json;
use std::path::PathBuf;

fn sample_model() -> OptionValueModel {
  OptionValueModel::new(vec![
    JobOption::path("input folder").required(),
    JobOption::text("title"),
    JobOption::flag("overwrite"),
    JobOption::choice("profile", ["hathi", "digital library"]),
  ])
  .unwrap()
}

#[test]
fn test_tabular_contract_has_one_row_per_option_and_one_column() {
  let model = sample_model();
  assert_eq!(model.row_count(), 4);
  assert_eq!(model.column_count(), 1);
  for row in 0..model.row_count() {
    assert_eq!(model.data(row, 0), Some(String::new()));
  }
  assert_eq!(model.data(4, 0), None);
  assert_eq!(model.data(0, 1), None);
}

#[test]
fn test_final_data_has_an_entry_for_every_option_even_when_unset() {
  let model = sample_model();
  let data = model.final_data();
  assert_eq!(data.len(), 4);
  assert_eq!(data.get("input folder"), Some(&OptionValue::Path(PathBuf::new())));
  assert_eq!(data.get("title"), Some(&OptionValue::Text(String::new())));
  assert_eq!(data.get("overwrite"), Some(&OptionValue::Flag(false)));
  assert_eq!(data.get("profile"), Some(&OptionValue::Choice(String::new())));
}

#[test]
fn test_header_is_label_in_title_case() {
  let model = sample_model();
  assert_eq!(model.header_data(0).as_deref(), Some("Input Folder"));
  assert_eq!(model.header_data(3).as_deref(), Some("Profile"));
  assert_eq!(model.header_data(9), None);
  assert_eq!(title_case("my_option"), "My_Option");
  assert_eq!(title_case("dummy2"), "Dummy2");
}

#[test]
fn test_unmodified_required_option_extracts_as_empty_string() {
  let model = OptionValueModel::new(vec![JobOption::text("my_option").required()]).unwrap();
  let data = serde_json::to_value(model.final_data()).unwrap();
  assert_eq!(data, json!({ "my_option": "" }));
}

#[test]
fn test_set_value_shows_up_in_final_data() {
  let mut model = OptionValueModel::new(vec![JobOption::text("my_option").required()]).unwrap();
  model.set_data(0, 0, OptionValue::Text("my data".to_string())).unwrap();
  assert_eq!(model.data(0, 0).as_deref(), Some("my data"));
  let data = serde_json::to_value(model.final_data()).unwrap();
  assert_eq!(data, json!({ "my_option": "my data" }));
}

#[test]
fn test_set_data_is_type_checked() {
  let mut model = sample_model();
  let err = model.set_data(2, 0, OptionValue::Text("yes".to_string())).unwrap_err();
  match err {
    BinderyError::OptionTypeMismatch { label, expected, actual } => {
      assert_eq!(label, "overwrite");
      assert_eq!(expected, "flag");
      assert_eq!(actual, "text");
    }
    other => panic!("Expected OptionTypeMismatch, got {:?}", other),
  }
  assert_eq!(model.data(2, 0), Some(String::new()));
}

#[test]
fn test_choice_must_be_one_of_the_declared_values() {
  let mut model = sample_model();
  assert!(matches!(
    model.set_value("profile", OptionValue::Choice("unknown".to_string())),
    Err(BinderyError::InvalidChoice { .. })
  ));
  model.set_value("profile", OptionValue::Choice("hathi".to_string())).unwrap();
  assert_eq!(model.final_data().choice("profile"), Some("hathi"));
}

#[test]
fn test_text_input_is_parsed_by_kind() {
  let mut model = sample_model();
  model.set_data_from_text(2, 0, "True").unwrap();
  model.set_data_from_text(0, 0, "/tmp/books").unwrap();
  let data = model.final_data();
  assert_eq!(data.flag("overwrite"), Some(true));
  assert_eq!(data.path("input folder"), Some(PathBuf::from("/tmp/books").as_path()));
  assert!(matches!(
    model.set_data_from_text(2, 0, "maybe"),
    Err(BinderyError::InvalidFlag { .. })
  ));
}

#[test]
fn test_cells_outside_the_table_are_rejected() {
  let mut model = sample_model();
  assert!(matches!(
    model.set_data(7, 0, OptionValue::Text("x".into())),
    Err(BinderyError::CellOutOfRange { row: 7, column: 0, rows: 4 })
  ));
  assert!(matches!(
    model.set_data(1, 1, OptionValue::Text("x".into())),
    Err(BinderyError::CellOutOfRange { row: 1, column: 1, .. })
  ));
}

#[test]
fn test_duplicate_labels_are_rejected() {
  let result = OptionValueModel::new(vec![JobOption::text("dummy"), JobOption::flag("dummy")]);
  assert!(matches!(result, Err(BinderyError::DuplicateOption { label }) if label == "dummy"));
}

#[test]
fn test_defaults_are_initial_values() {
  let model = OptionValueModel::new(vec![
    JobOption::choice("engine", ["tesseract", "none"]).with_default(OptionValue::Choice("tesseract".into())),
  ])
  .unwrap();
  assert_eq!(model.data(0, 0).as_deref(), Some("tesseract"));
  assert!(model.is_complete());
}

#[test]
fn test_missing_required_lists_empty_required_options() {
  let mut model = sample_model();
  assert_eq!(model.missing_required(), vec!["input folder".to_string()]);
  model.set_text("input folder", "/data").unwrap();
  assert!(model.missing_required().is_empty());
}

#[test]
fn test_load_json_round_trips_plain_mapping() {
  let mut model = sample_model();
  let mapping = json!({
    "input folder": "/scans",
    "title": "Atlas",
    "overwrite": true,
    "profile": "digital library",
  });
  model.load_json(mapping.as_object().unwrap()).unwrap();
  assert_eq!(serde_json::to_value(model.final_data()).unwrap(), mapping);
}

#[test]
fn test_load_json_rejects_unknown_labels_and_wrong_types() {
  let mut model = sample_model();
  let unknown = json!({ "colour": "red" });
  assert!(matches!(
    model.load_json(unknown.as_object().unwrap()),
    Err(BinderyError::UnknownOption { label }) if label == "colour"
  ));
  let wrong = json!({ "overwrite": 3 });
  assert!(matches!(
    model.load_json(wrong.as_object().unwrap()),
    Err(BinderyError::OptionTypeMismatch { .. })
  ));
}

#[test]
fn test_load_data_from_user_args() {
  let mut model = sample_model();
  let args: UserArgs = [("title", OptionValue::Text("Maps".into()))].into_iter().collect();
  model.load_data(&args).unwrap();
  assert_eq!(model.get("title").and_then(|o| o.value()), Some(&OptionValue::Text("Maps".into())));
}

#[test]
fn test_job_options_are_stable_across_calls() {
  let workflow = TestWorkflow::new("stable").with_options(vec![
    JobOption::text("dummy"),
    JobOption::choice("dummy2", ["a", "b"]),
  ]);
  assert_eq!(workflow.job_options(), workflow.job_options());
  assert_eq!(workflow.job_options()[1].kind, OptionKind::Choice(vec!["a".into(), "b".into()]));
}

#[test]
fn test_final_data_survives_json_and_loads_back() {
  let mut model = sample_model();
  model.set_text("input folder", "/scans").unwrap();
  model.set_text("overwrite", "yes").unwrap();
  model.set_value("profile", OptionValue::Choice("hathi".into())).unwrap();

  let text = serde_json::to_string(&model.final_data()).unwrap();
  let back: UserArgs = serde_json::from_str(&text).unwrap();

  let mut reloaded = sample_model();
  reloaded.load_data(&back).unwrap();
  assert_eq!(reloaded.final_data(), model.final_data());
  assert_eq!(
    reloaded.get("input folder").and_then(|o| o.value()),
    Some(&OptionValue::Path(PathBuf::from("/scans")))
  );
  assert_eq!(reloaded.final_data().choice("profile"), Some("hathi"));
}

#[test]
fn test_load_data_still_checks_choices_after_conversion() {
  let mut model = sample_model();
  let args: UserArgs = [("profile", OptionValue::Text("unknown".into()))].into_iter().collect();
  assert!(matches!(model.load_data(&args), Err(BinderyError::InvalidChoice { .. })));
}

#[test]
fn test_default_of_wrong_kind_is_a_schema_error() {
  let result = OptionValueModel::new(vec![JobOption::flag("overwrite").with_default(OptionValue::Text("yes".into()))]);
  assert!(matches!(
    result,
    Err(BinderyError::OptionTypeMismatch { label, .. }) if label == "overwrite"
  ));

  let result = OptionValueModel::new(vec![
    JobOption::choice("engine", ["tesseract"]).with_default(OptionValue::Choice("abbyy".into()))
  ]);
  assert!(matches!(result, Err(BinderyError::InvalidChoice { .. })));
}
