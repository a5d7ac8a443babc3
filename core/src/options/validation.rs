// bindery/src/options/validation.rs

//! Small validators for `Workflow::validate_user_options` implementations.
//! Each returns `Some(message)` when the check fails.

use super::option::JobOption;
use super::value::UserArgs;

pub fn require_value(args: &UserArgs, label: &str) -> Option<String> {
  match args.get(label) {
    Some(value) if !value.is_empty() => None,
    _ => Some(format!("required field empty: {}", label)),
  }
}

pub fn require_existing_path(args: &UserArgs, label: &str) -> Option<String> {
  let path = args.path(label)?;
  if path.as_os_str().is_empty() || path.exists() {
    None
  } else {
    Some(format!("{}: path does not exist: {}", label, path.display()))
  }
}

pub fn require_directory(args: &UserArgs, label: &str) -> Option<String> {
  let path = args.path(label)?;
  if path.as_os_str().is_empty() || path.is_dir() {
    None
  } else {
    Some(format!("{}: not a directory: {}", label, path.display()))
  }
}

pub fn require_file(args: &UserArgs, label: &str) -> Option<String> {
  let path = args.path(label)?;
  if path.as_os_str().is_empty() || path.is_file() {
    None
  } else {
    Some(format!("{}: not a file: {}", label, path.display()))
  }
}

/// Empty-value check for every required option in a schema.
pub fn required_options(schema: &[JobOption], args: &UserArgs) -> Vec<String> {
  schema
    .iter()
    .filter(|o| o.required)
    .filter_map(|o| require_value(args, &o.label))
    .collect()
}

/// Turns a list of check results into the `validate_user_options` return shape.
pub fn collect_errors<I>(checks: I) -> Result<(), Vec<String>>
where
  I: IntoIterator<Item = Option<String>>,
{
  let errors: Vec<String> = checks.into_iter().flatten().collect();
  if errors.is_empty() {
    Ok(())
  } else {
    Err(errors)
  }
}
