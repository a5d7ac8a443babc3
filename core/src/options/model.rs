// bindery/src/options/model.rs

//! The option value model: an ordered set of `JobOption`s presented as a table with
//! one row per option and a single value column.

use super::option::JobOption;
use super::value::{OptionValue, UserArgs};
use crate::error::{BinderyError, BinderyResult};
use std::collections::HashSet;
use tracing::{event, Level};

/// The only column of the table: the option's value.
pub const VALUE_COLUMN: usize = 0;

/// Ordered, label-unique configuration container bound to a workflow's option schema.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionValueModel {
  options: Vec<JobOption>,
}

impl OptionValueModel {
  /// Builds a model from a schema. Labels must be unique.
  pub fn new(options: Vec<JobOption>) -> BinderyResult<Self> {
    let mut seen = HashSet::new();
    for option in &options {
      if !seen.insert(option.label.as_str()) {
        return Err(BinderyError::DuplicateOption {
          label: option.label.clone(),
        });
      }
      option.check_schema()?;
    }
    Ok(Self { options })
  }

  // --- Tabular contract ---

  pub fn row_count(&self) -> usize {
    self.options.len()
  }

  pub fn column_count(&self) -> usize {
    1
  }

  /// Display value of a cell: the option's current value as text, `""` when unset.
  /// `None` for cells outside the table.
  pub fn data(&self, row: usize, column: usize) -> Option<String> {
    if column != VALUE_COLUMN {
      return None;
    }
    self.options.get(row).map(JobOption::display_value)
  }

  /// Row header: the option's label in title case.
  pub fn header_data(&self, row: usize) -> Option<String> {
    self.options.get(row).map(|o| title_case(&o.label))
  }

  /// Sets a cell from a typed value, checked against the option's kind.
  pub fn set_data(&mut self, row: usize, column: usize, value: OptionValue) -> BinderyResult<()> {
    let option = self.cell_mut(row, column)?;
    option.set_value(value)?;
    event!(Level::TRACE, label = %option.label, row, "Option value set.");
    Ok(())
  }

  /// Sets a cell from editor text, parsed according to the option's kind.
  pub fn set_data_from_text(&mut self, row: usize, column: usize, text: &str) -> BinderyResult<()> {
    let option = self.cell_mut(row, column)?;
    option.set_from_text(text)
  }

  // --- Label access ---

  pub fn get(&self, label: &str) -> Option<&JobOption> {
    self.options.iter().find(|o| o.label == label)
  }

  pub fn set_value(&mut self, label: &str, value: OptionValue) -> BinderyResult<()> {
    self.option_mut(label)?.set_value(value)
  }

  pub fn set_text(&mut self, label: &str, text: &str) -> BinderyResult<()> {
    self.option_mut(label)?.set_from_text(text)
  }

  pub fn options(&self) -> &[JobOption] {
    &self.options
  }

  pub fn iter(&self) -> impl Iterator<Item = &JobOption> {
    self.options.iter()
  }

  /// Labels of required options that have no value yet.
  pub fn missing_required(&self) -> Vec<String> {
    self
      .options
      .iter()
      .filter(|o| o.required && !o.has_value())
      .map(|o| o.label.clone())
      .collect()
  }

  pub fn is_complete(&self) -> bool {
    self.missing_required().is_empty()
  }

  // --- Mapping conversion ---

  /// Extracts the label -> value mapping. Always exactly one entry per option.
  pub fn final_data(&self) -> UserArgs {
    self.options.iter().map(|o| (o.label.clone(), o.final_value())).collect()
  }

  /// Loads values from a typed mapping. Every label must exist in the schema.
  ///
  /// Text values are converted by kind, so final data that went through JSON loads back.
  pub fn load_data(&mut self, data: &UserArgs) -> BinderyResult<()> {
    for (label, value) in data.iter() {
      self.option_mut(label)?.set_coerced(value.clone())?;
    }
    Ok(())
  }

  /// Loads values from a plain JSON object, converting each entry by the option's kind.
  pub fn load_json(&mut self, data: &serde_json::Map<String, serde_json::Value>) -> BinderyResult<()> {
    for (label, json) in data {
      let option = self.option_mut(label)?;
      let value = option.parse_json(json)?;
      option.set_value(value)?;
    }
    Ok(())
  }

  fn option_mut(&mut self, label: &str) -> BinderyResult<&mut JobOption> {
    self
      .options
      .iter_mut()
      .find(|o| o.label == label)
      .ok_or_else(|| BinderyError::UnknownOption {
        label: label.to_string(),
      })
  }

  fn cell_mut(&mut self, row: usize, column: usize) -> BinderyResult<&mut JobOption> {
    let rows = self.options.len();
    if column != VALUE_COLUMN {
      return Err(BinderyError::CellOutOfRange { row, column, rows });
    }
    self
      .options
      .get_mut(row)
      .ok_or(BinderyError::CellOutOfRange { row, column, rows })
  }
}

/// Uppercases the first letter of every alphabetic run and lowercases the rest.
/// `"my_option"` becomes `"My_Option"`, `"input folder"` becomes `"Input Folder"`.
pub fn title_case(label: &str) -> String {
  let mut out = String::with_capacity(label.len());
  let mut prev_is_letter = false;
  for ch in label.chars() {
    if ch.is_alphabetic() {
      if prev_is_letter {
        out.extend(ch.to_lowercase());
      } else {
        out.extend(ch.to_uppercase());
      }
      prev_is_letter = true;
    } else {
      out.push(ch);
      prev_is_letter = false;
    }
  }
  out
}
