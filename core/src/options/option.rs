// bindery/src/options/option.rs

//! A single configurable input declared by a workflow.

use super::value::{OptionKind, OptionValue};
use crate::error::{BinderyError, BinderyResult};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One configurable input: label, semantic type, required flag and current value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobOption {
  pub label: String,
  pub kind: OptionKind,
  pub required: bool,
  pub default: Option<OptionValue>,
  value: Option<OptionValue>,
}

impl JobOption {
  pub fn new(label: impl Into<String>, kind: OptionKind) -> Self {
    Self {
      label: label.into(),
      kind,
      required: false,
      default: None,
      value: None,
    }
  }

  pub fn text(label: impl Into<String>) -> Self {
    Self::new(label, OptionKind::Text)
  }

  pub fn path(label: impl Into<String>) -> Self {
    Self::new(label, OptionKind::Path)
  }

  pub fn flag(label: impl Into<String>) -> Self {
    Self::new(label, OptionKind::Flag)
  }

  pub fn choice<I, S>(label: impl Into<String>, choices: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    Self::new(label, OptionKind::Choice(choices.into_iter().map(Into::into).collect()))
  }

  pub fn required(mut self) -> Self {
    self.required = true;
    self
  }

  /// Sets the default, which also becomes the initial value.
  ///
  /// The default is checked against the kind when the option joins an `OptionValueModel`.
  pub fn with_default(mut self, value: OptionValue) -> Self {
    self.default = Some(value.clone());
    self.value = Some(value);
    self
  }

  /// Checks the declared default and current value against the option's kind.
  pub(crate) fn check_schema(&self) -> BinderyResult<()> {
    for value in self.default.iter().chain(self.value.iter()) {
      self.check(value)?;
    }
    Ok(())
  }

  pub fn value(&self) -> Option<&OptionValue> {
    self.value.as_ref()
  }

  /// The current value, or the kind's empty value when unset.
  pub fn final_value(&self) -> OptionValue {
    self.value.clone().unwrap_or_else(|| self.kind.empty_value())
  }

  /// Current value formatted as text, `""` when unset.
  pub fn display_value(&self) -> String {
    self.value.as_ref().map(ToString::to_string).unwrap_or_default()
  }

  pub fn has_value(&self) -> bool {
    self.value.as_ref().is_some_and(|v| !v.is_empty())
  }

  /// Type-checks and stores a value.
  pub fn set_value(&mut self, value: OptionValue) -> BinderyResult<()> {
    self.check(&value)?;
    self.value = Some(value);
    Ok(())
  }

  /// Stores a value from a typed mapping.
  ///
  /// A deserialized mapping only knows text and flags, so text is re-read by the option's
  /// kind before the type check.
  pub fn set_coerced(&mut self, value: OptionValue) -> BinderyResult<()> {
    let value = match value {
      OptionValue::Text(text) if self.kind != OptionKind::Text => self.parse_text(&text)?,
      other => other,
    };
    self.set_value(value)
  }

  /// Parses `text` according to the option's kind and stores it.
  pub fn set_from_text(&mut self, text: &str) -> BinderyResult<()> {
    let value = self.parse_text(text)?;
    self.set_value(value)
  }

  pub fn clear(&mut self) {
    self.value = self.default.clone();
  }

  pub(crate) fn parse_text(&self, text: &str) -> BinderyResult<OptionValue> {
    match &self.kind {
      OptionKind::Text => Ok(OptionValue::Text(text.to_string())),
      OptionKind::Path => Ok(OptionValue::Path(PathBuf::from(text))),
      OptionKind::Choice(_) => Ok(OptionValue::Choice(text.to_string())),
      OptionKind::Flag => match text.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Ok(OptionValue::Flag(true)),
        "false" | "no" | "0" | "off" | "" => Ok(OptionValue::Flag(false)),
        _ => Err(BinderyError::InvalidFlag {
          label: self.label.clone(),
          value: text.to_string(),
        }),
      },
    }
  }

  /// Converts a plain JSON value into this option's value type.
  pub(crate) fn parse_json(&self, json: &serde_json::Value) -> BinderyResult<OptionValue> {
    match (&self.kind, json) {
      (_, serde_json::Value::Null) => Ok(self.kind.empty_value()),
      (OptionKind::Flag, serde_json::Value::Bool(b)) => Ok(OptionValue::Flag(*b)),
      (_, serde_json::Value::String(s)) => self.parse_text(s),
      (kind, other) => Err(BinderyError::OptionTypeMismatch {
        label: self.label.clone(),
        expected: kind.type_name().to_string(),
        actual: json_type_name(other).to_string(),
      }),
    }
  }

  fn check(&self, value: &OptionValue) -> BinderyResult<()> {
    if !self.kind.matches(value) {
      return Err(BinderyError::OptionTypeMismatch {
        label: self.label.clone(),
        expected: self.kind.type_name().to_string(),
        actual: value.variant_name().to_string(),
      });
    }
    if let (OptionKind::Choice(choices), OptionValue::Choice(selected)) = (&self.kind, value) {
      // Empty clears the selection.
      if !selected.is_empty() && !choices.iter().any(|c| c == selected) {
        return Err(BinderyError::InvalidChoice {
          label: self.label.clone(),
          value: selected.clone(),
          choices: choices.clone(),
        });
      }
    }
    Ok(())
  }
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
  match value {
    serde_json::Value::Null => "null",
    serde_json::Value::Bool(_) => "boolean",
    serde_json::Value::Number(_) => "number",
    serde_json::Value::String(_) => "string",
    serde_json::Value::Array(_) => "array",
    serde_json::Value::Object(_) => "object",
  }
}
