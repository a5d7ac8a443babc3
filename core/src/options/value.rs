// bindery/src/options/value.rs

//! Semantic option types, their values, and the label -> value mapping handed to workflows.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// The closed set of semantic types an option can hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "choices", rename_all = "snake_case")]
pub enum OptionKind {
  /// Free text.
  Text,
  /// A single filesystem path.
  Path,
  /// A boolean flag.
  Flag,
  /// One value out of an enumerated set.
  Choice(Vec<String>),
}

impl OptionKind {
  /// The value an unset option of this kind reports in final data.
  pub fn empty_value(&self) -> OptionValue {
    match self {
      OptionKind::Text => OptionValue::Text(String::new()),
      OptionKind::Path => OptionValue::Path(PathBuf::new()),
      OptionKind::Flag => OptionValue::Flag(false),
      OptionKind::Choice(_) => OptionValue::Choice(String::new()),
    }
  }

  pub fn type_name(&self) -> &'static str {
    match self {
      OptionKind::Text => "text",
      OptionKind::Path => "path",
      OptionKind::Flag => "flag",
      OptionKind::Choice(_) => "choice",
    }
  }

  /// Whether `value` has the variant this kind stores.
  pub fn matches(&self, value: &OptionValue) -> bool {
    matches!(
      (self, value),
      (OptionKind::Text, OptionValue::Text(_))
        | (OptionKind::Path, OptionValue::Path(_))
        | (OptionKind::Flag, OptionValue::Flag(_))
        | (OptionKind::Choice(_), OptionValue::Choice(_))
    )
  }
}

impl fmt::Display for OptionKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.type_name())
  }
}

/// A typed option value.
///
/// Serializes untagged: text, paths and choices become JSON strings, flags JSON booleans.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
  Flag(bool),
  Text(String),
  Path(PathBuf),
  Choice(String),
}

impl OptionValue {
  pub fn as_str(&self) -> Option<&str> {
    match self {
      OptionValue::Text(s) | OptionValue::Choice(s) => Some(s),
      OptionValue::Path(p) => p.to_str(),
      OptionValue::Flag(_) => None,
    }
  }

  pub fn as_path(&self) -> Option<&Path> {
    match self {
      OptionValue::Path(p) => Some(p),
      _ => None,
    }
  }

  pub fn as_flag(&self) -> Option<bool> {
    match self {
      OptionValue::Flag(b) => Some(*b),
      _ => None,
    }
  }

  /// Empty text, path or choice. Flags are never empty.
  pub fn is_empty(&self) -> bool {
    match self {
      OptionValue::Text(s) | OptionValue::Choice(s) => s.is_empty(),
      OptionValue::Path(p) => p.as_os_str().is_empty(),
      OptionValue::Flag(_) => false,
    }
  }

  pub(crate) fn variant_name(&self) -> &'static str {
    match self {
      OptionValue::Text(_) => "text",
      OptionValue::Path(_) => "path",
      OptionValue::Flag(_) => "flag",
      OptionValue::Choice(_) => "choice",
    }
  }
}

impl fmt::Display for OptionValue {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      OptionValue::Text(s) | OptionValue::Choice(s) => f.write_str(s),
      OptionValue::Path(p) => write!(f, "{}", p.display()),
      OptionValue::Flag(b) => write!(f, "{}", b),
    }
  }
}

/// The "final data" of an option model: one entry per option label.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserArgs(BTreeMap<String, OptionValue>);

impl UserArgs {
  pub fn new() -> Self {
    Self(BTreeMap::new())
  }

  pub fn insert(&mut self, label: impl Into<String>, value: OptionValue) -> Option<OptionValue> {
    self.0.insert(label.into(), value)
  }

  pub fn get(&self, label: &str) -> Option<&OptionValue> {
    self.0.get(label)
  }

  pub fn contains(&self, label: &str) -> bool {
    self.0.contains_key(label)
  }

  pub fn text(&self, label: &str) -> Option<&str> {
    self.get(label).and_then(OptionValue::as_str)
  }

  pub fn path(&self, label: &str) -> Option<&Path> {
    self.get(label).and_then(OptionValue::as_path)
  }

  pub fn flag(&self, label: &str) -> Option<bool> {
    self.get(label).and_then(OptionValue::as_flag)
  }

  pub fn choice(&self, label: &str) -> Option<&str> {
    match self.get(label) {
      Some(OptionValue::Choice(s)) => Some(s),
      _ => None,
    }
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn labels(&self) -> impl Iterator<Item = &str> {
    self.0.keys().map(String::as_str)
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
    self.0.iter().map(|(k, v)| (k.as_str(), v))
  }
}

impl<K: Into<String>> FromIterator<(K, OptionValue)> for UserArgs {
  fn from_iter<I: IntoIterator<Item = (K, OptionValue)>>(iter: I) -> Self {
    Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
  }
}

impl IntoIterator for UserArgs {
  type Item = (String, OptionValue);
  type IntoIter = std::collections::btree_map::IntoIter<String, OptionValue>;

  fn into_iter(self) -> Self::IntoIter {
    self.0.into_iter()
  }
}
