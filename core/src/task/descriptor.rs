// bindery/src/task/descriptor.rs

//! Plain-data descriptions of work produced by discovery.

use anyhow::Context as AnyhowContext;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a discovered task: its position in the discovery output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub usize);

impl TaskId {
  pub fn index(self) -> usize {
    self.0
  }
}

impl fmt::Display for TaskId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "#{}", self.0)
  }
}

/// Serializable record describing one unit of work (one file, one book, ...).
///
/// Holds no open resources, so it can cross thread boundaries and be kept for reporting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskDescriptor(serde_json::Value);

impl TaskDescriptor {
  pub fn new(data: serde_json::Value) -> Self {
    Self(data)
  }

  /// Serializes any plain data type into a descriptor.
  pub fn from_serializable<T: Serialize>(data: &T) -> anyhow::Result<Self> {
    let value = serde_json::to_value(data).context("Task descriptor data is not serializable")?;
    Ok(Self(value))
  }

  /// Reads the descriptor back as a typed record.
  pub fn parse<T: DeserializeOwned>(&self) -> anyhow::Result<T> {
    serde_json::from_value(self.0.clone())
      .with_context(|| format!("Task descriptor does not match {}", std::any::type_name::<T>()))
  }

  /// Field lookup for object-shaped descriptors.
  pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
    self.0.get(key)
  }

  pub fn get_str(&self, key: &str) -> Option<&str> {
    self.get(key).and_then(serde_json::Value::as_str)
  }

  pub fn data(&self) -> &serde_json::Value {
    &self.0
  }

  pub fn into_inner(self) -> serde_json::Value {
    self.0
  }
}

impl From<serde_json::Value> for TaskDescriptor {
  fn from(value: serde_json::Value) -> Self {
    Self(value)
  }
}
