//! Values carried in a log entry's open-ended `data` map.
//!
//! The payload of a log entry is a string-keyed map whose required subset
//! depends on the entry type and jurisdiction. Values are a closed variant
//! rather than raw JSON so that "is this field filled in" has exactly one
//! definition: [`DataValue::is_missing`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The `data` payload of a log entry.
pub type LogData = BTreeMap<String, DataValue>;

/// A single value inside [`LogData`].
///
/// Serialises untagged, so a `LogData` map is plain JSON on the wire.
/// Numbers keep their integer/float distinction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DataValue {
  Null,
  Bool(bool),
  Number(serde_json::Number),
  String(String),
  List(Vec<DataValue>),
  Nested(BTreeMap<String, DataValue>),
}

impl DataValue {
  /// `true` for `Null` and the empty string. Zero and `false` are present
  /// values.
  pub fn is_missing(&self) -> bool {
    match self {
      Self::Null => true,
      Self::String(s) => s.is_empty(),
      _ => false,
    }
  }

  /// The numeric value, if this is a number.
  pub fn as_f64(&self) -> Option<f64> {
    match self {
      Self::Number(n) => n.as_f64(),
      _ => None,
    }
  }

  pub fn as_str(&self) -> Option<&str> {
    match self {
      Self::String(s) => Some(s),
      _ => None,
    }
  }

  /// Flat text rendering used by the tabular export formats.
  ///
  /// `Null` renders as the empty string; structured values render as their
  /// compact JSON text.
  pub fn to_text(&self) -> String {
    match self {
      Self::Null => String::new(),
      Self::Bool(b) => b.to_string(),
      Self::Number(n) => n.to_string(),
      Self::String(s) => s.clone(),
      Self::List(_) | Self::Nested(_) => {
        serde_json::Value::from(self.clone()).to_string()
      }
    }
  }
}

/// The numeric value under `key`; absent and non-numeric values read as zero.
pub fn numeric_field(data: &LogData, key: &str) -> f64 {
  data.get(key).and_then(DataValue::as_f64).unwrap_or(0.0)
}

// ─── Conversions ─────────────────────────────────────────────────────────────

impl From<serde_json::Value> for DataValue {
  fn from(value: serde_json::Value) -> Self {
    match value {
      serde_json::Value::Null => Self::Null,
      serde_json::Value::Bool(b) => Self::Bool(b),
      serde_json::Value::Number(n) => Self::Number(n),
      serde_json::Value::String(s) => Self::String(s),
      serde_json::Value::Array(items) => {
        Self::List(items.into_iter().map(Self::from).collect())
      }
      serde_json::Value::Object(map) => Self::Nested(
        map.into_iter().map(|(k, v)| (k, Self::from(v))).collect(),
      ),
    }
  }
}

impl From<DataValue> for serde_json::Value {
  fn from(value: DataValue) -> Self {
    match value {
      DataValue::Null => Self::Null,
      DataValue::Bool(b) => Self::Bool(b),
      DataValue::Number(n) => Self::Number(n),
      DataValue::String(s) => Self::String(s),
      DataValue::List(items) => {
        Self::Array(items.into_iter().map(Self::from).collect())
      }
      DataValue::Nested(map) => Self::Object(
        map.into_iter().map(|(k, v)| (k, Self::from(v))).collect(),
      ),
    }
  }
}

impl From<&str> for DataValue {
  fn from(s: &str) -> Self { Self::String(s.to_owned()) }
}

impl From<String> for DataValue {
  fn from(s: String) -> Self { Self::String(s) }
}

impl From<bool> for DataValue {
  fn from(b: bool) -> Self { Self::Bool(b) }
}

impl From<i64> for DataValue {
  fn from(n: i64) -> Self { Self::Number(n.into()) }
}

impl From<u64> for DataValue {
  fn from(n: u64) -> Self { Self::Number(n.into()) }
}

/// Non-finite floats have no JSON representation and become `Null`.
impl From<f64> for DataValue {
  fn from(n: f64) -> Self {
    serde_json::Number::from_f64(n).map_or(Self::Null, Self::Number)
  }
}
