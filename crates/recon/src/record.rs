//! Source rows as read from either dataset.
//!
//! A [`Record`] keeps its columns in the order ingestion produced them and
//! never changes after construction. Missing columns read as [`CellValue::Empty`].

use std::fmt;

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::error::ReconError;
use crate::model::Side;

static EMPTY: CellValue = CellValue::Empty;

/// A scalar cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Empty,
}

impl CellValue {
    /// String form used for keys and comparisons. `Empty` becomes `""`.
    pub fn as_text(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Number(n) => format_number(*n),
            Self::Empty => String::new(),
        }
    }

    /// True when the string form is empty.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Text(s) => s.is_empty(),
            Self::Number(_) => false,
            Self::Empty => true,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }
}

/// Integral values print without decimals (12.0 -> "12").
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Number(n) => f.write_str(&format_number(*n)),
            Self::Empty => Ok(()),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        Self::Number(n as f64)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Self::Empty)
    }
}

impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Text(s) => serializer.serialize_str(s),
            Self::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                serializer.serialize_i64(*n as i64)
            }
            Self::Number(n) => serializer.serialize_f64(*n),
            Self::Empty => serializer.serialize_none(),
        }
    }
}

/// One row from either source: ordered column -> value pairs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, CellValue)>,
    /// Sheet or group the row was read from. Not a column.
    origin: Option<String>,
}

impl Record {
    pub fn new(fields: Vec<(String, CellValue)>) -> Self {
        Self { fields, origin: None }
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    pub fn origin(&self) -> Option<&str> {
        self.origin.as_deref()
    }

    /// Value of `column`, or `Empty` when the column is absent.
    pub fn get(&self, column: &str) -> &CellValue {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, v)| v)
            .unwrap_or(&EMPTY)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.fields.iter().any(|(name, _)| name == column)
    }

    /// String form of `column` (absent -> "").
    pub fn text(&self, column: &str) -> String {
        self.get(column).as_text()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.fields.iter().map(|(name, v)| (name.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// True when every cell is blank.
    pub fn is_blank(&self) -> bool {
        self.fields.iter().all(|(_, v)| v.is_blank())
    }

    /// First column name that appears more than once, if any.
    pub(crate) fn repeated_column(&self) -> Option<&str> {
        self.fields.iter().enumerate().find_map(|(i, (name, _))| {
            self.fields[..i]
                .iter()
                .any(|(prev, _)| prev == name)
                .then_some(name.as_str())
        })
    }
}

impl<K: Into<String>, V: Into<CellValue>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Convert untyped JSON (an array of flat objects) into records.
///
/// Anything else is `InvalidSequence` / `InvalidInput`; no partial result.
pub fn records_from_json(side: Side, value: &JsonValue) -> Result<Vec<Record>, ReconError> {
    let items = value.as_array().ok_or_else(|| ReconError::InvalidSequence {
        side,
        reason: format!("expected an array of records, found {}", json_kind(value)),
    })?;

    items
        .iter()
        .enumerate()
        .map(|(index, item)| record_from_json(side, index, item))
        .collect()
}

fn record_from_json(side: Side, index: usize, item: &JsonValue) -> Result<Record, ReconError> {
    let obj = item.as_object().ok_or_else(|| ReconError::InvalidInput {
        side,
        index,
        reason: format!("expected an object, found {}", json_kind(item)),
    })?;

    let mut fields = Vec::with_capacity(obj.len());
    for (name, v) in obj {
        let cell = match v {
            JsonValue::Null => CellValue::Empty,
            JsonValue::String(s) => CellValue::Text(s.clone()),
            JsonValue::Number(n) => match n.as_f64() {
                Some(f) => CellValue::Number(f),
                None => CellValue::Text(n.to_string()),
            },
            JsonValue::Bool(b) => CellValue::Text(if *b { "TRUE" } else { "FALSE" }.into()),
            JsonValue::Array(_) | JsonValue::Object(_) => {
                return Err(ReconError::InvalidInput {
                    side,
                    index,
                    reason: format!("column {name:?} holds a nested {}", json_kind(v)),
                })
            }
        };
        fields.push((name.clone(), cell));
    }
    Ok(Record::new(fields))
}

fn json_kind(v: &JsonValue) -> &'static str {
    match v {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}
