//! Composite match keys.
//!
//! A key is built from three slots (kit, position, item). Each slot lists
//! candidate columns; the first non-blank one wins. Slot values are lower-cased
//! and joined with [`KEY_DELIMITER`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ReconError;
use crate::record::Record;

pub const KEY_DELIMITER: char = '|';

/// Normalized composite identifier shared by both sources.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct MatchKey(String);

impl MatchKey {
    /// Wrap an already-normalized key string.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The three normalized slot values.
    pub fn parts(&self) -> Vec<&str> {
        self.0.split(KEY_DELIMITER).collect()
    }
}

impl fmt::Display for MatchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ordered candidate columns for one key slot.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct KeySlot(Vec<String>);

impl KeySlot {
    pub fn new<I, S>(candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(candidates.into_iter().map(Into::into).collect())
    }

    pub fn single(column: impl Into<String>) -> Self {
        Self(vec![column.into()])
    }

    pub fn candidates(&self) -> &[String] {
        &self.0
    }

    /// Column tried first; used to label the slot.
    pub fn primary(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    /// First non-blank candidate, as text. Blank when none are set.
    pub fn resolve(&self, record: &Record) -> String {
        self.0
            .iter()
            .map(|column| record.get(column))
            .find(|v| !v.is_blank())
            .map(|v| v.as_text())
            .unwrap_or_default()
    }
}

/// Which columns build a source's key.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct KeySpec {
    pub kit: KeySlot,
    pub position: KeySlot,
    pub item: KeySlot,
}

impl KeySpec {
    pub fn new(kit: KeySlot, position: KeySlot, item: KeySlot) -> Self {
        Self { kit, position, item }
    }

    pub fn slots(&self) -> [(&'static str, &KeySlot); 3] {
        [("kit", &self.kit), ("position", &self.position), ("item", &self.item)]
    }

    /// Every slot needs at least one non-blank candidate name.
    pub fn validate(&self, source: &str) -> Result<(), ReconError> {
        for (slot_name, slot) in self.slots() {
            if slot.candidates().is_empty() {
                return Err(ReconError::Configuration(format!(
                    "{source}: key slot '{slot_name}' has no columns"
                )));
            }
            if let Some(pos) = slot.candidates().iter().position(|c| c.trim().is_empty()) {
                return Err(ReconError::Configuration(format!(
                    "{source}: key slot '{slot_name}' candidate #{} is blank",
                    pos + 1
                )));
            }
        }
        Ok(())
    }

    /// Build the key for `record`. Total: absent columns degrade to "".
    pub fn key(&self, record: &Record) -> MatchKey {
        let mut out = String::new();
        for (i, (_, slot)) in self.slots().into_iter().enumerate() {
            if i > 0 {
                out.push(KEY_DELIMITER);
            }
            out.push_str(&slot.resolve(record).to_lowercase());
        }
        MatchKey(out)
    }
}

/// Free-function form of [`KeySpec::key`].
pub fn match_key(record: &Record, spec: &KeySpec) -> MatchKey {
    spec.key(record)
}

/// Which rows count as data rows for a source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BlankRowPolicy {
    /// Every row is data.
    #[default]
    Keep,
    /// Skip rows whose kit and item slots are both blank.
    AllBlank,
    /// Skip rows whose kit or item slot is blank.
    AnyBlank,
}

impl BlankRowPolicy {
    pub fn is_data_row(self, record: &Record, spec: &KeySpec) -> bool {
        match self {
            Self::Keep => true,
            Self::AllBlank => {
                !(spec.kit.resolve(record).is_empty() && spec.item.resolve(record).is_empty())
            }
            Self::AnyBlank => {
                !spec.kit.resolve(record).is_empty() && !spec.item.resolve(record).is_empty()
            }
        }
    }
}

impl fmt::Display for BlankRowPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Keep => write!(f, "keep"),
            Self::AllBlank => write!(f, "all_blank"),
            Self::AnyBlank => write!(f, "any_blank"),
        }
    }
}
