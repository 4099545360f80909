use serde::{Deserialize, Serialize};

use crate::error::ReconError;
use crate::key::{BlankRowPolicy, KeySlot, KeySpec};
use crate::model::FieldMapping;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ReconConfig {
    pub name: String,
    pub left: SourceConfig,
    pub right: SourceConfig,
    /// Compared in order; empty means rows match on key alone.
    #[serde(default)]
    pub fields: Vec<FieldMapping>,
}

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SourceConfig {
    pub label: String,
    pub key: KeySpec,
    /// Blank-row rule. Left defaults to `all_blank`, right to `keep`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_rows: Option<BlankRowPolicy>,
    /// Same-key policy. Only the right source accepts anything but `last_wins`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duplicates: Option<DuplicatePolicy>,
}

/// What happens to right records that share a key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Last record in input order takes the index slot; earlier ones are dropped.
    #[default]
    LastWins,
    /// Last record takes the slot; earlier ones become extra right-only rows.
    CarryForward,
    /// Any duplicate fails the run.
    Reject,
}

impl DuplicatePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LastWins => "last_wins",
            Self::CarryForward => "carry_forward",
            Self::Reject => "reject",
        }
    }
}

impl std::fmt::Display for DuplicatePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DuplicatePolicy {
    type Err = ReconError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "last_wins" | "last-wins" => Ok(Self::LastWins),
            "carry_forward" | "carry-forward" => Ok(Self::CarryForward),
            "reject" => Ok(Self::Reject),
            other => Err(ReconError::Configuration(format!(
                "unknown duplicate policy {other:?} (expected last_wins, carry_forward or reject)"
            ))),
        }
    }
}

/// Engine knobs derived from a config (or built directly).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconOptions {
    pub left_filter: BlankRowPolicy,
    pub right_filter: BlankRowPolicy,
    pub right_duplicates: DuplicatePolicy,
}

impl Default for ReconOptions {
    fn default() -> Self {
        Self {
            left_filter: BlankRowPolicy::AllBlank,
            right_filter: BlankRowPolicy::Keep,
            right_duplicates: DuplicatePolicy::LastWins,
        }
    }
}

// ---------------------------------------------------------------------------
// Built-in NPD vs BOM layout
// ---------------------------------------------------------------------------

impl Default for ReconConfig {
    fn default() -> Self {
        Self::npd_bom()
    }
}

impl ReconConfig {
    /// Engineering NPD workbook (left) against manufacturing BOM export (right).
    pub fn npd_bom() -> Self {
        Self {
            name: "NPD vs BOM".into(),
            left: SourceConfig {
                label: "NPD".into(),
                key: KeySpec::new(
                    KeySlot::single("Kit #"),
                    KeySlot::single("Position #"),
                    KeySlot::new(["Item #", "h2m Item #"]),
                ),
                skip_rows: Some(BlankRowPolicy::AllBlank),
                duplicates: None,
            },
            right: SourceConfig {
                label: "BOM".into(),
                key: KeySpec::new(
                    KeySlot::single("Kit Item"),
                    KeySlot::single("Position"),
                    KeySlot::single("Item number"),
                ),
                skip_rows: Some(BlankRowPolicy::Keep),
                duplicates: Some(DuplicatePolicy::LastWins),
            },
            fields: vec![
                FieldMapping::new("h2m Item #", "Item number"),
                FieldMapping::new("Description", "Product name"),
                FieldMapping::new("Kit Qty", "Quantity"),
                FieldMapping::new("Kit #", "Kit Item"),
                FieldMapping::new("BOM/Assembly Notes", "BOM notes"),
                FieldMapping::new("Product Notes", "BOM Product notes"),
            ],
        }
    }

    // -----------------------------------------------------------------------
    // Parse + Validate
    // -----------------------------------------------------------------------

    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: ReconConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ReconError> {
        toml::to_string(self).map_err(|e| ReconError::ConfigParse(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        for (side, source) in [("left", &self.left), ("right", &self.right)] {
            if source.label.trim().is_empty() {
                return Err(ReconError::Configuration(format!("{side}: label is blank")));
            }
            source.key.validate(side)?;
        }

        if let Some(policy) = self.left.duplicates {
            if policy != DuplicatePolicy::LastWins {
                return Err(ReconError::Configuration(format!(
                    "left: duplicates = \"{policy}\" is not supported; \
                     left records are always last_wins"
                )));
            }
        }

        for (i, mapping) in self.fields.iter().enumerate() {
            if mapping.left.trim().is_empty() || mapping.right.trim().is_empty() {
                return Err(ReconError::Configuration(format!(
                    "fields[{i}]: both left and right column names are required (got {:?} / {:?})",
                    mapping.left, mapping.right
                )));
            }
            if self.fields[..i].contains(mapping) {
                return Err(ReconError::Configuration(format!(
                    "fields[{i}]: pair {:?} / {:?} is listed twice",
                    mapping.left, mapping.right
                )));
            }
        }

        Ok(())
    }

    pub fn options(&self) -> ReconOptions {
        ReconOptions {
            left_filter: self.left.skip_rows.unwrap_or(BlankRowPolicy::AllBlank),
            right_filter: self.right.skip_rows.unwrap_or(BlankRowPolicy::Keep),
            right_duplicates: self.right.duplicates.unwrap_or_default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
