use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::key::MatchKey;
use crate::record::Record;

// ---------------------------------------------------------------------------
// Sides + field mapping
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A left column and the right column holding the same attribute.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FieldMapping {
    pub left: String,
    pub right: String,
}

impl FieldMapping {
    pub fn new(left: impl Into<String>, right: impl Into<String>) -> Self {
        Self {
            left: left.into(),
            right: right.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Rows
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowStatus {
    Matched,
    Mismatched,
    LeftOnly,
    RightOnly,
}

impl RowStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RowStatus::Matched => "matched",
            RowStatus::Mismatched => "mismatched",
            RowStatus::LeftOnly => "left_only",
            RowStatus::RightOnly => "right_only",
        }
    }
}

impl std::fmt::Display for RowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One differing mapping pair. Values are the string forms before lower-casing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDiff {
    pub left_field: String,
    pub right_field: String,
    pub left_value: String,
    pub right_value: String,
}

/// Unit of output. Build through [`ComparisonRow::paired`],
/// [`ComparisonRow::left_only`] or [`ComparisonRow::right_only`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRow {
    pub key: MatchKey,
    pub status: RowStatus,
    pub left: Option<Record>,
    pub right: Option<Record>,
    pub matched: bool,
    /// Both field names of every differing mapping pair.
    pub diff_fields: BTreeSet<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub field_diffs: Vec<FieldDiff>,
    /// Sheet/group tags carried over from ingestion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left_origin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right_origin: Option<String>,
}

impl ComparisonRow {
    pub fn paired(key: MatchKey, left: Record, right: Record, field_diffs: Vec<FieldDiff>) -> Self {
        let diff_fields: BTreeSet<String> = field_diffs
            .iter()
            .flat_map(|d| [d.left_field.clone(), d.right_field.clone()])
            .collect();
        let matched = field_diffs.is_empty();
        Self {
            key,
            status: if matched { RowStatus::Matched } else { RowStatus::Mismatched },
            left_origin: left.origin().map(str::to_string),
            right_origin: right.origin().map(str::to_string),
            left: Some(left),
            right: Some(right),
            matched,
            diff_fields,
            field_diffs,
        }
    }

    pub fn left_only(key: MatchKey, left: Record) -> Self {
        Self {
            key,
            status: RowStatus::LeftOnly,
            left_origin: left.origin().map(str::to_string),
            right_origin: None,
            left: Some(left),
            right: None,
            matched: false,
            diff_fields: BTreeSet::new(),
            field_diffs: Vec::new(),
        }
    }

    pub fn right_only(key: MatchKey, right: Record) -> Self {
        Self {
            key,
            status: RowStatus::RightOnly,
            left_origin: None,
            right_origin: right.origin().map(str::to_string),
            left: None,
            right: Some(right),
            matched: false,
            diff_fields: BTreeSet::new(),
            field_diffs: Vec::new(),
        }
    }

    pub fn side(&self, side: Side) -> Option<&Record> {
        match side {
            Side::Left => self.left.as_ref(),
            Side::Right => self.right.as_ref(),
        }
    }

    pub fn is_diff_field(&self, column: &str) -> bool {
        self.diff_fields.contains(column)
    }
}

// ---------------------------------------------------------------------------
// Duplicates
// ---------------------------------------------------------------------------

/// A key seen more than once on one side. Indices are positions in that
/// side's input sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateKey {
    pub side: Side,
    pub key: MatchKey,
    pub count: usize,
    pub kept_index: usize,
    pub dropped_indices: Vec<usize>,
}

// ---------------------------------------------------------------------------
// Result
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconSummary {
    pub left_records: usize,
    pub right_records: usize,
    pub left_excluded: usize,
    pub right_excluded: usize,
    pub left_duplicates_dropped: usize,
    pub right_duplicates_dropped: usize,
    pub total_rows: usize,
    pub matched: usize,
    pub mismatched: usize,
    pub left_only: usize,
    pub right_only: usize,
}

impl ReconSummary {
    pub fn problems(&self) -> usize {
        self.mismatched + self.left_only + self.right_only
    }

    pub fn is_clean(&self) -> bool {
        self.problems() == 0
    }
}

/// Output of one reconciliation call: rows in emission order plus bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonResult {
    pub rows: Vec<ComparisonRow>,
    pub duplicates: Vec<DuplicateKey>,
    pub summary: ReconSummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconMeta {
    pub config_name: String,
    pub left_label: String,
    pub right_label: String,
    pub engine_version: String,
    pub run_at: String,
}

/// Config-driven run output.
#[derive(Debug, Clone, Serialize)]
pub struct ReconReport {
    pub meta: ReconMeta,
    pub summary: ReconSummary,
    pub duplicates: Vec<DuplicateKey>,
    pub rows: Vec<ComparisonRow>,
}

/// Pre-loaded records for both sources.
#[derive(Debug, Clone, Default)]
pub struct ReconInput {
    pub left: Vec<Record>,
    pub right: Vec<Record>,
}
