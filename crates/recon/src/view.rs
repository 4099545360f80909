//! Read-only views over comparison rows: filter, sort, pick lists.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::model::{ComparisonRow, RowStatus, Side};
use crate::record::CellValue;

/// Row passes when either side's column equals `value` (case-insensitive).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FieldFilter {
    pub left_field: String,
    pub right_field: String,
    pub value: String,
}

impl FieldFilter {
    pub fn new(
        left_field: impl Into<String>,
        right_field: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            left_field: left_field.into(),
            right_field: right_field.into(),
            value: value.into(),
        }
    }

    pub fn matches(&self, row: &ComparisonRow) -> bool {
        let want = self.value.to_lowercase();
        let hit = |side: Side, field: &str| {
            row.side(side)
                .is_some_and(|r| r.get(field).as_text().to_lowercase() == want)
        };
        hit(Side::Left, &self.left_field) || hit(Side::Right, &self.right_field)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SortSpec {
    pub column: String,
    pub side: Side,
    #[serde(default)]
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(column: impl Into<String>, side: Side, direction: SortDirection) -> Self {
        Self {
            column: column.into(),
            side,
            direction,
        }
    }

    fn value<'a>(&self, row: &'a ComparisonRow) -> &'a CellValue {
        static EMPTY: CellValue = CellValue::Empty;
        row.side(self.side).map_or(&EMPTY, |r| r.get(&self.column))
    }

    pub fn compare(&self, a: &ComparisonRow, b: &ComparisonRow) -> Ordering {
        let ord = compare_cells(self.value(a), self.value(b));
        match self.direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    }
}

/// Blank < numeric < text. Two numbers compare numerically, two texts by
/// string form. Numeric text ("12", " 3.5") counts as a number.
fn compare_cells(a: &CellValue, b: &CellValue) -> Ordering {
    match (sort_key(a), sort_key(b)) {
        (SortKey::Number(x), SortKey::Number(y)) => x.total_cmp(&y),
        (SortKey::Text(x), SortKey::Text(y)) => x.cmp(&y),
        (x, y) => x.rank().cmp(&y.rank()),
    }
}

enum SortKey {
    Blank,
    Number(f64),
    Text(String),
}

impl SortKey {
    fn rank(&self) -> u8 {
        match self {
            Self::Blank => 0,
            Self::Number(_) => 1,
            Self::Text(_) => 2,
        }
    }
}

fn sort_key(cell: &CellValue) -> SortKey {
    if cell.is_blank() {
        return SortKey::Blank;
    }
    if let Some(n) = cell.as_number() {
        return SortKey::Number(n);
    }
    let text = cell.as_text();
    match text.trim().parse::<f64>() {
        Ok(n) if n.is_finite() => SortKey::Number(n),
        _ => SortKey::Text(text),
    }
}

/// Which statuses to show.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusFilter {
    #[default]
    All,
    /// Everything except matched rows.
    Problems,
    Only(RowStatus),
}

impl StatusFilter {
    pub fn allows(self, status: RowStatus) -> bool {
        match self {
            Self::All => true,
            Self::Problems => status != RowStatus::Matched,
            Self::Only(s) => s == status,
        }
    }
}

/// Filters (ANDed) then an optional stable sort.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct View {
    #[serde(default)]
    pub status: StatusFilter,
    #[serde(default)]
    pub filters: Vec<FieldFilter>,
    #[serde(default)]
    pub sort: Option<SortSpec>,
}

impl View {
    pub fn apply<'a>(&self, rows: &'a [ComparisonRow]) -> Vec<&'a ComparisonRow> {
        let mut out: Vec<&ComparisonRow> = rows
            .iter()
            .filter(|r| self.status.allows(r.status))
            .filter(|r| self.filters.iter().all(|f| f.matches(r)))
            .collect();
        if let Some(sort) = &self.sort {
            out.sort_by(|a, b| sort.compare(a, b));
        }
        out
    }
}

/// Sorted, de-duplicated, lower-cased non-blank values of a column pair.
pub fn distinct_values(rows: &[ComparisonRow], left_field: &str, right_field: &str) -> Vec<String> {
    let mut set = BTreeSet::new();
    for row in rows {
        for (side, field) in [(Side::Left, left_field), (Side::Right, right_field)] {
            if let Some(record) = row.side(side) {
                let v = record.get(field).as_text().trim().to_lowercase();
                if !v.is_empty() {
                    set.insert(v);
                }
            }
        }
    }
    set.into_iter().collect()
}
