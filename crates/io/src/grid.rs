// Flat report grid shared by the CSV and XLSX exporters

use bomcheck_recon::{ComparisonRow, ReconReport, RowStatus, Side};

/// Cell text for a side the row does not have.
pub const MISSING: &str = "[MISSING]";

/// Column layout of an exported report: `status`, `key`, then each side's
/// columns prefixed with that side's label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridColumns {
    pub left_label: String,
    pub right_label: String,
    pub left: Vec<String>,
    pub right: Vec<String>,
}

impl GridColumns {
    pub fn new(
        left_label: impl Into<String>,
        right_label: impl Into<String>,
        left: Vec<String>,
        right: Vec<String>,
    ) -> Self {
        Self {
            left_label: left_label.into(),
            right_label: right_label.into(),
            left,
            right,
        }
    }

    /// Columns in first-seen order across the report's rows.
    pub fn from_report(report: &ReconReport) -> Self {
        let collect = |side: Side| {
            let mut cols: Vec<String> = Vec::new();
            for record in report.rows.iter().filter_map(|r| r.side(side)) {
                for c in record.columns() {
                    if !cols.iter().any(|x| x == c) {
                        cols.push(c.to_string());
                    }
                }
            }
            cols
        };
        Self::new(
            report.meta.left_label.clone(),
            report.meta.right_label.clone(),
            collect(Side::Left),
            collect(Side::Right),
        )
    }

    /// Keep only the requested columns of each side, in request order.
    /// An empty request keeps that side as is.
    pub fn narrow(self, left: &[String], right: &[String]) -> Result<Self, UnknownColumn> {
        let left_cols = pick(&self.left_label, self.left, left)?;
        let right_cols = pick(&self.right_label, self.right, right)?;
        Ok(Self {
            left: left_cols,
            right: right_cols,
            ..self
        })
    }

    pub fn headers(&self) -> Vec<String> {
        let mut out = vec!["status".to_string(), "key".to_string()];
        out.extend(self.left.iter().map(|c| format!("{}: {c}", self.left_label)));
        out.extend(self.right.iter().map(|c| format!("{}: {c}", self.right_label)));
        out
    }

    pub fn width(&self) -> usize {
        2 + self.left.len() + self.right.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{label} has no column {name:?}")]
pub struct UnknownColumn {
    pub label: String,
    pub name: String,
    pub available: Vec<String>,
}

fn pick(
    label: &str,
    available: Vec<String>,
    wanted: &[String],
) -> Result<Vec<String>, UnknownColumn> {
    if wanted.is_empty() {
        return Ok(available);
    }
    let mut out: Vec<String> = Vec::with_capacity(wanted.len());
    for name in wanted {
        if !available.contains(name) {
            return Err(UnknownColumn {
                label: label.to_string(),
                name: name.clone(),
                available,
            });
        }
        if !out.contains(name) {
            out.push(name.clone());
        }
    }
    Ok(out)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellMark {
    Plain,
    /// Column of a differing mapping pair.
    Diff,
    /// The row has no record on this side.
    Missing,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridCell {
    pub text: String,
    pub number: Option<f64>,
    pub mark: CellMark,
}

impl GridCell {
    fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            number: None,
            mark: CellMark::Plain,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridRow {
    pub status: RowStatus,
    pub cells: Vec<GridCell>,
}

/// Render rows against a column layout.
pub fn grid_rows<'a, I>(columns: &GridColumns, rows: I) -> Vec<GridRow>
where
    I: IntoIterator<Item = &'a ComparisonRow>,
{
    rows.into_iter()
        .map(|row| {
            let mut cells = Vec::with_capacity(columns.width());
            cells.push(GridCell::plain(row.status.as_str()));
            cells.push(GridCell::plain(row.key.as_str()));
            side_cells(row, Side::Left, &columns.left, &mut cells);
            side_cells(row, Side::Right, &columns.right, &mut cells);
            GridRow {
                status: row.status,
                cells,
            }
        })
        .collect()
}

fn side_cells(row: &ComparisonRow, side: Side, columns: &[String], out: &mut Vec<GridCell>) {
    let Some(record) = row.side(side) else {
        out.extend(columns.iter().map(|_| GridCell {
            text: MISSING.to_string(),
            number: None,
            mark: CellMark::Missing,
        }));
        return;
    };
    for col in columns {
        let differs = row.field_diffs.iter().any(|d| match side {
            Side::Left => d.left_field == *col,
            Side::Right => d.right_field == *col,
        });
        let value = record.get(col);
        out.push(GridCell {
            text: value.as_text(),
            number: value.as_number(),
            mark: if differs { CellMark::Diff } else { CellMark::Plain },
        });
    }
}
