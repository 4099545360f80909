// Excel/ODS import (calamine) and report export (rust_xlsxwriter)

use std::path::Path;

use bomcheck_recon::{CellValue, ComparisonRow, ReconSummary, RowStatus};
use calamine::{open_workbook_auto, Data, Reader, Sheets};
use rust_xlsxwriter::{Color, Format, Workbook as XlsxWorkbook};
use tracing::debug;

use crate::error::IoError;
use crate::grid::{grid_rows, CellMark, GridColumns};
use crate::workbook::SheetData;

/// Import every worksheet of an xlsx, xlsm, xls, xlsb or ods file.
pub fn import(path: &Path) -> Result<Vec<SheetData>, IoError> {
    let workbook_err = |message: String| IoError::Workbook {
        path: path.to_path_buf(),
        message,
    };

    let mut workbook: Sheets<_> =
        open_workbook_auto(path).map_err(|e| workbook_err(e.to_string()))?;
    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();

    let mut sheets = Vec::with_capacity(sheet_names.len());
    for sheet_name in &sheet_names {
        let range = workbook
            .worksheet_range(sheet_name)
            .map_err(|e| workbook_err(format!("failed to read sheet '{sheet_name}': {e}")))?;

        let mut rows = range.rows();
        let header: Vec<String> = rows
            .next()
            .map(|r| r.iter().map(|c| cell_value(c).as_text()).collect())
            .unwrap_or_default();
        let data = rows.map(|r| r.iter().map(cell_value).collect::<Vec<_>>());

        let sheet = SheetData::from_rows(sheet_name, header, data);
        debug!(sheet = %sheet_name, records = sheet.records.len(), "imported sheet");
        sheets.push(sheet);
    }

    Ok(sheets)
}

fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) if s.is_empty() => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(n) => CellValue::Number(*n),
        Data::Int(n) => CellValue::Number(*n as f64),
        // Stored as TRUE/FALSE text, the way the sheet shows it
        Data::Bool(b) => CellValue::Text(if *b { "TRUE" } else { "FALSE" }.into()),
        Data::Error(e) => CellValue::Text(format!("#{:?}", e)),
        // Date serials stay numeric
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
    }
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

const MATCHED_FILL: u32 = 0xC6EFCE;
const PROBLEM_FILL: u32 = 0xFFC7CE;
const MISSING_FONT: u32 = 0x808080;
const HEADER_FILL: u32 = 0xD9D9D9;

/// Row fill by status, then cell emphasis by mark.
struct RowFormats {
    plain: Format,
    diff: Format,
    missing: Format,
}

impl RowFormats {
    fn new(fill: u32) -> Self {
        let base = Format::new().set_background_color(Color::RGB(fill));
        Self {
            diff: base.clone().set_bold(),
            missing: base
                .clone()
                .set_italic()
                .set_font_color(Color::RGB(MISSING_FONT)),
            plain: base,
        }
    }

    fn get(&self, mark: CellMark) -> &Format {
        match mark {
            CellMark::Plain => &self.plain,
            CellMark::Diff => &self.diff,
            CellMark::Missing => &self.missing,
        }
    }
}

/// Write the comparison grid plus a summary sheet.
pub fn write_report<'a, I>(
    path: &Path,
    columns: &GridColumns,
    rows: I,
    summary: &ReconSummary,
) -> Result<(), IoError>
where
    I: IntoIterator<Item = &'a ComparisonRow>,
{
    let mut workbook = XlsxWorkbook::new();
    let header_format = Format::new()
        .set_bold()
        .set_background_color(Color::RGB(HEADER_FILL));
    let matched = RowFormats::new(MATCHED_FILL);
    let problem = RowFormats::new(PROBLEM_FILL);

    let grid = grid_rows(columns, rows);
    let headers = columns.headers();

    let sheet = workbook.add_worksheet().set_name("Comparison")?;
    for (col, h) in headers.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, h, &header_format)?;
        sheet.set_column_width(col as u16, (h.len() as f64 + 2.0).clamp(10.0, 40.0))?;
    }

    for (idx, row) in grid.iter().enumerate() {
        let r = (idx + 1) as u32;
        let formats = if row.status == RowStatus::Matched { &matched } else { &problem };
        for (col, cell) in row.cells.iter().enumerate() {
            let format = formats.get(cell.mark);
            match cell.number {
                Some(n) => sheet.write_number_with_format(r, col as u16, n, format)?,
                None => sheet.write_string_with_format(r, col as u16, &cell.text, format)?,
            };
        }
    }

    sheet.set_freeze_panes(1, 0)?;
    if !headers.is_empty() {
        sheet.autofilter(0, 0, grid.len() as u32, (headers.len() - 1) as u16)?;
    }

    let summary_sheet = workbook.add_worksheet().set_name("Summary")?;
    let counts: [(&str, usize); 11] = [
        ("left records", summary.left_records),
        ("right records", summary.right_records),
        ("left excluded", summary.left_excluded),
        ("right excluded", summary.right_excluded),
        ("left duplicates dropped", summary.left_duplicates_dropped),
        ("right duplicates dropped", summary.right_duplicates_dropped),
        ("rows", summary.total_rows),
        ("matched", summary.matched),
        ("mismatched", summary.mismatched),
        ("left only", summary.left_only),
        ("right only", summary.right_only),
    ];
    summary_sheet.write_string_with_format(0, 0, "metric", &header_format)?;
    summary_sheet.write_string_with_format(0, 1, "count", &header_format)?;
    summary_sheet.set_column_width(0, 26)?;
    for (i, (label, n)) in counts.iter().enumerate() {
        let r = (i + 1) as u32;
        summary_sheet.write_string(r, 0, *label)?;
        summary_sheet.write_number(r, 1, *n as f64)?;
    }

    workbook.save(path)?;
    debug!(path = %path.display(), rows = grid.len(), "wrote xlsx report");
    Ok(())
}
