use std::path::Path;

use bomcheck_io::{csv, json, load_workbook, xlsx, GridColumns, IoError};
use bomcheck_recon::{run, ReconConfig, ReconInput, RowStatus};
use calamine::{open_workbook_auto, Data, Reader};
use rust_xlsxwriter::Workbook as XlsxWorkbook;
use tempfile::tempdir;

fn write_npd(path: &Path) {
    let mut wb = XlsxWorkbook::new();
    let sheet = wb.add_worksheet().set_name("Assembly").unwrap();
    let header = ["Kit #", "Position #", "Item #", "h2m Item #", "Description", "Kit Qty"];
    for (c, h) in header.iter().enumerate() {
        sheet.write_string(0, c as u16, *h).unwrap();
    }
    let rows: [[&str; 5]; 3] = [
        ["KIT-1", "10", "", "H-001", "Bolt"],
        ["", "", "", "", "-- section --"],
        ["KIT-1", "20", "H-002", "H-002", "Nut"],
    ];
    for (r, row) in rows.iter().enumerate() {
        let r = (r + 1) as u32;
        for (c, v) in row.iter().enumerate() {
            if !v.is_empty() {
                sheet.write_string(r, c as u16, *v).unwrap();
            }
        }
        sheet.write_number(r, 5, 4.0).unwrap();
    }
    wb.save(path).unwrap();
}

fn write_bom(path: &Path) {
    std::fs::write(
        path,
        "Kit Item;Position;Item number;Product name;Quantity\n\
         kit-1;10;h-001;BOLT;4\n\
         kit-1;20;h-002;Nut;5\n\
         kit-2;10;h-100;Washer;1\n",
    )
    .unwrap();
}

fn load_and_run(dir: &Path) -> (bomcheck_recon::ReconReport, GridColumns) {
    let npd = dir.join("npd.xlsx");
    let bom = dir.join("bom.csv");
    write_npd(&npd);
    write_bom(&bom);

    let left = load_workbook(&npd).unwrap().select::<&str>(&[]).unwrap();
    let right = load_workbook(&bom).unwrap().select(&["bom"]).unwrap();
    let config = ReconConfig::npd_bom();
    let columns = GridColumns::new(
        config.left.label.clone(),
        config.right.label.clone(),
        left.columns().to_vec(),
        right.columns().to_vec(),
    );
    let input = ReconInput {
        left: left.into_records(),
        right: right.into_records(),
    };
    (run(&config, &input).unwrap(), columns)
}

#[test]
fn xlsx_and_csv_sources_reconcile() {
    let dir = tempdir().unwrap();
    let (report, _) = load_and_run(dir.path());

    let statuses: Vec<RowStatus> = report.rows.iter().map(|r| r.status).collect();
    assert_eq!(
        statuses,
        vec![RowStatus::Matched, RowStatus::Mismatched, RowStatus::RightOnly]
    );
    assert_eq!(report.summary.left_excluded, 1);
    assert_eq!(report.rows[0].left_origin.as_deref(), Some("Assembly"));
    assert_eq!(report.rows[0].right_origin.as_deref(), Some("bom"));
    assert!(report.rows[1].is_diff_field("Kit Qty"));
}

#[test]
fn csv_export_lines() {
    let dir = tempdir().unwrap();
    let (report, columns) = load_and_run(dir.path());

    let out = csv::to_csv(&columns, &report.rows).unwrap();
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("status,key,NPD: Kit #,NPD: Position #"));
    assert!(lines[0].ends_with("BOM: Product name,BOM: Quantity"));
    assert!(lines[3].starts_with("right_only,kit-2|10|h-100,[MISSING]"));
}

#[test]
fn xlsx_export_readable() {
    let dir = tempdir().unwrap();
    let (report, columns) = load_and_run(dir.path());
    let out = dir.path().join("report.xlsx");
    xlsx::write_report(&out, &columns, &report.rows, &report.summary).unwrap();

    let mut wb = open_workbook_auto(&out).unwrap();
    assert_eq!(wb.sheet_names(), vec!["Comparison".to_string(), "Summary".to_string()]);
    let range = wb.worksheet_range("Comparison").unwrap();
    assert_eq!(range.get((0, 0)), Some(&Data::String("status".into())));
    assert_eq!(range.get((1, 0)), Some(&Data::String("matched".into())));
    assert_eq!(range.get((3, 2)), Some(&Data::String("[MISSING]".into())));
    assert_eq!(range.height(), 4);

    // Exported workbook loads back through the same ingestion path
    let back = load_workbook(&out).unwrap();
    let comparison = back.sheet("Comparison").unwrap();
    assert_eq!(comparison.records.len(), 3);
    assert_eq!(comparison.records[1].text("status"), "mismatched");
}

#[test]
fn json_export_round_trip() {
    let dir = tempdir().unwrap();
    let (report, _) = load_and_run(dir.path());
    let path = dir.path().join("report.json");
    json::export(&report, &path).unwrap();
    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(value["summary"]["right_only"], 1);
    assert_eq!(value["rows"].as_array().unwrap().len(), 3);
}

#[test]
fn unknown_sheet_and_missing_file() {
    let dir = tempdir().unwrap();
    let bom = dir.path().join("bom.csv");
    write_bom(&bom);
    let err = load_workbook(&bom).unwrap().select(&["Sheet1"]).unwrap_err();
    assert!(matches!(err, IoError::UnknownSheet { .. }));

    let err = load_workbook(&dir.path().join("absent.xlsx")).unwrap_err();
    assert!(err.is_input());
}
