// CSV/TSV import and report export

use std::io::Read;
use std::path::Path;

use bomcheck_recon::{CellValue, ComparisonRow};

use crate::error::IoError;
use crate::grid::{grid_rows, GridColumns};
use crate::workbook::SheetData;

/// Read a delimited file as one sheet named after the file stem. The first
/// line is the header row. `None` sniffs the delimiter.
pub fn import(path: &Path, delimiter: Option<u8>) -> Result<SheetData, IoError> {
    let content = read_file_as_utf8(path)?;
    let delimiter = delimiter.unwrap_or_else(|| sniff_delimiter(&content));
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("Sheet1");
    import_from_string(name, &content, delimiter).map_err(|source| IoError::Csv {
        path: path.to_path_buf(),
        source,
    })
}

/// Detect the most likely field delimiter by checking consistency across the first few lines.
///
/// For each candidate (tab, semicolon, comma, pipe), count fields per line. The delimiter
/// that produces the most consistent field count (>1 field) wins.
fn sniff_delimiter(content: &str) -> u8 {
    let candidates: &[u8] = &[b'\t', b';', b',', b'|'];
    let sample_lines: Vec<&str> = content.lines().take(10).collect();

    if sample_lines.is_empty() {
        return b',';
    }

    let mut best = b',';
    let mut best_score = 0u64;

    for &delim in candidates {
        let counts: Vec<usize> = sample_lines
            .iter()
            .map(|line| {
                csv::ReaderBuilder::new()
                    .delimiter(delim)
                    .has_headers(false)
                    .flexible(true)
                    .from_reader(line.as_bytes())
                    .records()
                    .next()
                    .and_then(|r| r.ok())
                    .map(|r| r.len())
                    .unwrap_or(1)
            })
            .collect();

        let target = counts.first().copied().unwrap_or(0);
        if target <= 1 {
            continue;
        }

        // More consistent lines first, wider rows break ties
        let consistent = counts.iter().filter(|&&c| c == target).count() as u64;
        let score = consistent * target as u64;

        if score > best_score {
            best_score = score;
            best = delim;
        }
    }

    best
}

/// Read file and convert to UTF-8 if needed (Excel-exported CSVs are often Windows-1252).
pub fn read_file_as_utf8(path: &Path) -> Result<String, IoError> {
    let read_err = |source| IoError::Read {
        path: path.to_path_buf(),
        source,
    };
    let mut file = std::fs::File::open(path).map_err(read_err)?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(read_err)?;

    match String::from_utf8(bytes) {
        Ok(s) => Ok(s.strip_prefix('\u{feff}').map(str::to_string).unwrap_or(s)),
        Err(e) => {
            let bytes = e.into_bytes();
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            Ok(decoded.into_owned())
        }
    }
}

fn import_from_string(name: &str, content: &str, delimiter: u8) -> Result<SheetData, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut records = reader.records();
    let header: Vec<String> = match records.next() {
        Some(r) => r?.iter().map(str::to_string).collect(),
        None => Vec::new(),
    };

    let mut rows = Vec::new();
    for result in records {
        let record = result?;
        rows.push(
            record
                .iter()
                .map(|field| {
                    if field.is_empty() {
                        CellValue::Empty
                    } else {
                        CellValue::Text(field.to_string())
                    }
                })
                .collect::<Vec<_>>(),
        );
    }

    Ok(SheetData::from_rows(name, header, rows))
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

/// Write the report grid as CSV: header line, then one line per row.
pub fn write_report<'a, W, I>(writer: W, columns: &GridColumns, rows: I) -> Result<(), IoError>
where
    W: std::io::Write,
    I: IntoIterator<Item = &'a ComparisonRow>,
{
    let mut writer = csv::WriterBuilder::new().from_writer(writer);
    let export_err = |e: csv::Error| IoError::CsvExport(e.to_string());

    writer.write_record(columns.headers()).map_err(export_err)?;
    for row in grid_rows(columns, rows) {
        writer
            .write_record(row.cells.iter().map(|c| c.text.as_str()))
            .map_err(export_err)?;
    }
    writer
        .flush()
        .map_err(|e| IoError::CsvExport(e.to_string()))?;
    Ok(())
}

pub fn to_csv<'a, I>(columns: &GridColumns, rows: I) -> Result<String, IoError>
where
    I: IntoIterator<Item = &'a ComparisonRow>,
{
    let mut buf = Vec::new();
    write_report(&mut buf, columns, rows)?;
    String::from_utf8(buf).map_err(|e| IoError::CsvExport(e.to_string()))
}
