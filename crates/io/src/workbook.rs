// Workbook model: named sheets of header-keyed records

use std::path::{Path, PathBuf};

use bomcheck_recon::{CellValue, Record};
use tracing::{debug, warn};

use crate::error::IoError;

/// Input format, decided by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// xlsx / xlsm / xls / xlsb / ods, read with calamine
    Spreadsheet,
    /// csv / txt, delimiter sniffed from the first lines
    Csv,
    Tsv,
}

impl FileFormat {
    pub fn from_path(path: &Path) -> Result<Self, IoError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => Ok(Self::Spreadsheet),
            "csv" | "txt" => Ok(Self::Csv),
            "tsv" | "tab" => Ok(Self::Tsv),
            _ => Err(IoError::UnsupportedFormat {
                path: path.to_path_buf(),
                extension: ext,
            }),
        }
    }
}

/// One worksheet: its header row and the data rows below it.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetData {
    pub name: String,
    pub headers: Vec<String>,
    pub records: Vec<Record>,
}

impl SheetData {
    /// Build from a header row and raw value rows.
    ///
    /// Blank header cells drop their column. Repeated header names get a
    /// `_1`, `_2`... suffix. Rows with no non-blank value are skipped. Each
    /// record is tagged with the sheet name.
    pub fn from_rows<I>(name: &str, header: Vec<String>, rows: I) -> Self
    where
        I: IntoIterator<Item = Vec<CellValue>>,
    {
        let columns = header_columns(name, header);
        let headers: Vec<String> = columns.iter().map(|(_, h)| h.clone()).collect();

        let mut records = Vec::new();
        for row in rows {
            let fields: Vec<(String, CellValue)> = columns
                .iter()
                .map(|(idx, h)| {
                    let value = row.get(*idx).cloned().unwrap_or(CellValue::Empty);
                    (h.clone(), value)
                })
                .collect();
            let record = Record::new(fields).with_origin(name);
            if !record.is_blank() {
                records.push(record);
            }
        }

        Self {
            name: name.to_string(),
            headers,
            records,
        }
    }
}

/// (source column index, unique header name) for every non-blank header.
fn header_columns(sheet: &str, header: Vec<String>) -> Vec<(usize, String)> {
    let mut out: Vec<(usize, String)> = Vec::new();
    for (idx, raw) in header.into_iter().enumerate() {
        let name = raw.trim().to_string();
        if name.is_empty() {
            continue;
        }
        let mut unique = name.clone();
        let mut n = 0;
        while out.iter().any(|(_, h)| *h == unique) {
            n += 1;
            unique = format!("{name}_{n}");
        }
        if n > 0 {
            warn!(sheet, column = %name, renamed = %unique, "repeated header renamed");
        }
        out.push((idx, unique));
    }
    out
}

#[derive(Debug, Clone, PartialEq)]
pub struct Workbook {
    pub path: PathBuf,
    pub sheets: Vec<SheetData>,
}

impl Workbook {
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn sheet(&self, name: &str) -> Option<&SheetData> {
        self.sheets.iter().find(|s| s.name == name)
    }

    /// Flatten the named sheets, in the order given. No names selects every
    /// sheet in workbook order.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Result<Selection, IoError> {
        let chosen: Vec<&SheetData> = if names.is_empty() {
            self.sheets.iter().collect()
        } else {
            names
                .iter()
                .map(|n| {
                    let n = n.as_ref();
                    self.sheet(n).ok_or_else(|| IoError::UnknownSheet {
                        name: n.to_string(),
                        available: self.sheets.iter().map(|s| s.name.clone()).collect(),
                    })
                })
                .collect::<Result<_, _>>()?
        };

        let mut columns: Vec<String> = Vec::new();
        let mut records = Vec::new();
        for sheet in chosen {
            for h in &sheet.headers {
                if !columns.contains(h) {
                    columns.push(h.clone());
                }
            }
            records.extend(sheet.records.iter().cloned());
        }

        debug!(
            path = %self.path.display(),
            sheets = names.len(),
            records = records.len(),
            "selected sheets"
        );
        Ok(Selection { columns, records })
    }
}

/// Records from one or more sheets plus the union of their headers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    columns: Vec<String>,
    records: Vec<Record>,
}

impl Selection {
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }
}

/// Load every sheet of a workbook (or the single sheet of a CSV/TSV file).
pub fn load_workbook(path: &Path) -> Result<Workbook, IoError> {
    let sheets = match FileFormat::from_path(path)? {
        FileFormat::Spreadsheet => crate::xlsx::import(path)?,
        FileFormat::Csv => vec![crate::csv::import(path, None)?],
        FileFormat::Tsv => vec![crate::csv::import(path, Some(b'\t'))?],
    };
    if sheets.is_empty() {
        return Err(IoError::NoSheets {
            path: path.to_path_buf(),
        });
    }
    debug!(
        path = %path.display(),
        sheets = sheets.len(),
        records = sheets.iter().map(|s| s.records.len()).sum::<usize>(),
        "loaded workbook"
    );
    Ok(Workbook {
        path: path.to_path_buf(),
        sheets,
    })
}
