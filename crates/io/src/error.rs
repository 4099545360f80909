use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IoError {
    #[error("cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(
        "unsupported file type {extension:?} for {}; \
         expected xlsx, xlsm, xls, xlsb, ods, csv, tsv or txt",
        .path.display()
    )]
    UnsupportedFormat { path: PathBuf, extension: String },
    #[error("failed to open workbook {}: {message}", .path.display())]
    Workbook { path: PathBuf, message: String },
    #[error("{} contains no sheets", .path.display())]
    NoSheets { path: PathBuf },
    #[error("sheet {name:?} not found (available: {})", .available.join(", "))]
    UnknownSheet { name: String, available: Vec<String> },
    #[error("csv error in {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: ::csv::Error,
    },
    #[error("csv export failed: {0}")]
    CsvExport(String),
    #[error("xlsx export failed: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
    #[error("json export failed: {0}")]
    Json(#[from] serde_json::Error),
}

impl IoError {
    /// Errors caused by the input file itself, as opposed to export failures.
    pub fn is_input(&self) -> bool {
        matches!(
            self,
            Self::Read { .. }
                | Self::UnsupportedFormat { .. }
                | Self::Workbook { .. }
                | Self::NoSheets { .. }
                | Self::UnknownSheet { .. }
                | Self::Csv { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_sheet_lists_available() {
        let err = IoError::UnknownSheet {
            name: "Kits".into(),
            available: vec!["Sheet1".into(), "BOM".into()],
        };
        assert_eq!(err.to_string(), "sheet \"Kits\" not found (available: Sheet1, BOM)");
        assert!(err.is_input());
    }

    #[test]
    fn unsupported_names_path() {
        let err = IoError::UnsupportedFormat {
            path: PathBuf::from("parts.pdf"),
            extension: "pdf".into(),
        };
        assert!(err.to_string().contains("parts.pdf"));
    }
}
