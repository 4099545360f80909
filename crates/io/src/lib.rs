// Workbook ingestion and report export

pub mod csv;
pub mod error;
pub mod grid;
pub mod json;
pub mod workbook;
pub mod xlsx;

pub use error::IoError;
pub use grid::{GridColumns, UnknownColumn, MISSING};
pub use workbook::{load_workbook, FileFormat, Selection, SheetData, Workbook};
