//! `bomcheck-recon`: NPD vs BOM reconciliation engine.
//!
//! Pure engine crate: receives pre-loaded records, returns classified rows.
//! No CLI or IO dependencies.

pub mod classify;
pub mod config;
pub mod engine;
pub mod error;
pub mod evidence;
pub mod key;
pub mod matcher;
pub mod model;
pub mod record;
pub mod view;

pub use config::{DuplicatePolicy, ReconConfig, ReconOptions, SourceConfig};
pub use engine::{reconcile, run, run_json};
pub use error::ReconError;
pub use key::{match_key, BlankRowPolicy, KeySlot, KeySpec, MatchKey};
pub use model::{
    ComparisonResult, ComparisonRow, DuplicateKey, FieldDiff, FieldMapping, ReconInput, ReconMeta,
    ReconReport, ReconSummary, RowStatus, Side,
};
pub use record::{records_from_json, CellValue, Record};
pub use view::{distinct_values, FieldFilter, SortDirection, SortSpec, StatusFilter, View};
