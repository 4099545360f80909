//! `bomcheck compare`: load both files, reconcile, render.

use std::io::Write;
use std::path::{Path, PathBuf};

use bomcheck_io::{csv, json, load_workbook, xlsx, GridColumns, Selection};
use bomcheck_recon::{
    ComparisonRow, DuplicatePolicy, FieldFilter, ReconConfig, ReconInput, ReconReport, RowStatus,
    Side, SortDirection, SortSpec, StatusFilter, View,
};
use clap::{Args, ValueEnum};
use tracing::debug;

use crate::exit_codes::EXIT_DIFFS;
use crate::{load_config, CliError};

#[derive(Args)]
pub struct CompareArgs {
    /// Left (NPD) file: xlsx, xlsm, xls, xlsb, ods, csv or tsv
    pub left: PathBuf,

    /// Right (BOM) file
    pub right: PathBuf,

    /// Reconciliation config (.recon.toml); default is the built-in NPD vs BOM layout
    #[arg(long, short = 'c', env = "BOMCHECK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Left sheet to read (repeatable, in order; default: all sheets)
    #[arg(long = "left-sheet", value_name = "NAME")]
    pub left_sheets: Vec<String>,

    /// Right sheet to read (repeatable, in order; default: all sheets)
    #[arg(long = "right-sheet", value_name = "NAME")]
    pub right_sheets: Vec<String>,

    /// Left column to export to csv/xlsx (repeatable, in order; default: all)
    #[arg(long = "left-column", value_name = "COLUMN")]
    pub left_columns: Vec<String>,

    /// Right column to export to csv/xlsx (repeatable, in order; default: all)
    #[arg(long = "right-column", value_name = "COLUMN")]
    pub right_columns: Vec<String>,

    /// Override the config's policy for duplicate right keys
    #[arg(long, value_enum, value_name = "POLICY")]
    pub right_duplicates: Option<DuplicatesArg>,

    /// Show only rows whose kit column equals this value (either side)
    #[arg(long)]
    pub kit: Option<String>,

    /// Show only rows whose position column equals this value (either side)
    #[arg(long)]
    pub position: Option<String>,

    /// Hide matched rows
    #[arg(long)]
    pub only_problems: bool,

    /// Sort rows by this column
    #[arg(long, value_name = "COLUMN")]
    pub sort: Option<String>,

    /// Which side's column --sort reads
    #[arg(long, value_enum, default_value = "left")]
    pub sort_side: SideArg,

    /// Sort descending
    #[arg(long)]
    pub desc: bool,

    /// Output format
    #[arg(long, short = 'f', value_enum, default_value = "summary")]
    pub format: OutputFormat,

    /// Output file (default: stdout; required for xlsx)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Exit 1 when any row is not matched
    #[arg(long)]
    pub strict_exit: bool,

    /// Quiet mode - suppress the stderr summary and warnings
    #[arg(long, short = 'q')]
    pub quiet: bool,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum DuplicatesArg {
    LastWins,
    CarryForward,
    Reject,
}

impl From<DuplicatesArg> for DuplicatePolicy {
    fn from(arg: DuplicatesArg) -> Self {
        match arg {
            DuplicatesArg::LastWins => DuplicatePolicy::LastWins,
            DuplicatesArg::CarryForward => DuplicatePolicy::CarryForward,
            DuplicatesArg::Reject => DuplicatePolicy::Reject,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum SideArg {
    Left,
    Right,
}

impl From<SideArg> for Side {
    fn from(arg: SideArg) -> Self {
        match arg {
            SideArg::Left => Side::Left,
            SideArg::Right => Side::Right,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable row list
    Summary,
    Json,
    Csv,
    Xlsx,
}

pub fn cmd_compare(args: CompareArgs) -> Result<(), CliError> {
    if args.format == OutputFormat::Xlsx && args.output.is_none() {
        return Err(CliError::usage("--format xlsx needs --output FILE")
            .with_hint("e.g. --format xlsx -o report.xlsx"));
    }

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => ReconConfig::npd_bom(),
    };
    if let Some(policy) = args.right_duplicates {
        config.right.duplicates = Some(policy.into());
    }

    let left = load_selection(&args.left, &args.left_sheets)?;
    let right = load_selection(&args.right, &args.right_sheets)?;
    let columns = GridColumns::new(
        config.left.label.clone(),
        config.right.label.clone(),
        left.columns().to_vec(),
        right.columns().to_vec(),
    )
    .narrow(&args.left_columns, &args.right_columns)
    .map_err(|e| {
        let hint = format!("{} columns: {}", e.label, e.available.join(", "));
        CliError::usage(e.to_string()).with_hint(hint)
    })?;

    let input = ReconInput {
        left: left.into_records(),
        right: right.into_records(),
    };
    let report = bomcheck_recon::run(&config, &input)?;

    let view = build_view(&args, &config);
    let rows = view.apply(&report.rows);
    debug!(total = report.rows.len(), shown = rows.len(), "view applied");

    match args.format {
        OutputFormat::Summary => {
            let text = render_summary(&report, &rows);
            emit(&args.output, text.as_bytes())?;
        }
        OutputFormat::Json => {
            let filtered = ReconReport {
                rows: rows.iter().map(|r| (*r).clone()).collect(),
                ..report.clone()
            };
            let text = json::to_json(&filtered)?;
            emit(&args.output, format!("{text}\n").as_bytes())?;
        }
        OutputFormat::Csv => {
            let text = csv::to_csv(&columns, rows.iter().copied())?;
            emit(&args.output, text.as_bytes())?;
        }
        OutputFormat::Xlsx => {
            if let Some(path) = &args.output {
                xlsx::write_report(path, &columns, rows.iter().copied(), &report.summary)?;
            }
        }
    }

    if !args.quiet {
        let s = &report.summary;
        eprintln!(
            "{}: {} rows - {} matched, {} mismatched, {} {} only, {} {} only",
            report.meta.config_name,
            s.total_rows,
            s.matched,
            s.mismatched,
            s.left_only,
            report.meta.left_label,
            s.right_only,
            report.meta.right_label,
        );
        if let Some(path) = &args.output {
            eprintln!("wrote {}", path.display());
        }
    }

    if args.strict_exit && !report.summary.is_clean() {
        return Err(CliError::silent(EXIT_DIFFS));
    }
    Ok(())
}

fn load_selection(path: &Path, sheets: &[String]) -> Result<Selection, CliError> {
    let workbook = load_workbook(path)?;
    Ok(workbook.select(sheets)?)
}

/// Kit/position filters read each side's primary kit/position column.
fn build_view(args: &CompareArgs, config: &ReconConfig) -> View {
    let (lk, rk) = (&config.left.key, &config.right.key);
    let mut filters = Vec::new();
    for (value, left_slot, right_slot) in [
        (&args.kit, &lk.kit, &rk.kit),
        (&args.position, &lk.position, &rk.position),
    ] {
        if let (Some(v), Some(l), Some(r)) = (value, left_slot.primary(), right_slot.primary()) {
            filters.push(FieldFilter::new(l, r, v.as_str()));
        }
    }

    View {
        status: if args.only_problems { StatusFilter::Problems } else { StatusFilter::All },
        filters,
        sort: args.sort.as_ref().map(|column| {
            let direction = if args.desc { SortDirection::Desc } else { SortDirection::Asc };
            SortSpec::new(column.as_str(), args.sort_side.into(), direction)
        }),
    }
}

fn render_summary(report: &ReconReport, rows: &[&ComparisonRow]) -> String {
    let meta = &report.meta;
    let mut out = String::new();
    for row in rows {
        let status = match row.status {
            RowStatus::Matched => "ok".to_string(),
            RowStatus::Mismatched => "DIFF".to_string(),
            RowStatus::LeftOnly => format!("{} ONLY", meta.left_label),
            RowStatus::RightOnly => format!("{} ONLY", meta.right_label),
        };
        out.push_str(&format!("{status:<12} {}", row.key));
        for d in &row.field_diffs {
            out.push_str(&format!(
                "  {}={:?} vs {}={:?}",
                d.left_field, d.left_value, d.right_field, d.right_value
            ));
        }
        out.push('\n');
    }
    for dup in &report.duplicates {
        let label = match dup.side {
            Side::Left => &meta.left_label,
            Side::Right => &meta.right_label,
        };
        out.push_str(&format!(
            "duplicate {label} key {} ({} records, kept #{})\n",
            dup.key, dup.count, dup.kept_index
        ));
    }
    out
}

fn emit(output: &Option<PathBuf>, bytes: &[u8]) -> Result<(), CliError> {
    match output {
        Some(path) => std::fs::write(path, bytes)
            .map_err(|e| CliError::file(format!("cannot write {}: {e}", path.display()))),
        None => std::io::stdout()
            .write_all(bytes)
            .map_err(|e| CliError::file(format!("cannot write stdout: {e}"))),
    }
}
