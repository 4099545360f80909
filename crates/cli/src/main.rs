// bomcheck - reconcile an engineering NPD workbook against a manufacturing BOM export

mod compare;
mod exit_codes;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use bomcheck_io::IoError;
use bomcheck_recon::{ReconConfig, ReconError};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use exit_codes::{EXIT_CONFIG, EXIT_DUPLICATES, EXIT_FILE, EXIT_INPUT, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "bomcheck")]
#[command(about = "Reconcile NPD workbooks against BOM exports")]
#[command(version)]
struct Cli {
    /// More log output on stderr (-v debug, -vv trace). RUST_LOG overrides.
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare a left (NPD) file against a right (BOM) file
    #[command(after_help = "\
Examples:
  bomcheck compare npd.xlsx bom.xlsx
  bomcheck compare npd.xlsx bom.csv --left-sheet Assembly --only-problems
  bomcheck compare npd.xlsx bom.xlsx --config line-a.recon.toml --format xlsx -o report.xlsx
  bomcheck compare npd.xlsx bom.xlsx --kit KIT-100 --sort \"Position #\" --format csv
  bomcheck compare npd.xlsx bom.xlsx --format json --strict-exit")]
    Compare(compare::CompareArgs),

    /// List the sheets of a workbook and their header rows
    #[command(after_help = "\
Examples:
  bomcheck sheets npd.xlsx
  bomcheck sheets bom.csv --json")]
    Sheets {
        /// Workbook or CSV/TSV file
        file: PathBuf,

        /// Output JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Parse and validate a reconciliation config without running it
    Validate {
        /// Path to the .recon.toml config file
        config: PathBuf,
    },

    /// Print the built-in NPD vs BOM config as TOML
    #[command(after_help = "\
Examples:
  bomcheck config > npd-bom.recon.toml")]
    Config,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let quiet = matches!(&cli.command, Commands::Compare(args) if args.quiet);
    init_tracing(cli.verbose, quiet);

    let result = match cli.command {
        Commands::Compare(args) => compare::cmd_compare(args),
        Commands::Sheets { file, json } => cmd_sheets(&file, json),
        Commands::Validate { config } => cmd_validate(&config),
        Commands::Config => cmd_config(),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    let default = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "debug",
        (false, _) => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    pub fn usage(msg: impl Into<String>) -> Self {
        Self::new(EXIT_USAGE, msg)
    }

    pub fn file(msg: impl Into<String>) -> Self {
        Self::new(EXIT_FILE, msg)
    }

    /// Exit with a code and nothing on stderr.
    pub fn silent(code: u8) -> Self {
        Self::new(code, "")
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<ReconError> for CliError {
    fn from(err: ReconError) -> Self {
        let code = match &err {
            ReconError::ConfigParse(_) | ReconError::Configuration(_) => EXIT_CONFIG,
            ReconError::InvalidInput { .. } | ReconError::InvalidSequence { .. } => EXIT_INPUT,
            ReconError::DuplicateKeys(_) => EXIT_DUPLICATES,
        };
        let hint = match &err {
            ReconError::DuplicateKeys(_) => {
                Some(
                    "set [right] duplicates = \"last_wins\" or \"carry_forward\", \
                     or --right-duplicates"
                        .to_string(),
                )
            }
            ReconError::InvalidInput { .. } => {
                Some("each column name may appear only once per record".to_string())
            }
            ReconError::ConfigParse(_) => {
                Some("`bomcheck config` prints a complete example".to_string())
            }
            _ => None,
        };
        Self { code, message: err.to_string(), hint }
    }
}

impl From<IoError> for CliError {
    fn from(err: IoError) -> Self {
        let hint = match &err {
            IoError::UnknownSheet { .. } => {
                Some("`bomcheck sheets FILE` lists the sheet names".to_string())
            }
            IoError::UnsupportedFormat { .. } => {
                Some("save the file as .xlsx, .ods or .csv".to_string())
            }
            _ => None,
        };
        Self { code: EXIT_FILE, message: err.to_string(), hint }
    }
}

/// Read and validate a config file; errors carry the path.
pub fn load_config(path: &Path) -> Result<ReconConfig, CliError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| CliError::file(format!("cannot read config {}: {e}", path.display())))?;
    ReconConfig::from_toml(&text).map_err(|e| {
        let mut err = CliError::from(e);
        err.message = format!("{}: {}", path.display(), err.message);
        err
    })
}

// ============================================================================
// sheets / validate / config
// ============================================================================

#[derive(serde::Serialize)]
struct SheetInfo<'a> {
    name: &'a str,
    rows: usize,
    headers: &'a [String],
}

fn cmd_sheets(file: &Path, json: bool) -> Result<(), CliError> {
    let workbook = bomcheck_io::load_workbook(file)?;

    if json {
        let infos: Vec<SheetInfo> = workbook
            .sheets
            .iter()
            .map(|s| SheetInfo {
                name: &s.name,
                rows: s.records.len(),
                headers: &s.headers,
            })
            .collect();
        let out = serde_json::to_string_pretty(&infos)
            .map_err(|e| CliError::file(format!("JSON serialization error: {e}")))?;
        println!("{out}");
        return Ok(());
    }

    for sheet in &workbook.sheets {
        println!("{} ({} rows)", sheet.name, sheet.records.len());
        for h in &sheet.headers {
            println!("  {h}");
        }
    }
    Ok(())
}

fn cmd_validate(path: &Path) -> Result<(), CliError> {
    let config = load_config(path)?;
    let describe = |label: &str, key: &bomcheck_recon::KeySpec| {
        let slots: Vec<String> = key
            .slots()
            .iter()
            .map(|(slot, s)| format!("{slot}=[{}]", s.candidates().join(", ")))
            .collect();
        format!("{label}: {}", slots.join(" "))
    };
    println!("ok: {}", config.name);
    println!("  {}", describe(&config.left.label, &config.left.key));
    println!("  {}", describe(&config.right.label, &config.right.key));
    println!("  {} field pair(s)", config.fields.len());
    let options = config.options();
    println!(
        "  skip rows: {} / {}, right duplicates: {}",
        options.left_filter, options.right_filter, options.right_duplicates
    );
    Ok(())
}

fn cmd_config() -> Result<(), CliError> {
    let text = ReconConfig::npd_bom()
        .to_toml()
        .map_err(|e| CliError::new(EXIT_CONFIG, e.to_string()))?;
    print!("{text}");
    Ok(())
}
