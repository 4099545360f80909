//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! | Code | Meaning                                                        |
//! |------|----------------------------------------------------------------|
//! | 0    | Success                                                        |
//! | 1    | Differences found (only with `--strict-exit`)                  |
//! | 2    | CLI usage error (bad args, flag combination)                   |
//! | 3    | File error (input unreadable/unsupported, unknown sheet, output unwritable) |
//! | 4    | Invalid config (TOML syntax or validation)                     |
//! | 5    | Invalid input records                                          |
//! | 6    | Duplicate right keys under `duplicates = "reject"`             |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into `CliError`'s conversions

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// Compare found differences and `--strict-exit` was given.
/// Like `diff(1)`, exit 1 means "files differ."
pub const EXIT_DIFFS: u8 = 1;

/// Usage error - bad arguments, incompatible flags.
/// clap exits with the same code for parse failures.
pub const EXIT_USAGE: u8 = 2;

/// Cannot read an input file, unsupported extension, unknown sheet,
/// or cannot write the output file.
pub const EXIT_FILE: u8 = 3;

/// Config file failed to parse or validate.
pub const EXIT_CONFIG: u8 = 4;

/// Input records are malformed (e.g. a column repeated within one record).
pub const EXIT_INPUT: u8 = 5;

/// Right side has duplicate keys and the config rejects them.
pub const EXIT_DUPLICATES: u8 = 6;
