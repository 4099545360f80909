use thiserror::Error;

use crate::model::{DuplicateKey, Side};

#[derive(Debug, Error)]
pub enum ReconError {
    /// An input record sequence is not a sequence of flat key-value records.
    #[error("invalid {side} input, record {index}: {reason}")]
    InvalidInput {
        side: Side,
        index: usize,
        reason: String,
    },
    /// Input is malformed as a whole (not a sequence at all).
    #[error("invalid {side} input: {reason}")]
    InvalidSequence { side: Side, reason: String },
    /// TOML parse / deserialization error.
    #[error("config parse error: {0}")]
    ConfigParse(String),
    /// Config validation error (blank field name, empty key slot, etc.).
    #[error("configuration error: {0}")]
    Configuration(String),
    /// Duplicate right keys under `duplicates = "reject"`.
    #[error("{} duplicate key(s) on the right side: {}", .0.len(), summarize_duplicates(.0))]
    DuplicateKeys(Vec<DuplicateKey>),
}

impl ReconError {
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::ConfigParse(_) | Self::Configuration(_))
    }

    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput { .. } | Self::InvalidSequence { .. })
    }
}

fn summarize_duplicates(dups: &[DuplicateKey]) -> String {
    const SHOWN: usize = 5;
    let mut parts: Vec<String> = dups
        .iter()
        .take(SHOWN)
        .map(|d| format!("{:?} x{}", d.key.as_str(), d.count))
        .collect();
    if dups.len() > SHOWN {
        parts.push(format!("and {} more", dups.len() - SHOWN));
    }
    parts.join(", ")
}
