// JSON report export

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use bomcheck_recon::ReconReport;

use crate::error::IoError;

pub fn to_json(report: &ReconReport) -> Result<String, IoError> {
    Ok(serde_json::to_string_pretty(report)?)
}

pub fn export(report: &ReconReport, path: &Path) -> Result<(), IoError> {
    let file = File::create(path).map_err(|source| IoError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::to_writer_pretty(BufWriter::new(file), report)?;
    Ok(())
}
