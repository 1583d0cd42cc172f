//! Append-only CSV result sink

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::Condition;

/// One completed file analysis, ready for persistence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialRecord {
    pub trial_id: u32,
    pub condition: Condition,
    /// Nominal chirp rate supplied by the scheduler; pass-through metadata
    pub chirp_rate: f64,
    pub rho_mean_abs: f64,
    /// Unix timestamp (seconds) of when the analysis completed
    pub timestamp: i64,
}

/// Appends trial records to a CSV file, one row per completed analysis.
///
/// The header is written once, iff the destination does not exist yet;
/// re-opening an existing file keeps appending below the rows already
/// there. No schema versioning.
pub struct ResultSink {
    path: PathBuf,
}

impl ResultSink {
    const HEADER: &'static str = "trial_id,condition,chirp_rate,rho_mean_abs,timestamp";

    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .open(&path)
                .with_context(|| format!("Failed to create results file: {}", path.display()))?;
            writeln!(file, "{}", Self::HEADER)?;
        }
        Ok(Self { path })
    }

    pub fn append(&self, record: &TrialRecord) -> Result<()> {
        let mut file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open results file: {}", self.path.display()))?;

        writeln!(
            file,
            "{},{},{},{},{}",
            record.trial_id,
            record.condition.label(),
            record.chirp_rate,
            record.rho_mean_abs,
            record.timestamp
        )?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
