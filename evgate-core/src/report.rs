// SPDX-License-Identifier: Apache-2.0

//! JSON run reports.
//!
//! Persists the gate reports of one harness run to a timestamped JSON
//! file so CI can archive and diff results across runs.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::gate::GateReport;

/// Errors that can occur while writing or reading run reports.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("report I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize report: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// One harness run: every comparison that executed, in execution order.
/// On a failed run the failing comparison is the last entry.
#[derive(Debug, Serialize, Deserialize)]
pub struct RunReport {
    pub timestamp: DateTime<Utc>,
    pub tolerance: f64,
    pub passed: bool,
    pub results: Vec<GateReport>,
}

impl RunReport {
    pub fn new(tolerance: f64, passed: bool, results: Vec<GateReport>) -> Self {
        Self {
            timestamp: Utc::now(),
            tolerance,
            passed,
            results,
        }
    }
}

/// Writes run reports into an output directory.
pub struct RunReporter {
    output_dir: PathBuf,
}

impl RunReporter {
    /// Create a reporter, creating the output directory if needed.
    pub fn new(output_dir: impl AsRef<Path>) -> Result<Self, ReportError> {
        let output_dir = output_dir.as_ref().to_path_buf();
        fs::create_dir_all(&output_dir)?;
        Ok(Self { output_dir })
    }

    /// Save a run report to a timestamped JSON file and return its path.
    pub fn save(&self, report: &RunReport) -> Result<PathBuf, ReportError> {
        let timestamp = report.timestamp.format("%Y-%m-%dT%H-%M-%SZ");
        let filename = format!("evgate_{}.json", timestamp);
        let filepath = self.output_dir.join(filename);

        let file = File::create(&filepath)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, report)?;

        Ok(filepath)
    }

    /// Load a previously saved run report.
    pub fn load(path: impl AsRef<Path>) -> Result<RunReport, ReportError> {
        let file = File::open(path)?;
        let report = serde_json::from_reader(file)?;
        Ok(report)
    }
}
