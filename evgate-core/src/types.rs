// SPDX-License-Identifier: Apache-2.0

//! Validated value types for the harness.
//!
//! Following the "Newtype" pattern: invariants are checked at
//! construction time, so downstream code never re-validates.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::HarnessError;

/// Default minimum acceptable local/baseline throughput ratio.
pub const DEFAULT_TOLERANCE: f64 = 0.70;

/// Minimum acceptable local/baseline throughput ratio for a run to pass.
///
/// Must be finite and non-negative. Values >= 1.0 are legal: the
/// tolerance only enforces a lower bound on the ratio, never an upper
/// bound.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Tolerance(f64);

impl Tolerance {
    /// Create a new Tolerance with validation.
    pub fn new(value: f64) -> Result<Self, HarnessError> {
        if !value.is_finite() {
            return Err(HarnessError::InvalidTolerance {
                value,
                reason: "tolerance must be a finite number",
            });
        }
        if value < 0.0 {
            return Err(HarnessError::InvalidTolerance {
                value,
                reason: "tolerance cannot be negative",
            });
        }
        Ok(Self(value))
    }

    /// Get the inner ratio value.
    pub fn value(&self) -> f64 {
        self.0
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self(DEFAULT_TOLERANCE)
    }
}

impl fmt::Display for Tolerance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl TryFrom<f64> for Tolerance {
    type Error = HarnessError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Tolerance> for f64 {
    fn from(tolerance: Tolerance) -> Self {
        tolerance.0
    }
}

/// One named benchmark case with its local and baseline executables.
///
/// Opaque caller configuration: the harness never inspects the binaries
/// beyond executing them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchmarkScenario {
    /// Scenario label included in output to aid debugging.
    pub label: String,
    /// Benchmark built against the local library.
    pub local_bin: PathBuf,
    /// Benchmark built against the baseline library.
    pub baseline_bin: PathBuf,
}

impl BenchmarkScenario {
    pub fn new(
        label: impl Into<String>,
        local_bin: impl Into<PathBuf>,
        baseline_bin: impl Into<PathBuf>,
    ) -> Self {
        Self {
            label: label.into(),
            local_bin: local_bin.into(),
            baseline_bin: baseline_bin.into(),
        }
    }
}
