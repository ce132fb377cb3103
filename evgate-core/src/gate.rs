// SPDX-License-Identifier: Apache-2.0

//! Performance regression gate.
//!
//! Turns two parsed benchmark records into a pass/fail verdict against
//! a tolerance. Stateless: safe to invoke repeatedly with independent
//! inputs.

use serde::{Deserialize, Serialize};

use crate::parser::BenchmarkRecord;
use crate::types::Tolerance;

/// Outcome of one local-vs-baseline comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateReport {
    /// Composed label, e.g. `timer-epoll`.
    pub label: String,
    /// Local throughput in iterations per second.
    pub local_rate: f64,
    /// Baseline throughput in iterations per second.
    pub baseline_rate: f64,
    /// Local library version, `?` when the benchmark did not report one.
    pub local_version: String,
    /// Baseline library version, `?` when absent.
    pub baseline_version: String,
    /// local_rate / baseline_rate; +infinity when the baseline rate is 0.
    pub ratio: f64,
    /// Tolerance the ratio was gated against.
    pub tolerance: f64,
    /// True iff ratio >= tolerance (inclusive).
    pub passed: bool,
}

impl GateReport {
    /// Percentage slowdown relative to baseline. Only meaningful for a
    /// failed comparison.
    pub fn slowdown_percent(&self) -> f64 {
        (1.0 - self.ratio) * 100.0
    }

    fn prefix(&self) -> String {
        if self.label.is_empty() {
            String::new()
        } else {
            format!("[{}] ", self.label)
        }
    }

    /// Write the human-readable report: rates and ratio to stdout, the
    /// slowdown diagnostic to stderr on failure. Rounding is for
    /// display only; the verdict uses the exact ratio.
    pub fn print(&self) {
        let prefix = self.prefix();
        println!(
            "{}local build v{}: {:.0} iterations/sec",
            prefix, self.local_version, self.local_rate
        );
        println!(
            "{}baseline build v{}: {:.0} iterations/sec",
            prefix, self.baseline_version, self.baseline_rate
        );
        println!("{}ratio (local/baseline): {:.2}", prefix, self.ratio);

        if !self.passed {
            eprintln!(
                "{}local build is {:.1}% slower than baseline (tolerance {:.2})",
                prefix,
                self.slowdown_percent(),
                self.tolerance
            );
        }
    }
}

/// Gate a local record against a baseline record.
///
/// A baseline rate of 0 yields ratio = +infinity: the local build is
/// trivially at least as fast, so a degenerate baseline can never turn
/// into a false failure.
pub fn compare(
    label: &str,
    local: &BenchmarkRecord,
    baseline: &BenchmarkRecord,
    tolerance: Tolerance,
) -> GateReport {
    let local_rate = local.per_second();
    let baseline_rate = baseline.per_second();

    let ratio = if baseline_rate > 0.0 {
        local_rate / baseline_rate
    } else {
        f64::INFINITY
    };

    GateReport {
        label: label.to_string(),
        local_rate,
        baseline_rate,
        local_version: local.version().unwrap_or("?").to_string(),
        baseline_version: baseline.version().unwrap_or("?").to_string(),
        ratio,
        tolerance: tolerance.value(),
        passed: ratio >= tolerance.value(),
    }
}
