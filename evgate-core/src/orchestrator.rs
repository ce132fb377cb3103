// SPDX-License-Identifier: Apache-2.0

//! Fail-fast orchestration over backends × scenarios.
//!
//! Strictly sequential by design: benchmark measurements must not share
//! CPU or memory-bandwidth contention with concurrent runs, so one
//! combination executes at a time and the flow blocks at child-process
//! boundaries. The first failing combination aborts the whole run; the
//! remaining combinations are never invoked.

use crate::catalog::BackendDescriptor;
use crate::error::{HarnessError, HarnessResult};
use crate::gate::{self, GateReport};
use crate::runner::{run_benchmark, EnvOverlay, BACKEND_ENV};
use crate::types::{BenchmarkScenario, Tolerance};

/// Seam for running one scenario under one backend. The production
/// implementation spawns the two benchmark children; tests substitute
/// a scripted runner.
pub trait ComparisonRunner {
    fn compare(
        &self,
        label: &str,
        scenario: &BenchmarkScenario,
        backend: &BackendDescriptor,
    ) -> HarnessResult<GateReport>;
}

/// Production comparison: run the local and baseline benchmarks with
/// the backend selected via the environment overlay, then gate the
/// parsed records.
pub struct PerfCompare {
    tolerance: Tolerance,
}

impl PerfCompare {
    pub fn new(tolerance: Tolerance) -> Self {
        Self { tolerance }
    }
}

impl ComparisonRunner for PerfCompare {
    fn compare(
        &self,
        label: &str,
        scenario: &BenchmarkScenario,
        backend: &BackendDescriptor,
    ) -> HarnessResult<GateReport> {
        // Fresh overlay per invocation: backend selection can never
        // leak into a sibling run.
        let overlay = EnvOverlay::for_benchmark().set(BACKEND_ENV, backend.flag.to_string());

        let local = run_benchmark(&scenario.local_bin, &overlay)?;
        let baseline = run_benchmark(&scenario.baseline_bin, &overlay)?;

        let report = gate::compare(label, &local, &baseline, self.tolerance);
        report.print();
        Ok(report)
    }
}

/// Terminal state of one orchestrated run.
#[derive(Debug)]
pub enum RunOutcome {
    /// Every combination passed its gate.
    Done(Vec<GateReport>),
    /// No usable backends: nothing to regress against. A no-op success.
    NoBackends,
    /// A combination regressed past tolerance. Short-circuits the rest.
    Failed {
        /// Reports for combinations that completed before the failure,
        /// the failing one last.
        reports: Vec<GateReport>,
    },
}

impl RunOutcome {
    /// Process-style exit status: 0 for pass/no-op, 1 for regression.
    pub fn exit_code(&self) -> i32 {
        match self {
            RunOutcome::Done(_) | RunOutcome::NoBackends => 0,
            RunOutcome::Failed { .. } => 1,
        }
    }

    /// Reports gathered before the run terminated.
    pub fn reports(&self) -> &[GateReport] {
        match self {
            RunOutcome::Done(reports) | RunOutcome::Failed { reports } => reports,
            RunOutcome::NoBackends => &[],
        }
    }
}

/// Run every (backend, scenario) combination in backend-major order,
/// aborting on the first failure.
///
/// Benchmark execution errors (`BenchmarkFailed`, `MalformedOutput`,
/// spawn failures) propagate immediately: they are fatal to the run,
/// exactly like a regression.
pub fn run_all(
    backends: &[BackendDescriptor],
    scenarios: &[BenchmarkScenario],
    runner: &dyn ComparisonRunner,
) -> HarnessResult<RunOutcome> {
    if backends.is_empty() {
        tracing::info!("no backends available; nothing to run");
        println!("No backends available; nothing to run.");
        return Ok(RunOutcome::NoBackends);
    }

    let names: Vec<_> = backends.iter().map(|b| b.name).collect();
    println!("Available backends: {}", names.join(", "));

    let mut reports = Vec::with_capacity(backends.len() * scenarios.len());
    for backend in backends {
        for scenario in scenarios {
            let label = format!("{}-{}", scenario.label, backend.name);
            tracing::info!(backend = backend.name, scenario = %scenario.label, "running");
            println!("[backend {}] running {}...", backend.name, scenario.label);

            let report = runner.compare(&label, scenario, backend)?;
            let passed = report.passed;
            reports.push(report);

            if !passed {
                tracing::error!(
                    backend = backend.name,
                    scenario = %scenario.label,
                    "regression detected; aborting run"
                );
                return Ok(RunOutcome::Failed { reports });
            }
        }
    }

    Ok(RunOutcome::Done(reports))
}
