// SPDX-License-Identifier: Apache-2.0

//! `evgate run` - discover usable backends and gate every benchmark
//! scenario against the baseline build.

use std::path::Path;

use evgate_core::{
    discover, reconcile, run_all, BenchmarkScenario, HelperProber, PerfCompare, ReportError,
    RunOutcome, RunReport, RunReporter, Tolerance,
};

use crate::EXIT_USAGE;

pub fn execute(
    lib: &Path,
    baseline_lib: Option<&Path>,
    bench: &[String],
    tolerance: f64,
    report_dir: Option<&Path>,
) -> i32 {
    // clap enforces groups of three values per --bench occurrence.
    let scenarios: Vec<BenchmarkScenario> = bench
        .chunks(3)
        .map(|chunk| BenchmarkScenario::new(&chunk[0], &chunk[1], &chunk[2]))
        .collect();
    if scenarios.is_empty() {
        eprintln!("at least one --bench entry is required");
        return EXIT_USAGE;
    }

    let tolerance = match Tolerance::new(tolerance) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("{e}");
            return EXIT_USAGE;
        }
    };

    let prober = match HelperProber::current_exe() {
        Ok(p) => p,
        Err(e) => {
            eprintln!("{e}");
            return 1;
        }
    };

    tracing::info!(lib = %lib.display(), "discovering usable backends");
    let local_backends = match discover(lib, &prober) {
        Ok(backends) => backends,
        Err(e) => {
            eprintln!("{e}");
            return 1;
        }
    };

    let usable = match baseline_lib {
        Some(baseline_path) => {
            tracing::info!(lib = %baseline_path.display(), "discovering baseline backends");
            let baseline_backends = match discover(baseline_path, &prober) {
                Ok(backends) => backends,
                Err(e) => {
                    eprintln!("{e}");
                    return 1;
                }
            };
            reconcile(&local_backends, &baseline_backends).usable
        }
        None => local_backends,
    };

    let runner = PerfCompare::new(tolerance);
    let outcome = match run_all(&usable, &scenarios, &runner) {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("{e}");
            return 1;
        }
    };

    if let Some(dir) = report_dir {
        if let Err(e) = save_report(dir, tolerance, &outcome) {
            // The verdict stands even when the report cannot be written.
            eprintln!("failed to write run report: {e}");
        }
    }

    outcome.exit_code()
}

fn save_report(dir: &Path, tolerance: Tolerance, outcome: &RunOutcome) -> Result<(), ReportError> {
    let report = RunReport::new(
        tolerance.value(),
        outcome.exit_code() == 0,
        outcome.reports().to_vec(),
    );
    let path = RunReporter::new(dir)?.save(&report)?;
    println!("Run report saved to: {}", path.display());
    Ok(())
}
