// SPDX-License-Identifier: Apache-2.0

//! Benchmark child-process execution.
//!
//! Runs a benchmark executable with no arguments, an inherited
//! environment plus a per-invocation override overlay, and captured
//! output. Non-zero exit is a hard failure; partial output is never
//! interpreted.

use std::path::Path;
use std::process::Command;

use crate::error::{HarnessError, HarnessResult};
use crate::parser::{BenchmarkRecord, PER_SECOND_KEY};

/// Iteration-count variable consumed by the benchmark executables.
pub const ITER_ENV: &str = "LIBEV_BENCH_ITERATIONS";

/// Backend-selection variable consumed by the probed library.
pub const BACKEND_ENV: &str = "LIBEV_FLAGS";

/// Default iteration count applied when the caller has not set one.
pub const DEFAULT_ITERATIONS: &str = "200000";

/// Environment overrides layered on top of the inherited environment.
///
/// The overlay is a private per-invocation copy: applying it configures
/// a single child process and never mutates the parent environment, so
/// one invocation's backend selection cannot leak into a sibling.
#[derive(Debug, Clone, Default)]
pub struct EnvOverlay {
    vars: Vec<(String, String)>,
}

impl EnvOverlay {
    /// Create an empty overlay (children see the inherited environment
    /// unchanged).
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the standard benchmark overlay: the iteration count is
    /// defaulted only when absent from the parent environment, so a
    /// caller-provided count flows through untouched.
    pub fn for_benchmark() -> Self {
        Self::new().set_default(ITER_ENV, DEFAULT_ITERATIONS)
    }

    /// Set an override unconditionally.
    pub fn set(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        self.vars.retain(|(k, _)| *k != key);
        self.vars.push((key, value.into()));
        self
    }

    /// Set an override only if the variable is unset in both the parent
    /// environment and this overlay.
    pub fn set_default(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        if std::env::var_os(&key).is_some() || self.get(&key).is_some() {
            return self;
        }
        self.set(key, value)
    }

    /// Look up an override (not the inherited environment).
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn apply(&self, command: &mut Command) {
        for (key, value) in &self.vars {
            command.env(key, value);
        }
    }
}

/// Execute one benchmark and parse its result line.
///
/// The executable is run with no arguments. On non-zero exit, fails
/// with `BenchmarkFailed` carrying the exit code and trimmed stderr.
/// On success, the first stdout line containing `per_second=` is handed
/// to the parser.
pub fn run_benchmark(path: &Path, overlay: &EnvOverlay) -> HarnessResult<BenchmarkRecord> {
    let mut command = Command::new(path);
    overlay.apply(&mut command);

    tracing::debug!(path = %path.display(), "running benchmark");

    let output = command.output().map_err(|e| HarnessError::BenchmarkSpawn {
        path: path.to_path_buf(),
        source: e,
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        return Err(HarnessError::BenchmarkFailed {
            path: path.to_path_buf(),
            code: output.status.code().unwrap_or(-1),
            stderr,
        });
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let line = stdout
        .lines()
        .find(|l| l.contains(PER_SECOND_KEY))
        .unwrap_or_else(|| stdout.trim());

    BenchmarkRecord::parse(line)
}
