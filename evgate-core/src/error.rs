//! Error types for the regression harness.
//!
//! Explicit enum error types throughout; no `Box<dyn Error>` and no
//! `anyhow` in library code. Per-backend probe problems are deliberately
//! NOT errors: they are modeled as `ProbeOutcome` values because a
//! claimed-but-unusable backend is an expected negative result, not a
//! failure of the harness.

use std::path::PathBuf;

use thiserror::Error;

/// Fatal harness errors. Any of these aborts the current run.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// Benchmark stdout did not contain the required `per_second` field.
    #[error("missing per_second in benchmark output: {line:?}")]
    MalformedOutput { line: String },

    /// Benchmark stdout contained a `per_second` value that is not a
    /// non-negative number.
    #[error("invalid per_second value {value:?} in benchmark output")]
    InvalidRate { value: String },

    /// A benchmark child exited non-zero. Partial output is never trusted.
    #[error("{path} exited with {code}: {stderr}")]
    BenchmarkFailed {
        path: PathBuf,
        /// Exit code, or -1 when the child was terminated by a signal.
        code: i32,
        stderr: String,
    },

    /// A benchmark child could not be spawned or waited on.
    #[error("failed to execute benchmark {path}: {source}")]
    BenchmarkSpawn {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The shared library under test could not be loaded or its
    /// capability query could not be resolved. Fatal to the whole
    /// discovery step; there is no partial result.
    #[error("failed to load library {path}: {reason}")]
    LibraryLoad { path: PathBuf, reason: String },

    /// Tolerance outside the legal range (must be a finite value >= 0).
    #[error("invalid tolerance {value}: {reason}")]
    InvalidTolerance { value: f64, reason: &'static str },

    /// The probe helper executable could not be located.
    #[error("cannot determine probe helper executable: {source}")]
    ProbeHelper {
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias using HarnessError.
pub type HarnessResult<T> = Result<T, HarnessError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_benchmark_failed_display() {
        let err = HarnessError::BenchmarkFailed {
            path: PathBuf::from("/tmp/bench_timer"),
            code: 3,
            stderr: "cannot allocate watcher pool".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("/tmp/bench_timer"));
        assert!(msg.contains("exited with 3"));
        assert!(msg.contains("cannot allocate watcher pool"));
    }

    #[test]
    fn test_malformed_output_display() {
        let err = HarnessError::MalformedOutput {
            line: "warming up".to_string(),
        };
        assert!(err.to_string().contains("per_second"));
        assert!(err.to_string().contains("warming up"));
    }
}
