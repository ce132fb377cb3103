//! evgate core library
//!
//! Regression-detection harness for event-notification libraries with
//! interchangeable I/O-multiplexing backends. Discovers which backends
//! a build can actually instantiate on this host (probing in isolated,
//! time-bounded child processes), runs a standardized benchmark per
//! usable backend comparing a local build against a baseline build,
//! and gates each comparison against a tolerance ratio.

pub mod catalog;
pub mod error;
pub mod gate;
pub mod orchestrator;
pub mod parser;
pub mod probe;
pub mod reconcile;
pub mod report;
pub mod runner;
pub mod types;

// Re-export commonly used types
pub use catalog::{backend_name, BackendDescriptor, BACKENDS, EVFLAG_NOENV};
pub use error::{HarnessError, HarnessResult};
pub use gate::{compare, GateReport};
pub use orchestrator::{run_all, ComparisonRunner, PerfCompare, RunOutcome};
pub use parser::BenchmarkRecord;
pub use probe::{discover, probe_in_process, BackendProber, HelperProber, ProbeOutcome};
pub use reconcile::{reconcile, Reconciled};
pub use report::{ReportError, RunReport, RunReporter};
pub use runner::{run_benchmark, EnvOverlay};
pub use types::{BenchmarkScenario, Tolerance, DEFAULT_TOLERANCE};
