// SPDX-License-Identifier: Apache-2.0

//! evgate CLI
//!
//! Command-line interface for the backend performance regression
//! harness. Exit codes: 0 = all combinations passed (or none were
//! applicable), 1 = regression or hard failure, 2 = usage error.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

pub const EXIT_USAGE: i32 = 2;

/// evgate - Backend-aware performance regression harness
#[derive(Parser)]
#[command(name = "evgate")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run every benchmark scenario once per usable backend
    Run {
        /// Path to the local shared library under test
        #[arg(long)]
        lib: PathBuf,

        /// Optional path to the baseline shared library; backends the
        /// baseline cannot run are skipped
        #[arg(long)]
        baseline_lib: Option<PathBuf>,

        /// Benchmark tuple (label, local binary, baseline binary);
        /// repeatable, at least one required
        #[arg(
            long = "bench",
            num_args = 3,
            value_names = ["LABEL", "LOCAL_BIN", "BASELINE_BIN"],
            required = true
        )]
        bench: Vec<String>,

        /// Minimum acceptable local/baseline throughput ratio
        #[arg(long, default_value_t = evgate_core::DEFAULT_TOLERANCE)]
        tolerance: f64,

        /// Directory to write a timestamped JSON run report into
        #[arg(long)]
        report_dir: Option<PathBuf>,
    },

    /// Attempt to instantiate an event loop for one backend. Internal
    /// isolation helper spawned by `run`; exits 0 when usable.
    #[command(hide = true)]
    ProbeBackend {
        /// Path to the shared library to probe
        #[arg(long)]
        lib: PathBuf,

        /// Single-bit backend flag to request
        #[arg(long)]
        flag: u32,
    },
}

fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_writer(std::io::stderr)
        .init();

    let code = match cli.command {
        Commands::Run {
            lib,
            baseline_lib,
            bench,
            tolerance,
            report_dir,
        } => commands::run::execute(
            &lib,
            baseline_lib.as_deref(),
            &bench,
            tolerance,
            report_dir.as_deref(),
        ),
        Commands::ProbeBackend { lib, flag } => commands::probe::execute(&lib, flag),
    };

    std::process::exit(code);
}
