// SPDX-License-Identifier: Apache-2.0

//! Backend capability probing.
//!
//! A library build advertises the backends it was compiled with, but a
//! compiled-in backend is not necessarily usable on this host (the
//! kernel feature may be absent, and some builds abort or hang when
//! asked for it). Discovery therefore happens in two stages:
//!
//! 1. The `ev_supported_backends` query, made in-process. This is the
//!    only call the loaded library is trusted with; everything stateful
//!    happens elsewhere.
//! 2. Per claimed backend, an event-loop construction attempt run in an
//!    isolated child process with a hard timeout. Domain death or
//!    timeout is a normal negative result, never a harness failure.

use std::os::raw::{c_uint, c_void};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use crate::catalog::{BackendDescriptor, BACKENDS, EVFLAG_NOENV};
use crate::error::{HarnessError, HarnessResult};

/// Wall-clock bound on one isolated instantiation attempt.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Poll interval while waiting on a probe child.
const PROBE_POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Result of one isolated instantiation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// Loop construction succeeded and the active backend check-back
    /// confirmed the requested bit.
    Usable,
    /// The library declined the backend (null handle or silent fallback
    /// to a different backend).
    Rejected,
    /// The attempt exceeded the probe timeout and was killed.
    TimedOut,
    /// The probe child died abnormally; carries the exit code, or -1
    /// when terminated by a signal.
    Crashed(i32),
}

impl ProbeOutcome {
    pub fn is_usable(&self) -> bool {
        matches!(self, ProbeOutcome::Usable)
    }
}

/// Seam for running one isolated instantiation attempt.
///
/// The production implementation re-invokes the harness executable;
/// orchestration tests substitute a scripted prober.
pub trait BackendProber {
    fn probe(&self, lib: &Path, flag: u32) -> ProbeOutcome;
}

/// Probes by re-invoking a helper executable with the hidden
/// `probe-backend` subcommand, so a crash or hang in the probed library
/// can only take down the child.
pub struct HelperProber {
    program: PathBuf,
    timeout: Duration,
}

impl HelperProber {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            timeout: PROBE_TIMEOUT,
        }
    }

    /// Use the currently running executable as the probe helper.
    pub fn current_exe() -> HarnessResult<Self> {
        let program =
            std::env::current_exe().map_err(|e| HarnessError::ProbeHelper { source: e })?;
        Ok(Self::new(program))
    }

    /// Override the probe timeout (tests use a short one).
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl BackendProber for HelperProber {
    fn probe(&self, lib: &Path, flag: u32) -> ProbeOutcome {
        let child = Command::new(&self.program)
            .arg("probe-backend")
            .arg("--lib")
            .arg(lib)
            .arg("--flag")
            .arg(flag.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();

        let mut child = match child {
            Ok(child) => child,
            Err(e) => {
                tracing::warn!(
                    program = %self.program.display(),
                    error = %e,
                    "failed to spawn probe helper"
                );
                return ProbeOutcome::Crashed(-1);
            }
        };

        let deadline = Instant::now() + self.timeout;
        loop {
            match child.try_wait() {
                Ok(Some(status)) => {
                    return if status.success() {
                        ProbeOutcome::Usable
                    } else {
                        match status.code() {
                            Some(1) => ProbeOutcome::Rejected,
                            code => ProbeOutcome::Crashed(code.unwrap_or(-1)),
                        }
                    };
                }
                Ok(None) => {
                    if Instant::now() >= deadline {
                        let _ = child.kill();
                        let _ = child.wait();
                        return ProbeOutcome::TimedOut;
                    }
                    std::thread::sleep(PROBE_POLL_INTERVAL);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "wait on probe child failed");
                    let _ = child.kill();
                    let _ = child.wait();
                    return ProbeOutcome::Crashed(-1);
                }
            }
        }
    }
}

/// Query the bitmask of backends a library build was compiled with.
///
/// Load or symbol-resolution failure is fatal to the whole discovery
/// step: there is no meaningful partial result for a library that
/// cannot even be queried.
pub fn supported_backends(lib_path: &Path) -> HarnessResult<u32> {
    let load_err = |e: libloading::Error| HarnessError::LibraryLoad {
        path: lib_path.to_path_buf(),
        reason: e.to_string(),
    };

    unsafe {
        let lib = libloading::Library::new(lib_path).map_err(load_err)?;
        let supported: libloading::Symbol<unsafe extern "C" fn() -> c_uint> =
            lib.get(b"ev_supported_backends\0").map_err(load_err)?;
        Ok(supported())
    }
}

/// In-child body of one instantiation attempt.
///
/// Runs inside the isolated probe process, never in the orchestrating
/// harness. Success requires a non-null loop handle AND the reported
/// active backend still carrying the requested bit: construction must
/// not silently fall back to a different backend and report success.
/// `EVFLAG_NOENV` disables environment auto-configuration so host
/// variables cannot substitute another backend.
pub fn probe_in_process(lib_path: &Path, flag: u32) -> HarnessResult<bool> {
    let load_err = |e: libloading::Error| HarnessError::LibraryLoad {
        path: lib_path.to_path_buf(),
        reason: e.to_string(),
    };

    unsafe {
        let lib = libloading::Library::new(lib_path).map_err(load_err)?;
        let loop_new: libloading::Symbol<unsafe extern "C" fn(c_uint) -> *mut c_void> =
            lib.get(b"ev_loop_new\0").map_err(load_err)?;
        let loop_destroy: libloading::Symbol<unsafe extern "C" fn(*mut c_void)> =
            lib.get(b"ev_loop_destroy\0").map_err(load_err)?;
        let backend: libloading::Symbol<unsafe extern "C" fn(*mut c_void) -> c_uint> =
            lib.get(b"ev_backend\0").map_err(load_err)?;

        let handle = loop_new(flag | EVFLAG_NOENV);
        if handle.is_null() {
            return Ok(false);
        }

        let active = backend(handle);
        loop_destroy(handle);
        Ok(active & flag != 0)
    }
}

/// Filter catalog entries claimed by `mask` down to the ones a prober
/// confirms usable. Claimed-but-unusable backends are logged and
/// skipped; a single bad backend never aborts discovery.
pub fn filter_usable(
    lib_path: &Path,
    mask: u32,
    prober: &dyn BackendProber,
) -> Vec<BackendDescriptor> {
    let lib_name = lib_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| lib_path.display().to_string());

    let mut usable = Vec::new();
    for descriptor in BACKENDS {
        if mask & descriptor.flag == 0 {
            continue;
        }
        let outcome = prober.probe(lib_path, descriptor.flag);
        if outcome.is_usable() {
            usable.push(descriptor);
        } else {
            tracing::warn!(
                library = %lib_name,
                backend = descriptor.name,
                outcome = ?outcome,
                "skipping backend (probe failed)"
            );
            println!(
                "[{}] skipping backend {} (probe failed)",
                lib_name, descriptor.name
            );
        }
    }
    usable
}

/// Discover the ordered set of genuinely usable backends for one
/// library: query the claimed mask, then confirm each claimed backend
/// in isolation. A zero claimed mask yields an empty set, not an error.
pub fn discover(lib_path: &Path, prober: &dyn BackendProber) -> HarnessResult<Vec<BackendDescriptor>> {
    let mask = supported_backends(lib_path)?;
    tracing::debug!(
        library = %lib_path.display(),
        mask = format_args!("{mask:#04x}"),
        "claimed backend mask"
    );
    Ok(filter_usable(lib_path, mask, prober))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    struct ScriptedProber {
        unusable_flags: u32,
        probed: RefCell<Vec<u32>>,
    }

    impl ScriptedProber {
        fn failing(unusable_flags: u32) -> Self {
            Self {
                unusable_flags,
                probed: RefCell::new(Vec::new()),
            }
        }
    }

    impl BackendProber for ScriptedProber {
        fn probe(&self, _lib: &Path, flag: u32) -> ProbeOutcome {
            self.probed.borrow_mut().push(flag);
            if self.unusable_flags & flag != 0 {
                ProbeOutcome::Rejected
            } else {
                ProbeOutcome::Usable
            }
        }
    }

    fn write_script(dir: &TempDir, name: &str, body: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        let mut perms = fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&path, perms).unwrap();
        path
    }

    #[test]
    fn test_filter_skips_unclaimed_backends() {
        let prober = ScriptedProber::failing(0);
        let usable = filter_usable(Path::new("libev.so"), 0x05, &prober);

        let names: Vec<_> = usable.iter().map(|b| b.name).collect();
        assert_eq!(names, ["select", "epoll"]);
        // Only claimed bits were probed at all.
        assert_eq!(*prober.probed.borrow(), vec![0x01, 0x04]);
    }

    #[test]
    fn test_failed_probe_excludes_backend_but_continues() {
        // Claimed select|epoll, epoll probe fails: usable is exactly
        // {select} and discovery still probed everything claimed.
        let prober = ScriptedProber::failing(0x04);
        let usable = filter_usable(Path::new("libev.so"), 0x05, &prober);

        let names: Vec<_> = usable.iter().map(|b| b.name).collect();
        assert_eq!(names, ["select"]);
        assert_eq!(*prober.probed.borrow(), vec![0x01, 0x04]);
    }

    #[test]
    fn test_zero_mask_is_empty_not_error() {
        let prober = ScriptedProber::failing(0);
        let usable = filter_usable(Path::new("libev.so"), 0, &prober);
        assert!(usable.is_empty());
        assert!(prober.probed.borrow().is_empty());
    }

    #[test]
    fn test_usable_set_preserves_catalog_order() {
        let prober = ScriptedProber::failing(0);
        let usable = filter_usable(Path::new("libev.so"), 0xFF, &prober);
        let flags: Vec<_> = usable.iter().map(|b| b.flag).collect();
        assert_eq!(flags, vec![0x01, 0x02, 0x04, 0x08, 0x10, 0x20, 0x40, 0x80]);
    }

    #[test]
    fn test_helper_prober_success_exit() {
        let dir = TempDir::new().unwrap();
        let helper = write_script(&dir, "helper", "exit 0");
        let prober = HelperProber::new(helper);
        assert_eq!(
            prober.probe(Path::new("libev.so"), 0x04),
            ProbeOutcome::Usable
        );
    }

    #[test]
    fn test_helper_prober_rejection_exit() {
        let dir = TempDir::new().unwrap();
        let helper = write_script(&dir, "helper", "exit 1");
        let prober = HelperProber::new(helper);
        assert_eq!(
            prober.probe(Path::new("libev.so"), 0x04),
            ProbeOutcome::Rejected
        );
    }

    #[test]
    fn test_helper_prober_crash_exit() {
        let dir = TempDir::new().unwrap();
        let helper = write_script(&dir, "helper", "exit 42");
        let prober = HelperProber::new(helper);
        assert_eq!(
            prober.probe(Path::new("libev.so"), 0x04),
            ProbeOutcome::Crashed(42)
        );
    }

    #[test]
    fn test_helper_prober_timeout_kills_child() {
        let dir = TempDir::new().unwrap();
        let helper = write_script(&dir, "helper", "sleep 30");
        let prober = HelperProber::new(helper).with_timeout(Duration::from_millis(200));

        let start = Instant::now();
        let outcome = prober.probe(Path::new("libev.so"), 0x04);
        assert_eq!(outcome, ProbeOutcome::TimedOut);
        // The hung child was terminated well before its own sleep ended.
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_helper_prober_missing_program() {
        let prober = HelperProber::new("/nonexistent/evgate");
        assert_eq!(
            prober.probe(Path::new("libev.so"), 0x04),
            ProbeOutcome::Crashed(-1)
        );
    }

    #[test]
    fn test_supported_backends_load_failure_is_fatal() {
        let err = supported_backends(Path::new("/nonexistent/libev.so")).unwrap_err();
        assert!(matches!(err, HarnessError::LibraryLoad { .. }));
    }

    #[test]
    fn test_probe_in_process_load_failure_is_fatal() {
        let err = probe_in_process(Path::new("/nonexistent/libev.so"), 0x04).unwrap_err();
        assert!(matches!(err, HarnessError::LibraryLoad { .. }));
    }
}
