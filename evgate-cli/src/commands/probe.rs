// SPDX-License-Identifier: Apache-2.0

//! `evgate probe-backend` - in-child instantiation check.
//!
//! This process is the fault domain for one probe attempt: the parent
//! spawned it precisely so that an abort, crash, or hang inside the
//! probed library cannot take the harness down. Anything but a clean
//! usable result maps to a non-zero exit.

use std::path::Path;

use evgate_core::probe_in_process;

pub fn execute(lib: &Path, flag: u32) -> i32 {
    match probe_in_process(lib, flag) {
        Ok(true) => 0,
        Ok(false) => 1,
        Err(e) => {
            tracing::debug!(lib = %lib.display(), flag, error = %e, "probe failed");
            1
        }
    }
}
