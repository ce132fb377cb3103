// SPDX-License-Identifier: Apache-2.0

//! Static catalog of known event-loop backends.
//!
//! The numeric flags mirror the probed library's public configuration
//! contract. They are wire-level constants, not an internal choice:
//! never reorder or renumber entries. Catalog order only affects the
//! order backends are reported and exercised in.

use std::fmt;

/// Construction flag telling the library to ignore environment-variable
/// auto-configuration. OR-ed into every probe attempt so the host
/// environment cannot silently substitute a different backend.
pub const EVFLAG_NOENV: u32 = 0x0100_0000;

/// One known I/O-multiplexing backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BackendDescriptor {
    /// Short backend name used in labels and diagnostics.
    pub name: &'static str,
    /// Single-bit flag identifying the backend to the library.
    pub flag: u32,
}

impl fmt::Display for BackendDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// All backend kinds the probed library can be compiled with.
pub const BACKENDS: [BackendDescriptor; 8] = [
    BackendDescriptor { name: "select", flag: 0x01 },
    BackendDescriptor { name: "poll", flag: 0x02 },
    BackendDescriptor { name: "epoll", flag: 0x04 },
    BackendDescriptor { name: "kqueue", flag: 0x08 },
    BackendDescriptor { name: "devpoll", flag: 0x10 },
    BackendDescriptor { name: "port", flag: 0x20 },
    BackendDescriptor { name: "linuxaio", flag: 0x40 },
    BackendDescriptor { name: "iouring", flag: 0x80 },
];

/// Look up a backend name by its flag bit.
pub fn backend_name(flag: u32) -> Option<&'static str> {
    BACKENDS.iter().find(|b| b.flag == flag).map(|b| b.name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_are_distinct_single_bits() {
        let mut seen = 0u32;
        for backend in &BACKENDS {
            assert_eq!(
                backend.flag.count_ones(),
                1,
                "{} flag must be a single bit",
                backend.name
            );
            assert_eq!(seen & backend.flag, 0, "{} flag overlaps", backend.name);
            seen |= backend.flag;
        }
        assert_eq!(seen, 0xFF);
    }

    #[test]
    fn test_contract_values_are_stable() {
        // These values come from the probed library's public header and
        // must never drift.
        assert_eq!(backend_name(0x01), Some("select"));
        assert_eq!(backend_name(0x02), Some("poll"));
        assert_eq!(backend_name(0x04), Some("epoll"));
        assert_eq!(backend_name(0x08), Some("kqueue"));
        assert_eq!(backend_name(0x10), Some("devpoll"));
        assert_eq!(backend_name(0x20), Some("port"));
        assert_eq!(backend_name(0x40), Some("linuxaio"));
        assert_eq!(backend_name(0x80), Some("iouring"));
        assert_eq!(EVFLAG_NOENV, 0x0100_0000);
    }

    #[test]
    fn test_unknown_flag_has_no_name() {
        assert_eq!(backend_name(0x100), None);
        assert_eq!(backend_name(0), None);
    }
}
