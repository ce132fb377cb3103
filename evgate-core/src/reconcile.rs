// SPDX-License-Identifier: Apache-2.0

//! Baseline reconciliation.
//!
//! A backend the baseline build cannot run must not be benchmarked:
//! the comparison would be meaningless. Reconciliation intersects the
//! local usable set with the baseline usable set by flag identity and
//! reports what was dropped.

use crate::catalog::BackendDescriptor;

/// Result of intersecting local and baseline usable sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciled {
    /// Backends usable by both builds, in local (catalog) order.
    pub usable: Vec<BackendDescriptor>,
    /// Names of local backends skipped because the baseline lacks them.
    pub skipped: Vec<&'static str>,
}

/// Intersect local usable set `L` with baseline usable set `B`.
///
/// Returns `L ∩ B` plus the names in `L \ B`.
pub fn reconcile(local: &[BackendDescriptor], baseline: &[BackendDescriptor]) -> Reconciled {
    let baseline_mask: u32 = baseline.iter().fold(0, |mask, b| mask | b.flag);

    let usable: Vec<_> = local
        .iter()
        .filter(|b| baseline_mask & b.flag != 0)
        .copied()
        .collect();
    let skipped: Vec<_> = local
        .iter()
        .filter(|b| baseline_mask & b.flag == 0)
        .map(|b| b.name)
        .collect();

    if !skipped.is_empty() {
        tracing::warn!(backends = ?skipped, "skipping backends unavailable in baseline");
        println!(
            "Skipping backends unavailable in baseline: {}",
            skipped.join(", ")
        );
    }

    Reconciled { usable, skipped }
}
