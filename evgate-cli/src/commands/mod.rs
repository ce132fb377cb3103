// SPDX-License-Identifier: Apache-2.0

//! Command handlers for the evgate CLI.

pub mod probe;
pub mod run;
