// Copyright (c) Contributors to the runez project.
// SPDX-License-Identifier: Apache-2.0

//! Scoped dry-run state.
//!
//! Dry-run is tracked per thread. [`DryRun::scoped`] sets it for as long as
//! the returned guard lives, and restores the prior value when dropped:
//!
//! ```
//! use runez::DryRun;
//!
//! assert!(!runez::is_dryrun());
//! {
//!     let _dryrun = DryRun::scoped(true);
//!     assert!(runez::is_dryrun());
//! }
//! assert!(!runez::is_dryrun());
//! ```

use std::cell::Cell;

#[cfg(test)]
#[path = "./context_test.rs"]
mod context_test;

thread_local! {
    static DRYRUN: Cell<bool> = const { Cell::new(false) };
}

/// True if dry-run mode is currently active on this thread.
pub fn is_dryrun() -> bool {
    DRYRUN.with(Cell::get)
}

/// Explicit per-call override wins over the scoped state.
pub(crate) fn resolve_dryrun(explicit: Option<bool>) -> bool {
    explicit.unwrap_or_else(is_dryrun)
}

/// Guard restoring the previous dry-run state when dropped.
#[derive(Debug)]
#[must_use = "dry-run is restored as soon as the guard is dropped"]
pub struct DryRun {
    previous: bool,
}

impl DryRun {
    /// Turn dry-run on or off until the returned guard is dropped.
    pub fn scoped(enabled: bool) -> Self {
        let previous = DRYRUN.with(|state| state.replace(enabled));
        Self { previous }
    }
}

impl Drop for DryRun {
    fn drop(&mut self) {
        DRYRUN.with(|state| state.set(self.previous));
    }
}
