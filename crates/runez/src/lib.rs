// Copyright (c) Contributors to the runez project.
// SPDX-License-Identifier: Apache-2.0

//! runez - Convenience helpers for running programs
//!
//! This crate wraps the usual chores around spawning other programs: finding
//! them on PATH, flattening loosely typed argument lists, logging what gets
//! run, simulating runs in dry-run mode, and applying a uniform policy when
//! something fails.
//!
//! # Overview
//!
//! - [`run`] spawns a program and returns a [`RunResult`] with its captured
//!   output and exit code.
//! - [`Fatal`] decides what a failure does: exit the process, return an
//!   error, or log it and carry on with a fallback value.
//! - [`DryRun`] and [`Anchored`] are scoped guards, controlling dry-run mode
//!   and how paths are shortened in messages.
//! - [`PsInfo`] inspects a process and its ancestors via `ps`.
//!
//! # Example
//!
//! ```no_run
//! use runez::{args, run, Fatal, RunOptions};
//!
//! let options = RunOptions::with_fatal(Fatal::Raise);
//! let verbose = true;
//! let result = run("git", args!["log", "-n", 1, verbose.then_some("--stat")], &options)?;
//! println!("{}", result.output().unwrap_or_default());
//! # Ok::<(), runez::Error>(())
//! ```

pub mod context;
pub mod error;
pub mod flatten;
pub mod path;
pub mod ps;
pub mod result;
pub mod run;
pub mod system;
pub mod which;

pub use context::{is_dryrun, DryRun};
pub use error::{abort, Error, Fatal, Result};
pub use flatten::{flattened, flattened_split, quoted, represented_args, Arg};
pub use path::{anchors, dev_folder, find_parent_folder, resolved_path, short, Anchored};
pub use ps::{ProcessTable, PsInfo, SystemProcessTable};
pub use result::RunResult;
pub use run::{added_env_paths, run, RunOptions, Stream};
pub use system::{check_pid, terminal_width};
pub use which::{
    is_executable, make_executable, program_path, require_installed, which,
    which_outside_own_venv, Instructions, Outcome,
};
