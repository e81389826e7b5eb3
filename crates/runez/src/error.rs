// Copyright (c) Contributors to the runez project.
// SPDX-License-Identifier: Apache-2.0

//! Error types and the shared "abort" failure policy.

use miette::Diagnostic;
use thiserror::Error;

#[cfg(test)]
#[path = "./error_test.rs"]
mod error_test;

/// Convenience Result type with runez Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during runez operations.
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Program could not be found on PATH
    #[error("{program} is not installed{}", install_note(.instructions))]
    #[diagnostic(
        code(runez::not_installed),
        help("Check that the program is installed and available on PATH")
    )]
    NotInstalled {
        program: String,
        instructions: Option<String>,
    },

    /// Program ran but reported failure
    #[error("{program} exited with code {code}{}", failure_note(.note))]
    #[diagnostic(code(runez::non_zero_exit))]
    NonZeroExit {
        program: String,
        code: i32,
        note: Option<String>,
    },

    /// Program could not be spawned, or its output could not be collected
    #[error("{program} failed: {error}")]
    #[diagnostic(code(runez::run_failed))]
    RunFailed {
        program: String,
        #[source]
        error: std::io::Error,
    },

    /// Path expected to exist is missing
    #[error("{path} does not exist, can't {action}")]
    #[diagnostic(code(runez::missing_path))]
    MissingPath { path: String, action: &'static str },

    /// Permissions of a file could not be changed
    #[error("Can't chmod {path}: {error}")]
    #[diagnostic(code(runez::chmod_failed))]
    ChmodFailed {
        path: String,
        #[source]
        error: std::io::Error,
    },

    /// IO error passthrough
    #[error(transparent)]
    #[diagnostic(code(runez::io_error))]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Exit code to use when this error terminates the process.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NonZeroExit { code, .. } if *code != 0 => *code,
            _ => 1,
        }
    }
}

fn install_note(instructions: &Option<String>) -> String {
    match instructions.as_deref() {
        None | Some("") => String::new(),
        Some(text) if text.contains('\n') => format!(":\n- {text}"),
        Some(text) => format!(", {text}"),
    }
}

fn failure_note(note: &Option<String>) -> String {
    match note.as_deref() {
        None | Some("") => String::new(),
        Some(text) => format!(": {text}"),
    }
}

/// How a failing operation should behave.
///
/// Every failure path in this crate funnels through [`abort`], which applies
/// the policy chosen by the caller for that call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Fatal {
    /// Report the error and terminate the current process.
    #[default]
    Exit,
    /// Report the error and return it as `Err`.
    Raise,
    /// Report the error as a warning and return a sentinel value.
    Warn,
    /// Return a sentinel value without reporting anything.
    Silent,
}

impl Fatal {
    /// True when failures are turned into sentinel values instead of errors.
    pub fn is_tolerant(self) -> bool {
        matches!(self, Self::Warn | Self::Silent)
    }
}

/// Apply the `fatal` policy to `error`.
///
/// Returns `fallback` for tolerant policies, `Err(error)` for
/// [`Fatal::Raise`], and never returns for [`Fatal::Exit`].
pub fn abort<T>(fatal: Fatal, error: Error, fallback: T) -> Result<T> {
    abort_with(fatal, error, fallback, true)
}

/// Same as [`abort`], with reporting optionally turned off (used when the
/// user already saw the failure, for example via pass-through output).
pub(crate) fn abort_with<T>(fatal: Fatal, error: Error, fallback: T, report: bool) -> Result<T> {
    match fatal {
        Fatal::Silent => Ok(fallback),
        Fatal::Warn => {
            if report {
                tracing::warn!("{error}");
            }
            Ok(fallback)
        }
        Fatal::Raise => {
            if report {
                tracing::error!("{error}");
            }
            Err(error)
        }
        Fatal::Exit => {
            if report {
                report_fatal(&error);
            }
            std::process::exit(error.exit_code());
        }
    }
}

fn report_fatal(error: &Error) {
    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!("{error}");
    } else {
        // Nobody is listening to tracing events, make sure the user sees why we stopped
        eprintln!("ERROR: {error}");
    }
}
