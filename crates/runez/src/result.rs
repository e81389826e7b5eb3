// Copyright (c) Contributors to the runez project.
// SPDX-License-Identifier: Apache-2.0

//! Outcome of running a program.

use std::fmt;

use serde::Serialize;

#[cfg(test)]
#[path = "./result_test.rs"]
mod result_test;

/// Captured outcome of a program run.
///
/// `output` and `error` are `None` when the corresponding stream was not
/// captured. `exit_code` is `None` when the run did not wait for the
/// program to finish.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunResult {
    output: Option<String>,
    error: Option<String>,
    exit_code: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pid: Option<u32>,
}

impl RunResult {
    pub fn new(output: Option<String>, error: Option<String>, exit_code: Option<i32>) -> Self {
        Self {
            output,
            error,
            exit_code,
            pid: None,
        }
    }

    /// Result carrying only an exit code, streams were not captured.
    pub fn from_exit_code(exit_code: i32) -> Self {
        Self::new(None, None, Some(exit_code))
    }

    pub(crate) fn with_pid(mut self, pid: u32) -> Self {
        self.pid = Some(pid);
        self
    }

    pub fn output(&self) -> Option<&str> {
        self.output.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn exit_code(&self) -> Option<i32> {
        self.exit_code
    }

    /// Pid of the spawned process, if one was spawned.
    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    /// True if the program ran and exited with code 0.
    pub fn succeeded(&self) -> bool {
        self.exit_code == Some(0)
    }

    pub fn failed(&self) -> bool {
        !self.succeeded()
    }

    /// Captured stderr followed by stdout, skipping empty parts.
    pub fn full_output(&self) -> Option<String> {
        if self.output.is_none() && self.error.is_none() {
            return None;
        }

        let parts: Vec<&str> = [self.error.as_deref(), self.output.as_deref()]
            .into_iter()
            .flatten()
            .filter(|part| !part.is_empty())
            .collect();
        Some(parts.join("\n"))
    }
}

impl PartialEq for RunResult {
    fn eq(&self, other: &Self) -> bool {
        self.output == other.output
            && self.error == other.error
            && self.exit_code == other.exit_code
    }
}

impl Eq for RunResult {}

impl fmt::Display for RunResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.exit_code {
            Some(code) => write!(f, "RunResult(exit_code={code})"),
            None => write!(f, "RunResult(exit_code=None)"),
        }
    }
}
