// Copyright (c) Contributors to the runez project.
// SPDX-License-Identifier: Apache-2.0

//! Small queries about the running system.

#[cfg(test)]
#[path = "./system_test.rs"]
mod system_test;

/// True if a process with id `pid` exists and we're allowed to signal it.
#[cfg(unix)]
pub fn check_pid(pid: i32) -> bool {
    use nix::sys::signal::kill;
    use nix::unistd::Pid;

    pid > 0 && kill(Pid::from_raw(pid), None).is_ok()
}

// TODO: query the process with OpenProcess once windows support is needed
#[cfg(not(unix))]
pub fn check_pid(_pid: i32) -> bool {
    false
}

/// Width of the terminal we're attached to.
///
/// Falls back to `$COLUMNS`, then to `default`.
pub fn terminal_width(default: Option<u16>) -> Option<u16> {
    let term = console::Term::stdout();
    if term.is_term() {
        let (_rows, columns) = term.size();
        if columns > 0 {
            return Some(columns);
        }
    }

    std::env::var("COLUMNS")
        .ok()
        .and_then(|value| value.trim().parse().ok())
        .filter(|columns| *columns > 0)
        .or(default)
}
