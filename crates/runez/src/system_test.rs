// Copyright (c) Contributors to the runez project.
// SPDX-License-Identifier: Apache-2.0

use rstest::rstest;

use super::*;

#[rstest]
#[case(0)]
#[case(-1)]
fn test_check_pid_invalid(#[case] pid: i32) {
    assert!(!check_pid(pid));
}

#[cfg(unix)]
#[rstest]
fn test_check_pid_self() {
    assert!(check_pid(std::process::id() as i32));
}

#[rstest]
fn test_terminal_width_default() {
    let width = terminal_width(Some(42));
    assert!(width.is_some());
    assert!(width.unwrap() > 0);
}
