// Copyright (c) Contributors to the runez project.
// SPDX-License-Identifier: Apache-2.0

use rstest::rstest;

use super::*;

fn failure() -> Error {
    Error::NonZeroExit {
        program: "foo".to_string(),
        code: 3,
        note: Some("oops".to_string()),
    }
}

#[rstest]
#[case(Fatal::Warn)]
#[case(Fatal::Silent)]
fn test_tolerant_policies_return_fallback(#[case] fatal: Fatal) {
    assert!(fatal.is_tolerant());
    let value = abort(fatal, failure(), "some-return").expect("Should not raise");
    assert_eq!(value, "some-return");
}

#[rstest]
fn test_raise_returns_error() {
    assert!(!Fatal::Raise.is_tolerant());
    match abort(Fatal::Raise, failure(), 0) {
        Err(Error::NonZeroExit { code, .. }) => assert_eq!(code, 3),
        other => panic!("Expected NonZeroExit, got: {:?}", other),
    }
}

#[rstest]
fn test_default_policy_exits() {
    assert_eq!(Fatal::default(), Fatal::Exit);
}

/// Set in the child process spawned by `test_exit_terminates_process`.
const EXIT_IN_CHILD: &str = "RUNEZ_TEST_EXIT_IN_CHILD";

#[rstest]
fn test_exit_terminates_process() {
    if std::env::var_os(EXIT_IN_CHILD).is_some() {
        let _ = abort(Fatal::Exit, failure(), ());
        panic!("abort() with Fatal::Exit should not return");
    }

    // Run this same test again in a child process, where abort() exits
    let exe = std::env::current_exe().unwrap();
    let output = std::process::Command::new(exe)
        .args(["--exact", "error::error_test::test_exit_terminates_process", "--nocapture"])
        .env(EXIT_IN_CHILD, "1")
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(3));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: foo exited with code 3: oops"), "unexpected stderr: {stderr}");
}

#[rstest]
fn test_exit_codes() {
    assert_eq!(failure().exit_code(), 3);

    let missing = Error::NotInstalled {
        program: "foo".to_string(),
        instructions: None,
    };
    assert_eq!(missing.exit_code(), 1);
}

#[rstest]
#[case(None, "foo is not installed")]
#[case(Some("run: `brew install foo`"), "foo is not installed, run: `brew install foo`")]
#[case(Some("on darwin: a\n- on linux: b"), "foo is not installed:\n- on darwin: a\n- on linux: b")]
fn test_not_installed_message(#[case] instructions: Option<&str>, #[case] expected: &str) {
    let error = Error::NotInstalled {
        program: "foo".to_string(),
        instructions: instructions.map(String::from),
    };
    assert_eq!(error.to_string(), expected);
}

#[rstest]
fn test_non_zero_exit_message() {
    assert_eq!(failure().to_string(), "foo exited with code 3: oops");

    let bare = Error::NonZeroExit {
        program: "foo".to_string(),
        code: 1,
        note: None,
    };
    assert_eq!(bare.to_string(), "foo exited with code 1");
}
