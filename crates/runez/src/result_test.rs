// Copyright (c) Contributors to the runez project.
// SPDX-License-Identifier: Apache-2.0

use rstest::rstest;

use super::*;

fn result(output: Option<&str>, error: Option<&str>, code: Option<i32>) -> RunResult {
    RunResult::new(output.map(String::from), error.map(String::from), code)
}

#[rstest]
fn test_exit_code_only() {
    let r = RunResult::from_exit_code(0);
    assert!(r.succeeded());
    assert_eq!(r.to_string(), "RunResult(exit_code=0)");
    assert_eq!(r.output(), None);
    assert_eq!(r.error(), None);
    assert_eq!(r.full_output(), None);
}

#[rstest]
#[case(Some("hello"), Some(""), "hello")]
#[case(Some(""), Some("complaining"), "complaining")]
#[case(Some("hello there"), Some("failed"), "failed\nhello there")]
#[case(Some(""), Some(""), "")]
#[case(None, Some("oops"), "oops")]
fn test_full_output(#[case] output: Option<&str>, #[case] error: Option<&str>, #[case] expected: &str) {
    let r = result(output, error, Some(1));
    assert_eq!(r.full_output().as_deref(), Some(expected));
}

#[rstest]
fn test_predicates() {
    assert!(result(Some("x"), None, Some(0)).succeeded());
    assert!(result(Some("x"), None, Some(2)).failed());

    // Not waited for: neither exit code nor success is known
    let r = RunResult::default().with_pid(42);
    assert_eq!(r.exit_code(), None);
    assert_eq!(r.pid(), Some(42));
    assert!(r.failed());
    assert_eq!(r.to_string(), "RunResult(exit_code=None)");
}

#[rstest]
fn test_equality_ignores_pid() {
    let a = result(Some("hello"), Some(""), Some(0));
    let b = result(Some("hello"), Some(""), Some(0)).with_pid(123);
    assert_eq!(a, b);
    assert_ne!(a, result(Some("hello"), None, Some(0)));
    assert_ne!(a, result(Some("hello"), Some(""), Some(1)));
}

#[rstest]
fn test_serialize() {
    let r = result(Some("hello"), Some(""), Some(0));
    let value = serde_json::to_value(&r).unwrap();
    assert_eq!(
        value,
        serde_json::json!({"output": "hello", "error": "", "exit_code": 0})
    );
}
