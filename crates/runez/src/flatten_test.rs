// Copyright (c) Contributors to the runez project.
// SPDX-License-Identifier: Apache-2.0

use rstest::rstest;

use super::*;
use crate::args;

#[rstest]
fn test_flag_followed_by_none_is_dropped() {
    let value = args!["hello", "-a", 0, "-b", Arg::None, 1, 2, Arg::None, "foo bar"];
    assert_eq!(
        flattened(value, false),
        vec!["hello", "-a", "0", "1", "2", "foo bar"]
    );
}

#[rstest]
fn test_unique_mode_keeps_flag_and_dedups() {
    let value = args!["a", "-b", Arg::None, "a", ["c", "-b"]];
    assert_eq!(flattened(value, true), vec!["a", "-b", "c"]);
}

#[rstest]
fn test_nested_and_optional() {
    let missing: Option<&str> = None;
    let value = args![
        vec!["a", "b"],
        ["c"],
        Some("d"),
        missing,
        args![args!["e"], Arg::List(Vec::new())],
    ];
    assert_eq!(flattened(value, false), vec!["a", "b", "c", "d", "e"]);
}

#[rstest]
#[case(vec!["a", "b", "c"])]
#[case(vec!["--flag", "value", "-x"])]
#[case(vec![])]
fn test_flat_input_is_unchanged(#[case] input: Vec<&str>) {
    let expected: Vec<String> = input.iter().map(|s| s.to_string()).collect();
    assert_eq!(flattened(input, false), expected);
}

#[rstest]
fn test_paths_and_numbers() {
    let path = std::path::PathBuf::from("/tmp/foo");
    let value = args![&path, 1.5, -3, 'x'];
    assert_eq!(flattened(value, false), vec!["/tmp/foo", "1.5", "-3", "x"]);
}

#[rstest]
fn test_split() {
    let value = args!["a:b", "c", "b::d"];
    assert_eq!(flattened_split(value.clone(), ":", true), vec!["a", "b", "c", "d"]);
    assert_eq!(flattened_split(value, ":", false), vec!["a", "b", "c", "b", "d"]);
}

#[rstest]
#[case("", "")]
#[case("foo", "foo")]
#[case("foo bar", "\"foo bar\"")]
#[case("say \"hi\" there", "'say \"hi\" there'")]
fn test_quoted(#[case] text: &str, #[case] expected: &str) {
    assert_eq!(quoted(text), expected);
}

#[rstest]
fn test_represented_args() {
    assert_eq!(represented_args::<&str>(&[]), "");
    assert_eq!(represented_args(&["-a", "foo bar"]), "-a \"foo bar\"");
}
