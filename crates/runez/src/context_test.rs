// Copyright (c) Contributors to the runez project.
// SPDX-License-Identifier: Apache-2.0

use rstest::rstest;

use super::*;

#[rstest]
fn test_nested_scopes_restore() {
    assert!(!is_dryrun());
    {
        let _outer = DryRun::scoped(true);
        assert!(is_dryrun());
        {
            let _inner = DryRun::scoped(false);
            assert!(!is_dryrun());
        }
        assert!(is_dryrun());
    }
    assert!(!is_dryrun());
}

#[rstest]
#[case(None, false)]
#[case(Some(true), true)]
#[case(Some(false), false)]
fn test_explicit_override(#[case] explicit: Option<bool>, #[case] expected: bool) {
    assert_eq!(resolve_dryrun(explicit), expected);

    let _dryrun = DryRun::scoped(true);
    assert_eq!(resolve_dryrun(explicit), explicit.unwrap_or(true));
}

#[rstest]
fn test_state_is_per_thread() {
    let _dryrun = DryRun::scoped(true);
    let other = std::thread::spawn(is_dryrun).join().unwrap();
    assert!(!other);
    assert!(is_dryrun());
}
