// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[parameterized(
    plain_name = { "target\n", "target", true, false },
    nested_under_ignored = { "target\n", "target/debug/app", false, false },
    unrelated = { "target\n", "src/main.rs", false, true },
    extension_glob = { "*.log\n", "logs/app.log", false, false },
    negation = { "*.log\n!keep.log\n", "keep.log", false, true },
    dir_only_rule_on_dir = { "build/\n", "build", true, false },
    dir_only_rule_on_file = { "build/\n", "build", false, true },
)]
fn gitignore_dialect(strategy: &str, sub: &str, is_dir: bool, allowed: bool) {
    let skipper = Skipper::compile(strategy).unwrap();
    assert_eq!(skipper.allows(Path::new(sub), is_dir), allowed);
}

#[test]
fn empty_strategy_allows_everything() {
    let skipper = Skipper::compile("").unwrap();
    assert!(skipper.allows(Path::new("anything/at/all"), false));
}

#[test]
fn invalid_rule_is_an_error() {
    // An unclosed character class is not a valid glob.
    assert!(Skipper::compile("a[b\n").is_err());
}
