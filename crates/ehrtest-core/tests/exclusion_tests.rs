#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Volatile-field exclusion through paths, regexes, keys and predicates.

mod common;

use common::{comparator_with, expected_composition, server_composition};
use ehrtest_core::{ComparisonMode, PathRef};
use serde_json::json;

#[test]
fn test_excluded_keys_and_paths_make_payloads_match() {
    let cmp = comparator_with(|b| {
        b.exclude_key("uid")
            .exclude_path("root['context']")
            .exclude_regex_path(r"^root\['audit'\]")
            .exclude_regex_path(r"^root\['content'\]\[\d+\]\['celsius'\]")
    });

    let mut actual = server_composition();
    // temperature is the only entry the fixture does not list
    actual["content"].as_array_mut().unwrap().pop();

    assert!(cmp
        .payloads_match_exactly(actual, expected_composition())
        .unwrap());
}

#[test]
fn test_excluded_subtree_never_reported() {
    let cmp = comparator_with(|b| b.exclude_path("root['context']"));
    let report = cmp
        .diff(
            json!({"context": {"a": [1, 2], "b": "x"}, "keep": 1}),
            json!({"context": [true, null, {"deep": {"er": 3}}], "keep": 2}),
        )
        .unwrap();

    let context = PathRef::root().key("context");
    assert!(report.iter().all(|r| !context.is_prefix_of(r.path())));
    assert_eq!(report.len(), 1);
}

#[test]
fn test_excluded_key_matches_at_any_depth() {
    let cmp = comparator_with(|b| b.exclude_key("time_committed"));
    let report = cmp
        .diff(
            json!({"audit": {"time_committed": "2022"}, "items": [{"time_committed": 1}]}),
            json!({"audit": {"time_committed": "2023"}, "items": [{"time_committed": 2}]}),
        )
        .unwrap();
    assert!(report.is_empty(), "{:?}", report);
}

#[test]
fn test_regex_exclusion_inside_unordered_list() {
    let cmp = comparator_with(|b| b.exclude_regex_path(r"\['items'\]\[\d+\]\['ts'\]"));
    let verdict = cmp
        .evaluate(
            json!({"items": [{"id": 1, "ts": "a"}, {"id": 2, "ts": "b"}]}),
            json!({"items": [{"id": 2, "ts": "x"}, {"id": 1, "ts": "y"}]}),
            ComparisonMode::Exact,
        )
        .unwrap();
    assert!(verdict.passed, "{:?}", verdict.report);
}

#[test]
fn test_value_predicate_excludes_matching_values() {
    let cmp = comparator_with(|b| {
        b.exclude_value_callback(|value, _path| {
            value
                .as_str()
                .is_some_and(|s| s.len() == 36 && s.matches('-').count() == 4)
        })
    });

    let report = cmp
        .diff(
            json!({"ehr_id": "7d44b88c-4199-4bad-97dc-d78268e01398", "status": "ACTIVE"}),
            json!({"ehr_id": "0b5f5d7c-3e1f-4a8e-9f2a-1c2d3e4f5a6b", "status": "INACTIVE"}),
        )
        .unwrap();

    assert_eq!(report.len(), 1);
    assert_eq!(
        report.iter().next().unwrap().path().to_string(),
        "root['status']"
    );
}

#[test]
fn test_value_predicate_sees_path() {
    let cmp = comparator_with(|b| {
        b.exclude_value_callback(|_value, path| path.last_key() == Some("etag"))
    });
    let report = cmp
        .diff(json!({"etag": "1", "n": 1}), json!({"etag": "2", "n": 1}))
        .unwrap();
    assert!(report.is_empty());
}
