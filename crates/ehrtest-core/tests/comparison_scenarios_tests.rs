#![allow(clippy::unwrap_used, clippy::expect_used)]

//! End-to-end comparison scenarios through the `PayloadComparator` facade.

mod common;

use common::{comparator_with, default_comparator, paths_of};
use ehrtest_core::{ChangeKind, CompareError, ComparisonMode, Side};
use serde_json::json;

#[test]
fn test_scenario_01_identical_payloads_pass_exact() {
    // GIVEN a payload compared with itself
    let payload = json!({"a": 1, "b": 2});

    // WHEN evaluated in exact mode
    let verdict = default_comparator()
        .evaluate(&payload, &payload, ComparisonMode::Exact)
        .unwrap();

    // THEN it passes with an empty report
    assert!(verdict.passed);
    assert!(verdict.report.is_empty());
    assert!(default_comparator()
        .payloads_match_exactly(&payload, &payload)
        .unwrap());
}

#[test]
fn test_scenario_02_missing_required_key_fails_subset() {
    let cmp = default_comparator();

    let err = cmp
        .payload_is_subset_of_expected(json!({"a": 1}), json!({"a": 1, "b": 2}))
        .unwrap_err();

    let report = err.report().expect("mismatch carries the report");
    assert_eq!(paths_of(report, ChangeKind::KeyAdded), vec!["root['b']"]);
    assert!(matches!(
        err,
        CompareError::PayloadMismatch {
            mode: ComparisonMode::Subset,
            critical: 1,
            ..
        }
    ));
}

#[test]
fn test_scenario_03_superset_passes_subset() {
    let cmp = default_comparator();

    let verdict = cmp
        .evaluate(json!({"a": 1, "b": 2}), json!({"a": 1}), ComparisonMode::Subset)
        .unwrap();

    assert!(verdict.passed);
    assert_eq!(paths_of(&verdict.report, ChangeKind::KeyRemoved), vec!["root['b']"]);
    assert_eq!(verdict.ignorable_changes().count(), 1);

    // the same pair is not an exact match
    assert!(cmp
        .payloads_match_exactly(json!({"a": 1, "b": 2}), json!({"a": 1}))
        .is_err());
}

#[test]
fn test_scenario_04_ignore_order_controls_list_comparison() {
    let actual = json!({"list": [1, 2, 3]});
    let expected = json!({"list": [3, 2, 1]});

    // ignore_order=true: equivalent
    let report = default_comparator().diff(&actual, &expected).unwrap();
    assert!(report.is_empty());

    // ignore_order=false: positional value changes where the lists differ
    let ordered = comparator_with(|b| b.ignore_order(false));
    let report = ordered.diff(&actual, &expected).unwrap();
    assert_eq!(
        paths_of(&report, ChangeKind::ValueChanged),
        vec!["root['list'][0]", "root['list'][2]"]
    );
    assert_eq!(report.len(), 2);
}

#[test]
fn test_scenario_05_string_case_sensitivity() {
    let actual = json!({"s": "ONE"});
    let expected = json!({"s": "one"});

    let folded = comparator_with(|b| b.ignore_string_case(true));
    assert!(folded.payloads_match_exactly(&actual, &expected).unwrap());

    let report = default_comparator().diff(&actual, &expected).unwrap();
    assert_eq!(paths_of(&report, ChangeKind::ValueChanged), vec!["root['s']"]);
}

#[test]
fn test_scenario_06_malformed_text_fails_before_comparison() {
    let cmp = default_comparator();

    for (actual, expected, side) in [
        ("/foo/bar", r#"{"a": 1}"#, Side::Actual),
        (r#"{"a": 1}"#, "/foo/bar", Side::Expected),
    ] {
        let err = cmp
            .assert_payloads(actual, expected, ComparisonMode::Subset)
            .unwrap_err();
        match err {
            CompareError::Parse { side: got, message } => {
                assert_eq!(got, side);
                assert!(message.contains("Only VALID JSON strings accepted!"));
            }
            other => panic!("expected a parse error, got {other:?}"),
        }
    }
}

#[test]
fn test_text_and_structured_operands_mix() {
    let cmp = default_comparator();
    let verdict = cmp
        .evaluate(r#"{"a": [1, {"b": null}]}"#, json!({"a": [{"b": null}, 1]}), ComparisonMode::Exact)
        .unwrap();
    assert!(verdict.passed);
}
