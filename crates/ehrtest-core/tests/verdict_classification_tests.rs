#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Exact vs subset classification on realistic server payloads.

mod common;

use common::{
    comparator_with, default_comparator, expected_composition, paths_of, server_composition,
};
use ehrtest_core::{render_human_summary, ChangeKind, ComparisonMode};
use serde_json::json;

#[test]
fn test_server_payload_is_subset_of_fixture() {
    let cmp = default_comparator();
    let verdict = cmp
        .evaluate(server_composition(), expected_composition(), ComparisonMode::Subset)
        .unwrap();

    assert!(verdict.passed, "{}", render_human_summary(&verdict));
    assert_eq!(
        paths_of(&verdict.report, ChangeKind::KeyRemoved),
        vec!["root['audit']", "root['context']", "root['uid']"]
    );
    // body temperature is only on the server
    assert_eq!(
        paths_of(&verdict.report, ChangeKind::ItemRemoved),
        vec!["root['content'][2]"]
    );
    assert_eq!(verdict.critical_count(), 0);
}

#[test]
fn test_same_pair_fails_exact() {
    let cmp = default_comparator();
    let verdict = cmp
        .evaluate(server_composition(), expected_composition(), ComparisonMode::Exact)
        .unwrap();

    assert!(!verdict.passed);
    assert_eq!(verdict.critical_count(), verdict.report.len());
}

#[test]
fn test_changed_nested_value_is_critical_in_subset() {
    let mut expected = expected_composition();
    expected["content"][1]["systolic"] = json!(121);

    let cmp = default_comparator();
    let verdict = cmp
        .evaluate(server_composition(), expected, ComparisonMode::Subset)
        .unwrap();

    assert!(!verdict.passed);
    // reported at the actual element's index, on the changed field only
    assert_eq!(
        paths_of(&verdict.report, ChangeKind::ValueChanged),
        vec!["root['content'][0]['systolic']"]
    );
    let critical: Vec<_> = verdict.critical_changes().collect();
    assert_eq!(critical.len(), 1);
}

#[test]
fn test_list_element_with_extra_fields_passes_subset() {
    // GIVEN a server list entry carrying several fields the fixture omits
    let actual = json!({"items": [{"id": 1, "x": 1, "y": 2, "meta": {"etag": "a"}}]});
    let expected = json!({"items": [{"id": 1}]});

    // WHEN compared order-insensitively (the default)
    let verdict = default_comparator()
        .evaluate(&actual, &expected, ComparisonMode::Subset)
        .unwrap();

    // THEN the entry is paired and only the extra keys are reported
    assert!(verdict.passed, "{}", render_human_summary(&verdict));
    assert_eq!(verdict.report.count(ChangeKind::ItemAdded), 0);
    assert_eq!(
        paths_of(&verdict.report, ChangeKind::KeyRemoved),
        vec![
            "root['items'][0]['meta']",
            "root['items'][0]['x']",
            "root['items'][0]['y']"
        ]
    );

    // AND the verdict does not depend on ignore_order
    let ordered = comparator_with(|b| b.ignore_order(false))
        .evaluate(&actual, &expected, ComparisonMode::Subset)
        .unwrap();
    assert!(ordered.passed);
    assert_eq!(ordered.report, verdict.report);
}

#[test]
fn test_reordered_entries_with_extra_fields_pass_subset() {
    let verdict = default_comparator()
        .evaluate(
            json!({"content": [
                {"name": "Pulse", "rate": 72, "uid": "a", "time": "t1"},
                {"name": "Blood pressure", "systolic": 120, "uid": "b", "time": "t2"}
            ]}),
            json!({"content": [
                {"name": "Blood pressure", "systolic": 120},
                {"name": "Pulse", "rate": 72}
            ]}),
            ComparisonMode::Subset,
        )
        .unwrap();

    assert!(verdict.passed, "{}", render_human_summary(&verdict));
    assert_eq!(verdict.report.count(ChangeKind::KeyRemoved), 4);
    assert_eq!(verdict.report.count(ChangeKind::ValueChanged), 0);
}

#[test]
fn test_list_element_missing_a_field_still_fails_subset() {
    let verdict = default_comparator()
        .evaluate(
            json!({"items": [{"id": 1, "x": 1, "y": 2}]}),
            json!({"items": [{"id": 1, "required": true}]}),
            ComparisonMode::Subset,
        )
        .unwrap();

    assert!(!verdict.passed);
    assert_eq!(
        paths_of(&verdict.report, ChangeKind::KeyAdded),
        vec!["root['items'][0]['required']"]
    );
}

#[test]
fn test_type_change_is_critical_in_subset() {
    let cmp = default_comparator();
    let err = cmp
        .payload_is_subset_of_expected(json!({"rate": "72"}), json!({"rate": 72}))
        .unwrap_err();
    let report = err.report().unwrap();
    assert_eq!(paths_of(report, ChangeKind::TypeChanged), vec!["root['rate']"]);
}

#[test]
fn test_missing_list_item_is_critical_in_subset() {
    let cmp = default_comparator();
    let err = cmp
        .payload_is_subset_of_expected(json!({"tags": ["a"]}), json!({"tags": ["a", "b"]}))
        .unwrap_err();
    assert_eq!(
        paths_of(err.report().unwrap(), ChangeKind::ItemAdded),
        vec!["root['tags'][1]"]
    );
}

#[test]
fn test_repetition_direction_decides_subset_verdict() {
    let cmp = default_comparator();

    // more copies on the server than asked for
    let verdict = cmp
        .evaluate(json!([1, 1, 2]), json!([1, 2]), ComparisonMode::Subset)
        .unwrap();
    assert!(verdict.passed);
    assert_eq!(verdict.report.count(ChangeKind::RepetitionChanged), 1);

    // fewer copies than the fixture requires
    let verdict = cmp
        .evaluate(json!([1, 2]), json!([1, 1, 2]), ComparisonMode::Subset)
        .unwrap();
    assert!(!verdict.passed);
}

#[test]
fn test_report_json_uses_wire_names() {
    let report = default_comparator()
        .diff(json!({"a": 1, "gone": true}), json!({"a": 2, "new": null}))
        .unwrap();
    let wire = report.to_json().unwrap();

    assert_eq!(
        wire["values_changed"][0],
        json!({"path": "root['a']", "old_value": 1, "new_value": 2})
    );
    assert_eq!(wire["dictionary_item_removed"][0]["path"], json!("root['gone']"));
    assert_eq!(wire["dictionary_item_added"][0]["path"], json!("root['new']"));
}

#[test]
fn test_summary_lists_critical_changes() {
    let mut expected = expected_composition();
    expected["composer"]["name"] = json!("Dr. Who");
    let verdict = default_comparator()
        .evaluate(server_composition(), expected, ComparisonMode::Subset)
        .unwrap();

    let summary = render_human_summary(&verdict);
    assert!(summary.contains("**Verdict**: FAIL"));
    assert!(summary.contains("`root['composer']['name']` **critical**"));
    assert!(summary.contains("`root['uid']` ignorable"));
}
