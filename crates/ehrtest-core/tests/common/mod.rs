use ehrtest_core::{ChangeKind, DiffReport, PayloadComparator, TolerancePolicy};
use ehrtest_core::compare::TolerancePolicyBuilder;
use serde_json::{json, Value};

/// Comparator with the default tolerance policy
#[allow(dead_code)]
pub fn default_comparator() -> PayloadComparator {
    PayloadComparator::new(TolerancePolicy::default())
}

/// Comparator with a policy configured through the builder
#[allow(dead_code)]
pub fn comparator_with<F>(configure: F) -> PayloadComparator
where
    F: FnOnce(TolerancePolicyBuilder) -> TolerancePolicyBuilder,
{
    let policy = configure(TolerancePolicy::builder())
        .build()
        .expect("test policy should be valid");
    PayloadComparator::new(policy)
}

/// Rendered paths of every record of one kind, sorted
#[allow(dead_code)]
pub fn paths_of(report: &DiffReport, kind: ChangeKind) -> Vec<String> {
    let mut paths: Vec<String> = report
        .get(kind)
        .iter()
        .map(|r| r.path().to_string())
        .collect();
    paths.sort();
    paths
}

/// A trimmed-down openEHR composition as returned by the server
///
/// Carries the volatile fields (`uid`, `time_committed`) that fixtures never
/// pin down.
#[allow(dead_code)]
pub fn server_composition() -> Value {
    json!({
        "_type": "COMPOSITION",
        "uid": {"_type": "OBJECT_VERSION_ID", "value": "8849182c-82ad-4088-a07f-48ead4180515::local.ehrbase.org::1"},
        "name": {"_type": "DV_TEXT", "value": "Vital Signs"},
        "archetype_node_id": "openEHR-EHR-COMPOSITION.encounter.v1",
        "language": {"terminology_id": {"value": "ISO_639-1"}, "code_string": "en"},
        "composer": {"_type": "PARTY_IDENTIFIED", "name": "Dr. Yamamoto"},
        "context": {
            "start_time": {"value": "2021-12-21T14:19:31.649613+01:00"},
            "setting": {"value": "other care", "defining_code": {"code_string": "238"}}
        },
        "audit": {"time_committed": {"value": "2022-01-10T09:12:00.123+01:00"}},
        "content": [
            {"_type": "OBSERVATION", "name": {"value": "Blood pressure"}, "systolic": 120, "diastolic": 80},
            {"_type": "OBSERVATION", "name": {"value": "Pulse"}, "rate": 72},
            {"_type": "OBSERVATION", "name": {"value": "Body temperature"}, "celsius": 36.6}
        ]
    })
}

/// The fixture a test suite would hold for [`server_composition`]
#[allow(dead_code)]
pub fn expected_composition() -> Value {
    json!({
        "_type": "COMPOSITION",
        "name": {"_type": "DV_TEXT", "value": "Vital Signs"},
        "archetype_node_id": "openEHR-EHR-COMPOSITION.encounter.v1",
        "language": {"terminology_id": {"value": "ISO_639-1"}, "code_string": "en"},
        "composer": {"_type": "PARTY_IDENTIFIED", "name": "Dr. Yamamoto"},
        "content": [
            {"_type": "OBSERVATION", "name": {"value": "Pulse"}, "rate": 72},
            {"_type": "OBSERVATION", "name": {"value": "Blood pressure"}, "systolic": 120, "diastolic": 80}
        ]
    })
}
