#![allow(clippy::unwrap_used, clippy::expect_used)]

//! SUT profile selection as a test run performs it at start-up.

use ehrtest_core::core_types::Sensitive;
use ehrtest_core::{AuthType, CompareError, ControlMode, SutConfig, SutKind, SutSelection};
use std::collections::HashMap;

fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key: &str| vars.get(key).cloned()
}

#[test]
fn test_defaults_select_test_profile_with_basic_auth() {
    let config = SutSelection::from_lookup(env(&[])).unwrap().select();
    assert_eq!(config.sut, SutKind::Test);
    assert_eq!(config.auth_type, AuthType::Basic);
    assert_eq!(config.control_mode, ControlMode::Docker);
    assert_eq!(config.base_url, "http://localhost:8080/ehrbase/rest/openehr/v1");
    assert_eq!(config.node_name, "local.ehrbase.org");
}

#[test]
fn test_nodocker_switches_to_dev_profile() {
    let config = SutSelection::from_lookup(env(&[("NODOCKER", "True")]))
        .unwrap()
        .select();
    assert_eq!(config.sut, SutKind::Dev);
    assert_eq!(config.control_mode, ControlMode::Manual);
}

#[test]
fn test_oauth_profile_builds_bearer_header() {
    let config = SutSelection::from_lookup(env(&[("SUT", "TEST"), ("AUTH_TYPE", "OAUTH")]))
        .unwrap()
        .select();
    assert_eq!(config.auth_type, AuthType::OAuth);
    assert_eq!(config.oauth_grant.client_id, "ehrbase-robot");

    let err = config.authorization_header(None).unwrap_err();
    assert!(matches!(err, CompareError::Configuration { .. }));

    let token: Sensitive<String> = "eyJhbGciOi".into();
    let header = config.authorization_header(Some(&token)).unwrap();
    assert_eq!(header.expose(), "Bearer eyJhbGciOi");
    assert_eq!(format!("{header}"), "***REDACTED***");
}

#[test]
fn test_profiles_are_independent_values() {
    let oauth = SutConfig::dev().with_auth_type(AuthType::OAuth);
    let fresh = SutConfig::dev();
    assert_eq!(oauth.auth_type, AuthType::OAuth);
    assert_eq!(fresh.auth_type, AuthType::Basic);
}

#[test]
fn test_debug_output_hides_passwords() {
    let debug = format!("{:?}", SutConfig::test());
    assert!(!debug.contains("SuperSecretPassword"));
    assert!(!debug.contains("password: \"robot\""));
}

#[test]
fn test_unknown_values_are_rejected() {
    let err = SutSelection::from_lookup(env(&[("AUTH_TYPE", "kerberos")])).unwrap_err();
    assert!(err.to_string().contains("auth_type"));
}
