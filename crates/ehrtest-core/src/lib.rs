//! ehrtest core - payload comparison kernel for openEHR API contract tests
//!
//! This crate provides the pieces the test suites lean on when asserting
//! server responses against fixtures:
//! - Payload parsing from text or already-structured JSON
//! - Structural diff with path addressing and add/remove directionality
//! - Exact and subset verdicts with critical/ignorable classification
//! - Targeted item-count normalization for fixture preparation
//! - Explicit SUT configuration profiles (dev/test, basic/OAuth)

pub mod compare;
pub mod errors;
pub mod logging_facility;
pub mod normalize;
pub mod sut_config;

pub use ehrtest_core_types as core_types;

pub use compare::{
    compute_diff, parse_payload, render_human_summary, ChangeKind, ChangeRecord, ComparisonMode,
    DiffReport, PathRef, PathStep, PayloadComparator, PayloadInput, PolicyOptions, Side,
    TolerancePolicy, TolerancePolicyBuilder, ValueType, Verdict,
};
pub use errors::{CompareError, ExError, ExErrorKind, Result};
pub use normalize::{normalize_item_count, normalize_item_count_text};
pub use sut_config::{AuthType, ControlMode, SutConfig, SutKind, SutSelection};
