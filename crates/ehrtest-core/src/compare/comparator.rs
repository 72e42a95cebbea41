//! Comparison facade used by test suites.
//!
//! Two calling styles are supported:
//! - exploratory: [`PayloadComparator::diff`] / [`PayloadComparator::evaluate`]
//!   hand back the report for manual inspection
//! - assertion: [`PayloadComparator::assert_payloads`] turns a failing
//!   verdict into `CompareError::PayloadMismatch` carrying the full report
//!
//! Both operands are parsed before any comparison work starts, so a malformed
//! fixture fails fast with `CompareError::Parse` whatever the other side holds.

use crate::compare::engine::compute_diff;
use crate::compare::input::{parse_payload, PayloadInput, Side};
use crate::compare::model::DiffReport;
use crate::compare::policy::TolerancePolicy;
use crate::compare::verdict::{ComparisonMode, Verdict};
use crate::errors::{CompareError, Result};
use crate::{log_op_end, log_op_error, log_op_start};
use std::time::Instant;

/// Stateless comparator bound to one tolerance policy.
///
/// Cheap to clone and safe to share between threads; every call parses and
/// diffs its own operands.
#[derive(Debug, Clone, Default)]
pub struct PayloadComparator {
    policy: TolerancePolicy,
}

impl PayloadComparator {
    pub fn new(policy: TolerancePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &TolerancePolicy {
        &self.policy
    }

    /// Structural diff of `actual` against `expected`.
    ///
    /// # Errors
    ///
    /// `CompareError::Parse` when either operand is malformed or absent.
    pub fn diff<'a, 'b>(
        &self,
        actual: impl Into<PayloadInput<'a>>,
        expected: impl Into<PayloadInput<'b>>,
    ) -> Result<DiffReport> {
        log_op_start!("compare_payloads");
        let start = Instant::now();

        let report = self.diff_impl(actual.into(), expected.into()).map_err(|e| {
            log_op_error!(
                "compare_payloads",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            e
        })?;

        log_op_end!(
            "compare_payloads",
            duration_ms = start.elapsed().as_millis() as u64,
            change_count = report.len()
        );
        Ok(report)
    }

    /// Diff and classify without failing on a mismatch.
    ///
    /// # Errors
    ///
    /// `CompareError::Parse` when either operand is malformed or absent.
    pub fn evaluate<'a, 'b>(
        &self,
        actual: impl Into<PayloadInput<'a>>,
        expected: impl Into<PayloadInput<'b>>,
        mode: ComparisonMode,
    ) -> Result<Verdict> {
        log_op_start!("evaluate_payloads", mode = %mode);
        let start = Instant::now();

        let verdict = self
            .diff_impl(actual.into(), expected.into())
            .map(|report| Verdict::classify(report, mode))
            .map_err(|e| {
                log_op_error!(
                    "evaluate_payloads",
                    e.clone(),
                    duration_ms = start.elapsed().as_millis() as u64
                );
                e
            })?;

        trace_changes(&verdict);
        log_op_end!(
            "evaluate_payloads",
            duration_ms = start.elapsed().as_millis() as u64,
            passed = verdict.passed,
            change_count = verdict.report.len(),
            critical_count = verdict.critical_count()
        );
        Ok(verdict)
    }

    /// Diff, classify and fail on any critical change.
    ///
    /// Returns `Ok(true)` on pass so it reads naturally inside `assert!`.
    ///
    /// # Errors
    ///
    /// `CompareError::Parse` for malformed operands and
    /// `CompareError::PayloadMismatch` when the verdict is fail.
    pub fn assert_payloads<'a, 'b>(
        &self,
        actual: impl Into<PayloadInput<'a>>,
        expected: impl Into<PayloadInput<'b>>,
        mode: ComparisonMode,
    ) -> Result<bool> {
        log_op_start!("assert_payloads", mode = %mode);
        let start = Instant::now();

        let result = self
            .diff_impl(actual.into(), expected.into())
            .and_then(|report| {
                let verdict = Verdict::classify(report, mode);
                trace_changes(&verdict);
                if verdict.passed {
                    Ok(verdict.report.len())
                } else {
                    Err(CompareError::PayloadMismatch {
                        mode,
                        critical: verdict.critical_count(),
                        report: Box::new(verdict.report),
                    })
                }
            });

        match result {
            Ok(change_count) => {
                log_op_end!(
                    "assert_payloads",
                    duration_ms = start.elapsed().as_millis() as u64,
                    change_count = change_count
                );
                Ok(true)
            }
            Err(e) => {
                log_op_error!(
                    "assert_payloads",
                    e.clone(),
                    duration_ms = start.elapsed().as_millis() as u64
                );
                Err(e)
            }
        }
    }

    /// # Errors
    ///
    /// See [`PayloadComparator::assert_payloads`].
    pub fn payloads_match_exactly<'a, 'b>(
        &self,
        actual: impl Into<PayloadInput<'a>>,
        expected: impl Into<PayloadInput<'b>>,
    ) -> Result<bool> {
        self.assert_payloads(actual, expected, ComparisonMode::Exact)
    }

    /// # Errors
    ///
    /// See [`PayloadComparator::assert_payloads`].
    pub fn payload_is_subset_of_expected<'a, 'b>(
        &self,
        actual: impl Into<PayloadInput<'a>>,
        expected: impl Into<PayloadInput<'b>>,
    ) -> Result<bool> {
        self.assert_payloads(actual, expected, ComparisonMode::Subset)
    }

    fn diff_impl(&self, actual: PayloadInput<'_>, expected: PayloadInput<'_>) -> Result<DiffReport> {
        let t1 = parse_payload(actual, Side::Actual)?;
        let t2 = parse_payload(expected, Side::Expected)?;
        Ok(compute_diff(&t1, &t2, &self.policy))
    }
}

fn trace_changes(verdict: &Verdict) {
    for record in verdict.critical_changes() {
        tracing::warn!(
            mode = %verdict.mode,
            change_kind = %record.kind(),
            path = %record.path(),
            "critical change"
        );
    }
    for record in verdict.ignorable_changes() {
        tracing::debug!(
            mode = %verdict.mode,
            change_kind = %record.kind(),
            path = %record.path(),
            "ignorable change"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::model::ChangeKind;
    use serde_json::json;

    #[test]
    fn test_parse_failure_is_reported_before_comparison() {
        let cmp = PayloadComparator::default();
        let err = cmp.diff(json!({"a": 1}), "/foo/bar").unwrap_err();
        assert!(matches!(
            err,
            CompareError::Parse {
                side: Side::Expected,
                ..
            }
        ));
    }

    #[test]
    fn test_mismatch_carries_report() {
        let cmp = PayloadComparator::default();
        let err = cmp
            .payload_is_subset_of_expected(r#"{"a": 1}"#, r#"{"a": 1, "b": 2}"#)
            .unwrap_err();
        let report = err.report().expect("mismatch carries report");
        assert_eq!(report.count(ChangeKind::KeyAdded), 1);
        assert!(err.to_string().contains("1 critical change(s)"));
    }

    #[test]
    fn test_evaluate_returns_failing_verdict_without_error() {
        let cmp = PayloadComparator::default();
        let verdict = cmp
            .evaluate(json!([1, 2]), json!([1, 2, 3]), ComparisonMode::Exact)
            .unwrap();
        assert!(!verdict.passed);
        assert_eq!(verdict.report.count(ChangeKind::ItemAdded), 1);
    }

    #[test]
    fn test_absent_actual_is_rejected() {
        let cmp = PayloadComparator::default();
        let err = cmp
            .payloads_match_exactly(None::<&str>, "{}")
            .unwrap_err();
        assert!(matches!(
            err,
            CompareError::Parse {
                side: Side::Actual,
                ..
            }
        ));
    }
}
