//! Structural diff computation engine.
//!
//! The core entry point is [`compute_diff`], which walks two parsed JSON
//! documents in lock-step and produces a [`DiffReport`]. The walk is pure:
//! no logging, no allocation beyond the report and scratch buffers.

use crate::compare::model::{ChangeRecord, DiffReport, ValueType};
use crate::compare::path::PathRef;
use crate::compare::policy::{folded_number, TolerancePolicy};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;

/// Compute the full structural diff of `t1` (first operand) against `t2`.
///
/// Anything present only in `t2` is reported as added, anything present only
/// in `t1` as removed.
pub fn compute_diff(t1: &Value, t2: &Value, policy: &TolerancePolicy) -> DiffReport {
    let mut report = DiffReport::new();
    diff_node(t1, t2, &PathRef::root(), policy, &mut report);
    report
}

fn diff_node(
    t1: &Value,
    t2: &Value,
    path: &PathRef,
    policy: &TolerancePolicy,
    report: &mut DiffReport,
) {
    if policy.is_excluded(path, Some(t1), Some(t2)) {
        return;
    }

    let (old_type, new_type) = (ValueType::of(t1), ValueType::of(t2));
    if !policy.same_type(old_type, new_type) {
        report.push(ChangeRecord::TypeChanged {
            path: path.clone(),
            old_type,
            new_type,
            old_value: t1.clone(),
            new_value: t2.clone(),
        });
        return;
    }

    match (t1, t2) {
        (Value::Object(a), Value::Object(b)) => diff_objects(a, b, path, policy, report),
        (Value::Array(a), Value::Array(b)) if policy.ignore_order() => {
            diff_unordered(a, b, path, policy, report)
        }
        (Value::Array(a), Value::Array(b)) => diff_ordered(a, b, path, policy, report),
        _ => {
            if !policy.scalars_equal(t1, t2) {
                report.push(ChangeRecord::ValueChanged {
                    path: path.clone(),
                    old_value: t1.clone(),
                    new_value: t2.clone(),
                });
            }
        }
    }
}

fn diff_objects(
    a: &Map<String, Value>,
    b: &Map<String, Value>,
    path: &PathRef,
    policy: &TolerancePolicy,
    report: &mut DiffReport,
) {
    for (key, v1) in a {
        let child = path.key(key);
        match b.get(key) {
            Some(v2) => diff_node(v1, v2, &child, policy, report),
            None => {
                if !policy.is_excluded(&child, Some(v1), None) {
                    report.push(ChangeRecord::KeyRemoved {
                        path: child,
                        value: v1.clone(),
                    });
                }
            }
        }
    }
    for (key, v2) in b {
        if a.contains_key(key) {
            continue;
        }
        let child = path.key(key);
        if !policy.is_excluded(&child, None, Some(v2)) {
            report.push(ChangeRecord::KeyAdded {
                path: child,
                value: v2.clone(),
            });
        }
    }
}

fn diff_ordered(
    a: &[Value],
    b: &[Value],
    path: &PathRef,
    policy: &TolerancePolicy,
    report: &mut DiffReport,
) {
    for (i, (v1, v2)) in a.iter().zip(b).enumerate() {
        diff_node(v1, v2, &path.index(i), policy, report);
    }
    for (i, v1) in a.iter().enumerate().skip(b.len()) {
        let child = path.index(i);
        if !policy.is_excluded(&child, Some(v1), None) {
            report.push(ChangeRecord::ItemRemoved {
                path: child,
                value: v1.clone(),
            });
        }
    }
    for (j, v2) in b.iter().enumerate().skip(a.len()) {
        let child = path.index(j);
        if !policy.is_excluded(&child, None, Some(v2)) {
            report.push(ChangeRecord::ItemAdded {
                path: child,
                value: v2.clone(),
            });
        }
    }
}

#[derive(Default)]
struct Bucket {
    left: Vec<usize>,
    right: Vec<usize>,
}

/// Order-insensitive sequence diff.
///
/// Elements are bucketed by canonical form. Buckets present on both sides
/// match; a count mismatch is a repetition change. Left-over composite
/// elements are paired by smallest recursive diff so that a changed object
/// inside a list reports the changed field, not a remove/add pair.
fn diff_unordered(
    a: &[Value],
    b: &[Value],
    path: &PathRef,
    policy: &TolerancePolicy,
    report: &mut DiffReport,
) {
    let mut buckets: BTreeMap<String, Bucket> = BTreeMap::new();
    for (i, v1) in a.iter().enumerate() {
        if !policy.is_excluded(&path.index(i), Some(v1), None) {
            buckets.entry(canonical(v1, policy)).or_default().left.push(i);
        }
    }
    for (j, v2) in b.iter().enumerate() {
        if !policy.is_excluded(&path.index(j), None, Some(v2)) {
            buckets.entry(canonical(v2, policy)).or_default().right.push(j);
        }
    }

    let mut repetitions = Vec::new();
    let mut left_only = Vec::new();
    let mut right_only = Vec::new();
    for bucket in buckets.into_values() {
        if bucket.left.is_empty() {
            right_only.extend(bucket.right);
        } else if bucket.right.is_empty() {
            left_only.extend(bucket.left);
        } else if policy.report_repetition() && bucket.left.len() != bucket.right.len() {
            let first = bucket.left[0];
            repetitions.push(ChangeRecord::RepetitionChanged {
                path: path.index(first),
                value: a[first].clone(),
                old_repeat: bucket.left.len(),
                new_repeat: bucket.right.len(),
                old_indexes: bucket.left,
                new_indexes: bucket.right,
            });
        }
    }
    repetitions.sort_by(|x, y| x.path().cmp(y.path()));
    for record in repetitions {
        report.push(record);
    }
    left_only.sort_unstable();
    right_only.sort_unstable();

    let (paired_left, paired_right) =
        pair_leftovers(a, b, &left_only, &right_only, path, policy, report);

    for i in left_only.into_iter().filter(|i| !paired_left.contains(i)) {
        report.push(ChangeRecord::ItemRemoved {
            path: path.index(i),
            value: a[i].clone(),
        });
    }
    for j in right_only.into_iter().filter(|j| !paired_right.contains(j)) {
        report.push(ChangeRecord::ItemAdded {
            path: path.index(j),
            value: b[j].clone(),
        });
    }
}

/// Greedily pair unmatched composite elements, lowest conflict first.
///
/// Content present on one side only does not count against a pair, so an
/// element carrying extra fields still pairs with its leaner counterpart.
/// A pair is accepted when twice its conflict does not exceed the leaf count
/// of the smaller element; unrelated objects still surface as added/removed.
fn pair_leftovers(
    a: &[Value],
    b: &[Value],
    left_only: &[usize],
    right_only: &[usize],
    path: &PathRef,
    policy: &TolerancePolicy,
    report: &mut DiffReport,
) -> (BTreeSet<usize>, BTreeSet<usize>) {
    let mut candidates = Vec::new();
    for &i in left_only {
        let left_type = ValueType::of(&a[i]);
        if !left_type.is_composite() {
            continue;
        }
        for &j in right_only {
            if ValueType::of(&b[j]) != left_type {
                continue;
            }
            let mut sub = DiffReport::new();
            diff_node(&a[i], &b[j], &path.index(i), policy, &mut sub);
            let conflict = pairing_conflict(&sub);
            if conflict * 2 <= leaf_count(&a[i]).min(leaf_count(&b[j])) {
                candidates.push((conflict, sub.len(), i, j, sub));
            }
        }
    }
    candidates.sort_by(|x, y| (x.0, x.1, x.2, x.3).cmp(&(y.0, y.1, y.2, y.3)));

    let mut paired_left = BTreeSet::new();
    let mut paired_right = BTreeSet::new();
    for (_, _, i, j, sub) in candidates {
        if paired_left.contains(&i) || paired_right.contains(&j) {
            continue;
        }
        paired_left.insert(i);
        paired_right.insert(j);
        report.extend(sub);
    }
    (paired_left, paired_right)
}

/// How strongly two elements disagree.
///
/// Type and value changes always count. One-sided content (removed or added
/// keys and items, surplus repetitions) only counts for the part where both
/// sides carry something the other lacks.
fn pairing_conflict(sub: &DiffReport) -> usize {
    let mut changed = 0usize;
    let mut only_left = 0usize;
    let mut only_right = 0usize;
    for record in sub.iter() {
        match record {
            ChangeRecord::TypeChanged { .. } | ChangeRecord::ValueChanged { .. } => changed += 1,
            ChangeRecord::KeyRemoved { .. } | ChangeRecord::ItemRemoved { .. } => only_left += 1,
            ChangeRecord::KeyAdded { .. } | ChangeRecord::ItemAdded { .. } => only_right += 1,
            ChangeRecord::RepetitionChanged {
                old_repeat,
                new_repeat,
                ..
            } => {
                if old_repeat > new_repeat {
                    only_left += 1;
                } else {
                    only_right += 1;
                }
            }
        }
    }
    changed + only_left.min(only_right)
}

fn leaf_count(value: &Value) -> usize {
    match value {
        Value::Array(items) if !items.is_empty() => items.iter().map(leaf_count).sum(),
        Value::Object(map) if !map.is_empty() => map.values().map(leaf_count).sum(),
        _ => 1,
    }
}

/// Canonical text of a value under the policy's equivalence settings.
///
/// Two values with equal canonical text are equal for order-insensitive
/// matching: object keys are sorted, excluded keys dropped, strings folded
/// when case-insensitive, nested sequences sorted when order-insensitive.
fn canonical(value: &Value, policy: &TolerancePolicy) -> String {
    let mut out = String::new();
    write_canonical(value, policy, &mut out);
    out
}

fn write_canonical(value: &Value, policy: &TolerancePolicy, out: &mut String) {
    match value {
        Value::Null => out.push('n'),
        Value::Bool(b) => {
            let _ = write!(out, "b:{}", b);
        }
        Value::Number(n) => {
            let folded = if policy.ignore_type_subclasses() {
                folded_number(n)
            } else {
                None
            };
            if let Some(f) = folded {
                let _ = write!(out, "num:{:?}", f);
            } else if n.is_f64() {
                let _ = write!(out, "f:{}", n);
            } else {
                let _ = write!(out, "i:{}", n);
            }
        }
        Value::String(s) => {
            if policy.ignore_string_case() {
                let _ = write!(out, "s:{:?}", s.to_lowercase());
            } else {
                let _ = write!(out, "s:{:?}", s);
            }
        }
        Value::Array(items) => {
            let mut parts: Vec<String> = items.iter().map(|v| canonical(v, policy)).collect();
            if policy.ignore_order() {
                parts.sort();
            }
            out.push('[');
            out.push_str(&parts.join(","));
            out.push(']');
        }
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map
                .iter()
                .filter(|(k, _)| !policy.exclude_keys().contains(k.as_str()))
                .collect();
            entries.sort_by(|x, y| x.0.cmp(y.0));
            out.push('{');
            for (n, (k, v)) in entries.into_iter().enumerate() {
                if n > 0 {
                    out.push(',');
                }
                let _ = write!(out, "{:?}:", k);
                write_canonical(v, policy, out);
            }
            out.push('}');
        }
    }
}
