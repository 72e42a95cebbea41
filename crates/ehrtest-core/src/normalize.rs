//! Targeted item-count normalization for fixture preparation.
//!
//! openEHR fixtures often carry a collection (`content`, `items`, `events`)
//! where several entries share a name. Before a comparison the fixture is
//! adjusted so that exactly `target` entries carry that name.
//!
//! Rules:
//! - an item matches when `item.name == name` or `item.name.value == name`
//! - over-count removes matching items starting from the end of the array
//! - under-count clones the last matching item and inserts the copies
//!   directly after it
//!
//! The input document is never mutated; a new document is returned.

use crate::compare::input::{parse_payload, Side};
use crate::compare::path::PathRef;
use crate::errors::{CompareError, Result};
use crate::{log_op_end, log_op_error, log_op_start};
use serde_json::Value;
use std::time::Instant;

/// Return a copy of `doc` where exactly `target` items of the array at
/// `array_path` carry `name`.
///
/// # Errors
///
/// - `CompareError::PathResolution` when `array_path` does not exist or does
///   not point at an array
/// - `CompareError::NotFound` when no item carries `name`
pub fn normalize_item_count(
    doc: &Value,
    array_path: &PathRef,
    name: &str,
    target: usize,
) -> Result<Value> {
    log_op_start!("normalize_item_count", path = %array_path, target = target);
    let start = Instant::now();

    let result = normalize_impl(doc, array_path, name, target).map_err(|e| {
        log_op_error!(
            "normalize_item_count",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64
        );
        e
    })?;

    log_op_end!(
        "normalize_item_count",
        duration_ms = start.elapsed().as_millis() as u64
    );
    Ok(result)
}

/// Text-in, text-out variant of [`normalize_item_count`].
///
/// The path is given in rendered form, e.g. `root['content']`. Output is
/// pretty-printed with key order preserved.
///
/// # Errors
///
/// `CompareError::Parse` for malformed text, `CompareError::Configuration`
/// for a malformed path, otherwise as [`normalize_item_count`].
pub fn normalize_item_count_text(
    doc: &str,
    array_path: &str,
    name: &str,
    target: usize,
) -> Result<String> {
    let value = parse_payload(doc, Side::Actual)?;
    let path: PathRef = array_path.parse()?;
    let normalized = normalize_item_count(&value, &path, name, target)?;
    serde_json::to_string_pretty(&normalized).map_err(|e| CompareError::Serialization {
        message: e.to_string(),
    })
}

fn normalize_impl(doc: &Value, array_path: &PathRef, name: &str, target: usize) -> Result<Value> {
    let mut out = doc.clone();
    let items = match array_path.resolve_mut(&mut out) {
        Some(Value::Array(items)) => items,
        Some(other) => {
            return Err(CompareError::PathResolution {
                path: array_path.to_string(),
                reason: format!("expected an array, found {}", type_name(other)),
            })
        }
        None => {
            return Err(CompareError::PathResolution {
                path: array_path.to_string(),
                reason: "no such location in document".to_string(),
            })
        }
    };

    let matching: Vec<usize> = items
        .iter()
        .enumerate()
        .filter(|(_, item)| item_has_name(item, name))
        .map(|(i, _)| i)
        .collect();

    let Some(&last) = matching.last() else {
        return Err(CompareError::NotFound {
            path: array_path.to_string(),
            name: name.to_string(),
        });
    };

    let current = matching.len();
    if current > target {
        // highest indexes first so earlier positions stay valid
        for &idx in matching.iter().rev().take(current - target) {
            items.remove(idx);
        }
    } else if current < target {
        let template = items[last].clone();
        let copies = std::iter::repeat(template).take(target - current);
        items.splice(last + 1..last + 1, copies);
    }

    tracing::debug!(
        path = %array_path,
        name = name,
        before = current,
        after = target,
        "item count normalized"
    );
    Ok(out)
}

fn item_has_name(item: &Value, name: &str) -> bool {
    match item.get("name") {
        Some(Value::String(s)) => s == name,
        Some(Value::Object(dv_text)) => {
            dv_text.get("value").and_then(Value::as_str) == Some(name)
        }
        _ => false,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
