//! Diff report types.
//!
//! Change kinds keep the wire names test suites already grep for in CI logs
//! (`values_changed`, `dictionary_item_added`, ...). Direction is always
//! first operand → second operand: "added" means present only in the second
//! operand, "removed" present only in the first.

use crate::compare::path::PathRef;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Category of a single structural difference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum ChangeKind {
    #[serde(rename = "type_changes")]
    TypeChanged,
    #[serde(rename = "values_changed")]
    ValueChanged,
    #[serde(rename = "repetition_change")]
    RepetitionChanged,
    #[serde(rename = "dictionary_item_added")]
    KeyAdded,
    #[serde(rename = "dictionary_item_removed")]
    KeyRemoved,
    #[serde(rename = "iterable_item_added")]
    ItemAdded,
    #[serde(rename = "iterable_item_removed")]
    ItemRemoved,
}

impl ChangeKind {
    pub const ALL: [ChangeKind; 7] = [
        ChangeKind::TypeChanged,
        ChangeKind::ValueChanged,
        ChangeKind::RepetitionChanged,
        ChangeKind::KeyAdded,
        ChangeKind::KeyRemoved,
        ChangeKind::ItemAdded,
        ChangeKind::ItemRemoved,
    ];

    /// Stable wire name of the kind
    pub fn name(&self) -> &'static str {
        match self {
            ChangeKind::TypeChanged => "type_changes",
            ChangeKind::ValueChanged => "values_changed",
            ChangeKind::RepetitionChanged => "repetition_change",
            ChangeKind::KeyAdded => "dictionary_item_added",
            ChangeKind::KeyRemoved => "dictionary_item_removed",
            ChangeKind::ItemAdded => "iterable_item_added",
            ChangeKind::ItemRemoved => "iterable_item_removed",
        }
    }

    /// The kind a record takes when the operands are swapped
    pub fn inverse(&self) -> ChangeKind {
        match self {
            ChangeKind::KeyAdded => ChangeKind::KeyRemoved,
            ChangeKind::KeyRemoved => ChangeKind::KeyAdded,
            ChangeKind::ItemAdded => ChangeKind::ItemRemoved,
            ChangeKind::ItemRemoved => ChangeKind::ItemAdded,
            other => *other,
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// JSON value type as seen by the diff.
///
/// Integers and floats are distinct types unless the policy folds them
/// together with `ignore_type_subclasses`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Null,
    Bool,
    Integer,
    Float,
    String,
    Array,
    Object,
}

impl ValueType {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => ValueType::Null,
            Value::Bool(_) => ValueType::Bool,
            Value::Number(n) if n.is_f64() => ValueType::Float,
            Value::Number(_) => ValueType::Integer,
            Value::String(_) => ValueType::String,
            Value::Array(_) => ValueType::Array,
            Value::Object(_) => ValueType::Object,
        }
    }

    pub fn is_composite(&self) -> bool {
        matches!(self, ValueType::Array | ValueType::Object)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, ValueType::Integer | ValueType::Float)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ValueType::Null => "null",
            ValueType::Bool => "bool",
            ValueType::Integer => "integer",
            ValueType::Float => "float",
            ValueType::String => "string",
            ValueType::Array => "array",
            ValueType::Object => "object",
        };
        f.write_str(s)
    }
}

/// One structural difference between the two operands.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ChangeRecord {
    TypeChanged {
        path: PathRef,
        old_type: ValueType,
        new_type: ValueType,
        old_value: Value,
        new_value: Value,
    },
    ValueChanged {
        path: PathRef,
        old_value: Value,
        new_value: Value,
    },
    /// Same element, different multiplicity (order-insensitive sequences only)
    RepetitionChanged {
        path: PathRef,
        value: Value,
        old_repeat: usize,
        new_repeat: usize,
        old_indexes: Vec<usize>,
        new_indexes: Vec<usize>,
    },
    KeyAdded {
        path: PathRef,
        value: Value,
    },
    KeyRemoved {
        path: PathRef,
        value: Value,
    },
    ItemAdded {
        path: PathRef,
        value: Value,
    },
    ItemRemoved {
        path: PathRef,
        value: Value,
    },
}

impl ChangeRecord {
    pub fn kind(&self) -> ChangeKind {
        match self {
            ChangeRecord::TypeChanged { .. } => ChangeKind::TypeChanged,
            ChangeRecord::ValueChanged { .. } => ChangeKind::ValueChanged,
            ChangeRecord::RepetitionChanged { .. } => ChangeKind::RepetitionChanged,
            ChangeRecord::KeyAdded { .. } => ChangeKind::KeyAdded,
            ChangeRecord::KeyRemoved { .. } => ChangeKind::KeyRemoved,
            ChangeRecord::ItemAdded { .. } => ChangeKind::ItemAdded,
            ChangeRecord::ItemRemoved { .. } => ChangeKind::ItemRemoved,
        }
    }

    pub fn path(&self) -> &PathRef {
        match self {
            ChangeRecord::TypeChanged { path, .. }
            | ChangeRecord::ValueChanged { path, .. }
            | ChangeRecord::RepetitionChanged { path, .. }
            | ChangeRecord::KeyAdded { path, .. }
            | ChangeRecord::KeyRemoved { path, .. }
            | ChangeRecord::ItemAdded { path, .. }
            | ChangeRecord::ItemRemoved { path, .. } => path,
        }
    }

    /// The same change seen with the operands swapped
    pub fn invert(self) -> ChangeRecord {
        match self {
            ChangeRecord::TypeChanged {
                path,
                old_type,
                new_type,
                old_value,
                new_value,
            } => ChangeRecord::TypeChanged {
                path,
                old_type: new_type,
                new_type: old_type,
                old_value: new_value,
                new_value: old_value,
            },
            ChangeRecord::ValueChanged {
                path,
                old_value,
                new_value,
            } => ChangeRecord::ValueChanged {
                path,
                old_value: new_value,
                new_value: old_value,
            },
            ChangeRecord::RepetitionChanged {
                path,
                value,
                old_repeat,
                new_repeat,
                old_indexes,
                new_indexes,
            } => ChangeRecord::RepetitionChanged {
                path,
                value,
                old_repeat: new_repeat,
                new_repeat: old_repeat,
                old_indexes: new_indexes,
                new_indexes: old_indexes,
            },
            ChangeRecord::KeyAdded { path, value } => ChangeRecord::KeyRemoved { path, value },
            ChangeRecord::KeyRemoved { path, value } => ChangeRecord::KeyAdded { path, value },
            ChangeRecord::ItemAdded { path, value } => ChangeRecord::ItemRemoved { path, value },
            ChangeRecord::ItemRemoved { path, value } => ChangeRecord::ItemAdded { path, value },
        }
    }
}

/// All differences found by one comparison, bucketed by kind.
///
/// Buckets are never empty; a report with no buckets means the operands are
/// equivalent under the ordering and case settings of the policy used.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DiffReport {
    changes: BTreeMap<ChangeKind, Vec<ChangeRecord>>,
}

impl DiffReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, record: ChangeRecord) {
        self.changes.entry(record.kind()).or_default().push(record);
    }

    pub(crate) fn extend(&mut self, other: DiffReport) {
        for record in other.into_records() {
            self.push(record);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Total number of records across all kinds
    pub fn len(&self) -> usize {
        self.changes.values().map(Vec::len).sum()
    }

    /// Records of one kind, in traversal order
    pub fn get(&self, kind: ChangeKind) -> &[ChangeRecord] {
        self.changes.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn count(&self, kind: ChangeKind) -> usize {
        self.get(kind).len()
    }

    pub fn contains_kind(&self, kind: ChangeKind) -> bool {
        self.changes.contains_key(&kind)
    }

    pub fn kinds(&self) -> impl Iterator<Item = ChangeKind> + '_ {
        self.changes.keys().copied()
    }

    /// Every record, grouped by kind in kind order
    pub fn iter(&self) -> impl Iterator<Item = &ChangeRecord> {
        self.changes.values().flatten()
    }

    pub fn into_records(self) -> impl Iterator<Item = ChangeRecord> {
        self.changes.into_values().flatten()
    }

    /// The report with both operands swapped
    pub fn invert(self) -> DiffReport {
        let mut inverted = DiffReport::new();
        for record in self.into_records() {
            inverted.push(record.invert());
        }
        inverted
    }

    /// Diagnostic form: `{kind name: [{path, ...kind fields}]}`
    ///
    /// # Errors
    ///
    /// Any serde_json error raised while building the value.
    pub fn to_json(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}
