//! Classification of a diff report into a pass/fail verdict.
//!
//! The first operand is always the actual payload and the second the
//! expected fixture. In subset mode "removed" therefore means the server sent
//! something the fixture did not ask for, which is tolerated; "added" means
//! the fixture asked for something the server did not send.

use crate::compare::model::{ChangeKind, ChangeRecord, DiffReport};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// How strictly the actual payload must follow the expected one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ComparisonMode {
    /// No difference of any kind is tolerated
    Exact,
    /// The actual payload may carry more than expected, never less or different
    Subset,
}

impl fmt::Display for ComparisonMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComparisonMode::Exact => f.write_str("exact"),
            ComparisonMode::Subset => f.write_str("subset"),
        }
    }
}

impl FromStr for ComparisonMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "exact" => Ok(ComparisonMode::Exact),
            "subset" => Ok(ComparisonMode::Subset),
            other => Err(format!("unknown comparison mode `{}` (exact|subset)", other)),
        }
    }
}

impl ComparisonMode {
    /// Whether this record fails a comparison in this mode
    pub fn is_critical(&self, record: &ChangeRecord) -> bool {
        match self {
            ComparisonMode::Exact => true,
            ComparisonMode::Subset => match record {
                ChangeRecord::KeyRemoved { .. } | ChangeRecord::ItemRemoved { .. } => false,
                ChangeRecord::RepetitionChanged {
                    old_repeat,
                    new_repeat,
                    ..
                } => old_repeat < new_repeat,
                _ => true,
            },
        }
    }

    /// Kinds that can never pass in this mode regardless of payload
    pub fn always_critical_kinds(&self) -> &'static [ChangeKind] {
        match self {
            ComparisonMode::Exact => &ChangeKind::ALL,
            ComparisonMode::Subset => &[
                ChangeKind::TypeChanged,
                ChangeKind::ValueChanged,
                ChangeKind::KeyAdded,
                ChangeKind::ItemAdded,
            ],
        }
    }
}

/// Outcome of classifying one diff report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Verdict {
    pub mode: ComparisonMode,
    pub passed: bool,
    pub report: DiffReport,
}

impl Verdict {
    pub fn classify(report: DiffReport, mode: ComparisonMode) -> Self {
        let passed = !report.iter().any(|r| mode.is_critical(r));
        Self {
            mode,
            passed,
            report,
        }
    }

    pub fn critical_changes(&self) -> impl Iterator<Item = &ChangeRecord> {
        let mode = self.mode;
        self.report.iter().filter(move |r| mode.is_critical(r))
    }

    pub fn ignorable_changes(&self) -> impl Iterator<Item = &ChangeRecord> {
        let mode = self.mode;
        self.report.iter().filter(move |r| !mode.is_critical(r))
    }

    pub fn critical_count(&self) -> usize {
        self.critical_changes().count()
    }
}
