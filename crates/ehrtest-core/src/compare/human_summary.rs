//! Human-readable summary renderer for comparison verdicts.

use crate::compare::model::{ChangeKind, ChangeRecord};
use crate::compare::verdict::Verdict;
use serde_json::Value;

const MAX_VALUE_CHARS: usize = 80;

/// Render a Markdown summary of a [`Verdict`].
///
/// Intended for CI logs next to a failing assertion. Informational only; the
/// structured report stays the source of truth.
pub fn render_human_summary(verdict: &Verdict) -> String {
    let mut out = String::new();

    out.push_str("## Payload Comparison\n\n");
    let outcome = if verdict.passed { "PASS" } else { "FAIL" };
    out.push_str(&format!(
        "**Mode**: {}  \n**Verdict**: {}  \n**Changes**: {} ({} critical)\n\n",
        verdict.mode,
        outcome,
        verdict.report.len(),
        verdict.critical_count()
    ));

    if verdict.report.is_empty() {
        out.push_str("_No differences between payloads._\n");
        return out;
    }

    for kind in ChangeKind::ALL {
        let records = verdict.report.get(kind);
        if records.is_empty() {
            continue;
        }
        out.push_str(&format!("### {} ({})\n\n", heading(kind), records.len()));
        for record in records {
            let marker = if verdict.mode.is_critical(record) {
                "**critical**"
            } else {
                "ignorable"
            };
            out.push_str(&format!(
                "- `{}` {}: {}\n",
                record.path(),
                marker,
                describe(record)
            ));
        }
        out.push('\n');
    }

    out
}

fn heading(kind: ChangeKind) -> &'static str {
    match kind {
        ChangeKind::TypeChanged => "Type Changes",
        ChangeKind::ValueChanged => "Values Changed",
        ChangeKind::RepetitionChanged => "Repetition Changes",
        ChangeKind::KeyAdded => "Keys Only In Expected",
        ChangeKind::KeyRemoved => "Keys Only In Actual",
        ChangeKind::ItemAdded => "Items Only In Expected",
        ChangeKind::ItemRemoved => "Items Only In Actual",
    }
}

fn describe(record: &ChangeRecord) -> String {
    match record {
        ChangeRecord::TypeChanged {
            old_type,
            new_type,
            old_value,
            new_value,
            ..
        } => format!(
            "{} `{}` vs {} `{}`",
            old_type,
            short(old_value),
            new_type,
            short(new_value)
        ),
        ChangeRecord::ValueChanged {
            old_value,
            new_value,
            ..
        } => format!("`{}` vs `{}`", short(old_value), short(new_value)),
        ChangeRecord::RepetitionChanged {
            value,
            old_repeat,
            new_repeat,
            ..
        } => format!("`{}` x{} vs x{}", short(value), old_repeat, new_repeat),
        ChangeRecord::KeyAdded { value, .. }
        | ChangeRecord::KeyRemoved { value, .. }
        | ChangeRecord::ItemAdded { value, .. }
        | ChangeRecord::ItemRemoved { value, .. } => format!("`{}`", short(value)),
    }
}

fn short(value: &Value) -> String {
    let text = value.to_string();
    if text.chars().count() <= MAX_VALUE_CHARS {
        text
    } else {
        let cut: String = text.chars().take(MAX_VALUE_CHARS).collect();
        format!("{}…", cut)
    }
}
