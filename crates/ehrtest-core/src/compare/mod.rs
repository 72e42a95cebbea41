//! Structural payload comparison.
//!
//! Pipeline: [`input`] parses each operand, [`engine`] walks both trees
//! under a [`TolerancePolicy`] and produces a [`DiffReport`], [`verdict`]
//! classifies the report for a [`ComparisonMode`]. [`PayloadComparator`]
//! ties the steps together and owns the logging boundary.

pub mod comparator;
pub mod engine;
pub mod human_summary;
pub mod input;
pub mod model;
pub mod path;
pub mod policy;
pub mod verdict;

pub use comparator::PayloadComparator;
pub use engine::compute_diff;
pub use human_summary::render_human_summary;
pub use input::{parse_payload, PayloadInput, Side};
pub use model::{ChangeKind, ChangeRecord, DiffReport, ValueType};
pub use path::{PathRef, PathStep};
pub use policy::{PolicyOptions, TolerancePolicy, TolerancePolicyBuilder, ValueExclusion};
pub use verdict::{ComparisonMode, Verdict};
