//! Compare command
//!
//! Usage: ehrtest compare <ACTUAL> <EXPECTED> [--mode exact|subset] [--options <FILE>]

use clap::Args;
use ehrtest_core::{
    render_human_summary, CompareError, ComparisonMode, PayloadComparator, PolicyOptions,
    TolerancePolicy,
};
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct CompareArgs {
    /// Actual payload (JSON file)
    pub actual: PathBuf,

    /// Expected fixture (JSON file)
    pub expected: PathBuf,

    /// Comparison mode
    #[arg(short, long, default_value = "exact")]
    pub mode: ComparisonMode,

    /// TOML file with tolerance options; flags below take precedence
    #[arg(long)]
    pub options: Option<PathBuf>,

    /// Match sequences order-insensitively (default: true)
    #[arg(long)]
    pub ignore_order: Option<bool>,

    /// Compare strings case-insensitively
    #[arg(long)]
    pub ignore_string_case: bool,

    /// Treat integers and floats as one numeric type
    #[arg(long)]
    pub ignore_type_subclasses: bool,

    /// Literal path to skip, e.g. root['uid'] (repeatable)
    #[arg(long = "exclude-path")]
    pub exclude_paths: Vec<String>,

    /// Regex matched against rendered paths (repeatable)
    #[arg(long = "exclude-regex-path")]
    pub exclude_regex_paths: Vec<String>,

    /// Key name to skip at any depth (repeatable)
    #[arg(long = "exclude-key")]
    pub exclude_keys: Vec<String>,

    /// Print the JSON diff report to stdout
    #[arg(long)]
    pub report: bool,
}

impl CompareArgs {
    fn flag_options(&self) -> PolicyOptions {
        PolicyOptions {
            ignore_order: self.ignore_order,
            ignore_string_case: self.ignore_string_case.then_some(true),
            ignore_type_subclasses: self.ignore_type_subclasses.then_some(true),
            report_repetition: None,
            exclude_paths: self.exclude_paths.clone(),
            exclude_regex_paths: self.exclude_regex_paths.clone(),
            exclude_keys: self.exclude_keys.clone(),
        }
    }

    fn policy(&self) -> Result<TolerancePolicy, Box<dyn std::error::Error>> {
        let base = match &self.options {
            Some(path) => PolicyOptions::from_toml_str(&std::fs::read_to_string(path)?)?,
            None => PolicyOptions::default(),
        };
        Ok(base.merge(self.flag_options()).into_policy()?)
    }
}

/// Execute compare command
///
/// A failing verdict is returned as `CompareError::PayloadMismatch` after the
/// summary has been printed, so the process exits non-zero.
pub fn execute(args: CompareArgs) -> Result<(), Box<dyn std::error::Error>> {
    let policy = args.policy()?;
    let actual = std::fs::read_to_string(&args.actual)?;
    let expected = std::fs::read_to_string(&args.expected)?;

    let comparator = PayloadComparator::new(policy);
    let verdict = comparator.evaluate(actual.as_str(), expected.as_str(), args.mode)?;

    if args.report {
        println!("{}", serde_json::to_string_pretty(&verdict.report)?);
    } else {
        print!("{}", render_human_summary(&verdict));
    }

    if verdict.passed {
        Ok(())
    } else {
        Err(Box::new(CompareError::PayloadMismatch {
            mode: verdict.mode,
            critical: verdict.critical_count(),
            report: Box::new(verdict.report),
        }))
    }
}
