//! Tolerance policy: which differences the diff sees at all.
//!
//! Options come either from code (the builder) or from loosely typed data
//! (a JSON map, a TOML file, CLI flags). Loosely typed input is validated up
//! front against the closed set of recognized options; anything unknown or
//! mistyped is rejected before a single node is compared.

use crate::compare::model::ValueType;
use crate::compare::path::PathRef;
use crate::errors::{CompareError, Result};
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Number, Value};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// Predicate deciding whether a value at a path is ignored regardless of kind
pub type ValueExclusion = Arc<dyn Fn(&Value, &PathRef) -> bool + Send + Sync>;

const OPT_IGNORE_ORDER: &str = "ignore_order";
const OPT_IGNORE_STRING_CASE: &str = "ignore_string_case";
const OPT_IGNORE_TYPE_SUBCLASSES: &str = "ignore_type_subclasses";
const OPT_REPORT_REPETITION: &str = "report_repetition";
const OPT_EXCLUDE_PATHS: &str = "exclude_paths";
const OPT_EXCLUDE_REGEX_PATHS: &str = "exclude_regex_paths";
const OPT_EXCLUDE_KEYS: &str = "exclude_keys";
const OPT_EXCLUDE_VALUE_CALLBACK: &str = "exclude_value_callback";

/// Data form of the policy options; every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PolicyOptions {
    pub ignore_order: Option<bool>,
    pub ignore_string_case: Option<bool>,
    pub ignore_type_subclasses: Option<bool>,
    pub report_repetition: Option<bool>,
    pub exclude_paths: Vec<String>,
    pub exclude_regex_paths: Vec<String>,
    pub exclude_keys: Vec<String>,
}

impl PolicyOptions {
    /// Option names accepted in data form
    pub const RECOGNIZED: [&'static str; 8] = [
        OPT_IGNORE_ORDER,
        OPT_IGNORE_STRING_CASE,
        OPT_IGNORE_TYPE_SUBCLASSES,
        OPT_REPORT_REPETITION,
        OPT_EXCLUDE_PATHS,
        OPT_EXCLUDE_REGEX_PATHS,
        OPT_EXCLUDE_KEYS,
        OPT_EXCLUDE_VALUE_CALLBACK,
    ];

    /// Validate a JSON option map.
    ///
    /// # Errors
    ///
    /// `CompareError::Configuration` naming the first unknown option, the first
    /// value of the wrong type, or `exclude_value_callback` (which only the
    /// builder can supply).
    pub fn from_json_map(map: &Map<String, Value>) -> Result<Self> {
        let unknown: Vec<&str> = map
            .keys()
            .map(String::as_str)
            .filter(|k| !Self::RECOGNIZED.contains(k))
            .collect();
        if !unknown.is_empty() {
            return Err(CompareError::configuration(
                unknown.join(", "),
                format!(
                    "parameter(s) are not valid; recognized options: {}",
                    Self::RECOGNIZED.join(", ")
                ),
            ));
        }

        let mut options = PolicyOptions::default();
        for (key, value) in map {
            match key.as_str() {
                OPT_IGNORE_ORDER => options.ignore_order = Some(expect_bool(key, value)?),
                OPT_IGNORE_STRING_CASE => {
                    options.ignore_string_case = Some(expect_bool(key, value)?)
                }
                OPT_IGNORE_TYPE_SUBCLASSES => {
                    options.ignore_type_subclasses = Some(expect_bool(key, value)?)
                }
                OPT_REPORT_REPETITION => {
                    options.report_repetition = Some(expect_bool(key, value)?)
                }
                OPT_EXCLUDE_PATHS => options.exclude_paths = expect_strings(key, value)?,
                OPT_EXCLUDE_REGEX_PATHS => {
                    options.exclude_regex_paths = expect_strings(key, value)?
                }
                OPT_EXCLUDE_KEYS => options.exclude_keys = expect_strings(key, value)?,
                OPT_EXCLUDE_VALUE_CALLBACK => {
                    return Err(CompareError::configuration(
                        key.as_str(),
                        "a value predicate cannot be supplied as data; use TolerancePolicy::builder()",
                    ))
                }
                _ => {}
            }
        }
        Ok(options)
    }

    /// Validate options from TOML text (top-level keys are option names).
    ///
    /// # Errors
    ///
    /// `CompareError::Configuration` when the text is not valid TOML or any
    /// option fails [`PolicyOptions::from_json_map`] validation.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let table: toml::Table = text
            .parse()
            .map_err(|e: toml::de::Error| CompareError::configuration("options", e.to_string()))?;
        let json = serde_json::to_value(table)
            .map_err(|e| CompareError::configuration("options", e.to_string()))?;
        match json {
            Value::Object(map) => Self::from_json_map(&map),
            _ => Err(CompareError::configuration(
                "options",
                "top level must be a table",
            )),
        }
    }

    /// Layer `overrides` on top of `self`: flags set there win, lists append
    pub fn merge(mut self, overrides: PolicyOptions) -> PolicyOptions {
        self.ignore_order = overrides.ignore_order.or(self.ignore_order);
        self.ignore_string_case = overrides.ignore_string_case.or(self.ignore_string_case);
        self.ignore_type_subclasses = overrides
            .ignore_type_subclasses
            .or(self.ignore_type_subclasses);
        self.report_repetition = overrides.report_repetition.or(self.report_repetition);
        self.exclude_paths.extend(overrides.exclude_paths);
        self.exclude_regex_paths.extend(overrides.exclude_regex_paths);
        self.exclude_keys.extend(overrides.exclude_keys);
        self
    }

    /// Compile into a policy.
    ///
    /// # Errors
    ///
    /// `CompareError::Configuration` when a literal path does not parse or a
    /// regex does not compile.
    pub fn into_policy(self) -> Result<TolerancePolicy> {
        TolerancePolicyBuilder {
            options: self,
            callback: None,
        }
        .build()
    }
}

fn expect_bool(key: &str, value: &Value) -> Result<bool> {
    value.as_bool().ok_or_else(|| {
        CompareError::configuration(
            key,
            format!(
                "Argument `{}` must eval to boolean. Valid values: true or false, got: {}",
                key, value
            ),
        )
    })
}

fn expect_strings(key: &str, value: &Value) -> Result<Vec<String>> {
    let not_strings = || {
        CompareError::configuration(
            key,
            format!("must be a string or a list of strings, got: {}", value),
        )
    };
    match value {
        Value::String(s) => Ok(vec![s.clone()]),
        Value::Array(items) => items
            .iter()
            .map(|item| item.as_str().map(str::to_string).ok_or_else(not_strings))
            .collect(),
        _ => Err(not_strings()),
    }
}

/// Validated comparison tolerance settings.
#[derive(Clone)]
pub struct TolerancePolicy {
    ignore_order: bool,
    ignore_string_case: bool,
    ignore_type_subclasses: bool,
    report_repetition: bool,
    exclude_paths: BTreeSet<PathRef>,
    exclude_regex_paths: Vec<Regex>,
    exclude_keys: BTreeSet<String>,
    exclude_value_callback: Option<ValueExclusion>,
}

impl Default for TolerancePolicy {
    fn default() -> Self {
        Self {
            ignore_order: true,
            ignore_string_case: false,
            ignore_type_subclasses: false,
            report_repetition: true,
            exclude_paths: BTreeSet::new(),
            exclude_regex_paths: Vec::new(),
            exclude_keys: BTreeSet::new(),
            exclude_value_callback: None,
        }
    }
}

impl fmt::Debug for TolerancePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let regexes: Vec<&str> = self.exclude_regex_paths.iter().map(Regex::as_str).collect();
        let paths: Vec<String> = self.exclude_paths.iter().map(PathRef::to_string).collect();
        f.debug_struct("TolerancePolicy")
            .field("ignore_order", &self.ignore_order)
            .field("ignore_string_case", &self.ignore_string_case)
            .field("ignore_type_subclasses", &self.ignore_type_subclasses)
            .field("report_repetition", &self.report_repetition)
            .field("exclude_paths", &paths)
            .field("exclude_regex_paths", &regexes)
            .field("exclude_keys", &self.exclude_keys)
            .field(
                "exclude_value_callback",
                &self.exclude_value_callback.as_ref().map(|_| "<predicate>"),
            )
            .finish()
    }
}

impl TolerancePolicy {
    pub fn builder() -> TolerancePolicyBuilder {
        TolerancePolicyBuilder::default()
    }

    /// Shorthand for a policy built from a JSON option map
    ///
    /// # Errors
    ///
    /// See [`PolicyOptions::from_json_map`] and [`PolicyOptions::into_policy`].
    pub fn from_json_map(map: &Map<String, Value>) -> Result<Self> {
        PolicyOptions::from_json_map(map)?.into_policy()
    }

    pub fn ignore_order(&self) -> bool {
        self.ignore_order
    }

    pub fn ignore_string_case(&self) -> bool {
        self.ignore_string_case
    }

    pub fn ignore_type_subclasses(&self) -> bool {
        self.ignore_type_subclasses
    }

    pub fn report_repetition(&self) -> bool {
        self.report_repetition
    }

    pub fn exclude_keys(&self) -> &BTreeSet<String> {
        &self.exclude_keys
    }

    /// True when the node at `path` must not be compared at all.
    ///
    /// `t1`/`t2` are the node's values on each side where present; the value
    /// predicate excludes the node if it accepts either.
    pub fn is_excluded(&self, path: &PathRef, t1: Option<&Value>, t2: Option<&Value>) -> bool {
        if let Some(key) = path.last_key() {
            if self.exclude_keys.contains(key) {
                return true;
            }
        }
        if self.exclude_paths.contains(path) {
            return true;
        }
        if !self.exclude_regex_paths.is_empty() {
            let rendered = path.to_string();
            if self.exclude_regex_paths.iter().any(|re| re.is_match(&rendered)) {
                return true;
            }
        }
        if let Some(callback) = &self.exclude_value_callback {
            return t1.is_some_and(|v| callback(v, path)) || t2.is_some_and(|v| callback(v, path));
        }
        false
    }

    /// Type equality, folding integer/float together when configured
    pub fn same_type(&self, a: ValueType, b: ValueType) -> bool {
        a == b || (self.ignore_type_subclasses && a.is_numeric() && b.is_numeric())
    }

    /// Equality of two scalars already known to be of the same type
    pub fn scalars_equal(&self, a: &Value, b: &Value) -> bool {
        match (a, b) {
            (Value::String(x), Value::String(y)) if self.ignore_string_case => {
                x.to_lowercase() == y.to_lowercase()
            }
            (Value::Number(x), Value::Number(y)) if self.ignore_type_subclasses => {
                match (folded_number(x), folded_number(y)) {
                    (Some(fx), Some(fy)) => fx == fy,
                    _ => x == y,
                }
            }
            _ => a == b,
        }
    }
}

/// Largest integer magnitude an `f64` holds exactly at every step
const F64_EXACT_INT: u64 = 1 << 53;

/// Numeric value of `n` on the shared integer/float scale.
///
/// `None` for integers outside the exact `f64` range; those only ever equal
/// the identical integer. Negative zero is folded onto zero.
pub(crate) fn folded_number(n: &Number) -> Option<f64> {
    let value = if n.is_f64() {
        n.as_f64()?
    } else if let Some(u) = n.as_u64() {
        if u > F64_EXACT_INT {
            return None;
        }
        u as f64
    } else {
        let i = n.as_i64()?;
        if i.unsigned_abs() > F64_EXACT_INT {
            return None;
        }
        i as f64
    };
    Some(if value == 0.0 { 0.0 } else { value })
}

/// Builder for [`TolerancePolicy`]; validation happens in [`build`](Self::build).
#[derive(Default)]
pub struct TolerancePolicyBuilder {
    options: PolicyOptions,
    callback: Option<ValueExclusion>,
}

impl TolerancePolicyBuilder {
    pub fn options(mut self, options: PolicyOptions) -> Self {
        self.options = self.options.merge(options);
        self
    }

    pub fn ignore_order(mut self, value: bool) -> Self {
        self.options.ignore_order = Some(value);
        self
    }

    pub fn ignore_string_case(mut self, value: bool) -> Self {
        self.options.ignore_string_case = Some(value);
        self
    }

    pub fn ignore_type_subclasses(mut self, value: bool) -> Self {
        self.options.ignore_type_subclasses = Some(value);
        self
    }

    pub fn report_repetition(mut self, value: bool) -> Self {
        self.options.report_repetition = Some(value);
        self
    }

    /// Exclude one literal path such as `root['meta']['created']`
    pub fn exclude_path(mut self, path: impl Into<String>) -> Self {
        self.options.exclude_paths.push(path.into());
        self
    }

    /// Exclude every path the regex finds a match in, e.g. `root\['items'\]\[\d+\]\['uid'\]`
    pub fn exclude_regex_path(mut self, pattern: impl Into<String>) -> Self {
        self.options.exclude_regex_paths.push(pattern.into());
        self
    }

    /// Exclude a key name wherever it occurs
    pub fn exclude_key(mut self, key: impl Into<String>) -> Self {
        self.options.exclude_keys.push(key.into());
        self
    }

    /// Ignore any node for which `predicate(value, path)` is true
    pub fn exclude_value_callback<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&Value, &PathRef) -> bool + Send + Sync + 'static,
    {
        self.callback = Some(Arc::new(predicate));
        self
    }

    /// Validate and compile.
    ///
    /// # Errors
    ///
    /// `CompareError::Configuration` when an excluded path is malformed or a
    /// regex does not compile.
    pub fn build(self) -> Result<TolerancePolicy> {
        let defaults = TolerancePolicy::default();
        let options = self.options;

        let exclude_paths = options
            .exclude_paths
            .iter()
            .map(|p| {
                p.parse::<PathRef>().map_err(|e| {
                    CompareError::configuration(OPT_EXCLUDE_PATHS, e.to_string())
                })
            })
            .collect::<Result<BTreeSet<_>>>()?;

        let exclude_regex_paths = options
            .exclude_regex_paths
            .iter()
            .map(|p| {
                Regex::new(p).map_err(|e| {
                    CompareError::configuration(OPT_EXCLUDE_REGEX_PATHS, e.to_string())
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(TolerancePolicy {
            ignore_order: options.ignore_order.unwrap_or(defaults.ignore_order),
            ignore_string_case: options
                .ignore_string_case
                .unwrap_or(defaults.ignore_string_case),
            ignore_type_subclasses: options
                .ignore_type_subclasses
                .unwrap_or(defaults.ignore_type_subclasses),
            report_repetition: options
                .report_repetition
                .unwrap_or(defaults.report_repetition),
            exclude_paths,
            exclude_regex_paths,
            exclude_keys: options.exclude_keys.into_iter().collect(),
            exclude_value_callback: self.callback,
        })
    }
}
