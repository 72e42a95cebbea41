//! Path addressing inside a JSON document.
//!
//! Paths render as `root['key'][0]['other']`. The same text form is what
//! `exclude_paths` literals and `exclude_regex_paths` patterns are matched
//! against, and what the normalizer accepts to locate an array.

use crate::errors::CompareError;
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// One step from a parent node to a child node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PathStep {
    Key(String),
    Index(usize),
}

/// Location of a node, as the sequence of steps from the document root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PathRef(Vec<PathStep>);

impl PathRef {
    /// The document root
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// A new path one key deeper
    pub fn key(&self, key: &str) -> Self {
        let mut steps = self.0.clone();
        steps.push(PathStep::Key(key.to_string()));
        Self(steps)
    }

    /// A new path one index deeper
    pub fn index(&self, index: usize) -> Self {
        let mut steps = self.0.clone();
        steps.push(PathStep::Index(index));
        Self(steps)
    }

    pub fn steps(&self) -> &[PathStep] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// The last key step, if the path ends in one
    pub fn last_key(&self) -> Option<&str> {
        match self.0.last() {
            Some(PathStep::Key(k)) => Some(k),
            _ => None,
        }
    }

    /// True when `self` is `other` or an ancestor of it
    pub fn is_prefix_of(&self, other: &PathRef) -> bool {
        other.0.starts_with(&self.0)
    }

    /// Follow the path through `doc`
    pub fn resolve<'v>(&self, doc: &'v Value) -> Option<&'v Value> {
        self.0.iter().try_fold(doc, |node, step| match step {
            PathStep::Key(k) => node.as_object()?.get(k),
            PathStep::Index(i) => node.as_array()?.get(*i),
        })
    }

    /// Mutable variant of [`PathRef::resolve`]
    pub fn resolve_mut<'v>(&self, doc: &'v mut Value) -> Option<&'v mut Value> {
        self.0.iter().try_fold(doc, |node, step| match step {
            PathStep::Key(k) => node.as_object_mut()?.get_mut(k),
            PathStep::Index(i) => node.as_array_mut()?.get_mut(*i),
        })
    }
}

impl fmt::Display for PathRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("root")?;
        for step in &self.0 {
            match step {
                PathStep::Key(k) => {
                    let escaped = k.replace('\\', "\\\\").replace('\'', "\\'");
                    write!(f, "['{}']", escaped)?;
                }
                PathStep::Index(i) => write!(f, "[{}]", i)?,
            }
        }
        Ok(())
    }
}

impl Serialize for PathRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl FromStr for PathRef {
    type Err = CompareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| CompareError::configuration("path", format!("{s}: {reason}"));

        let rest = s
            .trim()
            .strip_prefix("root")
            .ok_or_else(|| invalid("path must start with `root`"))?;
        let mut chars = rest.chars().peekable();
        let mut steps = Vec::new();

        while let Some(c) = chars.next() {
            if c != '[' {
                return Err(invalid("expected `[`"));
            }
            match chars.peek().copied() {
                Some(quote @ ('\'' | '"')) => {
                    chars.next();
                    let mut key = String::new();
                    loop {
                        match chars.next() {
                            Some('\\') => match chars.next() {
                                Some(escaped) => key.push(escaped),
                                None => return Err(invalid("dangling escape")),
                            },
                            Some(ch) if ch == quote => break,
                            Some(ch) => key.push(ch),
                            None => return Err(invalid("unterminated key")),
                        }
                    }
                    if chars.next() != Some(']') {
                        return Err(invalid("expected `]` after key"));
                    }
                    steps.push(PathStep::Key(key));
                }
                Some(_) => {
                    let mut digits = String::new();
                    let mut closed = false;
                    for ch in chars.by_ref() {
                        if ch == ']' {
                            closed = true;
                            break;
                        }
                        digits.push(ch);
                    }
                    if !closed {
                        return Err(invalid("unterminated index"));
                    }
                    let index = digits
                        .trim()
                        .parse::<usize>()
                        .map_err(|_| invalid("index must be a non-negative integer"))?;
                    steps.push(PathStep::Index(index));
                }
                None => return Err(invalid("unterminated step")),
            }
        }

        Ok(Self(steps))
    }
}
