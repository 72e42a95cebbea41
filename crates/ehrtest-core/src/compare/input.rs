//! Operand parsing.
//!
//! Either side of a comparison may arrive as raw JSON text (a fixture file, a
//! response body) or as an already-parsed value. Everything is funnelled
//! through [`parse_payload`] so both operands fail the same way.

use crate::errors::{CompareError, Result};
use serde_json::Value;
use std::borrow::Cow;
use std::fmt;

/// Which operand of a comparison a value or error belongs to.
///
/// The first operand is the actual (server) payload, the second the expected
/// fixture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Actual,
    Expected,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Actual => f.write_str("actual"),
            Side::Expected => f.write_str("expected"),
        }
    }
}

/// A comparison operand before parsing.
#[derive(Debug, Clone, PartialEq)]
pub enum PayloadInput<'a> {
    /// Raw JSON text
    Text(Cow<'a, str>),
    /// An already-parsed document
    Structured(Cow<'a, Value>),
    /// No input was supplied
    Absent,
}

impl<'a> From<&'a str> for PayloadInput<'a> {
    fn from(text: &'a str) -> Self {
        PayloadInput::Text(Cow::Borrowed(text))
    }
}

impl<'a> From<&'a String> for PayloadInput<'a> {
    fn from(text: &'a String) -> Self {
        PayloadInput::Text(Cow::Borrowed(text.as_str()))
    }
}

impl From<String> for PayloadInput<'static> {
    fn from(text: String) -> Self {
        PayloadInput::Text(Cow::Owned(text))
    }
}

impl<'a> From<&'a Value> for PayloadInput<'a> {
    fn from(value: &'a Value) -> Self {
        PayloadInput::Structured(Cow::Borrowed(value))
    }
}

impl From<Value> for PayloadInput<'static> {
    fn from(value: Value) -> Self {
        PayloadInput::Structured(Cow::Owned(value))
    }
}

impl<'a, T> From<Option<T>> for PayloadInput<'a>
where
    T: Into<PayloadInput<'a>>,
{
    fn from(value: Option<T>) -> Self {
        value.map_or(PayloadInput::Absent, Into::into)
    }
}

/// Parse one operand into a JSON value.
///
/// # Errors
///
/// `CompareError::Parse` when the text is not valid JSON (the serde_json
/// message is kept verbatim) or when the input is absent.
pub fn parse_payload<'a>(input: impl Into<PayloadInput<'a>>, side: Side) -> Result<Value> {
    match input.into() {
        PayloadInput::Text(text) => {
            serde_json::from_str(&text).map_err(|e| CompareError::Parse {
                side,
                message: format!("Only VALID JSON strings accepted! ERROR: {}", e),
            })
        }
        PayloadInput::Structured(value) => Ok(value.into_owned()),
        PayloadInput::Absent => Err(CompareError::Parse {
            side,
            message: "the JSON payload must be text or a structured value, not absent"
                .to_string(),
        }),
    }
}
