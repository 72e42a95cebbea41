use crate::compare::{ComparisonMode, DiffReport, Side};
use thiserror::Error;

/// Result type alias using CompareError
pub type Result<T> = std::result::Result<T, CompareError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code used by the CLI exit output, the
/// structured log events and test assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    /// Malformed or absent input where valid JSON was required
    Parse,
    /// A supplied path does not exist in the document being queried or mutated
    PathResolution,
    /// A lookup inside a resolved location matched nothing
    NotFound,
    /// Classification verdict is fail and the caller asked for an error
    PayloadMismatch,
    /// Unrecognized or type-invalid option
    Configuration,

    // Integration/IO
    Io,
    Serialization,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::Parse => "ERR_PARSE",
            ExErrorKind::PathResolution => "ERR_PATH_RESOLUTION",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::PayloadMismatch => "ERR_PAYLOAD_MISMATCH",
            ExErrorKind::Configuration => "ERR_CONFIGURATION",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Carries classification fields for programmatic handling plus the
/// comparison context (operand side, document path) useful when a CI run
/// fails far away from the fixture that caused it.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    side: Option<Side>,
    path: Option<String>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            side: None,
            path: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add operand side context
    pub fn with_side(mut self, side: Side) -> Self {
        self.side = Some(side);
        self
    }

    /// Add document path context
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn side(&self) -> Option<Side> {
        self.side
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(side) = self.side {
            write!(f, " (side: {})", side)?;
        }
        if let Some(path) = &self.path {
            write!(f, " (path: {})", path)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Error taxonomy for comparison and fixture operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompareError {
    /// Operand text is not valid JSON, or the operand is absent
    #[error("Invalid {side} payload: {message}")]
    Parse { side: Side, message: String },

    /// A path does not exist in the document, or points at the wrong type
    #[error("Path {path} does not resolve: {reason}")]
    PathResolution { path: String, reason: String },

    /// No item carrying the requested name exists at the resolved path
    #[error("No item named '{name}' found in array at {path}")]
    NotFound { path: String, name: String },

    /// The verdict is fail; the full report is carried for diagnostics
    #[error("{}", mismatch_headline(.mode, .critical))]
    PayloadMismatch {
        mode: ComparisonMode,
        critical: usize,
        report: Box<DiffReport>,
    },

    /// An option is unknown or carries a value of the wrong type
    #[error("Invalid configuration for `{option}`: {reason}")]
    Configuration { option: String, reason: String },

    /// A result document could not be written back out as JSON
    #[error("Serialization failed: {message}")]
    Serialization { message: String },
}

fn mismatch_headline(mode: &ComparisonMode, critical: &usize) -> String {
    match mode {
        ComparisonMode::Exact => {
            format!("Payloads do NOT match! {} critical change(s)", critical)
        }
        ComparisonMode::Subset => format!(
            "Actual payload doesn't meet expectation! {} critical change(s)",
            critical
        ),
    }
}

impl CompareError {
    /// Shorthand for configuration errors raised while validating options
    pub fn configuration(option: impl Into<String>, reason: impl Into<String>) -> Self {
        CompareError::Configuration {
            option: option.into(),
            reason: reason.into(),
        }
    }

    /// The diff report carried by a mismatch, if any
    pub fn report(&self) -> Option<&DiffReport> {
        match self {
            CompareError::PayloadMismatch { report, .. } => Some(report),
            _ => None,
        }
    }
}

/// Conversion from CompareError to ExError
///
/// Lets callers hand any operation error to the logging macros and the CLI
/// without matching on every variant.
impl From<CompareError> for ExError {
    fn from(err: CompareError) -> Self {
        let message = err.to_string();
        match err {
            CompareError::Parse { side, .. } => ExError::new(ExErrorKind::Parse)
                .with_op("parse_payload")
                .with_side(side)
                .with_message(message),

            CompareError::PathResolution { path, .. } => {
                ExError::new(ExErrorKind::PathResolution)
                    .with_path(path)
                    .with_message(message)
            }

            CompareError::NotFound { path, .. } => ExError::new(ExErrorKind::NotFound)
                .with_path(path)
                .with_message(message),

            CompareError::PayloadMismatch { mode, .. } => {
                ExError::new(ExErrorKind::PayloadMismatch)
                    .with_op(format!("assert_payloads_{}", mode))
                    .with_message(message)
            }

            CompareError::Configuration { option, .. } => {
                ExError::new(ExErrorKind::Configuration)
                    .with_op("build_policy")
                    .with_path(option)
                    .with_message(message)
            }

            CompareError::Serialization { .. } => {
                ExError::new(ExErrorKind::Serialization).with_message(message)
            }
        }
    }
}

impl From<std::io::Error> for ExError {
    fn from(err: std::io::Error) -> Self {
        ExError::new(ExErrorKind::Io).with_message(err.to_string())
    }
}

impl From<serde_json::Error> for ExError {
    fn from(err: serde_json::Error) -> Self {
        ExError::new(ExErrorKind::Serialization).with_message(err.to_string())
    }
}
