//! Structured error types shared across the nest crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stable machine readable codes carried in [`ErrorInfo::code`].
pub mod codes {
    /// A required trace field was not supplied.
    pub const MISSING_FIELD: &str = "missing-field";
    /// Neither `nlive` nor `samples_n` was supplied.
    pub const MISSING_LIVE_INFO: &str = "missing-live-info";
    /// Both `nlive` and `samples_n` were supplied.
    pub const AMBIGUOUS_LIVE_INFO: &str = "ambiguous-live-info";
    /// A field name is not part of the trace schema or not present on the trace.
    pub const UNKNOWN_FIELD: &str = "unknown-field";
    /// The same field name was supplied twice.
    pub const DUPLICATE_FIELD: &str = "duplicate-field";
    /// A field value has the wrong shape for its name.
    pub const FIELD_TYPE: &str = "field-type";
    /// Per-iteration fields disagree on their length.
    pub const LENGTH_MISMATCH: &str = "length-mismatch";
    /// A field holds a value outside its admissible range.
    pub const INVALID_VALUE: &str = "invalid-value";
    /// Log-likelihoods are not non-decreasing.
    pub const UNSORTED_LOGL: &str = "unsorted-logl";
    /// An iteration index lies past the end of the trace.
    pub const ITERATION_OUT_OF_RANGE: &str = "iteration-out-of-range";
    /// Traces handed to the merger cannot be combined.
    pub const INCOMPATIBLE_RUNS: &str = "incompatible-runs";
    /// The merger was handed an empty set of traces.
    pub const NO_RUNS_TO_MERGE: &str = "no-runs-to-merge";
    /// A configuration file could not be read.
    pub const CONFIG_READ: &str = "config-read";
    /// A configuration document could not be parsed.
    pub const CONFIG_PARSE: &str = "config-parse";
}

/// Structured payload attached to every [`NestError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (field names, lengths, run indices, etc.).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional hint that may help the caller resolve the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Canonical error type for the nest crates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum NestError {
    /// Trace construction and lookup errors.
    #[error("schema error: {0}")]
    Schema(ErrorInfo),
    /// Run merging errors.
    #[error("merge error: {0}")]
    Merge(ErrorInfo),
    /// Configuration loading errors.
    #[error("config error: {0}")]
    Config(ErrorInfo),
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

impl NestError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            NestError::Schema(info)
            | NestError::Merge(info)
            | NestError::Config(info) => info,
        }
    }

    /// Returns the stable code of the payload.
    pub fn code(&self) -> &str {
        &self.info().code
    }
}
