//! Error taxonomy for reform parsing, validation and application
//!
//! Every variant names the offending key, year or value so that a reform
//! author can correct the input without digging through the code.

use std::path::PathBuf;
use thiserror::Error;

/// Crate-wide result type
pub type Result<T> = std::result::Result<T, PolicyError>;

const DIAGNOSTIC_RULE: &str = "----------------------------------------------------------";

/// Errors raised while building a policy or implementing a reform
#[derive(Debug, Error)]
pub enum PolicyError {
    /// Wrong container type, e.g. a reform that is not a JSON object
    #[error("{context} is not a mapping (found {found})")]
    InputShape { context: String, found: String },

    /// Non-string parameter key or non-integer year key
    #[error("{context} key {key:?} is not {expected}")]
    KeyType {
        context: String,
        key: String,
        expected: &'static str,
    },

    /// Reform year outside `[max(start_year, current_year), end_year]`
    #[error("reform provision in year={year} {relation} {bound_name}={bound}")]
    TemporalWindow {
        year: i32,
        relation: &'static str,
        bound_name: &'static str,
        bound: i32,
    },

    /// Reform text that is not valid JSON after comment stripping
    #[error("reform file {} contains invalid JSON: {source}", path.display())]
    MalformedJson {
        path: PathBuf,
        /// Comment-stripped text handed to the JSON parser
        text: String,
        #[source]
        source: serde_json::Error,
    },

    /// Reform file path does not resolve to a regular file
    #[error("reform file {} could not be found", path.display())]
    ResourceNotFound { path: PathBuf },

    /// Rate mapping or reform value whose shape does not fit
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    /// Year not covered by the baked-in rate tables
    #[error("no default {series} rate for year {year}")]
    UnsupportedYear { series: &'static str, year: i32 },

    /// Reform names a parameter absent from the parameter table
    #[error("parameter name {0} not in parameter values dictionary")]
    UnknownParameter(String),

    /// Leaf value of the wrong kind
    #[error("invalid value for {name} in {year}: {message}")]
    InvalidValue {
        name: String,
        year: i32,
        message: String,
    },

    /// Bad window bounds or cursor position
    #[error("invalid policy window: {0}")]
    InvalidWindow(String),

    /// Defaults table that does not fit the expected schema
    #[error("invalid parameter defaults: {0}")]
    Defaults(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl PolicyError {
    /// Delimited echo of the text that failed to parse, for pasting into an
    /// external JSON linter. `None` for every other variant.
    pub fn diagnostic(&self) -> Option<String> {
        match self {
            PolicyError::MalformedJson { text, .. } => Some(format!(
                "TO FIND FIRST JSON SYNTAX ERROR,\n\
                 COPY TEXT BETWEEN LINES AND PASTE INTO A JSON LINTER\n\
                 {rule}\n{body}\n{rule}\n",
                rule = DIAGNOSTIC_RULE,
                body = text.trim(),
            )),
            _ => None,
        }
    }

    pub(crate) fn key_type(context: impl Into<String>, key: impl Into<String>, expected: &'static str) -> Self {
        PolicyError::KeyType {
            context: context.into(),
            key: key.into(),
            expected,
        }
    }

    pub(crate) fn invalid_value(name: &str, year: i32, message: impl Into<String>) -> Self {
        PolicyError::InvalidValue {
            name: name.to_string(),
            year,
            message: message.into(),
        }
    }
}

/// Short name of a JSON value's type for error messages
pub(crate) fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
