use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error as ThisError;

///
/// EngineError
///
/// Explicit failures of the reconstruction engine. Irregular fields never
/// reach this type; each stage absorbs them into its defaults.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize, ThisError)]
pub enum EngineError {
    #[error("invalid input shape: expected {expected}, found {actual}")]
    InvalidInputShape { expected: String, actual: String },

    #[error("passport decode failed: {reason}")]
    PassportDecode { reason: String },

    #[error("{path}: {source}")]
    Context {
        path: String,
        #[source]
        source: Box<Self>,
    },
}

impl EngineError {
    /// Build a shape error describing the JSON kind that was found.
    pub(crate) fn invalid_shape(expected: &str, found: &Value) -> Self {
        Self::InvalidInputShape {
            expected: expected.to_string(),
            actual: json_kind(found).to_string(),
        }
    }

    pub(crate) fn passport_decode(reason: impl Into<String>) -> Self {
        Self::PassportDecode {
            reason: reason.into(),
        }
    }

    /// Stable classification of the innermost failure.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInputShape { .. } => ErrorKind::InvalidInputShape,
            Self::PassportDecode { .. } => ErrorKind::PassportDecodeError,
            Self::Context { source, .. } => source.kind(),
        }
    }

    /// Prepend a field segment to the error path.
    #[must_use]
    pub fn with_field(self, field: impl AsRef<str>) -> Self {
        self.with_path_segment(field.as_ref())
    }

    /// Prepend an index segment to the error path.
    #[must_use]
    pub fn with_index(self, index: usize) -> Self {
        self.with_path_segment(format!("[{index}]"))
    }

    /// Return the full contextual path, if available.
    #[must_use]
    pub const fn path(&self) -> Option<&str> {
        match self {
            Self::Context { path, .. } => Some(path.as_str()),
            _ => None,
        }
    }

    /// Return the innermost, non-context error variant.
    #[must_use]
    pub fn leaf(&self) -> &Self {
        match self {
            Self::Context { source, .. } => source.leaf(),
            _ => self,
        }
    }

    fn with_path_segment(self, segment: impl Into<String>) -> Self {
        let segment = segment.into();
        match self {
            Self::Context { path, source } => Self::Context {
                path: join_segments(segment.as_str(), path.as_str()),
                source,
            },
            source => Self::Context {
                path: segment,
                source: Box::new(source),
            },
        }
    }
}

fn join_segments(prefix: &str, suffix: &str) -> String {
    if suffix.starts_with('[') {
        format!("{prefix}{suffix}")
    } else {
        format!("{prefix}.{suffix}")
    }
}

///
/// ErrorKind
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum ErrorKind {
    /// The caller handed over something that is not list-shaped (or not an
    /// object where a batch document was expected).
    InvalidInputShape,

    /// A batch-level passport string could not be decoded into an object.
    PassportDecodeError,
}

/// Short name of a JSON value's kind, used in shape errors.
#[must_use]
pub const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

///
/// TESTS
///
