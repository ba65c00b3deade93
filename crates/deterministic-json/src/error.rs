use thiserror::Error;

/// Errors returned by canonicalization, serialization and parsing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A container directly or transitively contains itself.
    #[error("circular reference detected at {path}")]
    CircularReference {
        /// Location of the container that was re-entered.
        path: String,
    },
    /// The input text is not valid JSON.
    #[error("syntax error at line {line}, column {column}: {message}")]
    Syntax {
        /// 1-based line of the failure (0 when unknown).
        line: usize,
        /// 1-based column of the failure (0 when unknown).
        column: usize,
        /// Parser diagnostic.
        message: String,
    },
    /// The value has no JSON representation.
    #[error("unsupported value: {0}")]
    UnsupportedValue(String),
    /// Containers are nested deeper than the configured limit.
    #[error("nesting depth exceeds limit of {limit} at {path}")]
    DepthLimitExceeded {
        /// Configured maximum depth.
        limit: usize,
        /// Location of the first container past the limit.
        path: String,
    },
}

impl Error {
    pub(crate) fn syntax(err: &serde_json::Error) -> Self {
        // serde_json appends " at line L column C" to its own message.
        let mut message = err.to_string();
        if let Some(at) = message.rfind(" at line ") {
            message.truncate(at);
        }
        Error::Syntax {
            line: err.line(),
            column: err.column(),
            message,
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
