//! Formula error types

use std::ops::Range;
use thiserror::Error;

/// Result type for formula operations
pub type FormulaResult<T> = std::result::Result<T, FormulaError>;

/// Errors that can occur while parsing, evaluating or converting a formula
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormulaError {
    /// Source text does not conform to the grammar
    #[error("Syntax error at {}..{}: {message} (near '{snippet}')", .span.start, .span.end)]
    Syntax {
        message: String,
        /// Byte range of the offending text in the source
        span: Range<usize>,
        /// The offending text itself
        snippet: String,
    },

    /// Function or operator name missing from the registry
    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    /// A function's own evaluation procedure failed
    #[error("Evaluation error: {0}")]
    Evaluation(String),

    /// Wrong number of arguments
    #[error("Wrong number of arguments for {function}: expected {expected}, got {actual}")]
    ArgumentCount {
        function: String,
        expected: String,
        actual: usize,
    },

    /// A `get(path)` reference the runtime context could not resolve
    #[error("Unresolved reference: {0}")]
    UnresolvedReference(String),

    /// A rich-text document that cannot be turned into formula text
    #[error("Conversion error: {0}")]
    Conversion(String),
}

/// Coarse classification of a [`FormulaError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Syntax,
    UnknownFunction,
    Evaluation,
    UnresolvedReference,
    Conversion,
}

impl FormulaError {
    /// Build a syntax error covering `span` of `source`
    pub fn syntax(message: impl Into<String>, source: &str, span: Range<usize>) -> Self {
        let start = span.start.min(source.len());
        let end = span.end.clamp(start, source.len());
        let snippet = source.get(start..end).unwrap_or_default().to_string();
        FormulaError::Syntax {
            message: message.into(),
            span: start..end,
            snippet,
        }
    }

    /// Create a new evaluation error with a message
    pub fn evaluation<S: Into<String>>(msg: S) -> Self {
        FormulaError::Evaluation(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            FormulaError::Syntax { .. } => ErrorKind::Syntax,
            FormulaError::UnknownFunction(_) => ErrorKind::UnknownFunction,
            FormulaError::Evaluation(_) | FormulaError::ArgumentCount { .. } => {
                ErrorKind::Evaluation
            }
            FormulaError::UnresolvedReference(_) => ErrorKind::UnresolvedReference,
            FormulaError::Conversion(_) => ErrorKind::Conversion,
        }
    }

    /// Check if this error came from the parser
    pub fn is_syntax(&self) -> bool {
        self.kind() == ErrorKind::Syntax
    }
}
