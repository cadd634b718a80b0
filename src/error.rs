//! Error Handling for the Rinha Language Interpreter
//!
//! This module defines the single error type used throughout the lexer,
//! parser, and evaluator. Every fallible core operation returns
//! `Result<T, RinhaError>` and propagates failure with `?`; nothing in the
//! core is ever retried. All interpreter errors are fatal by contract: a
//! program either runs to completion or the run terminates with one of
//! these kinds.
//!
//! ## Error Categories
//!
//! ### Lexical Analysis Errors (`LexError`)
//! - Unterminated string literals
//! - Malformed numeric literals
//!
//! ### Parse Errors (`ParseError`)
//! - Unexpected or missing tokens
//! - Malformed statement or expression structure
//!
//! ### Runtime Errors
//! - **`UndefinedSymbol`**: identifier not present in current or global frame
//! - **`TypeError`**: arithmetic on non-integers, cross-type comparison, non-tuple to `first`/`second`
//! - **`DivisionByZero`**: `/` or `%` with a zero divisor
//! - **`StackOverflow`**: call-frame stack exhaustion
//! - **`ResourceLimit`**: string or other bounded-resource exhaustion
//!
//! ### Specialized Errors
//! - **`IOError`**: file system operations, wrapped from `std::io::Error`

use std::error::Error;
use std::fmt;

/// Where in the source an error occurred, for diagnostic rendering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

/// Comprehensive error type for all Rinha interpreter operations.
#[derive(Debug, Clone)]
pub enum RinhaError {
    /// Lexical analysis error during tokenization: unterminated string or
    /// malformed number literal.
    LexError { message: String, location: SourceLocation },

    /// Syntax error during parsing: unexpected or missing token.
    ParseError { message: String, location: SourceLocation },

    /// Reference to an identifier not bound in the current or global frame.
    UndefinedSymbol { name: String, location: SourceLocation },

    /// Type mismatch: arithmetic on a non-integer (other than `+`), a
    /// cross-type comparison, or a non-tuple passed to `first`/`second`.
    TypeError { message: String, location: SourceLocation },

    /// `/` or `%` with a zero divisor.
    DivisionByZero { location: SourceLocation },

    /// Call-frame stack exhausted past the configured depth limit.
    StackOverflow { location: SourceLocation },

    /// A bounded resource (string length, memo cache, …) was exhausted.
    ResourceLimit { message: String },

    /// File system or I/O operation error.
    ///
    /// Wraps standard I/O errors that occur while the CLI driver reads the
    /// source file. Automatically converted from `std::io::Error`.
    IOError(String),
}

impl RinhaError {
    pub fn location(&self) -> Option<SourceLocation> {
        match self {
            RinhaError::LexError { location, .. }
            | RinhaError::ParseError { location, .. }
            | RinhaError::UndefinedSymbol { location, .. }
            | RinhaError::TypeError { location, .. }
            | RinhaError::DivisionByZero { location }
            | RinhaError::StackOverflow { location } => Some(*location),
            RinhaError::ResourceLimit { .. } | RinhaError::IOError(_) => None,
        }
    }
}

impl fmt::Display for RinhaError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RinhaError::LexError { message, .. } => write!(f, "Lexical error: {}", message),
            RinhaError::ParseError { message, .. } => write!(f, "Parse error: {}", message),
            RinhaError::UndefinedSymbol { name, .. } => write!(f, "Undefined symbol: {}", name),
            RinhaError::TypeError { message, .. } => write!(f, "Type error: {}", message),
            RinhaError::DivisionByZero { .. } => write!(f, "Division by zero"),
            RinhaError::StackOverflow { .. } => write!(f, "Stack overflow"),
            RinhaError::ResourceLimit { message } => write!(f, "Resource limit exceeded: {}", message),
            RinhaError::IOError(msg) => write!(f, "IO error: {}", msg),
        }
    }
}

impl Error for RinhaError {}

impl From<std::io::Error> for RinhaError {
    fn from(err: std::io::Error) -> Self {
        RinhaError::IOError(err.to_string())
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, RinhaError>;
