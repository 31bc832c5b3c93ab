//! Unified error type for the GIANT pipeline.
//!
//! Lexing, parsing and evaluation each have their own narrow error shape
//! internally, but every one of them is ultimately reported to the user in
//! the same form: `Error on line <N>: <message>` (see spec §6/§7). `GiantError`
//! is that shared reporting shape.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GiantError {
    #[error("Error on line {line}: {message}")]
    Syntax { line: usize, message: String },

    #[error("Error on line {line}: {message}")]
    Name { line: usize, message: String },

    #[error("Error on line {line}: {message}")]
    Type { line: usize, message: String },

    #[error("Error on line {line}: {message}")]
    Value { line: usize, message: String },

    #[error("Error on line {line}: {message}")]
    Arithmetic { line: usize, message: String },
}

impl GiantError {
    pub fn line(&self) -> usize {
        match self {
            GiantError::Syntax { line, .. }
            | GiantError::Name { line, .. }
            | GiantError::Type { line, .. }
            | GiantError::Value { line, .. }
            | GiantError::Arithmetic { line, .. } => *line,
        }
    }

    pub fn syntax(line: usize, message: impl Into<String>) -> Self {
        GiantError::Syntax { line, message: message.into() }
    }

    pub fn name(line: usize, message: impl Into<String>) -> Self {
        GiantError::Name { line, message: message.into() }
    }

    pub fn type_error(line: usize, message: impl Into<String>) -> Self {
        GiantError::Type { line, message: message.into() }
    }

    pub fn value(line: usize, message: impl Into<String>) -> Self {
        GiantError::Value { line, message: message.into() }
    }

    pub fn arithmetic(line: usize, message: impl Into<String>) -> Self {
        GiantError::Arithmetic { line, message: message.into() }
    }
}
