use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse { line: usize, kind: ParseErrorKind },
    #[error("Missing required record: {0}")]
    MissingRecord(String),
    #[error("Unsupported structure file format: {0}")]
    UnsupportedFormat(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseErrorKind {
    #[error("Invalid integer in {field} (value: '{value}')")]
    InvalidInt { field: String, value: String },
    #[error("Invalid float in {field} (value: '{value}')")]
    InvalidFloat { field: String, value: String },
    #[error("Required field {field} is empty")]
    MissingField { field: String },
    #[error("Required column {column} is absent from the atom table")]
    MissingColumn { column: String },
    #[error("Line is too short for an atom record (must be at least {min} chars)")]
    LineTooShort { min: usize },
    #[error("Atom table ended mid-row ({found} of {expected} values)")]
    TruncatedRow { expected: usize, found: usize },
    #[error("Multi-line text field inside the atom table")]
    TextFieldInTable,
}

impl ParseError {
    pub(crate) fn at(line: usize, kind: ParseErrorKind) -> Self {
        ParseError::Parse { line, kind }
    }
}
