use alloc::string::String;

use thiserror::Error;

use crate::types::IonType;

/// Convenience alias used throughout the crate.
pub type IonResult<T> = Result<T, IonError>;

/// An error raised while reading Ion text.
///
/// `line` and `column` are the furthest position the scanner had read when the
/// error was detected. Errors are not recoverable: once a reader has returned
/// one, the stream it was reading should be abandoned.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{kind} at {line}:{column}")]
pub struct IonError {
    pub(crate) kind: ErrorKind,
    pub line: usize,
    pub column: usize,
}

impl IonError {
    pub(crate) fn new(kind: impl Into<ErrorKind>, line: usize, column: usize) -> Self {
        Self {
            kind: kind.into(),
            line,
            column,
        }
    }

    /// The category and details of this error.
    #[must_use]
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ErrorKind {
    #[error("syntax error: {0}")]
    Syntax(#[from] SyntaxError),
    #[error("symbol error: {0}")]
    Symbol(#[from] SymbolError),
    #[error("format error: {0}")]
    Format(#[from] FormatError),
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: &'static str, found: IonType },
    #[error("invalid operation: {0}")]
    Usage(&'static str),
}

/// Lexical and grammar errors.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SyntaxError {
    #[error("invalid character '{0}'")]
    InvalidCharacter(char),
    #[error("invalid UTF-8 byte 0x{0:02X}")]
    InvalidUtf8(u8),
    #[error("unexpected end of input")]
    UnexpectedEndOfInput,
    #[error("comments are not allowed inside a {0}")]
    IllegalComment(&'static str),
    #[error("unexpected {token} {context}")]
    UnexpectedToken {
        token: &'static str,
        context: &'static str,
    },
    #[error("mismatched closing delimiter: expected '{expected}', found '{found}'")]
    MismatchedCloser { expected: char, found: char },
    #[error("commas are not allowed between {0} values")]
    CommaNotAllowed(&'static str),
    #[error("field name outside of a struct")]
    FieldNameOutsideStruct,
    #[error("the keyword '{0}' cannot be used as {1} without quotes")]
    KeywordNotAllowed(String, &'static str),
    #[error("'null.{0}' is not a typed null")]
    InvalidNullType(String),
    #[error("invalid escape sequence '\\{0}'")]
    InvalidEscape(char),
    #[error("invalid hex digit '{0}' in escape sequence")]
    InvalidHexDigit(char),
    #[error("escape sequence \\u{{{0:X}}} is not a unicode scalar value")]
    InvalidCodePoint(u32),
    #[error("unpaired surrogate \\u{0:04X}")]
    UnpairedSurrogate(u32),
    #[error("non-ASCII character '{0}' in clob")]
    NonAsciiInClob(char),
    #[error("invalid base64 content: {0}")]
    InvalidBase64(&'static str),
    #[error("containers nested deeper than {0} levels")]
    DepthLimitExceeded(usize),
}

/// Errors raised while resolving symbols or building symbol tables.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SymbolError {
    #[error("symbol ${0} has unknown text")]
    UnknownText(usize),
    #[error("symbol ${sid} is beyond the max id {max_id} of the active symbol table")]
    OutOfRange { sid: usize, max_id: usize },
    #[error("unsupported Ion version marker '{0}'")]
    UnsupportedVersion(String),
    #[error("invalid import: {0}")]
    InvalidImport(String),
    #[error("a symbol table may declare at most one '{0}' field")]
    DuplicateField(&'static str),
    #[error("invalid shared symbol table: {0}")]
    InvalidSharedTable(&'static str),
}

/// Malformed numeric and timestamp literals.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FormatError {
    #[error("leading zero in integer '{0}'")]
    LeadingZero(String),
    #[error("misplaced underscore in '{0}'")]
    InvalidUnderscore(String),
    #[error("invalid {kind} literal '{text}'")]
    InvalidNumber { kind: &'static str, text: String },
    #[error("invalid timestamp '{text}': {reason}")]
    InvalidTimestamp { text: String, reason: &'static str },
    #[error("integer {0} does not fit in {1}")]
    IntegerOverflow(String, &'static str),
}
