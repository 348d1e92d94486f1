//! Character sources and the pushback buffer the scanner reads through.
//!
//! A [`CharSource`] yields Unicode scalar values one at a time and knows
//! nothing about Ion. [`Lookahead`] wraps a source with a small pushback
//! stack so the scanner can read ahead to classify a token and then return
//! the characters it did not consume.

use alloc::vec::Vec;
use core::{iter::Fuse, str::Chars};

use crate::error::{IonError, IonResult, SyntaxError};

/// A stream of characters for the scanner.
pub trait CharSource {
    /// Returns the next character, or `Ok(None)` once input is exhausted.
    ///
    /// After returning `Ok(None)` a source must keep returning `Ok(None)`.
    fn next_char(&mut self) -> Result<Option<char>, SyntaxError>;
}

/// In-memory text.
#[derive(Debug, Clone)]
pub struct StrSource<'a> {
    chars: Chars<'a>,
}

impl<'a> StrSource<'a> {
    #[must_use]
    pub fn new(text: &'a str) -> Self {
        Self { chars: text.chars() }
    }
}

impl CharSource for StrSource<'_> {
    #[inline]
    fn next_char(&mut self) -> Result<Option<char>, SyntaxError> {
        Ok(self.chars.next())
    }
}

/// UTF-8 encoded bytes, decoded lazily. A leading byte order mark is skipped.
#[derive(Debug, Clone)]
pub struct Utf8Source<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Utf8Source<'a> {
    #[must_use]
    pub fn new(bytes: &'a [u8]) -> Self {
        let pos = if bytes.starts_with(&[0xEF, 0xBB, 0xBF]) { 3 } else { 0 };
        Self { bytes, pos }
    }
}

impl CharSource for Utf8Source<'_> {
    fn next_char(&mut self) -> Result<Option<char>, SyntaxError> {
        let rest = &self.bytes[self.pos..];
        if rest.is_empty() {
            return Ok(None);
        }
        match bstr::decode_utf8(rest) {
            (Some(ch), len) => {
                self.pos += len;
                Ok(Some(ch))
            }
            (None, _) => Err(SyntaxError::InvalidUtf8(rest[0])),
        }
    }
}

/// Any iterator of characters.
#[derive(Debug, Clone)]
pub struct IterSource<I: Iterator<Item = char>> {
    iter: Fuse<I>,
}

impl<I: Iterator<Item = char>> IterSource<I> {
    pub fn new(iter: I) -> Self {
        Self { iter: iter.fuse() }
    }
}

impl<I: Iterator<Item = char>> CharSource for IterSource<I> {
    #[inline]
    fn next_char(&mut self) -> Result<Option<char>, SyntaxError> {
        Ok(self.iter.next())
    }
}

/// A character source with pushback and position tracking.
///
/// Positions are a high-water mark: characters that are unread and read again
/// do not move the line/column counters a second time.
#[derive(Debug)]
pub(crate) struct Lookahead<S> {
    source: S,
    pushed: Vec<char>,
    line: usize,
    column: usize,
}

impl<S: CharSource> Lookahead<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            pushed: Vec::new(),
            line: 1,
            column: 0,
        }
    }

    #[inline]
    pub fn read(&mut self) -> IonResult<Option<char>> {
        if let Some(ch) = self.pushed.pop() {
            return Ok(Some(ch));
        }
        match self.source.next_char() {
            Ok(Some(ch)) => {
                if ch == '\n' {
                    self.line += 1;
                    self.column = 0;
                } else {
                    self.column += 1;
                }
                Ok(Some(ch))
            }
            Ok(None) => Ok(None),
            Err(err) => Err(self.error(err)),
        }
    }

    /// Pushes a character back so the next [`read`](Self::read) returns it.
    /// Unreading end of input is a no-op because sources are fused.
    #[inline]
    pub fn unread(&mut self, ch: Option<char>) {
        if let Some(ch) = ch {
            self.pushed.push(ch);
        }
    }

    #[inline]
    pub fn peek(&mut self) -> IonResult<Option<char>> {
        let ch = self.read()?;
        self.unread(ch);
        Ok(ch)
    }

    pub fn position(&self) -> (usize, usize) {
        (self.line, self.column)
    }

    pub fn error(&self, kind: impl Into<crate::error::ErrorKind>) -> IonError {
        IonError::new(kind, self.line, self.column)
    }
}
