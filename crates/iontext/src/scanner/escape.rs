//! Backslash escapes inside strings, quoted symbols and clobs.
//!
//! Hex escapes are accumulated digit by digit in a [`HexEscapeBuffer`]
//! (`\xHH`, `\uHHHH` or `\UHHHHHHHH`); the scanner feeds it characters as it
//! reads them and receives the code point once the last digit arrives.

use super::Scanner;
use crate::{
    error::{IonResult, SyntaxError},
    source::CharSource,
};

/// What an escape sequence decoded to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Escaped {
    /// A code point; may be half of a surrogate pair when it came from `\u`.
    Code(u32),
    /// An escaped line ending, which contributes nothing to the text.
    Elided,
}

/// Which escapes are legal where the backslash was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EscapeMode {
    Text,
    Clob,
}

/// Accumulates a fixed number of hexadecimal digits into a code point.
#[derive(Debug)]
pub(crate) struct HexEscapeBuffer {
    acc: u32,
    len: u8,
    width: u8,
}

impl HexEscapeBuffer {
    pub fn new(width: u8) -> Self {
        debug_assert!(matches!(width, 2 | 4 | 8));
        Self {
            acc: 0,
            len: 0,
            width,
        }
    }

    #[inline]
    fn hex_val(c: char) -> Option<u32> {
        c.to_digit(16)
    }

    /// Feeds one digit. Returns `Ok(Some(code))` after the final digit.
    pub fn feed(&mut self, c: char) -> Result<Option<u32>, SyntaxError> {
        let d = Self::hex_val(c).ok_or(SyntaxError::InvalidHexDigit(c))?;
        self.acc = (self.acc << 4) | d;
        self.len += 1;
        if self.len == self.width {
            let code = self.acc;
            self.acc = 0;
            self.len = 0;
            Ok(Some(code))
        } else {
            Ok(None)
        }
    }
}

pub(crate) fn is_high_surrogate(code: u32) -> bool {
    (0xD800..=0xDBFF).contains(&code)
}

pub(crate) fn is_low_surrogate(code: u32) -> bool {
    (0xDC00..=0xDFFF).contains(&code)
}

impl<S: CharSource> Scanner<S> {
    /// Decodes the escape following a backslash that has already been read.
    pub(crate) fn read_escape(&mut self, mode: EscapeMode) -> IonResult<Escaped> {
        let Some(c) = self.input.read()? else {
            return Err(self.input.error(SyntaxError::UnexpectedEndOfInput));
        };
        let code = match c {
            'a' => 0x07,
            'b' => 0x08,
            't' => 0x09,
            'n' => 0x0A,
            'v' => 0x0B,
            'f' => 0x0C,
            'r' => 0x0D,
            '0' => 0x00,
            '?' | '\'' | '"' | '/' | '\\' => c as u32,
            'x' => return self.read_hex_escape(2).map(Escaped::Code),
            'u' if mode == EscapeMode::Text => return self.read_hex_escape(4).map(Escaped::Code),
            'U' if mode == EscapeMode::Text => return self.read_hex_escape(8).map(Escaped::Code),
            '\n' => return Ok(Escaped::Elided),
            '\r' => {
                let next = self.input.read()?;
                if next != Some('\n') {
                    self.input.unread(next);
                }
                return Ok(Escaped::Elided);
            }
            other => return Err(self.input.error(SyntaxError::InvalidEscape(other))),
        };
        Ok(Escaped::Code(code))
    }

    fn read_hex_escape(&mut self, width: u8) -> IonResult<u32> {
        let mut buffer = HexEscapeBuffer::new(width);
        loop {
            let Some(c) = self.input.read()? else {
                return Err(self.input.error(SyntaxError::UnexpectedEndOfInput));
            };
            match buffer.feed(c) {
                Ok(Some(code)) => return Ok(code),
                Ok(None) => {}
                Err(err) => return Err(self.input.error(err)),
            }
        }
    }

    /// Decodes a text escape into a `char`, joining `\uD8xx\uDCxx` pairs.
    pub(crate) fn read_text_escape(&mut self) -> IonResult<Option<char>> {
        let code = match self.read_escape(EscapeMode::Text)? {
            Escaped::Elided => return Ok(None),
            Escaped::Code(code) => code,
        };
        if is_low_surrogate(code) {
            return Err(self.input.error(SyntaxError::UnpairedSurrogate(code)));
        }
        if !is_high_surrogate(code) {
            return char::from_u32(code)
                .map(Some)
                .ok_or_else(|| self.input.error(SyntaxError::InvalidCodePoint(code)));
        }
        // A high surrogate must be followed directly by an escaped low one.
        if self.input.read()? != Some('\\') {
            return Err(self.input.error(SyntaxError::UnpairedSurrogate(code)));
        }
        let low = match self.read_escape(EscapeMode::Text)? {
            Escaped::Code(low) if is_low_surrogate(low) => low,
            _ => return Err(self.input.error(SyntaxError::UnpairedSurrogate(code))),
        };
        let joined = 0x10000 + ((code - 0xD800) << 10) + (low - 0xDC00);
        char::from_u32(joined)
            .map(Some)
            .ok_or_else(|| self.input.error(SyntaxError::InvalidCodePoint(joined)))
    }

    /// Decodes a clob escape into a byte.
    pub(crate) fn read_clob_escape(&mut self) -> IonResult<Option<u8>> {
        match self.read_escape(EscapeMode::Clob)? {
            Escaped::Elided => Ok(None),
            Escaped::Code(code) => u8::try_from(code)
                .map(Some)
                .map_err(|_| self.input.error(SyntaxError::InvalidCodePoint(code))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_decodes_after_exact_width() {
        let mut buf = HexEscapeBuffer::new(4);
        assert_eq!(buf.feed('0'), Ok(None));
        assert_eq!(buf.feed('0'), Ok(None));
        assert_eq!(buf.feed('e'), Ok(None));
        assert_eq!(buf.feed('9'), Ok(Some(0xE9)));
        // resets for the next escape
        assert_eq!(buf.feed('F'), Ok(None));
    }

    #[test]
    fn buffer_rejects_non_hex() {
        let mut buf = HexEscapeBuffer::new(2);
        assert_eq!(buf.feed('g'), Err(SyntaxError::InvalidHexDigit('g')));
    }
}
