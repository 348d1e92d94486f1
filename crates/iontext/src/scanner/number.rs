//! Numeric and timestamp literals.
//!
//! Classification happens in two steps. [`Scanner::scan_numeric_kind`] peeks
//! at the first few characters to separate radix ints and timestamps from
//! plain digits, then [`Scanner::load_number`] reads the whole literal into a
//! buffer with underscores removed and reports what it turned out to be.

use alloc::string::String;

use super::{Scanner, Token};
use crate::{
    error::{FormatError, IonResult, SyntaxError},
    source::CharSource,
};

/// What a numeric token turned out to be once fully read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NumericKind {
    Int,
    Hex,
    Binary,
    Decimal,
    Float,
    Timestamp,
}

/// Characters read during classification, replayed afterwards.
struct Taken {
    chars: [char; 6],
    len: usize,
}

impl Taken {
    fn new() -> Self {
        Self {
            chars: ['\0'; 6],
            len: 0,
        }
    }

    fn record(&mut self, c: Option<char>) -> Option<char> {
        if let Some(ch) = c {
            self.chars[self.len] = ch;
            self.len += 1;
        }
        c
    }
}

impl<S: CharSource> Scanner<S> {
    /// Classifies the numeric token starting at the next character without
    /// consuming any input.
    pub(super) fn scan_numeric_kind(&mut self) -> IonResult<Token> {
        let mut taken = Taken::new();
        let first = taken.record(self.input.read()?);
        let negative = first == Some('-');
        let lead = if negative {
            taken.record(self.input.read()?)
        } else {
            first
        };

        let mut token = Token::UnknownNumeric;
        let mut digits = 1;
        if lead == Some('0') {
            match taken.record(self.input.read()?) {
                Some('x' | 'X') => token = Token::Hex,
                Some('b' | 'B') => token = Token::Binary,
                Some(c) if c.is_ascii_digit() && !negative => digits = 2,
                _ => digits = 0,
            }
        }
        if token == Token::UnknownNumeric && !negative && digits > 0 {
            while digits < 4 {
                match taken.record(self.input.read()?) {
                    Some(c) if c.is_ascii_digit() => digits += 1,
                    _ => break,
                }
            }
            if digits == 4 && matches!(taken.record(self.input.read()?), Some('-' | 'T')) {
                token = Token::Timestamp;
            }
        }

        for &c in taken.chars[..taken.len].iter().rev() {
            self.input.unread(Some(c));
        }
        Ok(token)
    }

    /// Loads the current numeric token into `buf`. Underscores are dropped,
    /// radix prefixes and exponent markers are lowercased, and the literal
    /// must be followed by a value terminator.
    pub fn load_number(&mut self, buf: &mut String) -> IonResult<NumericKind> {
        let token = self.unfinished.take();
        let kind = match token {
            Some(Token::Hex) => {
                self.load_radix_int(buf, 'x', |c| c.is_ascii_hexdigit())?;
                NumericKind::Hex
            }
            Some(Token::Binary) => {
                self.load_radix_int(buf, 'b', |c| matches!(c, '0' | '1'))?;
                NumericKind::Binary
            }
            Some(Token::Timestamp) => {
                self.load_timestamp(buf)?;
                NumericKind::Timestamp
            }
            _ => self.load_decimal_number(buf)?,
        };
        self.expect_value_stop()?;
        Ok(kind)
    }

    fn load_sign(&mut self, buf: &mut String) -> IonResult<()> {
        let c = self.input.read()?;
        if c == Some('-') {
            buf.push('-');
        } else {
            self.input.unread(c);
        }
        Ok(())
    }

    fn load_radix_int(
        &mut self,
        buf: &mut String,
        marker: char,
        is_digit: fn(char) -> bool,
    ) -> IonResult<()> {
        self.load_sign(buf)?;
        // `0` then the marker, both checked during classification
        self.input.read()?;
        self.input.read()?;
        buf.push('0');
        buf.push(marker);
        if self.read_digit_run(buf, is_digit)? == 0 {
            let c = self.input.read()?;
            return Err(self.invalid_char(c));
        }
        Ok(())
    }

    fn load_decimal_number(&mut self, buf: &mut String) -> IonResult<NumericKind> {
        self.load_sign(buf)?;
        let int_start = buf.len();
        let count = self.read_digit_run(buf, |c| c.is_ascii_digit())?;
        if count == 0 {
            let c = self.input.read()?;
            return Err(self.invalid_char(c));
        }
        if count > 1 && buf[int_start..].starts_with('0') {
            return Err(self.error(FormatError::LeadingZero(buf.clone())));
        }

        let mut kind = NumericKind::Int;
        let mut c = self.input.read()?;
        if c == Some('.') {
            buf.push('.');
            self.read_digit_run(buf, |c| c.is_ascii_digit())?;
            kind = NumericKind::Decimal;
            c = self.input.read()?;
        }
        match c {
            Some('e' | 'E') => {
                buf.push('e');
                self.load_exponent(buf)?;
                kind = NumericKind::Float;
            }
            Some('d' | 'D') => {
                buf.push('d');
                self.load_exponent(buf)?;
                kind = NumericKind::Decimal;
            }
            other => self.input.unread(other),
        }
        Ok(kind)
    }

    fn load_exponent(&mut self, buf: &mut String) -> IonResult<()> {
        let mut c = self.input.read()?;
        if let Some(sign @ ('+' | '-')) = c {
            buf.push(sign);
            c = self.input.read()?;
        }
        let mut count = 0;
        while let Some(d) = c.filter(char::is_ascii_digit) {
            buf.push(d);
            count += 1;
            c = self.input.read()?;
        }
        if count == 0 {
            return Err(self.invalid_char(c));
        }
        self.input.unread(c);
        Ok(())
    }

    /// Reads digits accepted by `is_digit`, allowing single underscores
    /// between them. Returns the number of digits read.
    fn read_digit_run(&mut self, buf: &mut String, is_digit: fn(char) -> bool) -> IonResult<usize> {
        let mut count = 0;
        loop {
            match self.input.read()? {
                Some(d) if is_digit(d) => {
                    buf.push(d);
                    count += 1;
                }
                Some('_') => {
                    let next = self.input.peek()?;
                    if count == 0 || !next.is_some_and(is_digit) {
                        buf.push('_');
                        return Err(self.error(FormatError::InvalidUnderscore(buf.clone())));
                    }
                }
                other => {
                    self.input.unread(other);
                    return Ok(count);
                }
            }
        }
    }

    fn read_fixed_digits(&mut self, buf: &mut String, n: usize) -> IonResult<()> {
        for _ in 0..n {
            match self.input.read()? {
                Some(d) if d.is_ascii_digit() => buf.push(d),
                other => return Err(self.invalid_char(other)),
            }
        }
        Ok(())
    }

    fn expect_char(&mut self, buf: &mut String, want: char) -> IonResult<()> {
        match self.input.read()? {
            Some(c) if c == want => {
                buf.push(c);
                Ok(())
            }
            other => Err(self.invalid_char(other)),
        }
    }

    fn timestamp_error(&self, buf: &str, reason: &'static str) -> crate::error::IonError {
        self.error(FormatError::InvalidTimestamp {
            text: buf.into(),
            reason,
        })
    }

    /// Reads `YYYY T | YYYY-MM T | YYYY-MM-DD [T [hh:mm[:ss[.fff]] offset]]`.
    /// Field ranges are checked later when the text is parsed.
    fn load_timestamp(&mut self, buf: &mut String) -> IonResult<()> {
        self.read_fixed_digits(buf, 4)?;
        match self.input.read()? {
            Some('T') => {
                buf.push('T');
                return Ok(());
            }
            Some('-') => buf.push('-'),
            _ => return Err(self.timestamp_error(buf, "expected '-' or 'T' after the year")),
        }
        self.read_fixed_digits(buf, 2)?;
        match self.input.read()? {
            Some('T') => {
                buf.push('T');
                return Ok(());
            }
            Some('-') => buf.push('-'),
            _ => return Err(self.timestamp_error(buf, "month precision requires a trailing 'T'")),
        }
        self.read_fixed_digits(buf, 2)?;
        let c = self.input.read()?;
        if c != Some('T') {
            self.input.unread(c);
            return Ok(());
        }
        buf.push('T');
        if !self.input.peek()?.is_some_and(|c| c.is_ascii_digit()) {
            return Ok(());
        }

        self.read_fixed_digits(buf, 2)?;
        self.expect_char(buf, ':')?;
        self.read_fixed_digits(buf, 2)?;
        let mut c = self.input.read()?;
        if c == Some(':') {
            buf.push(':');
            self.read_fixed_digits(buf, 2)?;
            c = self.input.read()?;
            if c == Some('.') {
                buf.push('.');
                let mut count = 0;
                c = self.input.read()?;
                while let Some(d) = c.filter(char::is_ascii_digit) {
                    buf.push(d);
                    count += 1;
                    c = self.input.read()?;
                }
                if count == 0 {
                    return Err(self.timestamp_error(buf, "fractional seconds need at least one digit"));
                }
            }
        }
        match c {
            Some('Z' | 'z') => buf.push('Z'),
            Some(sign @ ('+' | '-')) => {
                buf.push(sign);
                self.read_fixed_digits(buf, 2)?;
                self.expect_char(buf, ':')?;
                self.read_fixed_digits(buf, 2)?;
            }
            other => {
                self.input.unread(other);
                return Err(self.timestamp_error(buf, "a time of day requires an offset"));
            }
        }
        Ok(())
    }
}
