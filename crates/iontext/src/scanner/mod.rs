//! Scanner: turns characters into Ion text tokens.
//!
//! What it does
//! - Skips whitespace and comments, then classifies the next token from its
//!   first few characters.
//! - Self-delimiting tokens (punctuation, EOF) are fully consumed by
//!   [`Scanner::next_token`]. Every other token is returned *unfinished*: the
//!   scanner has recognised what it is but has not yet read its content. The
//!   parser then calls the matching `load_*` method to materialise it, or does
//!   nothing, in which case the next `next_token` call skips the content.
//! - Provides the container and lob skipping routines used when a caller
//!   moves past a value without reading it.
//!
//! Lookahead
//! - All lookahead goes through the pushback stack of [`Lookahead`]. Numeric
//!   classification reads up to six characters and unreads every one of them
//!   before returning, so the `load_*` routines always start from the first
//!   character of the token.
//! - [`Scanner::unread_token`] restores a token the parser peeked at, which is
//!   how the parser looks past a symbol to decide whether it is an annotation.
//!
//! Comments
//! - Whitespace skipping takes a [`Comments`] strategy. Outside lobs comments
//!   are ignored; inside clobs they are an error; inside blobs `/` is a base64
//!   character, so skipping stops at it.

mod escape;
mod lob;
mod number;


use alloc::{string::String, vec};

pub(crate) use lob::LobKind;
pub(crate) use number::NumericKind;
use tracing::trace;

use crate::{
    error::{ErrorKind, IonError, IonResult, SyntaxError},
    source::{CharSource, Lookahead},
};

/// Lexical categories produced by the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Token {
    Eof,
    /// Digits that are an int, decimal or float; resolved by `load_number`.
    UnknownNumeric,
    Hex,
    Binary,
    Timestamp,
    /// `+inf`
    FloatInf,
    /// `-inf`
    FloatMinusInf,
    SymbolIdentifier,
    SymbolQuoted,
    SymbolOperator,
    StringDoubleQuote,
    StringTripleQuote,
    Comma,
    Colon,
    DoubleColon,
    OpenParen,
    CloseParen,
    OpenBrace,
    CloseBrace,
    OpenSquare,
    CloseSquare,
    OpenDoubleBrace,
    CloseDoubleBrace,
}

pub(crate) const TOKEN_COUNT: usize = 23;

impl Token {
    pub(crate) const ALL: [Token; TOKEN_COUNT] = [
        Token::Eof,
        Token::UnknownNumeric,
        Token::Hex,
        Token::Binary,
        Token::Timestamp,
        Token::FloatInf,
        Token::FloatMinusInf,
        Token::SymbolIdentifier,
        Token::SymbolQuoted,
        Token::SymbolOperator,
        Token::StringDoubleQuote,
        Token::StringTripleQuote,
        Token::Comma,
        Token::Colon,
        Token::DoubleColon,
        Token::OpenParen,
        Token::CloseParen,
        Token::OpenBrace,
        Token::CloseBrace,
        Token::OpenSquare,
        Token::CloseSquare,
        Token::OpenDoubleBrace,
        Token::CloseDoubleBrace,
    ];

    /// Returns `true` if the token has content left to load or skip.
    #[must_use]
    pub(crate) const fn is_unfinished(self) -> bool {
        matches!(
            self,
            Token::UnknownNumeric
                | Token::Hex
                | Token::Binary
                | Token::Timestamp
                | Token::SymbolIdentifier
                | Token::SymbolQuoted
                | Token::SymbolOperator
                | Token::StringDoubleQuote
                | Token::StringTripleQuote
        )
    }

    pub(crate) const fn is_numeric(self) -> bool {
        matches!(
            self,
            Token::UnknownNumeric | Token::Hex | Token::Binary | Token::Timestamp
        )
    }

    /// The character a closing token stands for.
    pub(crate) const fn closer(self) -> Option<char> {
        match self {
            Token::CloseParen => Some(')'),
            Token::CloseBrace => Some('}'),
            Token::CloseSquare => Some(']'),
            _ => None,
        }
    }

    pub(crate) const fn describe(self) -> &'static str {
        match self {
            Token::Eof => "end of input",
            Token::UnknownNumeric | Token::Hex | Token::Binary => "number",
            Token::Timestamp => "timestamp",
            Token::FloatInf | Token::FloatMinusInf => "infinity",
            Token::SymbolIdentifier | Token::SymbolQuoted => "symbol",
            Token::SymbolOperator => "operator",
            Token::StringDoubleQuote | Token::StringTripleQuote => "string",
            Token::Comma => "','",
            Token::Colon => "':'",
            Token::DoubleColon => "'::'",
            Token::OpenParen => "'('",
            Token::CloseParen => "')'",
            Token::OpenBrace => "'{'",
            Token::CloseBrace => "'}'",
            Token::OpenSquare => "'['",
            Token::CloseSquare => "']'",
            Token::OpenDoubleBrace => "'{{'",
            Token::CloseDoubleBrace => "'}}'",
        }
    }
}

/// How whitespace skipping treats `/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Comments {
    /// Skip `// ...` and `/* ... */`.
    Ignore,
    /// Comments are illegal in the named context.
    Error(&'static str),
    /// Stop at `/` and return it as content.
    Break,
}

#[inline]
pub(crate) fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0B' | '\x0C')
}

#[inline]
pub(crate) fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$'
}

#[inline]
pub(crate) fn is_identifier_part(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

#[inline]
pub(crate) fn is_operator_char(c: char) -> bool {
    matches!(
        c,
        '!' | '#' | '%' | '&' | '*' | '+' | '-' | '.' | '/' | ';' | '<' | '=' | '>' | '?' | '@'
            | '^' | '`' | '|' | '~'
    )
}

/// Characters that may directly follow a number, timestamp or `+inf`.
#[inline]
fn is_value_stop(c: char) -> bool {
    is_whitespace(c) || matches!(c, '{' | '}' | '[' | ']' | '(' | ')' | ',' | '"' | '\'')
}

/// Unescaped control characters are not allowed in text. `newlines` says
/// whether raw line breaks are acceptable (long strings only).
#[inline]
fn is_illegal_control(c: char, newlines: bool) -> bool {
    match c {
        '\t' | '\x0B' | '\x0C' => false,
        '\n' | '\r' => !newlines,
        c => c < ' ',
    }
}

pub(crate) struct Scanner<S> {
    input: Lookahead<S>,
    unfinished: Option<Token>,
    scratch: String,
}

impl<S: CharSource> Scanner<S> {
    pub fn new(source: S) -> Self {
        Self {
            input: Lookahead::new(source),
            unfinished: None,
            scratch: String::new(),
        }
    }

    pub fn position(&self) -> (usize, usize) {
        self.input.position()
    }

    pub fn error(&self, kind: impl Into<ErrorKind>) -> IonError {
        self.input.error(kind)
    }

    fn eof_error(&self) -> IonError {
        self.input.error(SyntaxError::UnexpectedEndOfInput)
    }

    fn invalid_char(&self, c: Option<char>) -> IonError {
        match c {
            Some(c) => self.input.error(SyntaxError::InvalidCharacter(c)),
            None => self.eof_error(),
        }
    }

    #[cfg(test)]
    pub(crate) fn unfinished(&self) -> Option<Token> {
        self.unfinished
    }

    /// Scans the next token. Content of a previous unfinished token that was
    /// never loaded is skipped first.
    pub fn next_token(&mut self) -> IonResult<Token> {
        if self.unfinished.is_some() {
            self.skip_token()?;
        }
        let c = self.skip_whitespace(Comments::Ignore)?;
        let token = match c {
            None => Token::Eof,
            Some(',') => Token::Comma,
            Some('[') => Token::OpenSquare,
            Some(']') => Token::CloseSquare,
            Some('(') => Token::OpenParen,
            Some(')') => Token::CloseParen,
            Some('}') => Token::CloseBrace,
            Some('{') => {
                let next = self.input.read()?;
                if next == Some('{') {
                    Token::OpenDoubleBrace
                } else {
                    self.input.unread(next);
                    Token::OpenBrace
                }
            }
            Some(':') => {
                let next = self.input.read()?;
                if next == Some(':') {
                    Token::DoubleColon
                } else {
                    self.input.unread(next);
                    Token::Colon
                }
            }
            Some('"') => Token::StringDoubleQuote,
            Some('\'') => self.scan_single_quote()?,
            Some('+') => {
                if self.scan_inf()? {
                    Token::FloatInf
                } else {
                    self.input.unread(Some('+'));
                    Token::SymbolOperator
                }
            }
            Some('-') => {
                let next = self.input.peek()?;
                if next.is_some_and(|n| n.is_ascii_digit()) {
                    self.input.unread(Some('-'));
                    self.scan_numeric_kind()?
                } else if self.scan_inf()? {
                    Token::FloatMinusInf
                } else {
                    self.input.unread(Some('-'));
                    Token::SymbolOperator
                }
            }
            Some(c) if c.is_ascii_digit() => {
                self.input.unread(Some(c));
                self.scan_numeric_kind()?
            }
            Some(c) if is_identifier_start(c) => {
                self.input.unread(Some(c));
                Token::SymbolIdentifier
            }
            Some(c) if is_operator_char(c) => {
                self.input.unread(Some(c));
                Token::SymbolOperator
            }
            Some(c) => return Err(self.input.error(SyntaxError::InvalidCharacter(c))),
        };
        if token.is_unfinished() {
            self.unfinished = Some(token);
        }
        trace!(?token, "scanned");
        Ok(token)
    }

    /// Puts a token returned by [`next_token`](Self::next_token) back so that
    /// the next call scans it again. Only valid before any of its content has
    /// been loaded.
    pub fn unread_token(&mut self, token: Token) {
        let chars: &[char] = match token {
            Token::Eof
            | Token::UnknownNumeric
            | Token::Hex
            | Token::Binary
            | Token::Timestamp
            | Token::SymbolIdentifier
            | Token::SymbolOperator => &[],
            Token::FloatInf => &['+', 'i', 'n', 'f'],
            Token::FloatMinusInf => &['-', 'i', 'n', 'f'],
            Token::SymbolQuoted => &['\''],
            Token::StringDoubleQuote => &['"'],
            Token::StringTripleQuote => &['\'', '\'', '\''],
            Token::Comma => &[','],
            Token::Colon => &[':'],
            Token::DoubleColon => &[':', ':'],
            Token::OpenParen => &['('],
            Token::CloseParen => &[')'],
            Token::OpenBrace => &['{'],
            Token::CloseBrace => &['}'],
            Token::OpenSquare => &['['],
            Token::CloseSquare => &[']'],
            Token::OpenDoubleBrace => &['{', '{'],
            Token::CloseDoubleBrace => &['}', '}'],
        };
        for &c in chars.iter().rev() {
            self.input.unread(Some(c));
        }
        self.unfinished = None;
    }

    /// After a `'`: either a quoted symbol or the start of a long string.
    fn scan_single_quote(&mut self) -> IonResult<Token> {
        let first = self.input.read()?;
        if first != Some('\'') {
            self.input.unread(first);
            return Ok(Token::SymbolQuoted);
        }
        let second = self.input.read()?;
        if second == Some('\'') {
            return Ok(Token::StringTripleQuote);
        }
        // `''` is the empty symbol; leave its closing quote for the loader.
        self.input.unread(second);
        self.input.unread(first);
        Ok(Token::SymbolQuoted)
    }

    /// After a sign: consumes `inf` if it is followed by a value stop.
    fn scan_inf(&mut self) -> IonResult<bool> {
        const INF: [char; 3] = ['i', 'n', 'f'];
        for (i, want) in INF.iter().enumerate() {
            let c = self.input.read()?;
            if c != Some(*want) {
                self.input.unread(c);
                for &back in INF[..i].iter().rev() {
                    self.input.unread(Some(back));
                }
                return Ok(false);
            }
        }
        if self.at_value_stop()? {
            Ok(true)
        } else {
            for &back in INF.iter().rev() {
                self.input.unread(Some(back));
            }
            Ok(false)
        }
    }

    /// Returns whether the next character ends a value, without consuming it.
    fn at_value_stop(&mut self) -> IonResult<bool> {
        let c = self.input.read()?;
        let stop = match c {
            None => true,
            Some('/') => matches!(self.input.peek()?, Some('/' | '*')),
            Some(c) => is_value_stop(c),
        };
        self.input.unread(c);
        Ok(stop)
    }

    fn expect_value_stop(&mut self) -> IonResult<()> {
        if self.at_value_stop()? {
            return Ok(());
        }
        let c = self.input.read()?;
        Err(self.invalid_char(c))
    }

    /// Skips whitespace and, depending on `comments`, comments. Returns the
    /// first character that is neither, already consumed.
    pub(crate) fn skip_whitespace(&mut self, comments: Comments) -> IonResult<Option<char>> {
        loop {
            match self.input.read()? {
                Some(c) if is_whitespace(c) => {}
                Some('/') => {
                    if comments == Comments::Break {
                        return Ok(Some('/'));
                    }
                    let next = self.input.peek()?;
                    if !matches!(next, Some('/' | '*')) {
                        return Ok(Some('/'));
                    }
                    if let Comments::Error(context) = comments {
                        return Err(self.input.error(SyntaxError::IllegalComment(context)));
                    }
                    self.input.read()?;
                    if next == Some('/') {
                        self.skip_line_comment()?;
                    } else {
                        self.skip_block_comment()?;
                    }
                }
                other => return Ok(other),
            }
        }
    }

    fn skip_line_comment(&mut self) -> IonResult<()> {
        loop {
            match self.input.read()? {
                None | Some('\n') => return Ok(()),
                Some(_) => {}
            }
        }
    }

    fn skip_block_comment(&mut self) -> IonResult<()> {
        loop {
            match self.input.read()? {
                None => return Err(self.eof_error()),
                Some('*') => {
                    let next = self.input.peek()?;
                    if next == Some('/') {
                        self.input.read()?;
                        return Ok(());
                    }
                }
                Some(_) => {}
            }
        }
    }

    /// Reads the character following `null`; returns the type name if it is
    /// a `.` suffix, leaving anything else in place. The type name must not
    /// run into further identifier characters.
    pub fn load_null_suffix(&mut self, buf: &mut String) -> IonResult<bool> {
        let c = self.input.read()?;
        if c != Some('.') {
            self.input.unread(c);
            return Ok(false);
        }
        loop {
            match self.input.read()? {
                Some(c) if c.is_ascii_alphabetic() => buf.push(c),
                Some(c) if is_identifier_part(c) => {
                    return Err(self.error(SyntaxError::InvalidCharacter(c)));
                }
                other => {
                    self.input.unread(other);
                    return Ok(true);
                }
            }
        }
    }

    pub fn load_symbol_identifier(&mut self, buf: &mut String) -> IonResult<()> {
        self.unfinished = None;
        loop {
            match self.input.read()? {
                Some(c) if is_identifier_part(c) => buf.push(c),
                other => {
                    self.input.unread(other);
                    return Ok(());
                }
            }
        }
    }

    pub fn load_symbol_operator(&mut self, buf: &mut String) -> IonResult<()> {
        self.unfinished = None;
        loop {
            match self.input.read()? {
                Some('/') if matches!(self.input.peek()?, Some('/' | '*')) => {
                    self.input.unread(Some('/'));
                    return Ok(());
                }
                Some(c) if is_operator_char(c) => buf.push(c),
                other => {
                    self.input.unread(other);
                    return Ok(());
                }
            }
        }
    }

    pub fn load_quoted_symbol(&mut self, buf: &mut String) -> IonResult<()> {
        self.unfinished = None;
        self.load_short_text(buf, '\'')
    }

    pub fn load_short_string(&mut self, buf: &mut String) -> IonResult<()> {
        self.unfinished = None;
        self.load_short_text(buf, '"')
    }

    fn load_short_text(&mut self, buf: &mut String, quote: char) -> IonResult<()> {
        loop {
            match self.input.read()? {
                None => return Err(self.eof_error()),
                Some(c) if c == quote => return Ok(()),
                Some('\\') => {
                    if let Some(ch) = self.read_text_escape()? {
                        buf.push(ch);
                    }
                }
                Some(c) if is_illegal_control(c, false) => {
                    return Err(self.input.error(SyntaxError::InvalidCharacter(c)));
                }
                Some(c) => buf.push(c),
            }
        }
    }

    /// Loads a `'''` string including any following segments, which are
    /// concatenated.
    pub fn load_long_string(&mut self, buf: &mut String) -> IonResult<()> {
        self.unfinished = None;
        loop {
            self.load_long_segment(buf)?;
            if !self.next_long_segment(Comments::Ignore)? {
                return Ok(());
            }
        }
    }

    fn load_long_segment(&mut self, buf: &mut String) -> IonResult<()> {
        loop {
            match self.input.read()? {
                None => return Err(self.eof_error()),
                Some('\'') => {
                    if self.consume_closing_quotes()? {
                        return Ok(());
                    }
                    buf.push('\'');
                }
                Some('\\') => {
                    if let Some(ch) = self.read_text_escape()? {
                        buf.push(ch);
                    }
                }
                Some('\r') => {
                    let next = self.input.read()?;
                    if next != Some('\n') {
                        self.input.unread(next);
                    }
                    buf.push('\n');
                }
                Some(c) if is_illegal_control(c, true) => {
                    return Err(self.input.error(SyntaxError::InvalidCharacter(c)));
                }
                Some(c) => buf.push(c),
            }
        }
    }

    /// After a `'` inside a long string: consumes two more quotes if present.
    fn consume_closing_quotes(&mut self) -> IonResult<bool> {
        let first = self.input.read()?;
        if first != Some('\'') {
            self.input.unread(first);
            return Ok(false);
        }
        let second = self.input.read()?;
        if second != Some('\'') {
            self.input.unread(second);
            self.input.unread(first);
            return Ok(false);
        }
        Ok(true)
    }

    /// After a long segment: consumes the opening `'''` of another segment if
    /// one follows (past whitespace and comments).
    fn next_long_segment(&mut self, comments: Comments) -> IonResult<bool> {
        let c = self.skip_whitespace(comments)?;
        if c != Some('\'') {
            self.input.unread(c);
            return Ok(false);
        }
        if self.consume_closing_quotes()? {
            Ok(true)
        } else {
            self.input.unread(c);
            Ok(false)
        }
    }

    /// Skips the content of the current unfinished token.
    pub fn skip_token(&mut self) -> IonResult<()> {
        let Some(token) = self.unfinished.take() else {
            return Ok(());
        };
        let mut scratch = core::mem::take(&mut self.scratch);
        scratch.clear();
        let result = match token {
            Token::SymbolIdentifier => self.load_symbol_identifier(&mut scratch),
            Token::SymbolOperator => self.load_symbol_operator(&mut scratch),
            Token::SymbolQuoted => self.skip_short_text('\''),
            Token::StringDoubleQuote => self.skip_short_text('"'),
            Token::StringTripleQuote => self.skip_long_string(Comments::Ignore),
            Token::UnknownNumeric | Token::Hex | Token::Binary | Token::Timestamp => {
                self.unfinished = Some(token);
                self.load_number(&mut scratch).map(|_| ())
            }
            _ => Ok(()),
        };
        self.scratch = scratch;
        result
    }

    fn skip_short_text(&mut self, quote: char) -> IonResult<()> {
        loop {
            match self.input.read()? {
                None => return Err(self.eof_error()),
                Some('\\') => {
                    if self.input.read()?.is_none() {
                        return Err(self.eof_error());
                    }
                }
                Some(c) if c == quote => return Ok(()),
                Some(_) => {}
            }
        }
    }

    fn skip_long_segment(&mut self) -> IonResult<()> {
        loop {
            match self.input.read()? {
                None => return Err(self.eof_error()),
                Some('\\') => {
                    if self.input.read()?.is_none() {
                        return Err(self.eof_error());
                    }
                }
                Some('\'') => {
                    if self.consume_closing_quotes()? {
                        return Ok(());
                    }
                }
                Some(_) => {}
            }
        }
    }

    fn skip_long_string(&mut self, comments: Comments) -> IonResult<()> {
        loop {
            self.skip_long_segment()?;
            if !self.next_long_segment(comments)? {
                return Ok(());
            }
        }
    }

    /// Skips to just past the `closer` that ends the container whose opening
    /// delimiter has already been consumed, walking nested containers,
    /// strings, quoted symbols, lobs and comments without materialising them.
    pub fn skip_over_container(&mut self, closer: char) -> IonResult<()> {
        let mut closers = vec![closer];
        while let Some(&expected) = closers.last() {
            match self.skip_whitespace(Comments::Ignore)? {
                None => return Err(self.eof_error()),
                Some(c) if c == expected => {
                    closers.pop();
                }
                Some(found @ (']' | ')' | '}')) => {
                    return Err(self
                        .input
                        .error(SyntaxError::MismatchedCloser { expected, found }));
                }
                Some('"') => self.skip_short_text('"')?,
                Some('\'') => {
                    let first = self.input.read()?;
                    if first == Some('\'') {
                        let second = self.input.read()?;
                        if second == Some('\'') {
                            self.skip_long_segment()?;
                        } else {
                            // empty quoted symbol
                            self.input.unread(second);
                        }
                    } else {
                        self.input.unread(first);
                        self.skip_short_text('\'')?;
                    }
                }
                Some('[') => closers.push(']'),
                Some('(') => closers.push(')'),
                Some('{') => {
                    let next = self.input.read()?;
                    if next == Some('{') {
                        self.skip_lob()?;
                    } else {
                        self.input.unread(next);
                        closers.push('}');
                    }
                }
                Some(_) => {}
            }
        }
        Ok(())
    }

    /// Skips a lob whose `{{` has been consumed, through its `}}`.
    fn skip_lob(&mut self) -> IonResult<()> {
        loop {
            match self.input.read()? {
                None => return Err(self.eof_error()),
                Some('"') => self.skip_short_text('"')?,
                Some('\'') => {
                    if !self.consume_closing_quotes()? {
                        return Err(self.input.error(SyntaxError::InvalidCharacter('\'')));
                    }
                    self.skip_long_segment()?;
                }
                Some('}') => {
                    let next = self.input.read()?;
                    if next == Some('}') {
                        return Ok(());
                    }
                    return Err(self.invalid_char(next));
                }
                Some(_) => {}
            }
        }
    }
}
