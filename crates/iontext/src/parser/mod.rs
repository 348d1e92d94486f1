//! The value-level state machine.
//!
//! [`RawTextParser`] pulls tokens from the [`Scanner`] and turns them into a
//! sequence of values, each with an optional field name and any annotations.
//! Dispatch goes through the static [`table`] of `(state, token) -> action`.
//!
//! Symbols are returned *raw*: text as written, or a symbol ID for unquoted
//! `$<digits>`. Resolving them against a symbol table is the reader's job.
//!
//! Content is loaded lazily. A string or lob stays in the input until the
//! caller asks for it; a container stays unread until the caller steps in.
//! Moving on with [`RawTextParser::next`] skips whatever was not consumed.

mod frame;
mod table;


use alloc::{string::String, vec, vec::Vec};
use core::mem;

pub(crate) use frame::{Frame, FrameKind};
use table::{Action, ParserState, action};
use tracing::trace;

use crate::{
    error::{ErrorKind, FormatError, IonError, IonResult, SyntaxError},
    scanner::{Comments, LobKind, NumericKind, Scanner, Token},
    source::CharSource,
    types::IonType,
};

/// A symbol as it appears in the text, before resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RawSymbol {
    Text(String),
    /// An unquoted `$<digits>` symbol ID.
    Sid(usize),
}

/// A scalar value as scanned, borrowed from the parser's buffers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum RawScalar<'a> {
    /// A null or a container.
    None,
    Bool(bool),
    /// Normalized numeric text: underscores removed, radix prefix and
    /// exponent marker lowercased.
    Number(NumericKind, &'a str),
    /// `nan`, `+inf` and `-inf`.
    Float(f64),
    Symbol(&'a RawSymbol),
    String(&'a str),
    Lob(&'a [u8]),
}

/// Content the scanner recognised but has not consumed yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pending {
    None,
    ShortString,
    LongString,
    Lob(LobKind),
    Container(FrameKind),
}

#[derive(Debug, Clone, PartialEq)]
enum Content {
    Empty,
    Bool(bool),
    Number(NumericKind),
    Float(f64),
    Symbol { symbol: RawSymbol, unquoted: bool },
    Text,
    Bytes,
}

fn is_keyword(text: &str) -> bool {
    matches!(text, "null" | "true" | "false" | "nan")
}

fn parse_sid(digits: &str) -> Result<usize, FormatError> {
    digits
        .parse()
        .map_err(|_| FormatError::IntegerOverflow(digits.into(), "a symbol ID"))
}

pub(crate) struct RawTextParser<S> {
    scanner: Scanner<S>,
    state: ParserState,
    frames: Vec<Frame>,
    max_depth: Option<usize>,

    ion_type: Option<IonType>,
    is_null: bool,
    field_name: Option<RawSymbol>,
    annotations: Vec<RawSymbol>,
    content: Content,
    pending: Pending,
    /// Set once the closer of the innermost container has been consumed.
    container_ended: bool,

    text: String,
    bytes: Vec<u8>,
}

impl<S: CharSource> RawTextParser<S> {
    pub fn new(source: S, max_depth: Option<usize>) -> Self {
        Self {
            scanner: Scanner::new(source),
            state: ParserState::BeforeAnnotationDatagram,
            frames: vec![Frame::new(FrameKind::Datagram)],
            max_depth,
            ion_type: None,
            is_null: false,
            field_name: None,
            annotations: Vec::new(),
            content: Content::Empty,
            pending: Pending::None,
            container_ended: false,
            text: String::new(),
            bytes: Vec::new(),
        }
    }

    pub fn error(&self, kind: impl Into<ErrorKind>) -> IonError {
        self.scanner.error(kind)
    }

    pub fn position(&self) -> (usize, usize) {
        self.scanner.position()
    }

    /// Nesting depth of the current value; top-level values are at depth 0.
    pub fn depth(&self) -> usize {
        self.frames.len() - 1
    }

    pub fn ion_type(&self) -> Option<IonType> {
        self.ion_type
    }

    pub fn is_null(&self) -> bool {
        self.is_null
    }

    pub fn field_name(&self) -> Option<&RawSymbol> {
        self.field_name.as_ref()
    }

    pub fn annotations(&self) -> &[RawSymbol] {
        &self.annotations
    }

    /// Returns `true` if the current value is a symbol written without quotes.
    pub fn is_unquoted_symbol(&self) -> bool {
        matches!(self.content, Content::Symbol { unquoted: true, .. })
    }

    fn frame(&self) -> Frame {
        // the datagram frame is never popped
        self.frames
            .last()
            .copied()
            .unwrap_or(Frame::new(FrameKind::Datagram))
    }

    fn after_value_state(&self) -> ParserState {
        match self.frame().kind {
            FrameKind::Datagram => ParserState::BeforeAnnotationDatagram,
            FrameKind::Sexp => ParserState::BeforeAnnotationSexp,
            FrameKind::List | FrameKind::Struct => ParserState::AfterValueContents,
        }
    }

    fn unexpected(&self, token: Token) -> IonError {
        self.error(SyntaxError::UnexpectedToken {
            token: token.describe(),
            context: self.state.describe(),
        })
    }

    fn clear_value(&mut self) {
        self.ion_type = None;
        self.is_null = false;
        self.field_name = None;
        self.annotations.clear();
        self.content = Content::Empty;
    }

    /// Advances to the next value at the current depth. Returns `None` at the
    /// end of the current container or of the input.
    pub fn next(&mut self) -> IonResult<Option<IonType>> {
        self.settle()?;
        self.clear_value();
        if self.container_ended {
            return Ok(None);
        }
        loop {
            let token = self.scanner.next_token()?;
            let step = action(self.state, token);
            trace!(state = ?self.state, ?token, action = ?step, "dispatch");
            match step {
                Action::NotDefined | Action::FinishLob => return Err(self.unexpected(token)),
                Action::UnexpectedEof => {
                    return Err(self.error(SyntaxError::UnexpectedEndOfInput));
                }
                Action::FinishDatagram => {
                    self.state = ParserState::Eof;
                    return Ok(None);
                }
                Action::EatComma => self.eat_comma()?,
                Action::FinishContainer => {
                    self.finish_container(token)?;
                    return Ok(None);
                }
                Action::LoadFieldName => self.load_field_name(token)?,
                Action::LoadAnnotation => {
                    if let Some(ion_type) = self.load_annotation_or_symbol(token)? {
                        return Ok(Some(ion_type));
                    }
                }
                Action::LoadScalar => return self.load_scalar(token).map(Some),
                Action::PlusInf => return Ok(Some(self.set_float(f64::INFINITY))),
                Action::MinusInf => return Ok(Some(self.set_float(f64::NEG_INFINITY))),
                Action::StartStruct => return Ok(Some(self.start_container(FrameKind::Struct))),
                Action::StartList => return Ok(Some(self.start_container(FrameKind::List))),
                Action::StartSexp => return Ok(Some(self.start_container(FrameKind::Sexp))),
                Action::StartLob => return self.start_lob().map(Some),
            }
        }
    }

    fn eat_comma(&mut self) -> IonResult<()> {
        let frame = self.frame();
        if frame.prohibits_commas {
            return Err(self.error(SyntaxError::CommaNotAllowed(frame.kind.describe())));
        }
        self.state = if frame.kind == FrameKind::Struct {
            ParserState::BeforeFieldName
        } else {
            ParserState::BeforeAnnotationContained
        };
        Ok(())
    }

    fn finish_container(&mut self, token: Token) -> IonResult<()> {
        let found = token.closer();
        match (self.frame().closer, found) {
            (Some(expected), Some(found)) if expected == found => {
                trace!(depth = self.depth(), "container closed");
                self.container_ended = true;
                Ok(())
            }
            (Some(expected), Some(found)) => {
                Err(self.error(SyntaxError::MismatchedCloser { expected, found }))
            }
            _ => Err(self.unexpected(token)),
        }
    }

    /// Loads an unquoted identifier, turning `$<digits>` into a symbol ID.
    fn load_identifier(&mut self) -> IonResult<String> {
        let mut text = String::new();
        self.scanner.load_symbol_identifier(&mut text)?;
        Ok(text)
    }

    fn identifier_symbol(&self, text: String) -> IonResult<RawSymbol> {
        match text.strip_prefix('$') {
            Some(digits) if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) => {
                parse_sid(digits).map(RawSymbol::Sid).map_err(|e| self.error(e))
            }
            _ => Ok(RawSymbol::Text(text)),
        }
    }

    fn load_field_name(&mut self, token: Token) -> IonResult<()> {
        let symbol = match token {
            Token::SymbolIdentifier => {
                let text = self.load_identifier()?;
                if is_keyword(&text) {
                    return Err(self.error(SyntaxError::KeywordNotAllowed(text, "a field name")));
                }
                self.identifier_symbol(text)?
            }
            Token::SymbolQuoted => {
                let mut text = String::new();
                self.scanner.load_quoted_symbol(&mut text)?;
                RawSymbol::Text(text)
            }
            Token::StringDoubleQuote => {
                let mut text = String::new();
                self.scanner.load_short_string(&mut text)?;
                RawSymbol::Text(text)
            }
            Token::StringTripleQuote => {
                let mut text = String::new();
                self.scanner.load_long_string(&mut text)?;
                RawSymbol::Text(text)
            }
            _ => return Err(self.unexpected(token)),
        };
        let next = self.scanner.next_token()?;
        if next != Token::Colon {
            return Err(self.error(SyntaxError::UnexpectedToken {
                token: next.describe(),
                context: "after a field name",
            }));
        }
        trace!(field = ?symbol, "field name");
        self.field_name = Some(symbol);
        self.state = ParserState::BeforeValueContent;
        Ok(())
    }

    /// A symbol in value position: an annotation when `::` follows, otherwise
    /// the value itself (which may be a keyword if unquoted).
    fn load_annotation_or_symbol(&mut self, token: Token) -> IonResult<Option<IonType>> {
        let unquoted = token == Token::SymbolIdentifier;
        let mut null_type = None;
        let text = if unquoted {
            let text = self.load_identifier()?;
            if text == "null" {
                let mut suffix = String::new();
                null_type = Some(if self.scanner.load_null_suffix(&mut suffix)? {
                    IonType::from_null_suffix(&suffix)
                        .ok_or_else(|| self.error(SyntaxError::InvalidNullType(suffix)))?
                } else {
                    IonType::Null
                });
            }
            text
        } else {
            let mut text = String::new();
            self.scanner.load_quoted_symbol(&mut text)?;
            text
        };

        let next = self.scanner.next_token()?;
        match next {
            Token::DoubleColon => {
                let symbol = if unquoted {
                    if is_keyword(&text) {
                        return Err(
                            self.error(SyntaxError::KeywordNotAllowed(text, "an annotation"))
                        );
                    }
                    self.identifier_symbol(text)?
                } else {
                    RawSymbol::Text(text)
                };
                trace!(annotation = ?symbol, "annotation");
                self.annotations.push(symbol);
                self.state = if self.frame().kind == FrameKind::Sexp {
                    ParserState::BeforeValueContentSexp
                } else {
                    ParserState::BeforeValueContent
                };
                Ok(None)
            }
            Token::Colon => Err(self.error(SyntaxError::FieldNameOutsideStruct)),
            _ => {
                self.scanner.unread_token(next);
                self.state = self.after_value_state();
                let ion_type = if let Some(null_type) = null_type {
                    self.is_null = true;
                    null_type
                } else if unquoted && text == "true" {
                    self.content = Content::Bool(true);
                    IonType::Bool
                } else if unquoted && text == "false" {
                    self.content = Content::Bool(false);
                    IonType::Bool
                } else if unquoted && text == "nan" {
                    self.content = Content::Float(f64::NAN);
                    IonType::Float
                } else {
                    let symbol = if unquoted {
                        self.identifier_symbol(text)?
                    } else {
                        RawSymbol::Text(text)
                    };
                    self.content = Content::Symbol { symbol, unquoted };
                    IonType::Symbol
                };
                self.ion_type = Some(ion_type);
                Ok(Some(ion_type))
            }
        }
    }

    fn load_scalar(&mut self, token: Token) -> IonResult<IonType> {
        let ion_type = match token {
            Token::UnknownNumeric | Token::Hex | Token::Binary | Token::Timestamp => {
                self.text.clear();
                let kind = self.scanner.load_number(&mut self.text)?;
                self.content = Content::Number(kind);
                match kind {
                    NumericKind::Int | NumericKind::Hex | NumericKind::Binary => IonType::Int,
                    NumericKind::Decimal => IonType::Decimal,
                    NumericKind::Float => IonType::Float,
                    NumericKind::Timestamp => IonType::Timestamp,
                }
            }
            Token::StringDoubleQuote => {
                self.pending = Pending::ShortString;
                IonType::String
            }
            Token::StringTripleQuote => {
                self.pending = Pending::LongString;
                IonType::String
            }
            Token::SymbolOperator => {
                let mut text = String::new();
                self.scanner.load_symbol_operator(&mut text)?;
                self.content = Content::Symbol {
                    symbol: RawSymbol::Text(text),
                    unquoted: true,
                };
                IonType::Symbol
            }
            _ => return Err(self.unexpected(token)),
        };
        self.state = if self.pending == Pending::LongString {
            ParserState::InLongString
        } else {
            self.after_value_state()
        };
        self.ion_type = Some(ion_type);
        Ok(ion_type)
    }

    fn set_float(&mut self, value: f64) -> IonType {
        self.content = Content::Float(value);
        self.state = self.after_value_state();
        self.ion_type = Some(IonType::Float);
        IonType::Float
    }

    fn start_container(&mut self, kind: FrameKind) -> IonType {
        let ion_type = match kind {
            FrameKind::Struct => IonType::Struct,
            FrameKind::Sexp => IonType::Sexp,
            FrameKind::List | FrameKind::Datagram => IonType::List,
        };
        self.pending = Pending::Container(kind);
        self.state = self.after_value_state();
        self.ion_type = Some(ion_type);
        ion_type
    }

    fn start_lob(&mut self) -> IonResult<IonType> {
        let kind = self.scanner.scan_lob_kind()?;
        let (state, ion_type) = match kind {
            LobKind::Blob => (ParserState::InBlobContent, IonType::Blob),
            LobKind::ClobShort => (ParserState::InClobDoubleQuoted, IonType::Clob),
            LobKind::ClobLong => (ParserState::InClobTripleQuoted, IonType::Clob),
        };
        self.pending = Pending::Lob(kind);
        self.state = state;
        self.ion_type = Some(ion_type);
        Ok(ion_type)
    }

    fn finish_lob(&mut self, kind: LobKind) -> IonResult<()> {
        let comments = match kind {
            LobKind::Blob => Comments::Break,
            LobKind::ClobShort | LobKind::ClobLong => Comments::Error("clob"),
        };
        self.scanner.next_lob_close(comments)?;
        match action(self.state, Token::CloseDoubleBrace) {
            Action::FinishLob => {
                self.state = self.after_value_state();
                Ok(())
            }
            _ => Err(self.unexpected(Token::CloseDoubleBrace)),
        }
    }

    /// Skips any content of the current value that the caller did not read.
    fn settle(&mut self) -> IonResult<()> {
        match mem::replace(&mut self.pending, Pending::None) {
            Pending::None => {}
            Pending::ShortString | Pending::LongString => self.scanner.skip_token()?,
            Pending::Lob(kind) => {
                self.scanner.skip_lob_content(kind)?;
                self.finish_lob(kind)?;
            }
            Pending::Container(kind) => {
                if let Some(closer) = kind.closer() {
                    self.scanner.skip_over_container(closer)?;
                }
            }
        }
        if self.state == ParserState::InLongString {
            self.state = self.after_value_state();
        }
        Ok(())
    }

    /// Reads string or lob content that is still in the input.
    pub fn load(&mut self) -> IonResult<()> {
        match self.pending {
            Pending::ShortString => {
                self.pending = Pending::None;
                self.text.clear();
                self.scanner.load_short_string(&mut self.text)?;
                self.content = Content::Text;
            }
            Pending::LongString => {
                self.pending = Pending::None;
                self.text.clear();
                self.scanner.load_long_string(&mut self.text)?;
                self.content = Content::Text;
                self.state = self.after_value_state();
            }
            Pending::Lob(kind) => {
                self.pending = Pending::None;
                self.bytes.clear();
                self.scanner.load_lob(kind, &mut self.bytes)?;
                self.finish_lob(kind)?;
                self.content = Content::Bytes;
            }
            Pending::None | Pending::Container(_) => {}
        }
        Ok(())
    }

    /// The current scalar as loaded so far. Strings and lobs read as
    /// [`RawScalar::None`] until [`load`](Self::load) has run.
    pub fn current(&self) -> RawScalar<'_> {
        match &self.content {
            Content::Empty => RawScalar::None,
            Content::Bool(b) => RawScalar::Bool(*b),
            Content::Number(kind) => RawScalar::Number(*kind, &self.text),
            Content::Float(f) => RawScalar::Float(*f),
            Content::Symbol { symbol, .. } => RawScalar::Symbol(symbol),
            Content::Text => RawScalar::String(&self.text),
            Content::Bytes => RawScalar::Lob(&self.bytes),
        }
    }

    /// The current scalar, loading string or lob content on first access.
    #[cfg(test)]
    pub fn scalar(&mut self) -> IonResult<RawScalar<'_>> {
        self.load()?;
        Ok(self.current())
    }

    pub fn step_in(&mut self) -> IonResult<()> {
        let Pending::Container(kind) = self.pending else {
            return Err(self.error(ErrorKind::Usage("step_in requires a non-null container")));
        };
        if let Some(max) = self.max_depth {
            if self.depth() >= max {
                return Err(self.error(SyntaxError::DepthLimitExceeded(max)));
            }
        }
        self.pending = Pending::None;
        self.frames.push(Frame::new(kind));
        self.state = match kind {
            FrameKind::Struct => ParserState::BeforeFieldName,
            FrameKind::Sexp => ParserState::BeforeAnnotationSexp,
            FrameKind::List | FrameKind::Datagram => ParserState::BeforeAnnotationContained,
        };
        self.clear_value();
        trace!(depth = self.depth(), ?kind, "step in");
        Ok(())
    }

    /// Leaves the current container, skipping any values not yet read.
    pub fn step_out(&mut self) -> IonResult<()> {
        if self.depth() == 0 {
            return Err(self.error(ErrorKind::Usage("cannot step out of the top level")));
        }
        self.settle()?;
        if !self.container_ended {
            if let Some(closer) = self.frame().closer {
                self.scanner.skip_over_container(closer)?;
            }
        }
        self.frames.pop();
        self.container_ended = false;
        self.state = self.after_value_state();
        self.clear_value();
        trace!(depth = self.depth(), "step out");
        Ok(())
    }
}
