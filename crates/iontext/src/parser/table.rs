//! The `(state, token) -> action` dispatch table.
//!
//! The table is filled at compile time by [`action_for`], so dispatch in the
//! parser loop is a single indexed load.

use crate::scanner::{TOKEN_COUNT, Token};

/// Positions in the Ion text grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ParserState {
    /// Between top-level values.
    BeforeAnnotationDatagram,
    /// At the start of a list element, or after a comma in a list.
    BeforeAnnotationContained,
    /// Between s-expression elements.
    BeforeAnnotationSexp,
    BeforeFieldName,
    /// After `name:` or `annotation::`; a value must follow.
    BeforeValueContent,
    /// After `annotation::` inside an s-expression.
    BeforeValueContentSexp,
    /// A long string value has not been consumed yet.
    InLongString,
    InClobDoubleQuoted,
    InClobTripleQuoted,
    InBlobContent,
    /// After a list element or struct field; expects `,` or the closer.
    AfterValueContents,
    Eof,
}

pub(crate) const STATE_COUNT: usize = 12;

impl ParserState {
    pub(crate) const ALL: [ParserState; STATE_COUNT] = [
        ParserState::BeforeAnnotationDatagram,
        ParserState::BeforeAnnotationContained,
        ParserState::BeforeAnnotationSexp,
        ParserState::BeforeFieldName,
        ParserState::BeforeValueContent,
        ParserState::BeforeValueContentSexp,
        ParserState::InLongString,
        ParserState::InClobDoubleQuoted,
        ParserState::InClobTripleQuoted,
        ParserState::InBlobContent,
        ParserState::AfterValueContents,
        ParserState::Eof,
    ];

    /// Where a token would be rejected, for error messages.
    pub(crate) const fn describe(self) -> &'static str {
        match self {
            ParserState::BeforeAnnotationDatagram => "at the top level",
            ParserState::BeforeAnnotationContained | ParserState::BeforeAnnotationSexp => {
                "where a value was expected"
            }
            ParserState::BeforeFieldName => "where a field name was expected",
            ParserState::BeforeValueContent | ParserState::BeforeValueContentSexp => {
                "after a field name or annotation"
            }
            ParserState::InLongString => "inside a long string",
            ParserState::InClobDoubleQuoted
            | ParserState::InClobTripleQuoted
            | ParserState::InBlobContent => "inside a lob",
            ParserState::AfterValueContents => "after a value",
            ParserState::Eof => "after the end of input",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Action {
    NotDefined,
    LoadFieldName,
    /// A symbol that is an annotation if `::` follows and a value otherwise.
    LoadAnnotation,
    StartStruct,
    StartList,
    StartSexp,
    StartLob,
    LoadScalar,
    PlusInf,
    MinusInf,
    EatComma,
    FinishContainer,
    FinishLob,
    FinishDatagram,
    UnexpectedEof,
}

const fn action_for(state: ParserState, token: Token) -> Action {
    use ParserState as P;
    use Token as T;

    match state {
        P::BeforeAnnotationDatagram
        | P::BeforeAnnotationContained
        | P::BeforeAnnotationSexp
        | P::BeforeValueContent
        | P::BeforeValueContentSexp => {
            let sexp = matches!(state, P::BeforeAnnotationSexp | P::BeforeValueContentSexp);
            let closable = matches!(state, P::BeforeAnnotationContained | P::BeforeAnnotationSexp);
            match token {
                T::UnknownNumeric
                | T::Hex
                | T::Binary
                | T::Timestamp
                | T::StringDoubleQuote
                | T::StringTripleQuote => Action::LoadScalar,
                T::FloatInf => Action::PlusInf,
                T::FloatMinusInf => Action::MinusInf,
                T::SymbolIdentifier | T::SymbolQuoted => Action::LoadAnnotation,
                T::SymbolOperator if sexp => Action::LoadScalar,
                T::OpenBrace => Action::StartStruct,
                T::OpenSquare => Action::StartList,
                T::OpenParen => Action::StartSexp,
                T::OpenDoubleBrace => Action::StartLob,
                T::CloseParen | T::CloseSquare | T::CloseBrace if closable => {
                    Action::FinishContainer
                }
                // rejected by the frame, which reports a better error
                T::Comma if matches!(state, P::BeforeAnnotationDatagram | P::BeforeAnnotationSexp) => {
                    Action::EatComma
                }
                T::Eof if matches!(state, P::BeforeAnnotationDatagram) => Action::FinishDatagram,
                T::Eof => Action::UnexpectedEof,
                _ => Action::NotDefined,
            }
        }
        P::BeforeFieldName => match token {
            T::SymbolIdentifier | T::SymbolQuoted | T::StringDoubleQuote | T::StringTripleQuote => {
                Action::LoadFieldName
            }
            T::CloseParen | T::CloseSquare | T::CloseBrace => Action::FinishContainer,
            T::Eof => Action::UnexpectedEof,
            _ => Action::NotDefined,
        },
        P::AfterValueContents => match token {
            T::Comma => Action::EatComma,
            T::CloseParen | T::CloseSquare | T::CloseBrace => Action::FinishContainer,
            T::Eof => Action::UnexpectedEof,
            _ => Action::NotDefined,
        },
        P::InClobDoubleQuoted | P::InClobTripleQuoted | P::InBlobContent => match token {
            T::CloseDoubleBrace => Action::FinishLob,
            T::Eof => Action::UnexpectedEof,
            _ => Action::NotDefined,
        },
        P::InLongString => match token {
            T::Eof => Action::UnexpectedEof,
            _ => Action::NotDefined,
        },
        P::Eof => match token {
            T::Eof => Action::FinishDatagram,
            _ => Action::NotDefined,
        },
    }
}

const fn build_actions() -> [[Action; TOKEN_COUNT]; STATE_COUNT] {
    let mut table = [[Action::NotDefined; TOKEN_COUNT]; STATE_COUNT];
    let mut s = 0;
    while s < STATE_COUNT {
        let mut t = 0;
        while t < TOKEN_COUNT {
            table[s][t] = action_for(ParserState::ALL[s], Token::ALL[t]);
            t += 1;
        }
        s += 1;
    }
    table
}

static ACTIONS: [[Action; TOKEN_COUNT]; STATE_COUNT] = build_actions();

#[inline]
pub(crate) fn action(state: ParserState, token: Token) -> Action {
    ACTIONS[state as usize][token as usize]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_order_matches_discriminants() {
        for (i, state) in ParserState::ALL.iter().enumerate() {
            assert_eq!(*state as usize, i);
        }
        for (i, token) in Token::ALL.iter().enumerate() {
            assert_eq!(*token as usize, i);
        }
    }

    #[test]
    fn table_agrees_with_rules() {
        for state in ParserState::ALL {
            for token in Token::ALL {
                assert_eq!(action(state, token), action_for(state, token));
            }
        }
    }

    #[test]
    fn closers_only_where_a_container_can_end() {
        use ParserState as P;
        assert_eq!(action(P::BeforeAnnotationDatagram, Token::CloseSquare), Action::NotDefined);
        assert_eq!(action(P::BeforeValueContent, Token::CloseBrace), Action::NotDefined);
        assert_eq!(action(P::BeforeAnnotationContained, Token::CloseSquare), Action::FinishContainer);
        assert_eq!(action(P::AfterValueContents, Token::CloseBrace), Action::FinishContainer);
    }

    #[test]
    fn operators_are_values_only_in_sexps() {
        use ParserState as P;
        assert_eq!(action(P::BeforeAnnotationSexp, Token::SymbolOperator), Action::LoadScalar);
        assert_eq!(action(P::BeforeValueContentSexp, Token::SymbolOperator), Action::LoadScalar);
        assert_eq!(action(P::BeforeAnnotationContained, Token::SymbolOperator), Action::NotDefined);
    }

    #[test]
    fn commas() {
        use ParserState as P;
        assert_eq!(action(P::AfterValueContents, Token::Comma), Action::EatComma);
        assert_eq!(action(P::BeforeAnnotationContained, Token::Comma), Action::NotDefined);
        assert_eq!(action(P::BeforeFieldName, Token::Comma), Action::NotDefined);
    }
}
