//! Blob and clob content between `{{` and `}}`.

use alloc::{string::String, vec::Vec};

use super::{Comments, Scanner, is_illegal_control, is_whitespace};
use crate::{
    error::{IonResult, SyntaxError},
    source::CharSource,
};

/// The form of a lob, decided by the first character after `{{`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LobKind {
    Blob,
    ClobShort,
    ClobLong,
}

const CLOB: &str = "clob";

impl<S: CharSource> Scanner<S> {
    /// Looks past the whitespace after `{{`. For clobs the opening quotes are
    /// consumed; for blobs nothing is.
    pub fn scan_lob_kind(&mut self) -> IonResult<LobKind> {
        match self.skip_whitespace(Comments::Break)? {
            Some('"') => Ok(LobKind::ClobShort),
            Some('\'') => {
                if self.consume_closing_quotes()? {
                    Ok(LobKind::ClobLong)
                } else {
                    Err(self.error(SyntaxError::InvalidCharacter('\'')))
                }
            }
            other => {
                self.input.unread(other);
                Ok(LobKind::Blob)
            }
        }
    }

    pub fn load_lob(&mut self, kind: LobKind, out: &mut Vec<u8>) -> IonResult<()> {
        match kind {
            LobKind::Blob => self.load_blob(out),
            LobKind::ClobShort => self.load_clob_short(out),
            LobKind::ClobLong => self.load_clob_long(out),
        }
    }

    pub fn skip_lob_content(&mut self, kind: LobKind) -> IonResult<()> {
        match kind {
            LobKind::Blob => loop {
                match self.input.read()? {
                    None => return Err(self.eof_error()),
                    Some('}') => {
                        self.input.unread(Some('}'));
                        return Ok(());
                    }
                    Some(_) => {}
                }
            },
            LobKind::ClobShort => self.skip_short_text('"'),
            LobKind::ClobLong => self.skip_long_string(Comments::Error(CLOB)),
        }
    }

    /// Consumes the `}}` that ends a lob.
    pub fn next_lob_close(&mut self, comments: Comments) -> IonResult<()> {
        match self.skip_whitespace(comments)? {
            Some('}') => {
                let next = self.input.read()?;
                if next == Some('}') {
                    Ok(())
                } else {
                    Err(self.invalid_char(next))
                }
            }
            other => Err(self.invalid_char(other)),
        }
    }

    fn push_clob_char(&self, out: &mut Vec<u8>, c: char, newlines: bool) -> IonResult<()> {
        if !c.is_ascii() {
            return Err(self.error(SyntaxError::NonAsciiInClob(c)));
        }
        if is_illegal_control(c, newlines) {
            return Err(self.error(SyntaxError::InvalidCharacter(c)));
        }
        // ASCII was checked above
        out.push(c as u8);
        Ok(())
    }

    fn load_clob_short(&mut self, out: &mut Vec<u8>) -> IonResult<()> {
        loop {
            match self.input.read()? {
                None => return Err(self.eof_error()),
                Some('"') => return Ok(()),
                Some('\\') => {
                    if let Some(byte) = self.read_clob_escape()? {
                        out.push(byte);
                    }
                }
                Some(c) => self.push_clob_char(out, c, false)?,
            }
        }
    }

    fn load_clob_long(&mut self, out: &mut Vec<u8>) -> IonResult<()> {
        loop {
            loop {
                match self.input.read()? {
                    None => return Err(self.eof_error()),
                    Some('\'') => {
                        if self.consume_closing_quotes()? {
                            break;
                        }
                        out.push(b'\'');
                    }
                    Some('\\') => {
                        if let Some(byte) = self.read_clob_escape()? {
                            out.push(byte);
                        }
                    }
                    Some('\r') => {
                        let next = self.input.read()?;
                        if next != Some('\n') {
                            self.input.unread(next);
                        }
                        out.push(b'\n');
                    }
                    Some(c) => self.push_clob_char(out, c, true)?,
                }
            }
            if !self.next_long_segment(Comments::Error(CLOB))? {
                return Ok(());
            }
        }
    }

    /// Reads base64 text up to (not including) the closing `}`. Whitespace
    /// may appear anywhere; `/` is content, never a comment.
    fn load_blob(&mut self, out: &mut Vec<u8>) -> IonResult<()> {
        let mut text = String::new();
        loop {
            match self.input.read()? {
                None => return Err(self.eof_error()),
                Some('}') => {
                    self.input.unread(Some('}'));
                    break;
                }
                Some(c) if is_whitespace(c) => {}
                Some(c) if c.is_ascii_alphanumeric() || matches!(c, '+' | '/' | '=') => {
                    text.push(c);
                }
                Some(c) => return Err(self.error(SyntaxError::InvalidCharacter(c))),
            }
        }
        decode_base64(text.as_bytes(), out).map_err(|err| self.error(err))
    }
}

fn sextet(b: u8) -> Option<u32> {
    let v = match b {
        b'A'..=b'Z' => b - b'A',
        b'a'..=b'z' => b - b'a' + 26,
        b'0'..=b'9' => b - b'0' + 52,
        b'+' => 62,
        b'/' => 63,
        _ => return None,
    };
    Some(u32::from(v))
}

/// Decodes standard padded base64.
pub(crate) fn decode_base64(text: &[u8], out: &mut Vec<u8>) -> Result<(), SyntaxError> {
    if text.len() % 4 != 0 {
        return Err(SyntaxError::InvalidBase64("length is not a multiple of four"));
    }
    let padding = text.iter().rev().take_while(|&&b| b == b'=').count();
    if padding > 2 {
        return Err(SyntaxError::InvalidBase64("too much padding"));
    }
    if text[..text.len() - padding].contains(&b'=') {
        return Err(SyntaxError::InvalidBase64("padding before the end"));
    }
    out.reserve(text.len() / 4 * 3);
    for chunk in text.chunks(4) {
        let mut acc = 0u32;
        let mut n = 0;
        for &b in chunk.iter().take_while(|&&b| b != b'=') {
            let v = sextet(b).ok_or(SyntaxError::InvalidBase64("invalid character"))?;
            acc = (acc << 6) | v;
            n += 1;
        }
        acc <<= 6 * (4 - n);
        let [_, b0, b1, b2] = acc.to_be_bytes();
        out.push(b0);
        if n > 2 {
            out.push(b1);
        }
        if n > 3 {
            out.push(b2);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;

    fn decode(text: &str) -> Result<Vec<u8>, SyntaxError> {
        let mut out = Vec::new();
        decode_base64(text.as_bytes(), &mut out)?;
        Ok(out)
    }

    #[test]
    fn base64_padding() {
        assert_eq!(decode("aGVsbG8="), Ok(b"hello".to_vec()));
        assert_eq!(decode("aGk="), Ok(b"hi".to_vec()));
        assert_eq!(decode("aA=="), Ok(vec![b'h']));
        assert_eq!(decode("aGV5"), Ok(b"hey".to_vec()));
        assert_eq!(decode(""), Ok(vec![]));
    }

    #[test]
    fn base64_errors() {
        assert!(decode("aGk").is_err());
        assert!(decode("a===").is_err());
        assert!(decode("a=Gk").is_err());
    }
}
