//! Owned values.
//!
//! An [`Element`] is a snapshot of one value and everything inside it, read
//! from a [`TextReader`]. Symbol text is resolved at read time, so elements
//! do not depend on the symbol table that was in effect. Its [`Display`]
//! impl writes Ion text that reads back as an equivalent element.
//!
//! [`Display`]: core::fmt::Display

use alloc::{string::String, vec::Vec};
use core::fmt::{self, Write as _};

use num_bigint::BigInt;

use crate::{
    decimal::Decimal,
    error::IonResult,
    reader::TextReader,
    source::CharSource,
    timestamp::Timestamp,
    types::IonType,
};

/// A field of a struct: its name, `None` when the name has unknown text.
pub type Field = (Option<String>, Element);

#[derive(Debug, Clone)]
pub enum Value {
    /// A null of the given type; `Null(IonType::Null)` is plain `null`.
    Null(IonType),
    Bool(bool),
    Int(BigInt),
    Float(f64),
    Decimal(Decimal),
    Timestamp(Timestamp),
    /// Symbol text, `None` when unknown.
    Symbol(Option<String>),
    String(String),
    Clob(Vec<u8>),
    Blob(Vec<u8>),
    List(Vec<Element>),
    Sexp(Vec<Element>),
    Struct(Vec<Field>),
}

impl Value {
    #[must_use]
    pub fn ion_type(&self) -> IonType {
        match self {
            Self::Null(t) => *t,
            Self::Bool(_) => IonType::Bool,
            Self::Int(_) => IonType::Int,
            Self::Float(_) => IonType::Float,
            Self::Decimal(_) => IonType::Decimal,
            Self::Timestamp(_) => IonType::Timestamp,
            Self::Symbol(_) => IonType::Symbol,
            Self::String(_) => IonType::String,
            Self::Clob(_) => IonType::Clob,
            Self::Blob(_) => IonType::Blob,
            Self::List(_) => IonType::List,
            Self::Sexp(_) => IonType::Sexp,
            Self::Struct(_) => IonType::Struct,
        }
    }
}

/// Ion equivalence: floats compare bit patterns (so `nan` equals itself and
/// `0e0` differs from `-0e0`), and struct fields compare as an unordered
/// collection.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null(a), Self::Null(b)) => a == b,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => {
                a.to_bits() == b.to_bits() || (a.is_nan() && b.is_nan())
            }
            (Self::Decimal(a), Self::Decimal(b)) => a == b,
            (Self::Timestamp(a), Self::Timestamp(b)) => a == b,
            (Self::Symbol(a), Self::Symbol(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Clob(a), Self::Clob(b)) | (Self::Blob(a), Self::Blob(b)) => a == b,
            (Self::List(a), Self::List(b)) | (Self::Sexp(a), Self::Sexp(b)) => a == b,
            (Self::Struct(a), Self::Struct(b)) => fields_equivalent(a, b),
            _ => false,
        }
    }
}

fn fields_equivalent(a: &[Field], b: &[Field]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut used = alloc::vec![false; b.len()];
    a.iter().all(|field| {
        let found = b
            .iter()
            .enumerate()
            .position(|(i, candidate)| !used[i] && candidate == field);
        match found {
            Some(i) => {
                used[i] = true;
                true
            }
            None => false,
        }
    })
}

/// A value with its annotations.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    /// Annotation texts in order; `None` for unknown text.
    pub annotations: Vec<Option<String>>,
    pub value: Value,
}

impl From<Value> for Element {
    fn from(value: Value) -> Self {
        Self {
            annotations: Vec::new(),
            value,
        }
    }
}

impl Element {
    #[must_use]
    pub fn ion_type(&self) -> IonType {
        self.value.ion_type()
    }

    /// Reads the next value at the reader's current depth, including all of
    /// its children.
    pub fn read<S: CharSource>(reader: &mut TextReader<S>) -> IonResult<Option<Self>> {
        match reader.next()? {
            Some(ion_type) => Self::read_current(reader, ion_type).map(Some),
            None => Ok(None),
        }
    }

    /// Reads every remaining value at the reader's current depth.
    pub fn read_all<S: CharSource>(reader: &mut TextReader<S>) -> IonResult<Vec<Self>> {
        let mut elements = Vec::new();
        while let Some(element) = Self::read(reader)? {
            elements.push(element);
        }
        Ok(elements)
    }

    fn read_current<S: CharSource>(
        reader: &mut TextReader<S>,
        ion_type: IonType,
    ) -> IonResult<Self> {
        let annotations = reader
            .annotation_symbols()
            .into_iter()
            .map(|token| token.text)
            .collect();
        let value = if reader.is_null() {
            Value::Null(ion_type)
        } else {
            match ion_type {
                IonType::Null => Value::Null(IonType::Null),
                IonType::Bool => Value::Bool(reader.read_bool()?),
                IonType::Int => Value::Int(reader.read_int()?),
                IonType::Float => Value::Float(reader.read_f64()?),
                IonType::Decimal => Value::Decimal(reader.read_decimal()?),
                IonType::Timestamp => Value::Timestamp(reader.read_timestamp()?),
                IonType::Symbol => Value::Symbol(reader.read_symbol()?.text),
                IonType::String => Value::String(reader.read_string()?.into()),
                IonType::Clob => Value::Clob(reader.read_lob()?.to_vec()),
                IonType::Blob => Value::Blob(reader.read_lob()?.to_vec()),
                IonType::List => Value::List(Self::read_children(reader)?),
                IonType::Sexp => Value::Sexp(Self::read_children(reader)?),
                IonType::Struct => {
                    let mut fields = Vec::new();
                    reader.step_in()?;
                    while let Some(child) = reader.next()? {
                        let name = reader.field_name_symbol().and_then(|token| token.text);
                        fields.push((name, Self::read_current(reader, child)?));
                    }
                    reader.step_out()?;
                    Value::Struct(fields)
                }
            }
        };
        Ok(Self { annotations, value })
    }

    fn read_children<S: CharSource>(reader: &mut TextReader<S>) -> IonResult<Vec<Self>> {
        reader.step_in()?;
        let children = Self::read_all(reader)?;
        reader.step_out()?;
        Ok(children)
    }
}

fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Symbols that read back differently when unquoted.
fn needs_quotes(text: &str) -> bool {
    if !is_identifier(text) || matches!(text, "null" | "true" | "false" | "nan") {
        return true;
    }
    match text.strip_prefix('$') {
        Some(rest) => rest.bytes().all(|b| b.is_ascii_digit()) || rest.starts_with("ion_"),
        None => false,
    }
}

fn write_escaped(f: &mut fmt::Formatter<'_>, text: &str, quote: char) -> fmt::Result {
    f.write_char(quote)?;
    for c in text.chars() {
        match c {
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            '\\' => f.write_str("\\\\")?,
            c if c == quote => write!(f, "\\{c}")?,
            c if c.is_control() => write!(f, "\\u{:04x}", u32::from(c))?,
            c => f.write_char(c)?,
        }
    }
    f.write_char(quote)
}

fn write_symbol(f: &mut fmt::Formatter<'_>, text: Option<&str>) -> fmt::Result {
    match text {
        None => f.write_str("$0"),
        Some(text) if needs_quotes(text) => write_escaped(f, text, '\''),
        Some(text) => f.write_str(text),
    }
}

const BASE64: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

fn write_base64(f: &mut fmt::Formatter<'_>, bytes: &[u8]) -> fmt::Result {
    for chunk in bytes.chunks(3) {
        let b = [
            chunk[0],
            chunk.get(1).copied().unwrap_or(0),
            chunk.get(2).copied().unwrap_or(0),
        ];
        let n = (u32::from(b[0]) << 16) | (u32::from(b[1]) << 8) | u32::from(b[2]);
        for i in 0..4 {
            if i <= chunk.len() {
                let index = (n >> (18 - 6 * i)) & 0x3F;
                f.write_char(char::from(BASE64[index as usize]))?;
            } else {
                f.write_char('=')?;
            }
        }
    }
    Ok(())
}

fn write_float(f: &mut fmt::Formatter<'_>, value: f64) -> fmt::Result {
    if value.is_nan() {
        f.write_str("nan")
    } else if value.is_infinite() {
        f.write_str(if value > 0.0 { "+inf" } else { "-inf" })
    } else {
        write!(f, "{value:e}")
    }
}

fn write_sequence(f: &mut fmt::Formatter<'_>, items: &[Element], separator: &str) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(separator)?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null(IonType::Null) => f.write_str("null"),
            Self::Null(t) => write!(f, "null.{t}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write_float(f, *x),
            Self::Decimal(d) => write!(f, "{d}"),
            Self::Timestamp(t) => write!(f, "{t}"),
            Self::Symbol(text) => write_symbol(f, text.as_deref()),
            Self::String(text) => write_escaped(f, text, '"'),
            Self::Clob(bytes) => {
                f.write_str("{{\"")?;
                for &b in bytes {
                    match b {
                        b'"' | b'\\' => write!(f, "\\{}", char::from(b))?,
                        0x20..=0x7E => f.write_char(char::from(b))?,
                        _ => write!(f, "\\x{b:02x}")?,
                    }
                }
                f.write_str("\"}}")
            }
            Self::Blob(bytes) => {
                f.write_str("{{")?;
                write_base64(f, bytes)?;
                f.write_str("}}")
            }
            Self::List(items) => {
                f.write_char('[')?;
                write_sequence(f, items, ", ")?;
                f.write_char(']')
            }
            Self::Sexp(items) => {
                f.write_char('(')?;
                write_sequence(f, items, " ")?;
                f.write_char(')')
            }
            Self::Struct(fields) => {
                f.write_char('{')?;
                for (i, (name, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write_symbol(f, name.as_deref())?;
                    write!(f, ": {value}")?;
                }
                f.write_char('}')
            }
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for annotation in &self.annotations {
            write_symbol(f, annotation.as_deref())?;
            f.write_str("::")?;
        }
        write!(f, "{}", self.value)
    }
}
