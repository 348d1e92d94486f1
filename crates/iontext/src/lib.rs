//! A pull parser for the Ion text format.
//!
//! [`TextReader`] walks a document value by value, stepping into and out of
//! containers on request. Field names, annotations and symbol values are
//! resolved through the [`SymbolTable`] in effect, which the reader updates
//! as it meets `$ion_symbol_table` declarations and `$ion_1_0` version
//! markers. Shared tables named by imports come from a [`Catalog`].
//!
//! ```rust
//! use iontext::{IonType, TextReader};
//!
//! let mut reader = TextReader::for_text("foo::bar::123 [1, 2]");
//! assert_eq!(reader.next().unwrap(), Some(IonType::Int));
//! assert_eq!(reader.annotations().unwrap(), ["foo", "bar"]);
//! assert_eq!(reader.read_i64().unwrap(), 123);
//! assert_eq!(reader.next().unwrap(), Some(IonType::List));
//! assert_eq!(reader.next().unwrap(), None);
//! ```

#![no_std]
#![allow(missing_docs)]
extern crate alloc;

#[cfg(test)]
extern crate std;

mod decimal;
mod error;
mod options;
mod parser;
mod reader;
mod scalar;
mod scanner;
mod source;
mod symbols;
mod timestamp;
mod types;
mod value;

#[cfg(test)]
mod tests;

use alloc::vec::Vec;

pub use decimal::Decimal;
pub use error::{ErrorKind, FormatError, IonError, IonResult, SymbolError, SyntaxError};
pub use options::ReaderOptions;
pub use reader::TextReader;
pub use source::{CharSource, IterSource, StrSource, Utf8Source};
pub use symbols::{
    Catalog, ImportDescriptor, ImportLocation, LocalSymbolTable, MemoryCatalog,
    SharedSymbolTable, SubstituteSymbolTable, SymbolTable, SymbolToken, resolve_import, system,
};
pub use timestamp::{Precision, Timestamp};
pub use types::IonType;
pub use value::{Element, Field, Value};

/// Reads every top-level value of `text`.
///
/// ```rust
/// let elements = iontext::load_all("'''ab''' '''cd''' 0x1A").unwrap();
/// assert_eq!(elements.len(), 2);
/// assert_eq!(elements[0].to_string(), "\"abcd\"");
/// assert_eq!(elements[1].to_string(), "26");
/// ```
pub fn load_all(text: &str) -> IonResult<Vec<Element>> {
    Element::read_all(&mut TextReader::for_text(text))
}
