//! The reader callers use.
//!
//! [`TextReader`] wraps the raw parser and keeps the symbol table in effect.
//! At the top level it consumes two kinds of values itself:
//!
//! - a struct annotated `$ion_symbol_table`, which installs a new local
//!   symbol table, and
//! - an unquoted, unannotated `$ion_<major>_<minor>` symbol (a version
//!   marker). `$ion_1_0` resets the table to the system table; any other
//!   version is an error.
//!
//! Everything else is handed to the caller. Field names, annotations and
//! symbol values are resolved against the table in effect when they are
//! asked for.

use alloc::{
    string::{String, ToString},
    vec::Vec,
};
use core::mem;

use num_bigint::BigInt;
use tracing::debug;

use crate::{
    decimal::Decimal,
    error::{ErrorKind, FormatError, IonError, IonResult, SymbolError},
    options::ReaderOptions,
    parser::{RawScalar, RawSymbol, RawTextParser},
    scalar::{parse_float, parse_int},
    scanner::NumericKind,
    source::{CharSource, StrSource, Utf8Source},
    symbols::{
        ImportDescriptor, LocalSymbolTable, SharedSymbolTable, SymbolTable, SymbolToken,
        resolve_import,
        system::{ION_SHARED_SYMBOL_TABLE, ION_SYMBOL_TABLE, system_symbol},
    },
    timestamp::Timestamp,
    types::IonType,
};

const ION_1_0: &str = "$ion_1_0";

/// Text for a raw symbol. SIDs past the table's range and SIDs without text
/// are errors.
fn resolve_text<'a>(table: &'a SymbolTable, raw: &'a RawSymbol) -> Result<&'a str, SymbolError> {
    match raw {
        RawSymbol::Text(text) => Ok(text.as_str()),
        RawSymbol::Sid(sid) if *sid > table.max_id() => Err(SymbolError::OutOfRange {
            sid: *sid,
            max_id: table.max_id(),
        }),
        RawSymbol::Sid(sid) => table
            .find_known_symbol(*sid)
            .ok_or(SymbolError::UnknownText(*sid)),
    }
}

/// Whether `raw` has the text of the system symbol `sid`.
fn is_system_symbol(table: &SymbolTable, raw: &RawSymbol, sid: usize) -> bool {
    resolve_text(table, raw).is_ok_and(|text| system_symbol(sid) == Some(text))
}

fn resolve_token(table: &SymbolTable, raw: &RawSymbol) -> SymbolToken {
    match raw {
        RawSymbol::Text(text) => table.find(text),
        RawSymbol::Sid(sid) => table.find_by_sid(*sid),
    }
}

/// Matches `$ion_<digits>_<digits>`.
fn is_version_marker(text: &str) -> bool {
    let Some(version) = text.strip_prefix("$ion_") else {
        return false;
    };
    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    version
        .split_once('_')
        .is_some_and(|(major, minor)| all_digits(major) && all_digits(minor))
}

/// Fields of symbol table and import structs the reader cares about.
#[derive(Clone, Copy)]
enum TableField {
    Name,
    Version,
    Imports,
    Symbols,
    MaxId,
}

impl TableField {
    fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "name" => Self::Name,
            "version" => Self::Version,
            "imports" => Self::Imports,
            "symbols" => Self::Symbols,
            "max_id" => Self::MaxId,
            _ => return None,
        })
    }
}

#[derive(Default)]
enum Imports {
    #[default]
    Absent,
    /// `imports: $ion_symbol_table`, appending to the table in effect.
    Current,
    List(Vec<ImportDescriptor>),
}

#[derive(Default)]
struct TableFields {
    name: Option<String>,
    version: Option<usize>,
    imports: Imports,
    symbols: Vec<Option<String>>,
}

/// A pull reader over Ion text.
///
/// # Examples
///
/// ```rust
/// use iontext::{IonType, TextReader};
///
/// let mut reader = TextReader::for_text("$ion_symbol_table::{symbols:[\"foo\"]} {$10: 1}");
/// assert_eq!(reader.next().unwrap(), Some(IonType::Struct));
/// reader.step_in().unwrap();
/// assert_eq!(reader.next().unwrap(), Some(IonType::Int));
/// assert_eq!(reader.field_name().unwrap(), Some("foo"));
/// assert_eq!(reader.read_i64().unwrap(), 1);
/// assert_eq!(reader.next().unwrap(), None);
/// reader.step_out().unwrap();
/// assert_eq!(reader.next().unwrap(), None);
/// ```
pub struct TextReader<S> {
    parser: RawTextParser<S>,
    symbols: SymbolTable,
    options: ReaderOptions,
    failed: Option<IonError>,
}

impl<'a> TextReader<StrSource<'a>> {
    /// A reader over in-memory text with default options.
    #[must_use]
    pub fn for_text(text: &'a str) -> Self {
        Self::new(StrSource::new(text))
    }
}

impl<'a> TextReader<Utf8Source<'a>> {
    /// A reader over UTF-8 bytes with default options. A leading byte order
    /// mark is skipped.
    #[must_use]
    pub fn for_bytes(bytes: &'a [u8]) -> Self {
        Self::new(Utf8Source::new(bytes))
    }
}

impl<S: CharSource> TextReader<S> {
    pub fn new(source: S) -> Self {
        Self::with_options(source, ReaderOptions::default())
    }

    pub fn with_options(source: S, options: ReaderOptions) -> Self {
        Self {
            parser: RawTextParser::new(source, options.max_depth),
            symbols: SymbolTable::System,
            options,
            failed: None,
        }
    }

    /// Records a stream error so later calls keep returning it.
    fn latch(&mut self, err: IonError) -> IonError {
        if matches!(err.kind(), ErrorKind::Usage(_) | ErrorKind::TypeMismatch { .. }) {
            return err;
        }
        #[cfg(any(test, feature = "fuzzing"))]
        assert!(!self.options.panic_on_error, "{err}");
        self.failed = Some(err.clone());
        err
    }

    fn check_failed(&self) -> IonResult<()> {
        match &self.failed {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    /// Advances to the next value at the current depth. Returns `None` at the
    /// end of the current container or of the input.
    pub fn next(&mut self) -> IonResult<Option<IonType>> {
        self.check_failed()?;
        let result = self.advance();
        result.map_err(|err| self.latch(err))
    }

    fn advance(&mut self) -> IonResult<Option<IonType>> {
        loop {
            let Some(ion_type) = self.parser.next()? else {
                return Ok(None);
            };
            if self.parser.depth() > 0 || self.parser.is_null() {
                return Ok(Some(ion_type));
            }
            match ion_type {
                IonType::Struct if self.is_local_table() => self.install_local_table()?,
                IonType::Symbol if self.is_version_marker() => self.reset_symbols()?,
                _ => return Ok(Some(ion_type)),
            }
        }
    }

    fn is_local_table(&self) -> bool {
        self.parser
            .annotations()
            .first()
            .is_some_and(|a| is_system_symbol(&self.symbols, a, ION_SYMBOL_TABLE))
    }

    fn is_version_marker(&self) -> bool {
        if !self.parser.annotations().is_empty() || !self.parser.is_unquoted_symbol() {
            return false;
        }
        matches!(self.parser.current(), RawScalar::Symbol(RawSymbol::Text(text)) if is_version_marker(text))
    }

    fn reset_symbols(&mut self) -> IonResult<()> {
        let marker = match self.parser.current() {
            RawScalar::Symbol(RawSymbol::Text(text)) => text.clone(),
            _ => String::new(),
        };
        if marker != ION_1_0 {
            return Err(self.parser.error(SymbolError::UnsupportedVersion(marker)));
        }
        debug!(max_id = SymbolTable::System.max_id(), "version marker, symbol table reset");
        self.symbols = SymbolTable::System;
        Ok(())
    }

    fn install_local_table(&mut self) -> IonResult<()> {
        let fields = self.read_table_fields()?;
        let mut table = match fields.imports {
            Imports::Absent => LocalSymbolTable::new(),
            Imports::Current => match &self.symbols {
                SymbolTable::Local(current) => current.clone(),
                _ => LocalSymbolTable::new(),
            },
            Imports::List(descriptors) => {
                let imports = self.resolve_imports(&descriptors)?;
                LocalSymbolTable::with_imports(imports).map_err(|e| self.parser.error(e))?
            }
        };
        for symbol in fields.symbols {
            table.add_symbol(symbol);
        }
        debug!(
            max_id = table.max_id(),
            imports = table.imports().len(),
            "local symbol table installed"
        );
        self.symbols = SymbolTable::Local(table);
        Ok(())
    }

    fn resolve_imports(&self, descriptors: &[ImportDescriptor]) -> IonResult<Vec<SymbolTable>> {
        let catalog = self.options.catalog.as_deref();
        let mut tables = Vec::with_capacity(descriptors.len());
        for descriptor in descriptors {
            let resolved = resolve_import(catalog, descriptor).map_err(|e| self.parser.error(e))?;
            if let Some(table) = resolved {
                debug!(
                    name = %descriptor.name,
                    version = descriptor.version,
                    substitute = table.is_substitute(),
                    "import resolved"
                );
                tables.push(table);
            }
        }
        Ok(tables)
    }

    /// Reads the struct at the current position as a symbol table
    /// declaration, leaving the parser after it.
    fn read_table_fields(&mut self) -> IonResult<TableFields> {
        let mut fields = TableFields::default();
        let mut seen_imports = false;
        let mut seen_symbols = false;
        self.parser.step_in()?;
        while let Some(ion_type) = self.parser.next()? {
            let field = self
                .parser
                .field_name()
                .and_then(|raw| resolve_text(&self.symbols, raw).ok())
                .and_then(TableField::from_name);
            match field {
                Some(TableField::Imports) => {
                    if mem::replace(&mut seen_imports, true) {
                        return Err(self.parser.error(SymbolError::DuplicateField("imports")));
                    }
                    fields.imports = self.read_imports(ion_type)?;
                }
                Some(TableField::Symbols) => {
                    if mem::replace(&mut seen_symbols, true) {
                        return Err(self.parser.error(SymbolError::DuplicateField("symbols")));
                    }
                    if ion_type == IonType::List && !self.parser.is_null() {
                        fields.symbols = self.read_symbol_list()?;
                    }
                }
                Some(TableField::Name) => fields.name = self.raw_string(ion_type)?,
                Some(TableField::Version) => fields.version = self.raw_usize(ion_type)?,
                Some(TableField::MaxId) | None => {}
            }
        }
        self.parser.step_out()?;
        Ok(fields)
    }

    fn read_imports(&mut self, ion_type: IonType) -> IonResult<Imports> {
        if self.parser.is_null() {
            return Ok(Imports::Absent);
        }
        match ion_type {
            IonType::Symbol => {
                let current = matches!(
                    self.parser.current(),
                    RawScalar::Symbol(raw) if is_system_symbol(&self.symbols, raw, ION_SYMBOL_TABLE)
                );
                Ok(if current { Imports::Current } else { Imports::Absent })
            }
            IonType::List => {
                let mut descriptors = Vec::new();
                self.parser.step_in()?;
                while let Some(ion_type) = self.parser.next()? {
                    if ion_type == IonType::Struct && !self.parser.is_null() {
                        if let Some(descriptor) = self.read_import_descriptor()? {
                            descriptors.push(descriptor);
                        }
                    }
                }
                self.parser.step_out()?;
                Ok(Imports::List(descriptors))
            }
            _ => Ok(Imports::Absent),
        }
    }

    /// Reads one `{name, version, max_id}` struct. Imports without a usable
    /// name are dropped.
    fn read_import_descriptor(&mut self) -> IonResult<Option<ImportDescriptor>> {
        let mut name = None;
        let mut version = None;
        let mut max_id = None;
        self.parser.step_in()?;
        while let Some(ion_type) = self.parser.next()? {
            let field = self
                .parser
                .field_name()
                .and_then(|raw| resolve_text(&self.symbols, raw).ok())
                .and_then(TableField::from_name);
            match field {
                Some(TableField::Name) => name = self.raw_string(ion_type)?,
                Some(TableField::Version) => version = self.raw_usize(ion_type)?,
                Some(TableField::MaxId) => max_id = self.raw_usize(ion_type)?,
                _ => {}
            }
        }
        self.parser.step_out()?;
        Ok(name
            .filter(|name| !name.is_empty())
            .map(|name| ImportDescriptor::new(name, version.unwrap_or(1), max_id)))
    }

    /// Strings become symbols; anything else leaves a gap.
    fn read_symbol_list(&mut self) -> IonResult<Vec<Option<String>>> {
        let mut symbols = Vec::new();
        self.parser.step_in()?;
        while let Some(ion_type) = self.parser.next()? {
            symbols.push(self.raw_string(ion_type)?);
        }
        self.parser.step_out()?;
        Ok(symbols)
    }

    fn raw_string(&mut self, ion_type: IonType) -> IonResult<Option<String>> {
        if ion_type != IonType::String || self.parser.is_null() {
            return Ok(None);
        }
        self.parser.load()?;
        Ok(match self.parser.current() {
            RawScalar::String(text) => Some(text.into()),
            _ => None,
        })
    }

    /// A non-negative int that fits in `usize`; anything else is `None`.
    fn raw_usize(&mut self, ion_type: IonType) -> IonResult<Option<usize>> {
        if ion_type != IonType::Int || self.parser.is_null() {
            return Ok(None);
        }
        let parsed = match self.parser.current() {
            RawScalar::Number(kind, text) => parse_int(kind, text),
            _ => return Ok(None),
        };
        let value = parsed.map_err(|e| self.parser.error(e))?;
        Ok(usize::try_from(&value).ok())
    }

    /// Enters the current container.
    pub fn step_in(&mut self) -> IonResult<()> {
        self.check_failed()?;
        let result = self.parser.step_in();
        result.map_err(|err| self.latch(err))
    }

    /// Leaves the current container, skipping any values not read.
    pub fn step_out(&mut self) -> IonResult<()> {
        self.check_failed()?;
        let result = self.parser.step_out();
        result.map_err(|err| self.latch(err))
    }

    /// Container depth of the current value; 0 at the top level.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.parser.depth()
    }

    #[must_use]
    pub fn ion_type(&self) -> Option<IonType> {
        self.parser.ion_type()
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        self.parser.is_null()
    }

    /// The symbol table in effect.
    #[must_use]
    pub fn symbol_table(&self) -> &SymbolTable {
        &self.symbols
    }

    /// Line and column (both 1-based) of the furthest character read.
    #[must_use]
    pub fn position(&self) -> (usize, usize) {
        self.parser.position()
    }

    /// The field name of the current value. Fails if the name is a symbol ID
    /// without known text.
    pub fn field_name(&self) -> IonResult<Option<&str>> {
        let Some(raw) = self.parser.field_name() else {
            return Ok(None);
        };
        resolve_text(&self.symbols, raw)
            .map(Some)
            .map_err(|e| self.parser.error(e))
    }

    /// The field name as a token, which may lack text.
    #[must_use]
    pub fn field_name_symbol(&self) -> Option<SymbolToken> {
        self.parser
            .field_name()
            .map(|raw| resolve_token(&self.symbols, raw))
    }

    /// Annotation texts in the order written. Fails if any annotation is a
    /// symbol ID without known text.
    pub fn annotations(&self) -> IonResult<Vec<&str>> {
        self.parser
            .annotations()
            .iter()
            .map(|raw| resolve_text(&self.symbols, raw).map_err(|e| self.parser.error(e)))
            .collect()
    }

    /// Annotations as tokens, which may lack text.
    #[must_use]
    pub fn annotation_symbols(&self) -> Vec<SymbolToken> {
        self.parser
            .annotations()
            .iter()
            .map(|raw| resolve_token(&self.symbols, raw))
            .collect()
    }

    #[must_use]
    pub fn has_annotation(&self, text: &str) -> bool {
        self.parser
            .annotations()
            .iter()
            .any(|raw| resolve_text(&self.symbols, raw) == Ok(text))
    }

    fn mismatch(&self, expected: &'static str) -> IonError {
        let kind = match self.parser.ion_type() {
            None => ErrorKind::Usage("there is no current value"),
            Some(_) if self.parser.is_null() => ErrorKind::TypeMismatch {
                expected,
                found: IonType::Null,
            },
            Some(found) => ErrorKind::TypeMismatch { expected, found },
        };
        self.parser.error(kind)
    }

    /// Loads string or lob content of the current value.
    fn load(&mut self) -> IonResult<()> {
        let result = self.parser.load();
        result.map_err(|err| self.latch(err))
    }

    pub fn read_bool(&self) -> IonResult<bool> {
        match self.parser.current() {
            RawScalar::Bool(b) => Ok(b),
            _ => Err(self.mismatch("bool")),
        }
    }

    pub fn read_int(&self) -> IonResult<BigInt> {
        let parsed = match self.parser.current() {
            RawScalar::Number(kind @ (NumericKind::Int | NumericKind::Hex | NumericKind::Binary), text) => {
                parse_int(kind, text)
            }
            _ => return Err(self.mismatch("int")),
        };
        parsed.map_err(|e| self.parser.error(e))
    }

    pub fn read_i64(&self) -> IonResult<i64> {
        let value = self.read_int()?;
        i64::try_from(&value)
            .map_err(|_| self.parser.error(FormatError::IntegerOverflow(value.to_string(), "i64")))
    }

    pub fn read_f64(&self) -> IonResult<f64> {
        let parsed = match self.parser.current() {
            RawScalar::Float(f) => Ok(f),
            RawScalar::Number(NumericKind::Float, text) => parse_float(text),
            _ => return Err(self.mismatch("float")),
        };
        parsed.map_err(|e| self.parser.error(e))
    }

    pub fn read_decimal(&self) -> IonResult<Decimal> {
        let parsed = match self.parser.current() {
            RawScalar::Number(NumericKind::Decimal, text) => text.parse::<Decimal>(),
            _ => return Err(self.mismatch("decimal")),
        };
        parsed.map_err(|e| self.parser.error(e))
    }

    pub fn read_timestamp(&self) -> IonResult<Timestamp> {
        let parsed = match self.parser.current() {
            RawScalar::Number(NumericKind::Timestamp, text) => text.parse::<Timestamp>(),
            _ => return Err(self.mismatch("timestamp")),
        };
        parsed.map_err(|e| self.parser.error(e))
    }

    /// Text of a string or symbol value. Fails for a symbol ID without
    /// known text.
    pub fn read_string(&mut self) -> IonResult<&str> {
        if self.parser.ion_type() == Some(IonType::String) {
            self.load()?;
        }
        match self.parser.current() {
            RawScalar::String(text) => Ok(text),
            RawScalar::Symbol(raw) => {
                resolve_text(&self.symbols, raw).map_err(|e| self.parser.error(e))
            }
            _ => Err(self.mismatch("string or symbol")),
        }
    }

    /// The current symbol value. Never fails for unknown text; the token's
    /// text is `None` instead.
    pub fn read_symbol(&self) -> IonResult<SymbolToken> {
        match self.parser.current() {
            RawScalar::Symbol(raw) => Ok(resolve_token(&self.symbols, raw)),
            _ => Err(self.mismatch("symbol")),
        }
    }

    /// Bytes of a blob or clob.
    pub fn read_lob(&mut self) -> IonResult<&[u8]> {
        if self.parser.ion_type().is_some_and(IonType::is_lob) {
            self.load()?;
        }
        match self.parser.current() {
            RawScalar::Lob(bytes) => Ok(bytes),
            _ => Err(self.mismatch("blob or clob")),
        }
    }

    /// Reads the current `$ion_shared_symbol_table::{...}` struct into a
    /// table. Imports are flattened into the new table's symbol list; SIDs
    /// of imports the catalog cannot supply become gaps.
    pub fn read_shared_symbol_table(&mut self) -> IonResult<SharedSymbolTable> {
        if self.parser.ion_type() != Some(IonType::Struct) || self.parser.is_null() {
            return Err(self.mismatch("struct"));
        }
        let annotated = self
            .parser
            .annotations()
            .first()
            .is_some_and(|a| is_system_symbol(&self.symbols, a, ION_SHARED_SYMBOL_TABLE));
        if !annotated {
            return Err(self.parser.error(SymbolError::InvalidSharedTable(
                "missing the $ion_shared_symbol_table annotation",
            )));
        }
        let result = self.read_table_fields();
        let fields = result.map_err(|err| self.latch(err))?;
        let Some(name) = fields.name.filter(|name| !name.is_empty()) else {
            return Err(self.parser.error(SymbolError::InvalidSharedTable(
                "a shared symbol table needs a name",
            )));
        };

        let mut symbols: Vec<Option<String>> = Vec::new();
        if let Imports::List(descriptors) = &fields.imports {
            for import in self.resolve_imports(descriptors)? {
                symbols.extend(import.declared_symbols().map(|s| s.map(String::from)));
            }
        }
        symbols.extend(fields.symbols);
        let table = SharedSymbolTable::with_gaps(name, fields.version.unwrap_or(1), symbols);
        debug!(
            name = table.name(),
            version = table.version(),
            max_id = table.max_id(),
            "shared symbol table read"
        );
        Ok(table)
    }
}
