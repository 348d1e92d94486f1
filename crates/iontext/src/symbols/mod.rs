//! Symbol tables.
//!
//! Every field name, annotation and symbol value is resolved through a
//! [`SymbolTable`], a closed family of four variants:
//!
//! - [`SymbolTable::System`]: the nine Ion 1.0 system symbols, SIDs 1-9.
//! - [`SymbolTable::Shared`]: a named, versioned table from a [`Catalog`].
//! - [`SymbolTable::Local`]: the table a reader builds from a document's
//!   `$ion_symbol_table` declarations, layered over its imports.
//! - [`SymbolTable::Substitute`]: a placeholder for an import the catalog
//!   could not supply as requested.
//!
//! All but the local table are immutable and shared through [`Arc`]. SIDs are
//! 1-based; SID 0 never has text.
//!
//! Lookups by SID return `None` for unknown text instead of failing. Readers
//! raise an error only when a caller asks for text that does not exist.

mod catalog;
mod local;
mod shared;
mod substitute;
pub mod system;


use alloc::{string::String, sync::Arc};

pub use catalog::{Catalog, ImportDescriptor, MemoryCatalog, resolve_import};
pub use local::LocalSymbolTable;
pub use shared::SharedSymbolTable;
pub use substitute::SubstituteSymbolTable;
use system::{SYSTEM_MAX_ID, SYSTEM_SYMBOLS, SYSTEM_TABLE_NAME, system_sid, system_symbol};

/// Where an imported symbol was defined.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImportLocation {
    /// Name of the imported table.
    pub table: String,
    /// SID within that table.
    pub sid: usize,
}

/// A symbol with whatever is known about it.
///
/// Either part may be missing: text without a SID (not defined in the table
/// in effect) or a SID without text (a gap, or an import that could not be
/// found).
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SymbolToken {
    pub text: Option<String>,
    pub sid: Option<usize>,
    pub import_location: Option<ImportLocation>,
}

impl SymbolToken {
    #[must_use]
    pub fn new(text: Option<String>, sid: Option<usize>) -> Self {
        Self {
            text,
            sid,
            import_location: None,
        }
    }

    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Returns `true` when neither text nor SID is known.
    #[must_use]
    pub fn is_none(&self) -> bool {
        self.text.is_none() && self.sid.is_none()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SymbolTable {
    System,
    Shared(Arc<SharedSymbolTable>),
    Local(LocalSymbolTable),
    Substitute(Arc<SubstituteSymbolTable>),
}

impl SymbolTable {
    /// `None` for local tables, which are anonymous.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::System => Some(SYSTEM_TABLE_NAME),
            Self::Shared(t) => Some(t.name()),
            Self::Local(_) => None,
            Self::Substitute(t) => Some(t.name()),
        }
    }

    #[must_use]
    pub fn version(&self) -> Option<usize> {
        match self {
            Self::System => Some(1),
            Self::Shared(t) => Some(t.version()),
            Self::Local(_) => None,
            Self::Substitute(t) => Some(t.version()),
        }
    }

    #[must_use]
    pub fn max_id(&self) -> usize {
        match self {
            Self::System => SYSTEM_MAX_ID,
            Self::Shared(t) => t.max_id(),
            Self::Local(t) => t.max_id(),
            Self::Substitute(t) => t.max_id(),
        }
    }

    #[must_use]
    pub fn is_system(&self) -> bool {
        matches!(self, Self::System)
    }

    #[must_use]
    pub fn is_shared(&self) -> bool {
        matches!(self, Self::Shared(_))
    }

    #[must_use]
    pub fn is_local(&self) -> bool {
        matches!(self, Self::Local(_))
    }

    #[must_use]
    pub fn is_substitute(&self) -> bool {
        matches!(self, Self::Substitute(_))
    }

    /// Text for `sid`, or `None` if it is out of range or has no text.
    #[must_use]
    pub fn find_known_symbol(&self, sid: usize) -> Option<&str> {
        match self {
            Self::System => system_symbol(sid),
            Self::Shared(t) => t.find_known_symbol(sid),
            Self::Local(t) => t.find_known_symbol(sid),
            Self::Substitute(t) => t.find_known_symbol(sid),
        }
    }

    /// The lowest SID with this text.
    #[must_use]
    pub fn find_sid(&self, text: &str) -> Option<usize> {
        match self {
            Self::System => system_sid(text),
            Self::Shared(t) => t.find_sid(text),
            Self::Local(t) => t.find_sid(text),
            Self::Substitute(t) => t.find_sid(text),
        }
    }

    /// Resolves text to a token carrying its SID and, for imported symbols,
    /// where it was defined.
    #[must_use]
    pub fn find(&self, text: &str) -> SymbolToken {
        if let Self::Local(t) = self {
            return t.find(text);
        }
        let sid = self.find_sid(text);
        SymbolToken {
            text: Some(text.into()),
            sid,
            import_location: sid.and_then(|sid| self.import_location(sid)),
        }
    }

    /// Resolves a SID to a token; the text is `None` when unknown.
    #[must_use]
    pub fn find_by_sid(&self, sid: usize) -> SymbolToken {
        SymbolToken {
            text: self.find_known_symbol(sid).map(String::from),
            sid: Some(sid),
            import_location: self.import_location(sid),
        }
    }

    #[must_use]
    pub fn import_location(&self, sid: usize) -> Option<ImportLocation> {
        if let Self::Local(t) = self {
            return t.import_location(sid);
        }
        if sid == 0 || sid > self.max_id() {
            return None;
        }
        Some(ImportLocation {
            table: self.name()?.into(),
            sid,
        })
    }

    /// Tables imported by a local table; empty for the other variants.
    #[must_use]
    pub fn imports(&self) -> &[SymbolTable] {
        match self {
            Self::Local(t) => t.imports(),
            _ => &[],
        }
    }

    /// The symbols this table defines itself, in SID order (imports
    /// excluded). Empty slots are `None`.
    pub fn declared_symbols(&self) -> impl Iterator<Item = Option<&str>> + '_ {
        let (first, count) = match self {
            Self::System => (1, SYSTEM_SYMBOLS.len()),
            Self::Shared(t) => (1, t.max_id()),
            Self::Local(t) => (t.imported_max_id() + 1, t.declared_symbols().len()),
            Self::Substitute(t) => (1, t.max_id()),
        };
        (first..first + count).map(move |sid| self.find_known_symbol(sid))
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::Local(LocalSymbolTable::new())
    }
}
