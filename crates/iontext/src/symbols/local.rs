use alloc::{collections::BTreeMap, string::String, vec, vec::Vec};

use super::{ImportLocation, SymbolTable, SymbolToken, system::SYSTEM_MAX_ID};
use crate::error::SymbolError;

/// The symbol table a reader builds for the document it is reading.
///
/// SIDs `1..=imported_max_id` belong to the imports, in order (the system
/// table is always first); the table's own symbols follow.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalSymbolTable {
    imports: Vec<SymbolTable>,
    symbols: Vec<Option<String>>,
    index: BTreeMap<String, usize>,
    imported_max_id: usize,
}

impl Default for LocalSymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalSymbolTable {
    /// A table importing only the system table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            imports: vec![SymbolTable::System],
            symbols: Vec::new(),
            index: BTreeMap::new(),
            imported_max_id: SYSTEM_MAX_ID,
        }
    }

    /// A table over the given imports. The system table always comes first,
    /// whether or not it is listed; local tables cannot be imported.
    pub fn with_imports(imports: Vec<SymbolTable>) -> Result<Self, SymbolError> {
        if imports.iter().any(SymbolTable::is_local) {
            return Err(SymbolError::InvalidImport(
                "a local symbol table cannot be imported".into(),
            ));
        }
        let mut all = Vec::with_capacity(imports.len() + 1);
        all.push(SymbolTable::System);
        all.extend(imports.into_iter().filter(|t| !t.is_system()));
        let mut table = Self {
            imports: all,
            symbols: Vec::new(),
            index: BTreeMap::new(),
            imported_max_id: 0,
        };
        table.refresh();
        Ok(table)
    }

    #[must_use]
    pub fn imports(&self) -> &[SymbolTable] {
        &self.imports
    }

    /// Sum of the max ids of all imports.
    #[must_use]
    pub fn imported_max_id(&self) -> usize {
        self.imported_max_id
    }

    #[must_use]
    pub fn max_id(&self) -> usize {
        self.imported_max_id + self.symbols.len()
    }

    /// The table's own symbols, in SID order.
    #[must_use]
    pub fn declared_symbols(&self) -> &[Option<String>] {
        &self.symbols
    }

    /// Appends a symbol (or an empty slot) and returns its SID. Text that is
    /// already defined is appended again; lookups by text keep returning the
    /// lowest SID.
    pub fn add_symbol(&mut self, text: Option<String>) -> usize {
        let sid = self.max_id() + 1;
        if let Some(text) = &text {
            if self.find_sid(text).is_none() {
                self.index.insert(text.clone(), sid);
            }
        }
        self.symbols.push(text);
        sid
    }

    /// Returns the SID of `text`, appending it if it is not yet defined.
    pub fn intern(&mut self, text: &str) -> usize {
        match self.find_sid(text) {
            Some(sid) => sid,
            None => self.add_symbol(Some(text.into())),
        }
    }

    /// Drops the table's own symbols, keeping its imports.
    pub fn clear_symbols(&mut self) {
        self.symbols.clear();
        self.index.clear();
    }

    /// Recomputes cached SID arithmetic after the imports or own symbols
    /// changed.
    pub fn refresh(&mut self) {
        self.imported_max_id = self.imports.iter().map(SymbolTable::max_id).sum();
        self.index.clear();
        let base = self.imported_max_id;
        for (i, text) in self.symbols.iter().enumerate() {
            if let Some(text) = text {
                self.index.entry(text.clone()).or_insert(base + i + 1);
            }
        }
    }

    /// Finds the import covering `sid` and the SID relative to it.
    fn locate(&self, sid: usize) -> Option<(&SymbolTable, usize)> {
        let mut base = 0;
        for import in &self.imports {
            let max = import.max_id();
            if sid <= base + max {
                return Some((import, sid - base));
            }
            base += max;
        }
        None
    }

    #[must_use]
    pub fn find_known_symbol(&self, sid: usize) -> Option<&str> {
        if sid == 0 {
            return None;
        }
        if sid <= self.imported_max_id {
            let (import, local_sid) = self.locate(sid)?;
            return import.find_known_symbol(local_sid);
        }
        self.symbols
            .get(sid - self.imported_max_id - 1)?
            .as_deref()
    }

    /// Imports are searched first, in order; then the table's own symbols.
    #[must_use]
    pub fn find_sid(&self, text: &str) -> Option<usize> {
        let mut base = 0;
        for import in &self.imports {
            if let Some(sid) = import.find_sid(text) {
                return Some(base + sid);
            }
            base += import.max_id();
        }
        self.index.get(text).copied()
    }

    #[must_use]
    pub fn find(&self, text: &str) -> SymbolToken {
        let sid = self.find_sid(text);
        SymbolToken {
            text: Some(text.into()),
            sid,
            import_location: sid.and_then(|sid| self.import_location(sid)),
        }
    }

    /// Where an imported SID comes from; `None` for the table's own symbols.
    #[must_use]
    pub fn import_location(&self, sid: usize) -> Option<ImportLocation> {
        if sid == 0 || sid > self.imported_max_id {
            return None;
        }
        let (import, local_sid) = self.locate(sid)?;
        Some(ImportLocation {
            table: import.name()?.into(),
            sid: local_sid,
        })
    }
}
