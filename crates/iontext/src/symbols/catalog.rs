use alloc::{collections::BTreeMap, format, string::String, sync::Arc};
use core::fmt;

use super::{SharedSymbolTable, SubstituteSymbolTable, SymbolTable, system::SYSTEM_TABLE_NAME};
use crate::error::SymbolError;

/// A source of shared symbol tables, consulted when a document imports one.
pub trait Catalog: fmt::Debug {
    /// Returns the table `name` at `version` if present, otherwise the best
    /// available version of the same name (if any).
    fn get_table(&self, name: &str, version: usize) -> Option<Arc<SharedSymbolTable>>;
}

/// An in-memory catalog. When the requested version is missing, the highest
/// available version is returned.
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    tables: BTreeMap<String, BTreeMap<usize, Arc<SharedSymbolTable>>>,
}

impl MemoryCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a table, replacing any table with the same name and version.
    pub fn insert(&mut self, table: SharedSymbolTable) -> Arc<SharedSymbolTable> {
        let table = Arc::new(table);
        self.tables
            .entry(table.name().into())
            .or_default()
            .insert(table.version(), Arc::clone(&table));
        table
    }

    #[must_use]
    pub fn with_table(mut self, table: SharedSymbolTable) -> Self {
        self.insert(table);
        self
    }
}

impl Catalog for MemoryCatalog {
    fn get_table(&self, name: &str, version: usize) -> Option<Arc<SharedSymbolTable>> {
        let versions = self.tables.get(name)?;
        versions
            .get(&version)
            .or_else(|| versions.values().next_back())
            .cloned()
    }
}

/// One entry of an `imports` list: `{name, version, max_id}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportDescriptor {
    pub name: String,
    pub version: usize,
    pub max_id: Option<usize>,
}

impl ImportDescriptor {
    pub fn new(name: impl Into<String>, version: usize, max_id: Option<usize>) -> Self {
        Self {
            name: name.into(),
            version,
            max_id,
        }
    }
}

/// Reconciles an import request with what the catalog holds.
///
/// - Imports of `$ion` or with an empty name are ignored (`Ok(None)`).
/// - Without a `max_id`, the exact version must be in the catalog.
/// - With a `max_id`, an exact version and size match is used directly;
///   anything else becomes a [`SubstituteSymbolTable`] spanning `max_id`
///   SIDs, forwarding to whatever same-named table was found.
pub fn resolve_import(
    catalog: Option<&dyn Catalog>,
    import: &ImportDescriptor,
) -> Result<Option<SymbolTable>, SymbolError> {
    if import.name.is_empty() || import.name == SYSTEM_TABLE_NAME {
        return Ok(None);
    }
    let version = import.version.max(1);
    let found = catalog.and_then(|c| c.get_table(&import.name, version));
    let exact = found.as_ref().is_some_and(|t| t.version() == version);

    match import.max_id {
        None if exact => Ok(found.map(SymbolTable::Shared)),
        None => Err(SymbolError::InvalidImport(format!(
            "'{}' version {version} is not in the catalog and no max_id was given",
            import.name
        ))),
        Some(max_id) if exact && found.as_ref().is_some_and(|t| t.max_id() == max_id) => {
            Ok(found.map(SymbolTable::Shared))
        }
        Some(max_id) => Ok(Some(SymbolTable::Substitute(Arc::new(
            SubstituteSymbolTable::new(import.name.clone(), version, max_id, found),
        )))),
    }
}
