use alloc::{string::String, sync::Arc};

use super::SharedSymbolTable;

/// Stands in for an import the catalog could not supply as requested.
///
/// The table occupies exactly the requested `max_id` SIDs. When a table of
/// the same name but a different version (or size) was found, lookups are
/// forwarded to it and clamped to the requested range; otherwise every SID
/// in the range has unknown text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubstituteSymbolTable {
    name: String,
    version: usize,
    max_id: usize,
    original: Option<Arc<SharedSymbolTable>>,
}

impl SubstituteSymbolTable {
    pub fn new(
        name: impl Into<String>,
        version: usize,
        max_id: usize,
        original: Option<Arc<SharedSymbolTable>>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.max(1),
            max_id,
            original,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn version(&self) -> usize {
        self.version
    }

    #[must_use]
    pub fn max_id(&self) -> usize {
        self.max_id
    }

    /// The different-version table lookups are forwarded to, if any.
    #[must_use]
    pub fn original(&self) -> Option<&Arc<SharedSymbolTable>> {
        self.original.as_ref()
    }

    #[must_use]
    pub fn find_known_symbol(&self, sid: usize) -> Option<&str> {
        if sid == 0 || sid > self.max_id {
            return None;
        }
        self.original.as_ref()?.find_known_symbol(sid)
    }

    #[must_use]
    pub fn find_sid(&self, text: &str) -> Option<usize> {
        self.original
            .as_ref()?
            .find_sid(text)
            .filter(|&sid| sid <= self.max_id)
    }
}
