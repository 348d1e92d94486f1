use alloc::{collections::BTreeMap, string::String, vec::Vec};

/// A named, versioned, immutable symbol table.
///
/// Slots may be empty (`None`): such SIDs are part of the table's range but
/// have no text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedSymbolTable {
    name: String,
    version: usize,
    symbols: Vec<Option<String>>,
    index: BTreeMap<String, usize>,
}

impl SharedSymbolTable {
    /// Builds a table from its symbol list. A version below 1 is treated as 1.
    pub fn new<I, T>(name: impl Into<String>, version: usize, symbols: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self::with_gaps(name, version, symbols.into_iter().map(|s| Some(s.into())))
    }

    /// Like [`new`](Self::new), but slots may be empty.
    pub fn with_gaps(
        name: impl Into<String>,
        version: usize,
        symbols: impl IntoIterator<Item = Option<String>>,
    ) -> Self {
        let symbols: Vec<Option<String>> = symbols.into_iter().collect();
        let mut index = BTreeMap::new();
        for (i, text) in symbols.iter().enumerate() {
            if let Some(text) = text {
                // the lowest SID wins for duplicated text
                index.entry(text.clone()).or_insert(i + 1);
            }
        }
        Self {
            name: name.into(),
            version: version.max(1),
            symbols,
            index,
        }
    }

    /// A new version of `prior`: its symbols keep their SIDs and `symbols`
    /// are appended after them.
    #[must_use]
    pub fn extend(
        prior: &SharedSymbolTable,
        version: usize,
        symbols: impl IntoIterator<Item = Option<String>>,
    ) -> Self {
        Self::with_gaps(
            prior.name.clone(),
            version,
            prior.symbols.iter().cloned().chain(symbols),
        )
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
        self.symbols.len()
    }

    #[must_use]
    pub fn symbols(&self) -> &[Option<String>] {
        &self.symbols
    }

    #[must_use]
    pub fn find_known_symbol(&self, sid: usize) -> Option<&str> {
        self.symbols.get(sid.checked_sub(1)?)?.as_deref()
    }

    #[must_use]
    pub fn find_sid(&self, text: &str) -> Option<usize> {
        self.index.get(text).copied()
    }
}
