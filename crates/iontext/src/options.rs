use alloc::sync::Arc;

use crate::symbols::Catalog;

/// Configuration for a [`TextReader`](crate::TextReader).
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
///
/// use iontext::{MemoryCatalog, ReaderOptions, SharedSymbolTable, StrSource, TextReader};
///
/// let catalog = MemoryCatalog::new()
///     .with_table(SharedSymbolTable::new("colors", 1, ["red", "green"]));
/// let options = ReaderOptions {
///     catalog: Some(Arc::new(catalog)),
///     max_depth: Some(64),
///     ..Default::default()
/// };
/// let text = "$ion_symbol_table::{imports:[{name:\"colors\", version:1}]} $11";
/// let mut reader = TextReader::with_options(StrSource::new(text), options);
/// reader.next().unwrap();
/// assert_eq!(reader.read_symbol().unwrap().text(), Some("green"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ReaderOptions {
    /// Where shared symbol tables named in an `imports` list are looked up.
    ///
    /// Without a catalog, imports that give a `max_id` become substitute
    /// tables whose symbols have unknown text, and imports without one fail.
    ///
    /// # Default
    ///
    /// `None`
    pub catalog: Option<Arc<dyn Catalog>>,

    /// The deepest container nesting the reader will step into.
    ///
    /// # Default
    ///
    /// `None` (unlimited)
    pub max_depth: Option<usize>,

    #[cfg(any(test, feature = "fuzzing"))]
    /// Panic on errors instead of returning them.
    ///
    /// Enabled only in test and fuzzing builds to produce backtraces.
    pub panic_on_error: bool,
}
