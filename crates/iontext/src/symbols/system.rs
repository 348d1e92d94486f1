//! The Ion 1.0 system symbol table.

/// SID of `$ion`.
pub const ION: usize = 1;
/// SID of `$ion_1_0`.
pub const ION_1_0: usize = 2;
/// SID of `$ion_symbol_table`.
pub const ION_SYMBOL_TABLE: usize = 3;
/// SID of `name`.
pub const NAME: usize = 4;
/// SID of `version`.
pub const VERSION: usize = 5;
/// SID of `imports`.
pub const IMPORTS: usize = 6;
/// SID of `symbols`.
pub const SYMBOLS: usize = 7;
/// SID of `max_id`.
pub const MAX_ID: usize = 8;
/// SID of `$ion_shared_symbol_table`.
pub const ION_SHARED_SYMBOL_TABLE: usize = 9;

/// Highest SID defined by the system table.
pub const SYSTEM_MAX_ID: usize = 9;

/// Name of the system table.
pub const SYSTEM_TABLE_NAME: &str = "$ion";

pub(crate) static SYSTEM_SYMBOLS: [&str; SYSTEM_MAX_ID] = [
    "$ion",
    "$ion_1_0",
    "$ion_symbol_table",
    "name",
    "version",
    "imports",
    "symbols",
    "max_id",
    "$ion_shared_symbol_table",
];

pub(crate) fn system_symbol(sid: usize) -> Option<&'static str> {
    sid.checked_sub(1)
        .and_then(|i| SYSTEM_SYMBOLS.get(i))
        .copied()
}

pub(crate) fn system_sid(text: &str) -> Option<usize> {
    SYSTEM_SYMBOLS
        .iter()
        .position(|s| *s == text)
        .map(|i| i + 1)
}
