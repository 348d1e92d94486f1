use core::fmt;

/// The thirteen Ion data types.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IonType {
    Null,
    Bool,
    Int,
    Float,
    Decimal,
    Timestamp,
    Symbol,
    String,
    Clob,
    Blob,
    List,
    Sexp,
    Struct,
}

impl IonType {
    /// Returns `true` for `list`, `sexp` and `struct`.
    #[must_use]
    pub fn is_container(self) -> bool {
        matches!(self, Self::List | Self::Sexp | Self::Struct)
    }

    /// Returns `true` for `clob` and `blob`.
    #[must_use]
    pub fn is_lob(self) -> bool {
        matches!(self, Self::Clob | Self::Blob)
    }

    /// The lowercase keyword used for this type in typed nulls (`null.int`).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::Decimal => "decimal",
            Self::Timestamp => "timestamp",
            Self::Symbol => "symbol",
            Self::String => "string",
            Self::Clob => "clob",
            Self::Blob => "blob",
            Self::List => "list",
            Self::Sexp => "sexp",
            Self::Struct => "struct",
        }
    }

    /// Resolves the type name that follows `null.` in a typed null.
    pub(crate) fn from_null_suffix(name: &str) -> Option<Self> {
        Some(match name {
            "null" => Self::Null,
            "bool" => Self::Bool,
            "int" => Self::Int,
            "float" => Self::Float,
            "decimal" => Self::Decimal,
            "timestamp" => Self::Timestamp,
            "symbol" => Self::Symbol,
            "string" => Self::String,
            "clob" => Self::Clob,
            "blob" => Self::Blob,
            "list" => Self::List,
            "sexp" => Self::Sexp,
            "struct" => Self::Struct,
            _ => return None,
        })
    }
}

impl fmt::Display for IonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
