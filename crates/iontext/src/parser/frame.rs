/// The kind of an open container. The datagram is the implicit outermost one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FrameKind {
    Datagram,
    List,
    Sexp,
    Struct,
}

impl FrameKind {
    pub(crate) const fn closer(self) -> Option<char> {
        match self {
            Self::Datagram => None,
            Self::List => Some(']'),
            Self::Sexp => Some(')'),
            Self::Struct => Some('}'),
        }
    }

    pub(crate) const fn describe(self) -> &'static str {
        match self {
            Self::Datagram => "top-level",
            Self::List => "list",
            Self::Sexp => "s-expression",
            Self::Struct => "struct",
        }
    }
}

/// One level of container nesting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Frame {
    pub kind: FrameKind,
    /// The character that must close this container.
    pub closer: Option<char>,
    /// Values at this level are separated by whitespace only.
    pub prohibits_commas: bool,
}

impl Frame {
    pub(crate) const fn new(kind: FrameKind) -> Self {
        Self {
            kind,
            closer: kind.closer(),
            prohibits_commas: matches!(kind, FrameKind::Datagram | FrameKind::Sexp),
        }
    }
}
