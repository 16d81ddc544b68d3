use std::fmt;
use std::str::FromStr;

/// Script-visible exception categories a host function may raise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExceptionKind {
    /// Malformed input the host logic was asked to interpret.
    Syntax,
    /// An argument or value had an unexpected shape.
    Type,
    /// A referenced name or binding does not exist.
    Reference,
    /// A numeric or index argument is out of bounds.
    Range,
    /// A host-side invariant was violated.
    Internal,
}

impl ExceptionKind {
    pub const ALL: [ExceptionKind; 5] = [
        ExceptionKind::Syntax,
        ExceptionKind::Type,
        ExceptionKind::Reference,
        ExceptionKind::Range,
        ExceptionKind::Internal,
    ];

    /// The constructor name scripts see, e.g. `TypeError`.
    pub fn name(&self) -> &'static str {
        match self {
            ExceptionKind::Syntax => "SyntaxError",
            ExceptionKind::Type => "TypeError",
            ExceptionKind::Reference => "ReferenceError",
            ExceptionKind::Range => "RangeError",
            ExceptionKind::Internal => "InternalError",
        }
    }
}

impl fmt::Display for ExceptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown exception kind: {0}")]
pub struct UnknownKind(pub String);

impl FromStr for ExceptionKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ExceptionKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| UnknownKind(s.to_string()))
    }
}
