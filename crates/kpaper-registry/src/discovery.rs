//! Tagged outcomes of extension discovery.

use std::fmt;

use crate::capability::ExtensionCandidate;

/// Why a class in a candidate package was not registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Binary name contains the nesting separator.
    NestedType,
    /// Abstract classes, interfaces, enums, annotations and objects.
    NotConcrete(&'static str),
    /// The host cannot reach the class or its constructor.
    NotPublic,
    NoDefaultConstructor,
    /// The class does not provide the capability it was considered for.
    MissingCapability,
    /// Listed in the registry but absent from the catalog.
    NotLoadable,
    InstantiationFailed(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NestedType => f.write_str("nested type"),
            Self::NotConcrete(kind) => write!(f, "{kind} cannot be instantiated"),
            Self::NotPublic => f.write_str("not publicly constructible"),
            Self::NoDefaultConstructor => f.write_str("no no-argument constructor"),
            Self::MissingCapability => f.write_str("capability not implemented"),
            Self::NotLoadable => f.write_str("class not found"),
            Self::InstantiationFailed(message) => write!(f, "instantiation failed: {message}"),
        }
    }
}

/// The result of considering one class during discovery.
///
/// Discovery never fails: a class that is not a match is `Skipped`, so the
/// caller can log or count it instead of the scan aborting.
pub enum Discovery<T> {
    Matched {
        candidate: ExtensionCandidate,
        instance: T,
    },
    Skipped {
        candidate: ExtensionCandidate,
        reason: SkipReason,
    },
}

impl<T> Discovery<T> {
    pub fn candidate(&self) -> &ExtensionCandidate {
        match self {
            Self::Matched { candidate, .. } | Self::Skipped { candidate, .. } => candidate,
        }
    }

    pub fn is_matched(&self) -> bool {
        matches!(self, Self::Matched { .. })
    }
}

impl<T> fmt::Debug for Discovery<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Matched { candidate, .. } => f
                .debug_struct("Matched")
                .field("candidate", candidate)
                .finish_non_exhaustive(),
            Self::Skipped { candidate, reason } => f
                .debug_struct("Skipped")
                .field("candidate", candidate)
                .field("reason", reason)
                .finish(),
        }
    }
}
