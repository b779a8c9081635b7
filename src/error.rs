//! Error types for recursive translation.

use std::fmt;

use thiserror::Error;

/// Ordered record of the reference resolutions currently in flight.
///
/// Each entry pairs the initiating key (the key whose raw value introduced a
/// reference into the resolution) with the raw source string that contained
/// it. The chain is threaded as an argument through every re-entrant call of
/// one top-level translation; a referenced key that already appears as a
/// chain key is a cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleChain {
    entries: Vec<(String, String)>,
}

impl CycleChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `key` is already being resolved on the active path.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.iter().any(|(entry, _)| entry == key)
    }

    /// Initiating keys, outermost first.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    /// The `(initiating key, raw source string)` entries, outermost first.
    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn push(&mut self, key: &str, raw_source: &str) {
        self.entries.push((key.to_string(), raw_source.to_string()));
    }

    pub(crate) fn pop(&mut self) {
        self.entries.pop();
    }
}

impl fmt::Display for CycleChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (key, raw_source)) in self.entries.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{key:?} => {raw_source:?}")?;
        }
        write!(f, "}}")
    }
}

/// Errors surfaced by recursive translation.
///
/// Both variants propagate unmodified through nested reference resolutions
/// to the original caller; nothing is written back to the store on an error
/// path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The requested key has no value, even after ancestor fallback. Always
    /// names the originally requested key, never an ancestor tried on its
    /// behalf.
    #[error("translation missing: {locale}.{key}")]
    MissingTranslation { locale: String, key: String },

    /// A reference chain revisited a key already being resolved within the
    /// same top-level call.
    #[error("cyclic reference detected in chain {chain}")]
    CyclicReference { chain: CycleChain },
}

pub type Result<T> = std::result::Result<T, Error>;
