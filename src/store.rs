//! Translation storage.
//!
//! The [`Store`] trait is the interface the translator consumes: an
//! un-recursive, un-cached base lookup plus a merge-style write used by the
//! interpolation cache. [`MemoryStore`] is the in-memory reference
//! implementation backed by one ordered JSON tree per locale.

use std::collections::HashMap;

use anyhow::{Context, Result, bail};
use serde_json::map::Entry;
use serde_json::{Map, Value};

use crate::keys::normalize_keys;

/// Base translation storage consumed by [`Translator`](crate::Translator).
///
/// Values are owned on the way out: `raw_lookup` hands the caller its own
/// copy, so compilation never aliases the store's live structures and the
/// only write path into the store is [`Store::store`].
pub trait Store {
    /// The un-recursive, un-cached base lookup. Returns `None` on a miss.
    fn raw_lookup(&self, locale: &str, key: &str, scope: &[String], separator: &str)
    -> Option<Value>;

    /// Deep-merge a sparse patch into the locale's translation tree.
    fn store(&mut self, locale: &str, patch: Map<String, Value>);
}

/// In-memory translation store, one insertion-ordered tree per locale.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    translations: HashMap<String, Map<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deep-merge a patch into a locale's translation tree. Nested objects
    /// merge per key, anything else replaces the existing value.
    pub fn store_translations(&mut self, locale: &str, patch: Map<String, Value>) {
        let tree = self.translations.entry(locale.to_string()).or_default();
        merge_into(tree, patch);
    }

    /// Load a locale's translations from a JSON object string.
    pub fn add_json(&mut self, locale: &str, json: &str) -> Result<()> {
        let value: Value = serde_json::from_str(json)
            .with_context(|| format!("Failed to parse translations for locale: {locale}"))?;
        match value {
            Value::Object(map) => {
                self.store_translations(locale, map);
                Ok(())
            }
            _ => bail!("Root of translation JSON must be an object for locale: {locale}"),
        }
    }

    /// The raw stored tree for a locale, unfiltered by interpolation.
    pub fn translations(&self, locale: &str) -> Option<&Map<String, Value>> {
        self.translations.get(locale)
    }
}

impl Store for MemoryStore {
    fn raw_lookup(
        &self,
        locale: &str,
        key: &str,
        scope: &[String],
        separator: &str,
    ) -> Option<Value> {
        let tree = self.translations.get(locale)?;
        let segments = normalize_keys(locale, key, scope, separator);

        let mut path = segments[1..].iter();
        let mut current = tree.get(path.next()?.as_str())?;
        for segment in path {
            current = current.as_object()?.get(segment.as_str())?;
        }
        Some(current.clone())
    }

    fn store(&mut self, locale: &str, patch: Map<String, Value>) {
        self.store_translations(locale, patch);
    }
}

fn merge_into(tree: &mut Map<String, Value>, patch: Map<String, Value>) {
    for (key, incoming) in patch {
        match tree.entry(key) {
            Entry::Occupied(mut slot) => match (slot.get_mut(), incoming) {
                (Value::Object(existing), Value::Object(child)) => merge_into(existing, child),
                (slot_value, other) => *slot_value = other,
            },
            Entry::Vacant(slot) => {
                slot.insert(incoming);
            }
        }
    }
}
