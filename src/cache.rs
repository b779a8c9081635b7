//! Persisting compiled results and ancestor fallback.
//!
//! When a lookup had to compile, the compiled value is merged back into the
//! store at its original key path as a sparse patch, so later lookups return
//! it from a plain base read. The ancestor fallback retries a missed key
//! through its truncated parent path, which compiles (and caches) a
//! containing hash that was still stored as an unresolved reference.

use serde_json::{Map, Value};

use crate::error::{CycleChain, Result};
use crate::keys::normalize_keys;
use crate::store::Store;
use crate::translator::{Options, Translator};

impl<S: Store> Translator<S> {
    /// Merge `compiled` into the store at the key path of `dot_key`.
    ///
    /// The patch mirrors only the path from the first post-locale segment
    /// down to the leaf; sibling keys are untouched by the store's merge.
    pub(crate) fn cache_compiled_result(
        &mut self,
        locale: &str,
        dot_key: &str,
        compiled: Value,
        options: &Options,
    ) {
        let segments = normalize_keys(locale, dot_key, &options.scope, &options.separator);
        // skip the leading locale segment
        let path = &segments[1..];
        if path.is_empty() {
            return;
        }

        let mut patch = compiled;
        for segment in path.iter().rev() {
            let mut wrapper = Map::new();
            wrapper.insert(segment.clone(), patch);
            patch = Value::Object(wrapper);
        }
        let Value::Object(patch) = patch else {
            unreachable!("patch is wrapped in at least one object");
        };
        self.store_mut().store(locale, patch);
    }

    /// A locale's recursive lookup with one extra chance on a miss: compile
    /// the truncated parent key (which may populate the requested leaf),
    /// then retry the original key.
    ///
    /// The parent goes through the full lookup on the same chain, so its own
    /// references resolve, its ancestors are tried recursively, and a cycle
    /// through it is still caught. A final miss is reported by the caller
    /// for the original key, never the ancestor.
    pub(crate) fn lookup_with_ancestor_fallback(
        &mut self,
        locale: &str,
        current_locale: &str,
        key: &str,
        options: &Options,
        chain: &mut CycleChain,
    ) -> Result<Option<Value>> {
        if let Some(found) = self.lookup(locale, current_locale, key, options, chain)? {
            return Ok(Some(found));
        }

        let segments = normalize_keys(locale, key, &options.scope, &options.separator);
        // need at least a parent and a leaf after the locale segment
        let path = &segments[1..];
        if path.len() < 2 {
            return Ok(None);
        }

        let leaf = path[path.len() - 1].as_str();
        let parent_key = path[..path.len() - 1].join(&options.separator);
        // scope is already folded into parent_key
        let parent_options = options.reentrant();

        let Some(ancestor) = self.lookup_with_ancestor_fallback(
            locale,
            current_locale,
            &parent_key,
            &parent_options,
            chain,
        )?
        else {
            return Ok(None);
        };

        // Compiling the ancestor persisted the leaf when the cache is on;
        // read it back through the store. With the cache off, the compiled
        // ancestor only exists here, so index it directly.
        if let Some(found) = self.lookup(locale, current_locale, key, options, chain)? {
            return Ok(Some(found));
        }
        match ancestor {
            Value::Object(map) => Ok(map.get(leaf).cloned()),
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use crate::store::MemoryStore;

    use super::*;

    fn translator_with(json: &str) -> Translator<MemoryStore> {
        let mut store = MemoryStore::new();
        store.add_json("en", json).unwrap();
        Translator::new(store)
    }

    #[test]
    fn test_compiled_string_is_persisted_at_its_path() {
        let mut t = translator_with(r#"{ "foo": "foo", "bar": { "baz": "bar ${foo}" } }"#);
        let result = t.translate("en", "bar.baz").unwrap();
        assert_eq!(
            t.store().raw_lookup("en", "bar.baz", &[], "."),
            Some(result)
        );
        // siblings of the patched path are untouched
        assert_eq!(t.store().raw_lookup("en", "foo", &[], "."), Some(json!("foo")));
    }

    #[test]
    fn test_persisting_twice_is_a_no_op_in_effect() {
        let mut t = translator_with(r#"{ "foo": "foo", "bar": "bar ${foo}" }"#);
        let first = t.translate("en", "bar").unwrap();
        let second = t.translate("en", "bar").unwrap();
        assert_eq!(first, second);
        assert_eq!(t.store().raw_lookup("en", "bar", &[], "."), Some(first));
    }

    #[test]
    fn test_scoped_key_is_persisted_under_the_full_path() {
        let mut t = translator_with(
            r#"{ "foo": "foo", "models": { "user": { "label": "a ${foo}" } } }"#,
        );
        let options = Options {
            scope: vec!["models".to_string()],
            ..Options::default()
        };
        assert_eq!(
            t.translate_with("en", "user.label", &options).unwrap(),
            json!("a foo")
        );
        assert_eq!(
            t.store().raw_lookup("en", "models.user.label", &[], "."),
            Some(json!("a foo"))
        );
    }

    #[test]
    fn test_deep_key_through_a_hash_reference() {
        let mut t = translator_with(
            r#"{
                "hash_lookup": "${hash}",
                "hash": { "one": "hash", "deeper": { "first": "First hash" } }
            }"#,
        );
        assert_eq!(
            t.translate("en", "hash_lookup.deeper.first").unwrap(),
            json!("First hash")
        );
        // the ancestor got compiled and cached along the way
        assert_eq!(
            t.store().raw_lookup("en", "hash_lookup.one", &[], "."),
            Some(json!("hash"))
        );
    }

    #[test]
    fn test_deep_key_through_a_hash_reference_without_cache() {
        let mut t = translator_with(
            r#"{
                "hash_lookup": "${hash}",
                "hash": { "deeper": { "first": "First hash" } }
            }"#,
        );
        t.disable_interpolation_cache();
        assert_eq!(
            t.translate("en", "hash_lookup.deeper.first").unwrap(),
            json!("First hash")
        );
        // nothing was written back
        assert_eq!(
            t.store().raw_lookup("en", "hash_lookup", &[], "."),
            Some(json!("${hash}"))
        );
    }

    #[test]
    fn test_miss_after_ancestor_fallback_names_the_original_key() {
        let mut t = translator_with(
            r#"{ "hash_lookup": "${hash}", "hash": { "deeper": { "first": "First hash" } } }"#,
        );
        let err = t
            .translate("en", "hash_lookup.deeper.not_there.really")
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "translation missing: en.hash_lookup.deeper.not_there.really"
        );
    }

    #[test]
    fn test_single_segment_miss_is_final() {
        let mut t = translator_with(r#"{ "foo": "foo" }"#);
        assert_eq!(
            t.translate("en", "nope").unwrap_err().to_string(),
            "translation missing: en.nope"
        );
    }
}
