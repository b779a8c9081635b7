//! Recursive compilation of raw translation values.
//!
//! A raw value is compiled per shape: mappings recurse into every child
//! preserving key order, strings get their `${key}` references resolved and
//! re-assembled, and any other leaf passes through untouched. The
//! accompanying flag reports whether a live reference was found anywhere, so
//! the caller knows whether the result is worth caching.

use serde_json::{Map, Value};

use crate::error::{CycleChain, Error, Result};
use crate::store::Store;
use crate::token::{Token, tokenize};
use crate::translator::{Options, Translator};

impl<S: Store> Translator<S> {
    /// Compile the raw value fetched for `initiating_key`.
    ///
    /// Always builds a fresh value; the caller's input is consumed and the
    /// store's structures are never touched in place.
    pub(crate) fn deep_compile(
        &mut self,
        current_locale: &str,
        value: Value,
        initiating_key: &str,
        options: &Options,
        chain: &mut CycleChain,
    ) -> Result<(Value, bool)> {
        match value {
            Value::Object(map) => {
                let mut compiled = Map::with_capacity(map.len());
                let mut had_to_compile = false;
                for (key, child) in map {
                    let child_key = format!("{initiating_key}{}{key}", options.separator);
                    let (child_compiled, child_flag) =
                        self.deep_compile(current_locale, child, &child_key, options, chain)?;
                    had_to_compile |= child_flag;
                    compiled.insert(key, child_compiled);
                }
                Ok((Value::Object(compiled), had_to_compile))
            }
            Value::String(text) => {
                self.compile_string(current_locale, text, initiating_key, options, chain)
            }
            other => Ok((other, false)),
        }
    }

    /// Compile one string: resolve live references, render escaped ones as
    /// their inert `${key}` spelling, keep literals verbatim.
    ///
    /// A string that is exactly one live reference may resolve to a whole
    /// mapping (or array); that value is handed through structurally instead
    /// of being stringified. In any multi-token context a non-string
    /// resolution is concatenated as compact JSON.
    fn compile_string(
        &mut self,
        current_locale: &str,
        text: String,
        initiating_key: &str,
        options: &Options,
        chain: &mut CycleChain,
    ) -> Result<(Value, bool)> {
        let tokens = tokenize(&text);
        if !tokens.iter().any(|t| matches!(t, Token::Reference { .. })) {
            return Ok((Value::String(text), false));
        }
        let had_to_compile = tokens.iter().any(Token::is_live_reference);

        let mut pieces = Vec::with_capacity(tokens.len());
        for token in &tokens {
            match token {
                Token::Literal(run) => pieces.push(Value::String((*run).to_string())),
                Token::Reference { key, escaped: true } => {
                    pieces.push(Value::String(format!("${{{key}}}")));
                }
                Token::Reference { key, escaped: false } => {
                    pieces.push(self.resolve_reference(
                        current_locale,
                        key,
                        &text,
                        initiating_key,
                        options,
                        chain,
                    )?);
                }
            }
        }

        if pieces.len() == 1 && (pieces[0].is_object() || pieces[0].is_array()) {
            return Ok((pieces.remove(0), had_to_compile));
        }

        let mut rendered = String::new();
        for piece in pieces {
            match piece {
                Value::String(text_piece) => rendered.push_str(&text_piece),
                other => rendered.push_str(&other.to_string()),
            }
        }
        Ok((Value::String(rendered), had_to_compile))
    }

    /// Resolve one live `${key}` occurrence by re-entering the top-level
    /// translate with the locale requested at the top of the call stack,
    /// never the locale the enclosing raw value happened to be stored under.
    ///
    /// The enclosing source string is recorded on the chain for the duration
    /// of the descent; a referenced key already on the chain is a cycle.
    fn resolve_reference(
        &mut self,
        current_locale: &str,
        ref_key: &str,
        raw_source: &str,
        initiating_key: &str,
        options: &Options,
        chain: &mut CycleChain,
    ) -> Result<Value> {
        // A key may appear only once as a chain entry: a repeat means the
        // key's own compilation is on the path that led back here.
        let revisited = chain.contains(initiating_key);
        chain.push(initiating_key, raw_source);
        if revisited || chain.contains(ref_key) {
            return Err(Error::CyclicReference {
                chain: chain.clone(),
            });
        }
        let resolved =
            self.translate_in_chain(current_locale, ref_key, &options.reentrant(), chain);
        chain.pop();
        resolved
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use crate::error::Error;
    use crate::store::MemoryStore;

    use super::*;

    fn translator_with(json: &str) -> Translator<MemoryStore> {
        let mut store = MemoryStore::new();
        store.add_json("en", json).unwrap();
        Translator::new(store)
    }

    #[test]
    fn test_resolves_embedded_reference() {
        let mut t = translator_with(r#"{ "foo": "foo", "bar": "bar ${foo}" }"#);
        assert_eq!(t.translate("en", "bar").unwrap(), json!("bar foo"));
    }

    #[test]
    fn test_bare_reference_becomes_the_referenced_hash() {
        let mut t =
            translator_with(r#"{ "hash": { "one": "hash" }, "hash_lookup": "${hash}" }"#);
        assert_eq!(
            t.translate("en", "hash_lookup").unwrap(),
            json!({ "one": "hash" })
        );
    }

    #[test]
    fn test_structured_reference_in_multi_token_context_is_stringified() {
        let mut t =
            translator_with(r#"{ "hash": { "one": "hash" }, "wrapped": "got: ${hash}" }"#);
        assert_eq!(
            t.translate("en", "wrapped").unwrap(),
            json!(r#"got: {"one":"hash"}"#)
        );
    }

    #[test]
    fn test_numeric_reference_is_stringified() {
        let mut t = translator_with(r#"{ "n": 3, "msg": "count: ${n}" }"#);
        assert_eq!(t.translate("en", "msg").unwrap(), json!("count: 3"));
    }

    #[test]
    fn test_escaped_reference_is_rendered_inert() {
        let mut t = translator_with(r#"{ "escaped": "price: $${foo}" }"#);
        assert_eq!(t.translate("en", "escaped").unwrap(), json!("price: ${foo}"));
        // nothing live was found, so nothing was persisted either
        assert_eq!(
            t.store().raw_lookup("en", "escaped", &[], "."),
            Some(json!("price: $${foo}"))
        );
    }

    #[test]
    fn test_missing_reference_propagates_the_referenced_key() {
        let mut t = translator_with(r#"{ "alternate_lookup": "${baz}" }"#);
        assert_eq!(
            t.translate("en", "alternate_lookup"),
            Err(Error::MissingTranslation {
                locale: "en".to_string(),
                key: "baz".to_string(),
            })
        );
    }

    #[test]
    fn test_self_reference_is_a_cycle() {
        let mut t = translator_with(r#"{ "x": "${x}" }"#);
        let Err(Error::CyclicReference { chain }) = t.translate("en", "x") else {
            panic!("expected a cyclic reference error");
        };
        assert_eq!(chain.keys().filter(|key| *key == "x").count(), 1);
        assert_eq!(chain.entries(), [("x".to_string(), "${x}".to_string())]);
    }

    #[test]
    fn test_mutual_reference_is_a_cycle() {
        let mut t = translator_with(r#"{ "a": "${b}", "b": "${a}" }"#);
        let Err(Error::CyclicReference { chain }) = t.translate("en", "a") else {
            panic!("expected a cyclic reference error");
        };
        assert_eq!(
            chain.entries(),
            [
                ("a".to_string(), "${b}".to_string()),
                ("b".to_string(), "${a}".to_string()),
            ]
        );
        assert!(t.translate("en", "b").is_err());
    }

    #[test]
    fn test_sibling_references_to_the_same_key_are_not_a_cycle() {
        let mut t = translator_with(
            r#"{ "base": "B", "foo": "${base}!", "twice": "${foo} and ${foo}" }"#,
        );
        assert_eq!(t.translate("en", "twice").unwrap(), json!("B! and B!"));
    }

    #[test]
    fn test_cycle_through_an_ancestor_lookup_is_detected() {
        // resolving a.x re-compiles a itself, so a's compilation is cyclic
        let mut t = translator_with(r#"{ "a": "${a.x}" }"#);
        assert!(matches!(
            t.translate("en", "a"),
            Err(Error::CyclicReference { .. })
        ));
    }

    #[test]
    fn test_cycle_through_a_hash_child_names_the_child_key() {
        let mut t = translator_with(r#"{ "bar": { "baz": "loop ${bar.baz}" } }"#);
        let Err(Error::CyclicReference { chain }) = t.translate("en", "bar") else {
            panic!("expected a cyclic reference error");
        };
        assert_eq!(chain.keys().collect::<Vec<_>>(), ["bar.baz"]);
    }
}
