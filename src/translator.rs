//! Top-level translate entry point.
//!
//! [`Translator`] layers recursive interpolation and result caching over a
//! base [`Store`]: a lookup fetches the raw value, compiles every embedded
//! `${key}` reference by re-entering `translate` for the referenced key, and
//! writes the compiled result back into the store so later lookups are a
//! plain base read. Reference resolution and ancestor fallback re-enter
//! through [`Translator::translate_in_chain`] so that one cycle chain spans
//! the whole logical call.

use std::collections::HashMap;

use serde_json::Value;

use crate::error::{CycleChain, Error, Result};
use crate::store::Store;

/// Per-call lookup options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Scope segments prepended to the key, as in `["models", "user"]`.
    pub scope: Vec<String>,
    /// Separator used to split dotted keys into path segments.
    pub separator: String,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            scope: Vec::new(),
            separator: ".".to_string(),
        }
    }
}

impl Options {
    /// Options for a re-entrant resolution: referenced keys are absolute,
    /// so the enclosing scope does not apply, but the separator does.
    pub(crate) fn reentrant(&self) -> Self {
        Self {
            scope: Vec::new(),
            separator: self.separator.clone(),
        }
    }
}

/// Recursive-lookup layer over a translation [`Store`].
///
/// With the interpolation cache enabled (the default), a value that needed
/// compiling is persisted back to the store at its original key path, so the
/// next lookup returns the compiled value without touching the tokenizer.
/// With the cache disabled nothing is ever written back and every call
/// re-resolves from the stored raw text.
pub struct Translator<S: Store> {
    store: S,
    cache_enabled: bool,
    fallbacks: HashMap<String, Vec<String>>,
}

impl<S: Store> Translator<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            cache_enabled: true,
            fallbacks: HashMap::new(),
        }
    }

    /// Disable the interpolation cache: every call re-resolves from the
    /// stored raw text and nothing is written back to the store.
    pub fn disable_interpolation_cache(&mut self) {
        self.cache_enabled = false;
    }

    pub fn cache_enabled(&self) -> bool {
        self.cache_enabled
    }

    /// Fallback locales tried, in order, when `locale` itself misses.
    /// References embedded in a fallback locale's value still resolve with
    /// the locale originally requested.
    pub fn set_fallbacks(&mut self, locale: &str, chain: Vec<String>) {
        self.fallbacks.insert(locale.to_string(), chain);
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Translate `key` in `locale` with default options.
    pub fn translate(&mut self, locale: &str, key: &str) -> Result<Value> {
        self.translate_with(locale, key, &Options::default())
    }

    /// Translate `key` in `locale`.
    ///
    /// Walks the locale's fallback chain, resolves every embedded reference
    /// recursively, applies ancestor fallback on a direct miss, and caches
    /// compiled results when the cache is enabled.
    pub fn translate_with(&mut self, locale: &str, key: &str, options: &Options) -> Result<Value> {
        let mut chain = CycleChain::new();
        self.translate_in_chain(locale, key, options, &mut chain)
    }

    /// Re-entrant entry point: reference resolution and ancestor fallback
    /// call back in here with the chain of the enclosing call, so revisits
    /// are detected across the whole top-level resolution.
    pub(crate) fn translate_in_chain(
        &mut self,
        locale: &str,
        key: &str,
        options: &Options,
        chain: &mut CycleChain,
    ) -> Result<Value> {
        for candidate in self.fallback_chain(locale) {
            if let Some(value) =
                self.lookup_with_ancestor_fallback(&candidate, locale, key, options, chain)?
            {
                return Ok(value);
            }
        }
        Err(Error::MissingTranslation {
            locale: locale.to_string(),
            key: key.to_string(),
        })
    }

    fn fallback_chain(&self, locale: &str) -> Vec<String> {
        let mut chain = vec![locale.to_string()];
        if let Some(fallbacks) = self.fallbacks.get(locale) {
            for fallback in fallbacks {
                if !chain.contains(fallback) {
                    chain.push(fallback.clone());
                }
            }
        }
        chain
    }

    /// One locale's recursive lookup: base lookup, compile, cache.
    ///
    /// `locale` is where the raw value is fetched from; `current_locale` is
    /// the locale requested at the top level, which embedded references
    /// resolve against even when the raw text was found under a fallback.
    pub(crate) fn lookup(
        &mut self,
        locale: &str,
        current_locale: &str,
        key: &str,
        options: &Options,
        chain: &mut CycleChain,
    ) -> Result<Option<Value>> {
        let Some(raw) = self
            .store
            .raw_lookup(locale, key, &options.scope, &options.separator)
        else {
            return Ok(None);
        };

        if !matches!(raw, Value::String(_) | Value::Object(_)) {
            return Ok(Some(raw));
        }

        let (compiled, had_to_compile) =
            self.deep_compile(current_locale, raw, key, options, chain)?;

        if self.cache_enabled && had_to_compile {
            self.cache_compiled_result(locale, key, compiled.clone(), options);
        }

        Ok(Some(compiled))
    }
}
