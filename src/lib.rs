//! Interloc - recursive `${key}` interpolation for i18n translation stores.
//!
//! Stored translation values (strings or arbitrarily nested mappings) may
//! embed references to other keys as `${other.key}`. A lookup through
//! [`Translator`] resolves every reference recursively, detects cyclic
//! reference chains, and memoizes the fully compiled result back into the
//! store so repeated lookups are a plain base read. `$${key}` escapes a
//! reference, rendering the literal `${key}` with nothing looked up.
//!
//! ```
//! use interloc::{MemoryStore, Translator};
//! use serde_json::json;
//!
//! let mut store = MemoryStore::new();
//! store
//!     .add_json("en", r#"{ "foo": "foo", "bar": { "baz": "bar ${foo}" } }"#)
//!     .unwrap();
//!
//! let mut translator = Translator::new(store);
//! assert_eq!(translator.translate("en", "bar.baz").unwrap(), json!("bar foo"));
//! ```
//!
//! ## Module Structure
//!
//! - `token`: interpolation token scanning (`${key}` / `$${key}` / literal)
//! - `keys`: dotted-key normalization into full key paths
//! - `store`: the `Store` interface and the in-memory reference store
//! - `translator`: the re-entrant top-level translate entry point
//! - `error`: missing-translation and cyclic-reference errors
//!
//! Compilation and cache persistence live in private modules behind
//! [`Translator`].

pub mod error;
pub mod keys;
pub mod store;
pub mod token;
pub mod translator;

mod cache;
mod compile;

pub use error::{CycleChain, Error, Result};
pub use store::{MemoryStore, Store};
pub use translator::{Options, Translator};
