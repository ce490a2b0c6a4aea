#![warn(missing_docs)]
//! `mathsnip-config` - YAML snippet & variable configuration for `mathsnip-core`.
//!
//! This crate contains the definition-file loader: raw `serde` shapes, the trigger-variable
//! table, and the compiler that turns records into `mathsnip_core::Snippet` values, plus a
//! built-in default snippet set.
//!
//! Loading is fault-tolerant per record: one malformed snippet produces one [`ConfigError`]
//! and the remaining records still compile, so a typo in a user file never disables every
//! snippet at once.

pub mod compiler;
pub mod defaults;
pub mod definition;
pub mod error;
pub mod variables;

pub use compiler::{LoadedSnippets, compile_file, load_path, load_str};
pub use defaults::{DEFAULT_SNIPPETS_YAML, default_snippets};
pub use definition::{SnippetDef, SnippetFileDef, TriggerDef};
pub use error::ConfigError;
pub use variables::{builtin_variables, substitute_variables};
