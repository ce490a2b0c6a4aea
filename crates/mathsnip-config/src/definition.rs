//! Raw `serde` shapes for snippet definition files.
//!
//! These mirror the YAML structure as authored; turning records into engine snippets is the
//! compiler's job.

use serde::Deserialize;
use serde_yaml::Value;
use std::collections::HashMap;

#[derive(Debug, Clone, Default, Deserialize)]
/// Raw YAML snippet definition file.
///
/// The `snippets` entries stay as raw YAML values here so one malformed record produces one
/// error instead of rejecting the whole file; the compiler deserializes them individually.
pub struct SnippetFileDef {
    #[serde(default)]
    /// User variables, merged over the built-in table (user entries win).
    pub variables: HashMap<String, String>,

    #[serde(default)]
    /// The snippet records, in file order.
    pub snippets: Vec<Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
/// `trigger:` field: either a plain string or the explicit `{ regex: "..." }` form.
pub enum TriggerDef {
    /// A plain trigger string (literal unless the `r` option letter is set).
    Plain(String),
    /// An explicit regex trigger.
    Regex {
        /// The regex source string.
        regex: String,
    },
}

#[derive(Debug, Clone, Deserialize)]
/// A single snippet record as authored.
pub struct SnippetDef {
    /// The trigger.
    pub trigger: TriggerDef,

    /// Replacement text; may contain tabstop markers, `[[i]]` capture references, or
    /// `${VISUAL}`.
    pub replacement: String,

    #[serde(default)]
    /// Option letters: modes `m t M k c`, behavior `A r w v`. No mode letters means all
    /// modes.
    pub options: String,

    #[serde(default)]
    /// Priority; higher wins, default 0.
    pub priority: Option<i32>,

    #[serde(default)]
    /// Optional human-readable description.
    pub description: Option<String>,
}

impl SnippetDef {
    /// The trigger string as authored, regardless of form.
    pub fn trigger_text(&self) -> &str {
        match &self.trigger {
            TriggerDef::Plain(s) => s,
            TriggerDef::Regex { regex } => regex,
        }
    }
}
