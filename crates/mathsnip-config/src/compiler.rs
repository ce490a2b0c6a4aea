//! Compiles raw YAML records into [`mathsnip_core::Snippet`] values.
//!
//! Compilation is per record: a malformed record yields one [`ConfigError`] and the
//! remaining records still load. Option letters, variable expansion, regex anchoring, and
//! the visual-snippet invariants are all resolved here, so the engine only ever sees
//! well-formed snippets.

use std::collections::HashMap;

use mathsnip_core::{
    ModeMask, Snippet, SnippetKind, VISUAL_PLACEHOLDER, compile_trigger_pattern,
};
use serde_yaml::Value;

use crate::definition::{SnippetDef, SnippetFileDef, TriggerDef};
use crate::error::ConfigError;
use crate::variables::{builtin_variables, substitute_variables};

/// The result of compiling a definition file: every record that compiled, plus one error per
/// record that did not.
#[derive(Debug, Default)]
pub struct LoadedSnippets {
    /// Compiled snippets, in file order (the engine sorts on installation).
    pub snippets: Vec<Snippet>,
    /// One entry per rejected record.
    pub errors: Vec<ConfigError>,
}

/// Parse and compile a YAML definition string.
///
/// A document that is not valid YAML is fatal; individually malformed records are collected
/// in [`LoadedSnippets::errors`] without discarding the rest.
pub fn load_str(yaml: &str) -> Result<LoadedSnippets, ConfigError> {
    let def: SnippetFileDef = serde_yaml::from_str(yaml)?;
    Ok(compile_file(def))
}

/// Read and compile a definition file from disk.
pub fn load_path(path: impl AsRef<std::path::Path>) -> Result<LoadedSnippets, ConfigError> {
    let yaml = std::fs::read_to_string(path)?;
    load_str(&yaml)
}

/// Compile an already-parsed definition file.
pub fn compile_file(def: SnippetFileDef) -> LoadedSnippets {
    let mut variables = builtin_variables();
    // User entries shadow built-ins.
    variables.extend(def.variables);

    let mut loaded = LoadedSnippets::default();
    for (index, value) in def.snippets.into_iter().enumerate() {
        match compile_record(index, value, &variables) {
            Ok(snippet) => loaded.snippets.push(snippet),
            Err(err) => loaded.errors.push(err),
        }
    }
    loaded
}

fn compile_record(
    index: usize,
    value: Value,
    variables: &HashMap<String, String>,
) -> Result<Snippet, ConfigError> {
    let record: SnippetDef =
        serde_yaml::from_value(value).map_err(|err| ConfigError::BadRecord {
            index,
            message: err.to_string(),
        })?;

    let trigger = record.trigger_text().to_string();
    let options = parse_options(&trigger, &record.options)?;
    let is_regex = options.regex || matches!(record.trigger, TriggerDef::Regex { .. });

    let kind = if options.visual {
        let mut chars = trigger.chars();
        let (Some(ch), None) = (chars.next(), chars.next()) else {
            return Err(ConfigError::BadVisualTrigger { trigger });
        };
        if !record.replacement.contains(VISUAL_PLACEHOLDER) {
            return Err(ConfigError::MissingVisualPlaceholder { trigger });
        }
        SnippetKind::Visual { trigger: ch }
    } else if is_regex {
        let source = substitute_variables(&trigger, variables)
            .map_err(|name| ConfigError::UnknownVariable {
                trigger: trigger.clone(),
                name,
            })?;
        let regex =
            compile_trigger_pattern(&source).map_err(|err| ConfigError::BadRegex {
                trigger: trigger.clone(),
                message: err.to_string(),
            })?;
        SnippetKind::Pattern { regex, source }
    } else {
        SnippetKind::Literal { trigger }
    };

    Ok(Snippet {
        kind,
        replacement: record.replacement,
        mask: options.mask,
        automatic: options.automatic,
        word_boundary: options.word_boundary,
        priority: record.priority.unwrap_or(0),
        description: record.description,
    })
}

#[derive(Debug)]
struct ParsedOptions {
    mask: ModeMask,
    automatic: bool,
    regex: bool,
    word_boundary: bool,
    visual: bool,
}

fn parse_options(trigger: &str, options: &str) -> Result<ParsedOptions, ConfigError> {
    let mut parsed = ParsedOptions {
        mask: ModeMask::default(),
        automatic: false,
        regex: false,
        word_boundary: false,
        visual: false,
    };
    for letter in options.chars() {
        match letter {
            'm' => {
                parsed.mask.inline_math = true;
                parsed.mask.block_math = true;
            }
            't' => parsed.mask.text = true,
            'M' => parsed.mask.block_math = true,
            'k' => parsed.mask.inline_math = true,
            'c' => parsed.mask.code = true,
            'A' => parsed.automatic = true,
            'r' => parsed.regex = true,
            'w' => parsed.word_boundary = true,
            'v' => parsed.visual = true,
            ' ' | '\t' => {}
            other => {
                return Err(ConfigError::BadOptions {
                    trigger: trigger.to_string(),
                    letter: other,
                });
            }
        }
    }
    // No mode letters: the snippet fires everywhere.
    if parsed.mask.is_empty() {
        parsed.mask = ModeMask::all();
    }
    Ok(parsed)
}
