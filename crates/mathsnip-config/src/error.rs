//! Loader error types.

use thiserror::Error;

#[derive(Debug, Error)]
/// Errors produced by the snippet configuration loader.
///
/// Record-level variants name the offending trigger (or record index when the record could
/// not be deserialized at all); the loader collects them without discarding valid records.
pub enum ConfigError {
    #[error("YAML parse error: {0}")]
    /// YAML parsing failed for the whole document.
    Yaml(#[from] serde_yaml::Error),

    #[error("I/O error: {0}")]
    /// Filesystem I/O failed.
    Io(#[from] std::io::Error),

    #[error("snippet record {index}: {message}")]
    /// A record in the `snippets` list did not deserialize.
    BadRecord {
        /// Zero-based index of the record in the file.
        index: usize,
        /// The deserialization error message.
        message: String,
    },

    #[error("snippet '{trigger}': unknown option letter '{letter}'")]
    /// An `options` string contained an unrecognized letter.
    BadOptions {
        /// The record's trigger as authored.
        trigger: String,
        /// The unrecognized letter.
        letter: char,
    },

    #[error("snippet '{trigger}': regex compile error: {message}")]
    /// A regex trigger failed to compile.
    BadRegex {
        /// The record's trigger as authored.
        trigger: String,
        /// The compiler error message.
        message: String,
    },

    #[error("snippet '{trigger}': unknown variable '{name}'")]
    /// A `${NAME}` reference in a trigger has no definition.
    UnknownVariable {
        /// The record's trigger as authored.
        trigger: String,
        /// The unresolved variable name.
        name: String,
    },

    #[error("snippet '{trigger}': visual trigger must be a single character")]
    /// A `v`-flagged record's trigger is not exactly one character.
    BadVisualTrigger {
        /// The record's trigger as authored.
        trigger: String,
    },

    #[error("snippet '{trigger}': visual replacement does not contain ${{VISUAL}}")]
    /// A `v`-flagged record's replacement has nowhere to put the selection.
    MissingVisualPlaceholder {
        /// The record's trigger as authored.
        trigger: String,
    },
}
