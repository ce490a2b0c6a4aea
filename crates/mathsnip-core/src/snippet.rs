//! The snippet definition model.
//!
//! A [`Snippet`] is an immutable trigger→replacement rule. The three shapes (literal suffix,
//! anchored regex, visual/selection-based) form a closed sum type with one `process` operation
//! per variant, dispatched by pattern match; exhaustiveness is checked at compile time.
//!
//! Snippets are parsed once (see `mathsnip-config`), sorted by descending priority with ties
//! broken by descending trigger length, and replaced wholesale on configuration reload.

use crate::context::{Environment, Mode};
use regex::Regex;

/// The magic substring in a visual snippet's replacement that is substituted with the
/// selection verbatim.
pub const VISUAL_PLACEHOLDER: &str = "${VISUAL}";

/// The set of modes a snippet may fire in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModeMask {
    /// Fires in plain text.
    pub text: bool,
    /// Fires in inline math.
    pub inline_math: bool,
    /// Fires in block math.
    pub block_math: bool,
    /// Fires inside code blocks.
    pub code: bool,
}

impl ModeMask {
    /// All modes. Definitions carrying no mode letters parse to this (the historical
    /// behavior: the inverse of the empty set).
    pub fn all() -> Self {
        ModeMask {
            text: true,
            inline_math: true,
            block_math: true,
            code: true,
        }
    }

    /// Any math (inline or block).
    pub fn math() -> Self {
        ModeMask {
            inline_math: true,
            block_math: true,
            ..ModeMask::default()
        }
    }

    /// Text only.
    pub fn text_only() -> Self {
        ModeMask {
            text: true,
            ..ModeMask::default()
        }
    }

    /// Returns `true` if no mode is set.
    pub fn is_empty(&self) -> bool {
        !(self.text || self.inline_math || self.block_math || self.code)
    }

    /// Returns `true` if the mask overlaps the given mode flags.
    pub fn accepts(&self, mode: &Mode) -> bool {
        (self.text && mode.text && !mode.text_env)
            || (self.inline_math && mode.inline_math)
            || (self.block_math && mode.block_math)
            || (self.code && mode.code)
    }
}

/// The shape of a snippet's trigger, with the matching logic specific to each variant.
#[derive(Debug, Clone)]
pub enum SnippetKind {
    /// Matched by exact suffix comparison against the text immediately before the cursor.
    Literal {
        /// The literal trigger string.
        trigger: String,
    },
    /// Matched by an anchored regex against the effective line up to the cursor.
    Pattern {
        /// The compiled pattern (with the end-of-string anchor appended at build time).
        regex: Regex,
        /// The pattern source as authored, kept for diagnostics and ordering.
        source: String,
    },
    /// Fires only when a non-empty selection exists and the trigger character is typed.
    Visual {
        /// The single trigger character.
        trigger: char,
    },
}

/// How a successful match maps onto the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchSpan {
    /// Replace this many characters of the matching window (which ends at the cursor,
    /// including a just-typed character that is not yet in the document).
    Suffix(usize),
    /// Replace the current selection.
    Selection,
}

/// The result of a snippet's `process` operation: where to edit and what to insert.
#[derive(Debug, Clone)]
pub struct SnippetMatch {
    /// The span the replacement covers.
    pub span: MatchSpan,
    /// The concrete replacement text (captures/selection already substituted, tabstop
    /// markers still present).
    pub replacement: String,
}

/// An immutable snippet definition.
#[derive(Debug, Clone)]
pub struct Snippet {
    /// The trigger shape.
    pub kind: SnippetKind,
    /// Replacement text; may contain `$N` / `${N:default}` tabstop markers, `[[i]]` capture
    /// references (pattern snippets), or `${VISUAL}` (visual snippets).
    pub replacement: String,
    /// Modes this snippet fires in.
    pub mask: ModeMask,
    /// Fires on any typed character rather than only on the explicit trigger key.
    pub automatic: bool,
    /// Requires word-boundary delimiters on both sides of the match.
    pub word_boundary: bool,
    /// Higher priority wins; default 0.
    pub priority: i32,
    /// Optional human-readable description.
    pub description: Option<String>,
}

impl Snippet {
    /// Trigger length in characters, used to break priority ties (longer, more specific
    /// triggers win).
    pub fn trigger_len(&self) -> usize {
        match &self.kind {
            SnippetKind::Literal { trigger } => trigger.chars().count(),
            SnippetKind::Pattern { source, .. } => source.chars().count(),
            SnippetKind::Visual { .. } => 1,
        }
    }

    /// Run this snippet against the matching window.
    ///
    /// - `window` is the effective line up to the cursor, with a just-typed character already
    ///   appended when applicable.
    /// - `selection` is the primary selected text for the range under consideration (empty
    ///   for carets).
    ///
    /// Returns `None` on no match.
    pub fn process(&self, window: &str, selection: &str) -> Option<SnippetMatch> {
        match &self.kind {
            SnippetKind::Literal { trigger } => {
                if !window.ends_with(trigger.as_str()) {
                    return None;
                }
                Some(SnippetMatch {
                    span: MatchSpan::Suffix(trigger.chars().count()),
                    replacement: self.replacement.clone(),
                })
            }
            SnippetKind::Pattern { regex, .. } => {
                let caps = regex.captures(window)?;
                let whole = caps.get(0)?;
                // The anchor guarantees the match ends at the cursor.
                debug_assert_eq!(whole.end(), window.len());
                let replacement = substitute_captures(&self.replacement, &caps);
                Some(SnippetMatch {
                    span: MatchSpan::Suffix(whole.as_str().chars().count()),
                    replacement,
                })
            }
            SnippetKind::Visual { trigger } => {
                if selection.is_empty() || !window.ends_with(*trigger) {
                    return None;
                }
                Some(SnippetMatch {
                    span: MatchSpan::Selection,
                    replacement: self.replacement.replace(VISUAL_PLACEHOLDER, selection),
                })
            }
        }
    }
}

/// Substitute `[[i]]` capture references (0-indexed: `[[0]]` is the first capture group).
fn substitute_captures(replacement: &str, caps: &regex::Captures<'_>) -> String {
    let mut out = String::with_capacity(replacement.len());
    let chars: Vec<char> = replacement.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        if chars[i] == '[' && i + 1 < chars.len() && chars[i + 1] == '[' {
            let digits_start = i + 2;
            let mut j = digits_start;
            while j < chars.len() && chars[j].is_ascii_digit() {
                j += 1;
            }
            if j > digits_start && j + 1 < chars.len() && chars[j] == ']' && chars[j + 1] == ']' {
                let num: String = chars[digits_start..j].iter().collect();
                let group: usize = num.parse().unwrap_or(0);
                if let Some(m) = caps.get(group + 1) {
                    out.push_str(m.as_str());
                }
                i = j + 2;
                continue;
            }
        }
        out.push(chars[i]);
        i += 1;
    }
    out
}

/// Build the anchored regex for a pattern snippet (end-of-string anchor appended so the match
/// always ends at the cursor).
pub fn compile_trigger_pattern(source: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!("{source}$"))
}

/// Sort snippets by descending priority; ties broken by descending trigger length.
pub fn sort_snippets(snippets: &mut [Snippet]) {
    snippets.sort_by(|a, b| {
        b.priority
            .cmp(&a.priority)
            .then_with(|| b.trigger_len().cmp(&a.trigger_len()))
    });
}

/// The static trigger→environment exclusion table, consulted before a snippet fires.
///
/// Prevents, for example, alphanumeric auto-subscript snippets from firing inside `\pu{}`
/// unit expressions.
pub fn excluded_environment(snippet: &Snippet) -> Option<Environment> {
    let key = match &snippet.kind {
        SnippetKind::Literal { trigger } => trigger.as_str(),
        SnippetKind::Pattern { source, .. } => source.as_str(),
        SnippetKind::Visual { .. } => return None,
    };
    match key {
        r"([A-Za-z])(\d)" => Some(Environment::new(r"\pu{", "}")),
        "->" => Some(Environment::new(r"\ce{", "}")),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn literal(trigger: &str, replacement: &str, priority: i32) -> Snippet {
        Snippet {
            kind: SnippetKind::Literal {
                trigger: trigger.to_string(),
            },
            replacement: replacement.to_string(),
            mask: ModeMask::all(),
            automatic: true,
            word_boundary: false,
            priority,
            description: None,
        }
    }

    #[test]
    fn test_literal_suffix_match() {
        let s = literal("sr", "^{2}", 0);
        let m = s.process("$a sr", "").unwrap();
        assert_eq!(m.span, MatchSpan::Suffix(2));
        assert_eq!(m.replacement, "^{2}");
        assert!(s.process("$a s", "").is_none());
    }

    #[test]
    fn test_pattern_capture_substitution() {
        let regex = compile_trigger_pattern(r"([A-Za-z])(\d)").unwrap();
        let s = Snippet {
            kind: SnippetKind::Pattern {
                regex,
                source: r"([A-Za-z])(\d)".to_string(),
            },
            replacement: "[[0]]_{[[1]]}".to_string(),
            mask: ModeMask::math(),
            automatic: true,
            word_boundary: false,
            priority: 0,
            description: None,
        };
        let m = s.process("x2", "").unwrap();
        assert_eq!(m.span, MatchSpan::Suffix(2));
        assert_eq!(m.replacement, "x_{2}");
    }

    #[test]
    fn test_visual_requires_selection() {
        let s = Snippet {
            kind: SnippetKind::Visual { trigger: 'U' },
            replacement: r"\underbrace{${VISUAL}}_{$0}".to_string(),
            mask: ModeMask::math(),
            automatic: false,
            word_boundary: false,
            priority: 0,
            description: None,
        };
        assert!(s.process("abcU", "").is_none());
        let m = s.process("abcU", "a+b").unwrap();
        assert_eq!(m.span, MatchSpan::Selection);
        assert_eq!(m.replacement, r"\underbrace{a+b}_{$0}");
    }

    #[test]
    fn test_sort_priority_then_trigger_length() {
        let mut snippets = vec![
            literal("sr", "A", 0),
            literal("xsr", "B", 0),
            literal("s", "C", 5),
        ];
        sort_snippets(&mut snippets);
        let order: Vec<&str> = snippets
            .iter()
            .map(|s| match &s.kind {
                SnippetKind::Literal { trigger } => trigger.as_str(),
                _ => unreachable!(),
            })
            .collect();
        // Highest priority first; equal priorities ordered by descending trigger length.
        assert_eq!(order, vec!["s", "xsr", "sr"]);
    }

    #[test]
    fn test_mode_mask_accepts() {
        let mut mode = Mode::default();
        mode.inline_math = true;
        assert!(ModeMask::math().accepts(&mode));
        assert!(!ModeMask::text_only().accepts(&mode));

        let mut text_env = Mode::default();
        text_env.text = true;
        text_env.text_env = true;
        // Inside \text{} nested in math: math-only must not fire; neither does plain text
        // (the sub-environment is not ordinary prose).
        assert!(!ModeMask::math().accepts(&text_env));
    }

    #[test]
    fn test_exclusion_table() {
        let s = Snippet {
            kind: SnippetKind::Pattern {
                regex: compile_trigger_pattern(r"([A-Za-z])(\d)").unwrap(),
                source: r"([A-Za-z])(\d)".to_string(),
            },
            replacement: "[[0]]_{[[1]]}".to_string(),
            mask: ModeMask::math(),
            automatic: true,
            word_boundary: false,
            priority: 0,
            description: None,
        };
        let env = excluded_environment(&s).unwrap();
        assert_eq!(env.open_symbol, r"\pu{");
    }
}
