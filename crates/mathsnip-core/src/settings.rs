//! Engine settings.
//!
//! A plain value object owned by the engine and replaced wholesale on configuration reload.
//! Feature toggles gate whole policy layers; the remaining fields tune individual behaviors.

use crate::context::Environment;

/// The key that fires manually-triggered (non-automatic) snippets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerKey {
    /// The Tab key (default).
    Tab,
    /// The Space key.
    Space,
}

/// All tunables for the engine.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Master toggle for snippet expansion.
    pub snippets_enabled: bool,
    /// Toggle for the autofraction feature.
    pub autofraction_enabled: bool,
    /// Toggle for matrix/align environment shortcuts.
    pub matrix_shortcuts_enabled: bool,
    /// Toggle for tab-out-of-delimiter navigation.
    pub tabout_enabled: bool,
    /// Toggle for the auto-enlarge-brackets pass.
    pub auto_enlarge_brackets: bool,
    /// The manual snippet trigger key.
    pub trigger_key: TriggerKey,
    /// Characters accepted as word boundaries around `w`-flagged snippets.
    pub word_delimiters: String,
    /// Characters that terminate the backward numerator walk in autofraction.
    pub autofraction_breaking_chars: String,
    /// Environments inside which autofraction never fires.
    pub autofraction_excluded: Vec<Environment>,
    /// Environment names in which Tab/Enter become matrix shortcuts.
    pub matrix_environments: Vec<String>,
    /// Words that make the enclosing bracket pair eligible for `\left`/`\right` wrapping.
    pub enlarge_trigger_words: Vec<String>,
    /// Fenced-code-block languages classified as block math.
    pub math_code_languages: Vec<String>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            snippets_enabled: true,
            autofraction_enabled: true,
            matrix_shortcuts_enabled: true,
            tabout_enabled: true,
            auto_enlarge_brackets: true,
            trigger_key: TriggerKey::Tab,
            word_delimiters: "., -\n:;!?/{}[]()=~$".to_string(),
            autofraction_breaking_chars: "+-=<>,;: \t\r\n".to_string(),
            autofraction_excluded: vec![
                Environment::new(r"\pu{", "}"),
                Environment::new(r"\ce{", "}"),
                Environment::new(r"^{", "}"),
                Environment::new(r"\frac{", "}"),
            ],
            matrix_environments: vec![
                "pmatrix".to_string(),
                "bmatrix".to_string(),
                "vmatrix".to_string(),
                "matrix".to_string(),
                "cases".to_string(),
                "align".to_string(),
                "aligned".to_string(),
                "gather".to_string(),
                "array".to_string(),
            ],
            enlarge_trigger_words: vec![
                "sum".to_string(),
                "int".to_string(),
                "frac".to_string(),
                "prod".to_string(),
                "bigcup".to_string(),
                "bigcap".to_string(),
            ],
            math_code_languages: Vec::new(),
        }
    }
}
