//! The region classifier.
//!
//! Given a document and a cursor position, computes the [`Mode`] (text / inline math / block
//! math / code, plus the "inside a text-producing sub-environment" flag) and the [`Bounds`] of
//! the enclosing math or code region. Nearly every feature in the engine is gated on this
//! classification.
//!
//! Results are cached per exact cursor offset and invalidated whenever the buffer version
//! changes; a sorted list of previously seen math-region bounds allows binary-search
//! containment checks without re-asking the [`MathSource`] oracle while the cursor stays
//! inside a known region.

use crate::brackets::{close_bracket_for, find_matching_bracket, rfind_before};
use crate::syntax::MathSource;
use std::collections::HashMap;

/// A LaTeX open/close delimiter pair used for containment tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    /// The opening symbol, e.g. `\text{`.
    pub open_symbol: String,
    /// The closing symbol, e.g. `}`.
    pub close_symbol: String,
}

impl Environment {
    /// Create an environment from its delimiter pair.
    pub fn new(open_symbol: impl Into<String>, close_symbol: impl Into<String>) -> Self {
        Self {
            open_symbol: open_symbol.into(),
            close_symbol: close_symbol.into(),
        }
    }
}

/// Mode flags for a cursor position.
///
/// `inline_math`/`block_math` are suppressed (and `text_env` raised) when the position falls
/// inside a text-producing sub-environment nested in math, mirroring real LaTeX semantics
/// where `\text{...}` content is not math.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Mode {
    /// Plain text (including Markdown prose).
    pub text: bool,
    /// Inside `$...$`.
    pub inline_math: bool,
    /// Inside `$$...$$` (or a math-language code block).
    pub block_math: bool,
    /// Inside a fenced code block not treated as math.
    pub code: bool,
    /// Inside a text-producing sub-environment nested within math.
    pub text_env: bool,
}

impl Mode {
    /// Plain-text mode (the default when no enclosing region is found).
    pub fn plain_text() -> Self {
        Mode {
            text: true,
            ..Mode::default()
        }
    }

    /// Returns `true` if the position is in math proper (not suppressed by a text
    /// sub-environment).
    pub fn in_math(&self) -> bool {
        (self.inline_math || self.block_math) && !self.text_env
    }
}

/// Boundaries of the enclosing math/code region. Inner bounds exclude the delimiter tokens,
/// outer bounds include them; both are contiguous half-open ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    /// Offset of the opening delimiter.
    pub outer_start: usize,
    /// Offset just past the opening delimiter.
    pub inner_start: usize,
    /// Offset of the closing delimiter.
    pub inner_end: usize,
    /// Offset just past the closing delimiter.
    pub outer_end: usize,
}

/// The classification result for one cursor position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Context {
    /// The position this context was computed for.
    pub pos: usize,
    /// Mode flags.
    pub mode: Mode,
    /// Bounds of the enclosing math/code region, if any.
    pub bounds: Option<Bounds>,
    /// Language of the enclosing fenced code block, if any.
    pub codeblock_language: Option<String>,
}

impl Context {
    fn plain(pos: usize) -> Self {
        Context {
            pos,
            mode: Mode::plain_text(),
            bounds: None,
            codeblock_language: None,
        }
    }
}

/// Returns `true` if `pos` falls inside environment `env` (between its open and close
/// symbols), scanning backward for the most recent unclosed open symbol.
///
/// The open symbol is searched for literally. When it ends in a generic bracket character
/// (e.g. `\text{`), the matching close is found by balanced-bracket search from that trailing
/// bracket, so unrelated `{...}` pairs inside the environment are counted correctly.
pub fn is_within_environment(text: &str, pos: usize, env: &Environment) -> bool {
    let open_len = env.open_symbol.chars().count();
    let mut search_before = pos;

    while let Some(open_idx) = rfind_before(text, &env.open_symbol, search_before) {
        let content_start = open_idx + open_len;

        let trailing = env.open_symbol.chars().last();
        let close_idx = match trailing.and_then(close_bracket_for) {
            Some(generic_close) if env.close_symbol == generic_close.to_string() => {
                // The open symbol ends in a generic bracket whose pair is the close symbol:
                // balance from the bracket character itself.
                find_matching_bracket(
                    text,
                    content_start - 1,
                    &trailing.expect("trailing bracket").to_string(),
                    &env.close_symbol,
                    false,
                    None,
                )
            }
            _ => find_matching_bracket(
                text,
                open_idx,
                &env.open_symbol,
                &env.close_symbol,
                false,
                None,
            ),
        };

        match close_idx {
            // Unclosed environment: everything after the open symbol is inside.
            None => return pos >= content_start,
            Some(close) if content_start <= pos && pos <= close => return true,
            Some(_) => {
                // This occurrence closes before `pos`; keep looking further back.
                search_before = open_idx;
            }
        }
    }

    false
}

/// The fixed list of text-producing sub-environments that suppress math mode.
pub fn text_environments() -> Vec<Environment> {
    [
        r"\text{",
        r"\tag{",
        r"\begin{",
        r"\textrm{",
        r"\mbox{",
        r"\textbf{",
        r"\textit{",
    ]
    .iter()
    .map(|open| Environment::new(*open, "}"))
    .collect()
}

#[derive(Debug, Clone, Copy)]
struct CachedRegion {
    bounds: Bounds,
    display: bool,
}

/// Computes and caches [`Context`] values against a [`MathSource`] oracle.
pub struct ContextProvider<S: MathSource> {
    source: S,
    math_languages: Vec<String>,
    text_envs: Vec<Environment>,
    cache: HashMap<usize, Context>,
    regions: Vec<CachedRegion>,
    cached_version: Option<u64>,
}

impl<S: MathSource> ContextProvider<S> {
    /// Create a provider over `source`. Code blocks whose language appears in
    /// `math_languages` are classified as block math.
    pub fn new(source: S, math_languages: Vec<String>) -> Self {
        Self {
            source,
            math_languages,
            text_envs: text_environments(),
            cache: HashMap::new(),
            regions: Vec::new(),
            cached_version: None,
        }
    }

    /// The underlying oracle.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Replace the math-language list (configuration reload); drops the cache.
    pub fn set_math_languages(&mut self, math_languages: Vec<String>) {
        self.math_languages = math_languages;
        self.invalidate();
    }

    /// Drop all cached classifications (any document or viewport change).
    pub fn invalidate(&mut self) {
        self.cache.clear();
        self.regions.clear();
        self.cached_version = None;
    }

    /// Classify `pos` in `text`. `version` keys the cache: a new version invalidates
    /// everything computed for the previous one.
    pub fn context_at(&mut self, text: &str, pos: usize, version: u64) -> Context {
        if self.cached_version != Some(version) {
            self.invalidate();
            self.cached_version = Some(version);
        }
        if let Some(ctx) = self.cache.get(&pos) {
            return ctx.clone();
        }
        let ctx = self.classify(text, pos);
        self.cache.insert(pos, ctx.clone());
        ctx
    }

    fn classify(&mut self, text: &str, pos: usize) -> Context {
        // Fenced code blocks first: `$` inside them never opens math.
        if let Some(block) = self.source.codeblock_at(text, pos) {
            let bounds = Bounds {
                outer_start: block.inner_start,
                inner_start: block.inner_start,
                inner_end: block.inner_end,
                outer_end: block.inner_end,
            };
            let is_math_language = block
                .language
                .as_deref()
                .is_some_and(|lang| self.math_languages.iter().any(|m| m == lang));

            if is_math_language {
                return self.math_context(text, pos, bounds, true, block.language);
            }
            return Context {
                pos,
                mode: Mode {
                    code: true,
                    ..Mode::default()
                },
                bounds: Some(bounds),
                codeblock_language: block.language,
            };
        }

        if let Some(region) = self.lookup_region(text, pos) {
            return self.math_context(text, pos, region.bounds, region.display, None);
        }

        Context::plain(pos)
    }

    fn math_context(
        &self,
        text: &str,
        pos: usize,
        bounds: Bounds,
        display: bool,
        codeblock_language: Option<String>,
    ) -> Context {
        let in_text_env = self
            .text_envs
            .iter()
            .any(|env| is_within_environment(text, pos, env));

        let mode = if in_text_env {
            Mode {
                text: true,
                text_env: true,
                ..Mode::default()
            }
        } else {
            Mode {
                inline_math: !display,
                block_math: display,
                ..Mode::default()
            }
        };

        Context {
            pos,
            mode,
            bounds: Some(bounds),
            codeblock_language,
        }
    }

    /// Containment lookup against the sorted region cache, falling back to the oracle.
    fn lookup_region(&mut self, text: &str, pos: usize) -> Option<CachedRegion> {
        let idx = self
            .regions
            .partition_point(|r| r.bounds.inner_end < pos);
        if let Some(region) = self.regions.get(idx)
            && region.bounds.inner_start <= pos
            && pos <= region.bounds.inner_end
        {
            return Some(*region);
        }

        let found = self.source.math_region_at(text, pos)?;
        let cached = CachedRegion {
            bounds: Bounds {
                outer_start: found.outer_start,
                inner_start: found.inner_start,
                inner_end: found.inner_end,
                outer_end: found.outer_end,
            },
            display: found.display,
        };
        let insert_at = self
            .regions
            .partition_point(|r| r.bounds.inner_start < cached.bounds.inner_start);
        self.regions.insert(insert_at, cached);
        Some(cached)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::MarkdownMathScanner;

    fn provider() -> ContextProvider<MarkdownMathScanner> {
        ContextProvider::new(MarkdownMathScanner::new(), vec!["desmos".to_string()])
    }

    #[test]
    fn test_inline_math_classification() {
        let mut p = provider();
        let ctx = p.context_at("a $x+y$ b", 4, 0);
        assert!(ctx.mode.inline_math);
        assert!(ctx.mode.in_math());
        let bounds = ctx.bounds.unwrap();
        assert_eq!(bounds.inner_start, 3);
        assert_eq!(bounds.inner_end, 6);
    }

    #[test]
    fn test_block_math_classification() {
        let mut p = provider();
        let ctx = p.context_at("$$\nx\n$$", 4, 0);
        assert!(ctx.mode.block_math);
        assert!(!ctx.mode.inline_math);
    }

    #[test]
    fn test_text_environment_suppresses_math() {
        let mut p = provider();
        let text = r"$x + \text{some words} + y$";
        let inside_text = p.context_at(text, 15, 0);
        assert!(inside_text.mode.text_env);
        assert!(!inside_text.mode.in_math());

        let in_math = p.context_at(text, 3, 0);
        assert!(in_math.mode.in_math());
    }

    #[test]
    fn test_no_region_defaults_to_text() {
        let mut p = provider();
        let ctx = p.context_at("plain prose", 5, 0);
        assert_eq!(ctx.mode, Mode::plain_text());
        assert!(ctx.bounds.is_none());
    }

    #[test]
    fn test_code_block_language() {
        let mut p = provider();
        let text = "```python\nx = 1\n```\n";
        let ctx = p.context_at(text, 12, 0);
        assert!(ctx.mode.code);
        assert_eq!(ctx.codeblock_language.as_deref(), Some("python"));
    }

    #[test]
    fn test_math_language_code_block_is_block_math() {
        let mut p = provider();
        let text = "```desmos\ny = x^2\n```\n";
        let ctx = p.context_at(text, 12, 0);
        assert!(ctx.mode.block_math);
        assert!(ctx.mode.in_math());
    }

    #[test]
    fn test_is_within_environment_nested_braces() {
        let text = r"\text{a {nested} b} outside";
        let env = Environment::new(r"\text{", "}");
        assert!(is_within_environment(text, 8, &env));
        assert!(is_within_environment(text, 12, &env));
        assert!(!is_within_environment(text, 22, &env));
    }

    #[test]
    fn test_is_within_environment_unclosed() {
        let env = Environment::new(r"\text{", "}");
        assert!(is_within_environment(r"$\text{abc", 9, &env));
    }

    #[test]
    fn test_cache_invalidation_on_version_change() {
        let mut p = provider();
        let ctx1 = p.context_at("$x$", 1, 0);
        assert!(ctx1.mode.in_math());
        // Same position, new version, different text.
        let ctx2 = p.context_at("yyy", 1, 1);
        assert!(!ctx2.mode.in_math());
    }
}
