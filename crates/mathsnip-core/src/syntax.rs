//! The math-region oracle.
//!
//! The region classifier never walks document syntax itself; it asks a [`MathSource`] for the
//! boundary pair enclosing a position. The trait is the injected seam: a host with an
//! incremental parser implements it over its syntax tree, while [`MarkdownMathScanner`] is the
//! built-in implementation for Markdown-style documents (`$...$`, `$$...$$`, fenced code
//! blocks).

use regex::Regex;

/// A math region's boundaries. Inner bounds exclude the delimiter tokens, outer bounds include
/// them; all ranges are half-open character offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MathRegion {
    /// Offset of the opening delimiter.
    pub outer_start: usize,
    /// Offset just past the opening delimiter.
    pub inner_start: usize,
    /// Offset of the closing delimiter.
    pub inner_end: usize,
    /// Offset just past the closing delimiter.
    pub outer_end: usize,
    /// `true` for display (`$$`) math, `false` for inline (`$`) math.
    pub display: bool,
}

impl MathRegion {
    /// Returns `true` if `pos` lies within the region's content (inclusive of both inner
    /// boundaries, so a caret between `$` and `$` counts).
    pub fn contains(&self, pos: usize) -> bool {
        self.inner_start <= pos && pos <= self.inner_end
    }
}

/// A fenced code block: the language tag (if any) and the content bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock {
    /// The language string after the opening fence, if present.
    pub language: Option<String>,
    /// Offset of the first content character (start of the line after the fence).
    pub inner_start: usize,
    /// Offset just past the last content character (start of the closing fence line).
    pub inner_end: usize,
}

impl CodeBlock {
    /// Returns `true` if `pos` lies within the block content.
    pub fn contains(&self, pos: usize) -> bool {
        self.inner_start <= pos && pos <= self.inner_end
    }
}

/// The syntax oracle consumed by the region classifier.
pub trait MathSource {
    /// The math region whose content contains `pos`, if any.
    fn math_region_at(&self, text: &str, pos: usize) -> Option<MathRegion>;

    /// The fenced code block whose content contains `pos`, if any.
    fn codeblock_at(&self, text: &str, pos: usize) -> Option<CodeBlock>;

    /// All math regions in the document, in order. Used to warm the classifier's bounds cache.
    fn math_regions(&self, text: &str) -> Vec<MathRegion>;
}

/// The built-in Markdown scanner.
///
/// Recognizes `$...$` inline spans (closed at the end of the line if unterminated),
/// `$$...$$` display blocks (closed at the end of the document if unterminated), and
/// triple-backtick fenced code blocks. `\$` never opens or closes a span. A position
/// directly between two adjacent `$` is reported as an empty inline span.
#[derive(Debug, Clone, Default)]
pub struct MarkdownMathScanner;

impl MarkdownMathScanner {
    /// Create a scanner.
    pub fn new() -> Self {
        Self
    }

    fn scan(&self, text: &str) -> (Vec<MathRegion>, Vec<CodeBlock>) {
        let chars: Vec<char> = text.chars().collect();
        let fence_re = fence_regex();

        let mut regions = Vec::new();
        let mut blocks = Vec::new();

        let mut i = 0;
        let mut block_open: Option<usize> = None; // outer_start of an open $$ block
        let mut inline_open: Option<usize> = None; // outer_start of an open $ span

        while i < chars.len() {
            let line_start = i;
            let mut line_end = i;
            while line_end < chars.len() && chars[line_end] != '\n' {
                line_end += 1;
            }
            let line: String = chars[line_start..line_end].iter().collect();

            // Fenced code blocks take a whole line and suppress math scanning inside.
            if block_open.is_none()
                && inline_open.is_none()
                && let Some(caps) = fence_re.captures(&line)
            {
                let language = caps
                    .get(1)
                    .map(|m| m.as_str().trim().to_string())
                    .filter(|s| !s.is_empty());
                let content_start = if line_end < chars.len() { line_end + 1 } else { line_end };

                // Find the closing fence line.
                let mut j = content_start;
                let mut content_end = chars.len();
                loop {
                    if j >= chars.len() {
                        break;
                    }
                    let close_start = j;
                    let mut close_end = j;
                    while close_end < chars.len() && chars[close_end] != '\n' {
                        close_end += 1;
                    }
                    let close_line: String = chars[close_start..close_end].iter().collect();
                    if close_line.trim_end() == "```" || close_line.trim_end().starts_with("```") && close_line.trim().chars().all(|c| c == '`') {
                        content_end = close_start;
                        j = close_end + 1;
                        break;
                    }
                    j = close_end + 1;
                }

                blocks.push(CodeBlock {
                    language,
                    inner_start: content_start,
                    inner_end: content_end,
                });
                i = j.max(content_end);
                continue;
            }

            // Scan the line for math delimiters.
            let mut k = line_start;
            while k < line_end {
                let ch = chars[k];
                if ch == '\\' {
                    k += 2;
                    continue;
                }
                if ch != '$' {
                    k += 1;
                    continue;
                }

                let doubled = k + 1 < chars.len() && chars[k + 1] == '$';
                if let Some(outer_start) = block_open {
                    if doubled {
                        regions.push(MathRegion {
                            outer_start,
                            inner_start: outer_start + 2,
                            inner_end: k,
                            outer_end: k + 2,
                            display: true,
                        });
                        block_open = None;
                        k += 2;
                    } else {
                        k += 1;
                    }
                } else if let Some(outer_start) = inline_open {
                    regions.push(MathRegion {
                        outer_start,
                        inner_start: outer_start + 1,
                        inner_end: k,
                        outer_end: k + 1,
                        display: false,
                    });
                    inline_open = None;
                    k += 1;
                } else if doubled {
                    block_open = Some(k);
                    k += 2;
                } else {
                    inline_open = Some(k);
                    k += 1;
                }
            }

            // An unterminated inline span closes at the end of its line.
            if let Some(outer_start) = inline_open.take() {
                regions.push(MathRegion {
                    outer_start,
                    inner_start: outer_start + 1,
                    inner_end: line_end,
                    outer_end: line_end,
                    display: false,
                });
            }

            i = line_end + 1;
        }

        // An unterminated display block runs to the end of the document.
        if let Some(outer_start) = block_open {
            regions.push(MathRegion {
                outer_start,
                inner_start: outer_start + 2,
                inner_end: chars.len(),
                outer_end: chars.len(),
                display: true,
            });
        }

        (regions, blocks)
    }
}

fn fence_regex() -> Regex {
    // Compiled per scan; the scanner itself is stateless and cheap to share.
    Regex::new(r"^\s*```+\s*([A-Za-z0-9_+-]*)\s*$").expect("static fence pattern compiles")
}

/// A caret exactly between two adjacent unescaped dollars is an empty inline span, even
/// though the pair reads as a display-math opener everywhere else.
fn empty_span_at(text: &str, pos: usize) -> Option<MathRegion> {
    let chars: Vec<char> = text.chars().collect();
    if pos == 0 || pos >= chars.len() || chars[pos - 1] != '$' || chars[pos] != '$' {
        return None;
    }
    if pos >= 2 && chars[pos - 2] == '\\' {
        return None;
    }
    Some(MathRegion {
        outer_start: pos - 1,
        inner_start: pos,
        inner_end: pos,
        outer_end: pos + 1,
        display: false,
    })
}

impl MathSource for MarkdownMathScanner {
    fn math_region_at(&self, text: &str, pos: usize) -> Option<MathRegion> {
        let (regions, blocks) = self.scan(text);
        if let Some(region) = regions.into_iter().find(|r| r.contains(pos)) {
            return Some(region);
        }
        if blocks.iter().any(|b| b.contains(pos)) {
            return None;
        }
        empty_span_at(text, pos)
    }

    fn codeblock_at(&self, text: &str, pos: usize) -> Option<CodeBlock> {
        let (_, blocks) = self.scan(text);
        blocks.into_iter().find(|b| b.contains(pos))
    }

    fn math_regions(&self, text: &str) -> Vec<MathRegion> {
        self.scan(text).0
    }
}
