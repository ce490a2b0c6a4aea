//! Tab-out: Tab jumps past the next closing delimiter, or out of the math region entirely.

use crate::buffer::{Edit, EditTag, HostBuffer, SelRange, Transaction};
use crate::context::{Bounds, Context};
use crate::tokenizer::{TokenKind, tokenize};

/// Commands that render as closing delimiters.
const RIGHT_COMMANDS: &[&str] = &[
    r"\rangle", r"\rceil", r"\rfloor", r"\rvert", r"\rVert", r"\rbrace", r"\rbrack",
];

/// Move the caret past the next closing delimiter after the cursor, staying inside the math
/// region. A `\right` command jumps past its attached delimiter token.
///
/// When no closing delimiter remains and only whitespace separates the cursor from the end of
/// the region, the caret exits the region instead: past the closing `$` for inline math, or
/// onto the line after the closing `$$` for display math (creating that line at end of
/// document, and trimming whitespace the cursor leaves behind).
pub fn run_tabout<B: HostBuffer>(buffer: &mut B, context: &Context) -> bool {
    let Some(bounds) = context.bounds else {
        return false;
    };
    let pos = buffer.selections()[buffer.primary_index()].max();
    if pos > bounds.inner_end {
        return false;
    }

    let ahead = buffer.slice(pos, bounds.inner_end);
    for (idx, token) in tokenize(&ahead).iter().enumerate() {
        let target = match token.kind {
            TokenKind::Char if matches!(token.text.as_str(), ")" | "]" | "}") => Some(token.end),
            TokenKind::EscapedSymbol
                if matches!(token.text.as_str(), r"\)" | r"\]" | r"\}") =>
            {
                Some(token.end)
            }
            TokenKind::Command if RIGHT_COMMANDS.contains(&token.text.as_str()) => {
                Some(token.end)
            }
            TokenKind::Command if token.text == r"\right" => {
                // Jump past the delimiter the `\right` is attached to; a bare trailing
                // `\right` still gets jumped over.
                Some(
                    tokenize(&ahead)
                        .get(idx + 1)
                        .map_or(token.end, |next| next.end),
                )
            }
            _ => None,
        };
        if let Some(rel) = target {
            buffer.set_selections(vec![SelRange::caret(pos + rel)], 0);
            return true;
        }
    }

    // No closing delimiter left: exit the region if the cursor is at its (whitespace) end.
    if !ahead.trim().is_empty() {
        return false;
    }
    if context.mode.block_math {
        exit_display_math(buffer, pos, bounds)
    } else {
        buffer.set_selections(vec![SelRange::caret(bounds.outer_end)], 0);
        true
    }
}

fn exit_display_math<B: HostBuffer>(buffer: &mut B, pos: usize, bounds: Bounds) -> bool {
    // Trailing whitespace on the line the cursor leaves gets trimmed.
    let line = buffer.line_of(pos);
    let line_start = buffer.line_start(line);
    let line_end = buffer.line_end(line);
    let kept = buffer.slice(line_start, line_end).trim_end().chars().count();
    let trim_from = line_start + kept;
    let trim_edit = (trim_from < line_end && line_end <= bounds.inner_end)
        .then(|| Edit::new(trim_from, buffer.slice(trim_from, line_end), ""));

    let close_line = buffer.line_of(bounds.outer_end.saturating_sub(1));
    let has_next_line = close_line + 1 < buffer.line_count();

    let mut edits: Vec<Edit> = Vec::new();
    if !has_next_line {
        edits.push(Edit::new(buffer.len_chars(), "", "\n"));
    }
    let mut target = if has_next_line {
        buffer.line_start(close_line + 1)
    } else {
        buffer.len_chars() + 1
    };
    if let Some(edit) = trim_edit {
        target = edit.map_offset(target, false);
        edits.push(edit);
    }

    if edits.is_empty() {
        buffer.set_selections(vec![SelRange::caret(target)], 0);
    } else {
        buffer.apply(
            Transaction::new(edits, EditTag::Other)
                .with_selections(vec![SelRange::caret(target)], 0),
        );
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::MemoryBuffer;
    use crate::context::Mode;

    fn inline_context(text: &str, pos: usize) -> Context {
        let len = text.chars().count();
        Context {
            pos,
            mode: Mode {
                inline_math: true,
                ..Mode::default()
            },
            bounds: Some(Bounds {
                outer_start: 0,
                inner_start: 1,
                inner_end: len - 1,
                outer_end: len,
            }),
            codeblock_language: None,
        }
    }

    #[test]
    fn test_jumps_past_next_closing_bracket() {
        let text = "$(a)b$";
        let mut buf = MemoryBuffer::new(text);
        buf.set_caret(2);
        assert!(run_tabout(&mut buf, &inline_context(text, 2)));
        assert_eq!(buf.selections(), &[SelRange::caret(4)]);
    }

    #[test]
    fn test_right_command_jumps_past_its_delimiter() {
        let text = r"$\left( x \right) + y$";
        let mut buf = MemoryBuffer::new(text);
        buf.set_caret(9);
        assert!(run_tabout(&mut buf, &inline_context(text, 9)));
        // Just past the `)` attached to `\right`.
        assert_eq!(buf.selections(), &[SelRange::caret(17)]);
    }

    #[test]
    fn test_rangle_is_a_closing_delimiter() {
        let text = r"$\langle x \rangle$";
        let mut buf = MemoryBuffer::new(text);
        buf.set_caret(10);
        assert!(run_tabout(&mut buf, &inline_context(text, 10)));
        assert_eq!(buf.selections(), &[SelRange::caret(18)]);
    }

    #[test]
    fn test_exits_inline_region_at_end() {
        let text = "$x$";
        let mut buf = MemoryBuffer::new(text);
        buf.set_caret(2);
        assert!(run_tabout(&mut buf, &inline_context(text, 2)));
        assert_eq!(buf.selections(), &[SelRange::caret(3)]);
    }

    #[test]
    fn test_not_at_end_falls_through() {
        let text = "$a bc$";
        let mut buf = MemoryBuffer::new(text);
        buf.set_caret(2);
        assert!(!run_tabout(&mut buf, &inline_context(text, 2)));
    }

    #[test]
    fn test_exits_display_math_onto_next_line() {
        let text = "$$\nx+y\n$$\nafter";
        let mut buf = MemoryBuffer::new(text);
        buf.set_caret(6);
        let ctx = Context {
            pos: 6,
            mode: Mode {
                block_math: true,
                ..Mode::default()
            },
            bounds: Some(Bounds {
                outer_start: 0,
                inner_start: 2,
                inner_end: 7,
                outer_end: 9,
            }),
            codeblock_language: None,
        };
        assert!(run_tabout(&mut buf, &ctx));
        assert_eq!(buf.selections(), &[SelRange::caret(10)]);
        assert_eq!(buf.contents(), text);
    }

    #[test]
    fn test_exits_display_math_creating_final_line() {
        let text = "$$\nx\n$$";
        let mut buf = MemoryBuffer::new(text);
        buf.set_caret(4);
        let ctx = Context {
            pos: 4,
            mode: Mode {
                block_math: true,
                ..Mode::default()
            },
            bounds: Some(Bounds {
                outer_start: 0,
                inner_start: 2,
                inner_end: 5,
                outer_end: 7,
            }),
            codeblock_language: None,
        };
        assert!(run_tabout(&mut buf, &ctx));
        assert_eq!(buf.contents(), "$$\nx\n$$\n");
        assert_eq!(buf.selections(), &[SelRange::caret(8)]);
    }

    #[test]
    fn test_trims_trailing_whitespace_on_exit() {
        let text = "$$\nx   \n$$\n";
        let mut buf = MemoryBuffer::new(text);
        buf.set_caret(4);
        let ctx = Context {
            pos: 4,
            mode: Mode {
                block_math: true,
                ..Mode::default()
            },
            bounds: Some(Bounds {
                outer_start: 0,
                inner_start: 2,
                inner_end: 8,
                outer_end: 10,
            }),
            codeblock_language: None,
        };
        assert!(run_tabout(&mut buf, &ctx));
        assert_eq!(buf.contents(), "$$\nx\n$$\n");
        assert_eq!(buf.selections(), &[SelRange::caret(8)]);
    }
}
