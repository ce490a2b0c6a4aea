//! Autofraction: typing `/` after a numerator turns it into `\frac{numerator}{}`.

use crate::brackets::{find_matching_bracket, is_close_bracket, is_open_bracket, open_bracket_for};
use crate::buffer::HostBuffer;
use crate::context::{Context, is_within_environment};
use crate::expansion::apply_replacement;
use crate::settings::EngineSettings;
use crate::tabstop::TabstopState;

/// Run autofraction at the primary selection.
///
/// The numerator is the selection if one exists; otherwise it is found by walking backward
/// from the cursor, stopping at a breaking character, at an unmatched open bracket, at the
/// far side of a balanced bracket group, or at the start of the enclosing math region. The
/// replacement places the cursor in the denominator tabstop; the typed `/` is consumed and
/// never inserted.
pub fn run_autofraction<B: HostBuffer>(
    buffer: &mut B,
    context: &Context,
    settings: &EngineSettings,
    tabstops: &mut TabstopState,
    expansion_id: u64,
) -> bool {
    let Some(bounds) = context.bounds else {
        return false;
    };
    let text = buffer.contents();
    let sel = buffer.selections()[buffer.primary_index()];

    for env in &settings.autofraction_excluded {
        if is_within_environment(&text, sel.max(), env) {
            return false;
        }
    }

    let (start, end) = if sel.is_empty() {
        let pos = sel.head;
        let Some(start) = numerator_start(&text, pos, bounds.inner_start, settings) else {
            return false;
        };
        (start, pos)
    } else {
        (sel.min(), sel.max())
    };

    if start >= end {
        return false;
    }

    let mut numerator = buffer.slice(start, end);
    numerator = strip_outer_brackets(&numerator);

    let replacement = format!("\\frac{{{numerator}}}{{$0}}$1");
    apply_replacement(buffer, start, end, &replacement, tabstops, expansion_id)
}

/// Walk backward from `pos` to the start of the numerator. Returns `None` when the walk
/// hits an unbalanced bracket (the feature aborts rather than guessing).
fn numerator_start(
    text: &str,
    pos: usize,
    region_start: usize,
    settings: &EngineSettings,
) -> Option<usize> {
    let chars: Vec<char> = text.chars().collect();
    let mut i = pos;
    while i > region_start {
        let ch = chars[i - 1];
        if is_close_bracket(ch) {
            let open = open_bracket_for(ch)?;
            let open_idx = find_matching_bracket(
                text,
                i - 1,
                &open.to_string(),
                &ch.to_string(),
                true,
                Some(region_start),
            )?;
            i = open_idx;
            continue;
        }
        // Balanced groups are consumed by the jump above, so an open bracket seen here is
        // unmatched: the numerator cannot extend past it.
        if is_open_bracket(ch) {
            break;
        }
        if settings.autofraction_breaking_chars.contains(ch) {
            break;
        }
        i -= 1;
    }
    Some(i.max(region_start))
}

/// `(a+b)` as a whole numerator loses its brackets: `\frac{a+b}{...}`.
fn strip_outer_brackets(numerator: &str) -> String {
    let chars: Vec<char> = numerator.chars().collect();
    if chars.len() >= 2
        && chars[0] == '('
        && chars[chars.len() - 1] == ')'
        && find_matching_bracket(numerator, 0, "(", ")", false, None) == Some(chars.len() - 1)
    {
        chars[1..chars.len() - 1].iter().collect()
    } else {
        numerator.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> EngineSettings {
        EngineSettings::default()
    }

    #[test]
    fn test_numerator_stops_at_breaking_char() {
        // "$1+x" with cursor after x: numerator is just "x".
        assert_eq!(numerator_start("$1+x", 4, 1, &settings()), Some(3));
    }

    #[test]
    fn test_numerator_jumps_bracket_group() {
        // "$(a+b)" with cursor after ")": the whole group is the numerator.
        assert_eq!(numerator_start("$(a+b)", 6, 1, &settings()), Some(1));
    }

    #[test]
    fn test_numerator_stops_at_region_start() {
        assert_eq!(numerator_start("$abc", 4, 1, &settings()), Some(1));
    }

    #[test]
    fn test_numerator_stops_at_line_break() {
        // Display math spans lines; the numerator never crosses one.
        assert_eq!(numerator_start("$$\nx", 4, 2, &settings()), Some(3));
    }

    #[test]
    fn test_numerator_stops_at_unmatched_open_bracket() {
        // "$f(a" with cursor after a: the stray "(" bounds the numerator.
        assert_eq!(numerator_start("$f(a", 4, 1, &settings()), Some(3));
    }

    #[test]
    fn test_unbalanced_bracket_aborts() {
        assert_eq!(numerator_start("$a+b)", 5, 1, &settings()), None);
    }

    #[test]
    fn test_strip_outer_brackets() {
        assert_eq!(strip_outer_brackets("(a+b)"), "a+b");
        assert_eq!(strip_outer_brackets("(a)(b)"), "(a)(b)");
        assert_eq!(strip_outer_brackets("ab"), "ab");
    }
}
