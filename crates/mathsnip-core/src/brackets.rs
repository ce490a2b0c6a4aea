//! Bracket and delimiter matching utilities.
//!
//! All public inputs/outputs use **character offsets** (Unicode scalar values), never byte
//! offsets. Delimiters may be multi-character strings (e.g. `\langle` / `\rangle`); same-type
//! pairs nest and are counted.
//!
//! "Not found" is always `None`; callers are expected to handle it explicitly rather than
//! treating any index as a sentinel.

/// Returns the matching closing bracket for a generic opening bracket (`(`, `[`, `{`).
pub fn close_bracket_for(open: char) -> Option<char> {
    match open {
        '(' => Some(')'),
        '[' => Some(']'),
        '{' => Some('}'),
        _ => None,
    }
}

/// Returns the matching opening bracket for a generic closing bracket (`)`, `]`, `}`).
pub fn open_bracket_for(close: char) -> Option<char> {
    match close {
        ')' => Some('('),
        ']' => Some('['),
        '}' => Some('{'),
        _ => None,
    }
}

/// Returns `true` if `ch` is a generic opening bracket.
pub fn is_open_bracket(ch: char) -> bool {
    matches!(ch, '(' | '[' | '{')
}

/// Returns `true` if `ch` is a generic closing bracket.
pub fn is_close_bracket(ch: char) -> bool {
    matches!(ch, ')' | ']' | '}')
}

/// Find the delimiter matching the one at `start`, scanning balanced nested pairs.
///
/// - Forward (`backwards == false`): `start` is the character offset of (or before) an `open`
///   delimiter; returns the offset of the `close` delimiter that balances it.
/// - Backward (`backwards == true`): `start` is the character offset of a `close` delimiter;
///   returns the offset of the `open` delimiter that balances it.
/// - `end` optionally bounds the scan: an exclusive upper limit when scanning forward, an
///   inclusive lower limit when scanning backward.
///
/// The backward search is implemented by reversing the text, swapping the delimiter roles, and
/// re-deriving the forward result; for balanced input this is equivalent to a native backward
/// scan.
pub fn find_matching_bracket(
    text: &str,
    start: usize,
    open: &str,
    close: &str,
    backwards: bool,
    end: Option<usize>,
) -> Option<usize> {
    let chars: Vec<char> = text.chars().collect();
    let open_chars: Vec<char> = open.chars().collect();
    let close_chars: Vec<char> = close.chars().collect();
    if open_chars.is_empty() || close_chars.is_empty() {
        return None;
    }

    if !backwards {
        let limit = end.unwrap_or(chars.len()).min(chars.len());
        return scan_forward(&chars, start, &open_chars, &close_chars, limit);
    }

    // Reverse the document and the delimiters, swap their roles, then map the forward result
    // back into the original coordinate space.
    let n = chars.len();
    let rev: Vec<char> = chars.iter().rev().copied().collect();
    let rev_open: Vec<char> = close_chars.iter().rev().copied().collect();
    let rev_close: Vec<char> = open_chars.iter().rev().copied().collect();

    let close_len = close_chars.len();
    if start + close_len > n {
        return None;
    }
    let rev_start = n - (start + close_len);
    let rev_limit = n - end.unwrap_or(0).min(n);

    let idx = scan_forward(&rev, rev_start, &rev_open, &rev_close, rev_limit)?;
    Some(n - (idx + open_chars.len()))
}

fn scan_forward(
    chars: &[char],
    start: usize,
    open: &[char],
    close: &[char],
    limit: usize,
) -> Option<usize> {
    let mut depth: usize = 0;
    let mut i = start;
    while i < limit {
        if slice_matches(chars, i, open) {
            depth += 1;
            i += open.len();
        } else if slice_matches(chars, i, close) {
            if depth == 0 {
                // Unbalanced: a close with no corresponding open in the scanned window.
                return None;
            }
            depth -= 1;
            if depth == 0 {
                return Some(i);
            }
            i += close.len();
        } else {
            i += 1;
        }
    }
    None
}

fn slice_matches(chars: &[char], at: usize, needle: &[char]) -> bool {
    chars.len() >= at + needle.len() && &chars[at..at + needle.len()] == needle
}

/// Find the last occurrence of `needle` that starts strictly before `before`.
///
/// Offsets are character offsets. Used by the environment-containment scan, which searches for
/// an environment's open symbol literally rather than for its trailing bracket character.
pub fn rfind_before(text: &str, needle: &str, before: usize) -> Option<usize> {
    let chars: Vec<char> = text.chars().collect();
    let needle_chars: Vec<char> = needle.chars().collect();
    if needle_chars.is_empty() || before == 0 {
        return None;
    }
    let mut i = before.min(chars.len());
    while i > 0 {
        i -= 1;
        if slice_matches(&chars, i, &needle_chars) {
            return Some(i);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_simple_pair() {
        assert_eq!(find_matching_bracket("(a)", 0, "(", ")", false, None), Some(2));
    }

    #[test]
    fn test_forward_nested_pairs() {
        let text = "{a{b{c}d}e}";
        assert_eq!(find_matching_bracket(text, 0, "{", "}", false, None), Some(10));
        assert_eq!(find_matching_bracket(text, 2, "{", "}", false, None), Some(8));
        assert_eq!(find_matching_bracket(text, 4, "{", "}", false, None), Some(6));
    }

    #[test]
    fn test_backward_matches_forward_round_trip() {
        let text = "x{a{b}c{d}e}y";
        let close = find_matching_bracket(text, 1, "{", "}", false, None).unwrap();
        assert_eq!(close, 11);
        let open = find_matching_bracket(text, close, "{", "}", true, None).unwrap();
        assert_eq!(open, 1);
    }

    #[test]
    fn test_multi_char_delimiters() {
        let text = r"\langle a \langle b \rangle c \rangle";
        let close = find_matching_bracket(text, 0, r"\langle", r"\rangle", false, None).unwrap();
        assert_eq!(close, 30);
        let open = find_matching_bracket(text, close, r"\langle", r"\rangle", true, None).unwrap();
        assert_eq!(open, 0);
    }

    #[test]
    fn test_unbalanced_returns_none() {
        assert_eq!(find_matching_bracket("((a)", 0, "(", ")", false, None), None);
        assert_eq!(find_matching_bracket("a)", 1, "(", ")", true, None), None);
    }

    #[test]
    fn test_round_trip_generated_nesting() {
        // Build nested balanced input and check both directions for every pair.
        let text = "([{()}]([]))";
        let opens: Vec<(usize, char)> = text
            .chars()
            .enumerate()
            .filter(|(_, c)| is_open_bracket(*c))
            .collect();
        for (i, open) in opens {
            let close = close_bracket_for(open).unwrap();
            let j = find_matching_bracket(
                text,
                i,
                &open.to_string(),
                &close.to_string(),
                false,
                None,
            )
            .unwrap();
            let back = find_matching_bracket(
                text,
                j,
                &open.to_string(),
                &close.to_string(),
                true,
                None,
            )
            .unwrap();
            assert_eq!(back, i, "round trip failed for pair at {i}");
        }
    }

    #[test]
    fn test_rfind_before() {
        let text = r"a \text{b} c \text{d}";
        assert_eq!(rfind_before(text, r"\text{", 21), Some(13));
        assert_eq!(rfind_before(text, r"\text{", 13), Some(2));
        assert_eq!(rfind_before(text, r"\text{", 2), None);
    }

    #[test]
    fn test_bracket_maps() {
        assert_eq!(close_bracket_for('('), Some(')'));
        assert_eq!(open_bracket_for(']'), Some('['));
        assert_eq!(close_bracket_for('x'), None);
    }
}
