//! Auto-enlarge brackets: wrap bracket pairs containing a large operator in `\left`/`\right`.

use crate::brackets::find_matching_bracket;
use crate::buffer::{Edit, EditTag, HostBuffer, Transaction};
use crate::context::Bounds;
use crate::settings::EngineSettings;
use crate::tabstop::TabstopState;

/// Scan the region content for `(...)` / `[...]` pairs whose contents mention one of the
/// configured trigger words (`sum`, `int`, ...) and wrap each in `\left` / `\right`. Nested
/// eligible pairs are all wrapped. Pairs already preceded by `\left` are left alone.
///
/// All insertions apply as one transaction; live tabstop ranges are shifted through it.
pub fn enlarge_brackets<B: HostBuffer>(
    buffer: &mut B,
    bounds: Bounds,
    settings: &EngineSettings,
    tabstops: &mut TabstopState,
) -> bool {
    let text = buffer.contents();
    let chars: Vec<char> = text.chars().collect();
    let inner_end = bounds.inner_end.min(chars.len());

    let mut insertions: Vec<(usize, &'static str)> = Vec::new();
    let mut i = bounds.inner_start;
    while i < inner_end {
        let close = match chars[i] {
            '(' => ')',
            '[' => ']',
            _ => {
                i += 1;
                continue;
            }
        };
        // `\(` is an escape, not a bracket.
        if i > 0 && chars[i - 1] == '\\' {
            i += 1;
            continue;
        }
        let open = chars[i];
        let Some(j) = find_matching_bracket(
            &text,
            i,
            &open.to_string(),
            &close.to_string(),
            false,
            Some(inner_end),
        ) else {
            i += 1;
            continue;
        };

        let contents: String = chars[i + 1..j].iter().collect();
        let eligible = settings
            .enlarge_trigger_words
            .iter()
            .any(|word| contents.contains(word.as_str()));
        if eligible && !preceded_by_left(&chars, i) {
            insertions.push((i, "\\left"));
            insertions.push((j, "\\right"));
        }
        i += 1;
    }

    if insertions.is_empty() {
        return false;
    }

    insertions.sort_by(|a, b| b.0.cmp(&a.0));
    let edits: Vec<Edit> = insertions
        .iter()
        .map(|(pos, text)| Edit::new(*pos, "", *text))
        .collect();
    buffer.apply(Transaction::new(edits.clone(), EditTag::Other));
    for edit in &edits {
        tabstops.map_through(edit);
    }
    true
}

fn preceded_by_left(chars: &[char], i: usize) -> bool {
    i >= 5 && chars[i - 5..i] == ['\\', 'l', 'e', 'f', 't']
}
