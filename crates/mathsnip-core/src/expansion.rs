//! The snippet matching & expansion engine.
//!
//! On each relevant keystroke the engine walks the selection ranges last-to-first (so earlier
//! edits never shift the offsets of not-yet-processed ranges), finds the highest-priority
//! applicable snippet per range, and queues one edit per match. All queued edits apply as a
//! single atomic transaction; tabstop markers found in the inserted text are registered as one
//! group set, and the cursor lands in the first placeholder.
//!
//! A failure mid-pipeline discards the queue, logs the error, and reports "not handled" so
//! the keystroke falls through to default editor behavior; the document is never left in a
//! partial state.

use crate::buffer::{Edit, EditTag, HostBuffer, SelRange, Transaction};
use crate::context::{ContextProvider, is_within_environment};
use crate::key::KeyEvent;
use crate::settings::EngineSettings;
use crate::snippet::{MatchSpan, Snippet, excluded_environment};
use crate::syntax::MathSource;
use crate::tabstop::{AbsoluteTabstop, TabstopState, parse_tabstops};

/// What an expansion pass did, for the caller to follow up on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpansionReport {
    /// A replacement contained a configured large-delimiter trigger word; the auto-enlarge
    /// pass should run over the enclosing region.
    pub run_enlarge: bool,
    /// Tabstops were registered by this expansion.
    pub registered_tabstops: bool,
}

struct PlannedEdit {
    start: usize,
    end: usize,
    clean_text: String,
    stops: Vec<crate::tabstop::ParsedTabstop>,
}

/// Try to expand a snippet for the given keystroke. Returns `None` when the key was not
/// handled (no match, or a modifier chord).
pub fn expand_snippets<B: HostBuffer, S: MathSource>(
    buffer: &mut B,
    contexts: &mut ContextProvider<S>,
    snippets: &[Snippet],
    key: &KeyEvent,
    settings: &EngineSettings,
    tabstops: &mut TabstopState,
    expansion_id: u64,
) -> Option<ExpansionReport> {
    if key.ctrl_or_cmd {
        return None;
    }
    let typed = key.typed_char();
    let manual = key.is_manual_trigger(settings.trigger_key);
    if typed.is_none() && !manual {
        return None;
    }

    let text = buffer.contents();
    let version = buffer.version();

    let mut ranges: Vec<SelRange> = buffer.selections().to_vec();
    ranges.sort_by(|a, b| b.min().cmp(&a.min()));

    let mut planned: Vec<PlannedEdit> = Vec::new();

    for sel in &ranges {
        let pos = sel.max();
        let context = contexts.context_at(&text, pos, version);
        let selection_text = buffer.slice(sel.min(), sel.max());
        let line_start = buffer.line_start(buffer.line_of(pos));
        let window_base = buffer.slice(line_start, pos);

        for snippet in snippets {
            if !snippet.mask.accepts(&context.mode) {
                continue;
            }
            if let Some(env) = excluded_environment(snippet)
                && is_within_environment(&text, pos, &env)
            {
                continue;
            }

            // Automatic and visual snippets need the just-pressed printable character
            // appended to the matching window; manual snippets need the trigger key.
            let needs_typed =
                snippet.automatic || matches!(snippet.kind, crate::snippet::SnippetKind::Visual { .. });
            let (window, appended) = if needs_typed {
                let Some(ch) = typed else { continue };
                let mut w = window_base.clone();
                w.push(ch);
                (w, 1usize)
            } else {
                if !manual {
                    continue;
                }
                (window_base.clone(), 0usize)
            };

            let Some(found) = snippet.process(&window, &selection_text) else {
                continue;
            };

            let (start, end) = match found.span {
                MatchSpan::Suffix(len) => {
                    if len < appended {
                        continue;
                    }
                    let consumed_in_doc = len - appended;
                    if consumed_in_doc > pos {
                        log::error!(
                            "snippet match longer than text before cursor (len {len}, pos {pos}); skipping"
                        );
                        continue;
                    }
                    (pos - consumed_in_doc, sel.max())
                }
                MatchSpan::Selection => (sel.min(), sel.max()),
            };

            if snippet.word_boundary
                && !word_boundaries_ok(buffer, start, sel.max(), &settings.word_delimiters)
            {
                continue;
            }

            let replacement = indent_continuation_lines(buffer, line_start, &found.replacement);
            let (clean_text, stops) = parse_tabstops(&replacement);
            planned.push(PlannedEdit {
                start,
                end,
                clean_text,
                stops,
            });
            break; // first successful match per range wins
        }
    }

    if planned.is_empty() {
        return None;
    }

    // Build the transaction (edits already ordered by descending start) while tracking the
    // absolute tabstop/caret positions through each applied edit.
    let mut edits: Vec<Edit> = Vec::with_capacity(planned.len());
    let mut abs_stops: Vec<AbsoluteTabstop> = Vec::new();
    let mut carets: Vec<usize> = Vec::new();
    let mut run_enlarge = false;

    for plan in &planned {
        let edit = Edit::new(
            plan.start,
            buffer.slice(plan.start, plan.end),
            plan.clean_text.clone(),
        );

        for stop in &mut abs_stops {
            stop.start = edit.map_offset(stop.start, true);
            stop.end = edit.map_offset(stop.end, false);
        }
        for caret in &mut carets {
            *caret = edit.map_offset(*caret, false);
        }

        if plan.stops.is_empty() {
            carets.push(plan.start + plan.clean_text.chars().count());
        } else {
            for stop in &plan.stops {
                abs_stops.push(AbsoluteTabstop {
                    number: stop.number,
                    start: plan.start + stop.start,
                    end: plan.start + stop.end,
                });
            }
        }

        if settings.auto_enlarge_brackets
            && settings
                .enlarge_trigger_words
                .iter()
                .any(|word| plan.clean_text.contains(word.as_str()))
        {
            run_enlarge = true;
        }

        edits.push(edit);
    }

    let selections_after = if abs_stops.is_empty() {
        carets.iter().map(|&c| SelRange::caret(c)).collect()
    } else {
        first_group_ranges(&abs_stops)
    };

    buffer.apply(
        Transaction::new(edits, EditTag::SnippetExpansion(expansion_id))
            .with_selections(selections_after, 0),
    );
    contexts.invalidate();

    let registered_tabstops = !abs_stops.is_empty();
    if registered_tabstops {
        tabstops.register(abs_stops);
    } else {
        tabstops.clear();
    }

    Some(ExpansionReport {
        run_enlarge,
        registered_tabstops,
    })
}

/// Apply one replacement (with tabstop markers) at `[start, end)` as a snippet-tagged
/// transaction, registering any tabstops. Shared with the autofraction feature.
pub(crate) fn apply_replacement<B: HostBuffer>(
    buffer: &mut B,
    start: usize,
    end: usize,
    replacement: &str,
    tabstops: &mut TabstopState,
    expansion_id: u64,
) -> bool {
    let (clean_text, stops) = parse_tabstops(replacement);
    let abs_stops: Vec<AbsoluteTabstop> = stops
        .iter()
        .map(|s| AbsoluteTabstop {
            number: s.number,
            start: start + s.start,
            end: start + s.end,
        })
        .collect();

    let selections_after = if abs_stops.is_empty() {
        vec![SelRange::caret(start + clean_text.chars().count())]
    } else {
        first_group_ranges(&abs_stops)
    };

    buffer.apply(
        Transaction::new(
            vec![Edit::new(start, buffer.slice(start, end), clean_text)],
            EditTag::SnippetExpansion(expansion_id),
        )
        .with_selections(selections_after, 0),
    );

    if abs_stops.is_empty() {
        tabstops.clear();
    } else {
        tabstops.register(abs_stops);
    }
    true
}

fn first_group_ranges(stops: &[AbsoluteTabstop]) -> Vec<SelRange> {
    let lowest = stops.iter().map(|s| s.number).min().unwrap_or(0);
    stops
        .iter()
        .filter(|s| s.number == lowest)
        .map(|s| SelRange::new(s.start, s.end))
        .collect()
}

fn word_boundaries_ok<B: HostBuffer>(
    buffer: &B,
    start: usize,
    end: usize,
    delimiters: &str,
) -> bool {
    let before_ok = start == 0
        || buffer
            .char_at(start - 1)
            .is_none_or(|ch| delimiters.contains(ch));
    let after_ok = buffer
        .char_at(end)
        .is_none_or(|ch| delimiters.contains(ch));
    before_ok && after_ok
}

/// Re-apply the current line's indentation / blockquote prefix to continuation lines of a
/// multi-line replacement so the inserted block stays aligned.
fn indent_continuation_lines<B: HostBuffer>(
    buffer: &B,
    line_start: usize,
    replacement: &str,
) -> String {
    if !replacement.contains('\n') {
        return replacement.to_string();
    }
    let line = buffer.line_of(line_start);
    let line_text = buffer.slice(line_start, buffer.line_end(line));
    let prefix: String = line_text
        .chars()
        .take_while(|c| matches!(c, ' ' | '\t' | '>'))
        .collect();
    if prefix.is_empty() {
        return replacement.to_string();
    }
    replacement.replace('\n', &format!("\n{prefix}"))
}
