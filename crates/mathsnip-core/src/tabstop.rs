//! The tabstop state machine.
//!
//! A snippet replacement may contain `$N` and `${N:default}` markers. Extraction turns the
//! replacement into marker-free text plus relative placeholder ranges; registration groups
//! absolute ranges by number ([`TabstopGroup`]); the state machine owns the live groups and
//! the advance/exit transitions.
//!
//! States: Empty → Active (one or more ordered groups) → advance transitions → Empty.
//! Groups are ordered by ascending number and consumed front-to-back. Defensive rules: an
//! advance with zero groups is a no-op returning `false`; a group whose ranges were all
//! deleted by later edits is skipped automatically.
//!
//! Decoration (the colored marks in the UI) is owned by the host; the state machine exposes
//! the live ranges and their palette indices to drive it.

use crate::brackets::find_matching_bracket;
use crate::buffer::{Edit, HostBuffer, SelRange};

/// Number of entries in the fixed decoration palette. Color indices are assigned round-robin
/// and wrap once the palette is exhausted.
pub const PALETTE_SIZE: usize = 8;

/// Pick the next decoration color: the lowest palette index not currently active, wrapping to
/// reuse indices once all are taken. Pure function of the active set, independent of any
/// rendering concern.
pub fn next_color(active: &[usize]) -> usize {
    for color in 0..PALETTE_SIZE {
        if !active.contains(&color) {
            return color;
        }
    }
    active.len() % PALETTE_SIZE
}

/// A placeholder extracted from a replacement string, with offsets **relative to the
/// marker-free text**.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTabstop {
    /// The tabstop number (`0` is conventionally the final resting position).
    pub number: usize,
    /// Start offset in the clean text.
    pub start: usize,
    /// End offset in the clean text (equals `start` for `$N` markers).
    pub end: usize,
    /// Default text pre-filled into the placeholder (possibly empty).
    pub default_text: String,
}

/// Extract tabstop markers from `replacement`.
///
/// Returns the marker-free text and the placeholders found. `${N:default}` defaults may
/// themselves contain balanced braces; the closing brace is located with the bracket matcher,
/// not naive search.
pub fn parse_tabstops(replacement: &str) -> (String, Vec<ParsedTabstop>) {
    let chars: Vec<char> = replacement.chars().collect();
    let mut clean = String::new();
    let mut clean_len = 0usize;
    let mut stops = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];

        if ch == '\\' && i + 1 < chars.len() && chars[i + 1] == '$' {
            clean.push('$');
            clean_len += 1;
            i += 2;
            continue;
        }

        if ch == '$' && i + 1 < chars.len() {
            let next = chars[i + 1];

            if next.is_ascii_digit() {
                let mut j = i + 1;
                while j < chars.len() && chars[j].is_ascii_digit() {
                    j += 1;
                }
                let number: String = chars[i + 1..j].iter().collect();
                stops.push(ParsedTabstop {
                    number: number.parse().unwrap_or(0),
                    start: clean_len,
                    end: clean_len,
                    default_text: String::new(),
                });
                i = j;
                continue;
            }

            if next == '{' {
                // `${N:default}` - find the matching brace, defaults may nest braces.
                if let Some(close) =
                    find_matching_bracket(replacement, i + 1, "{", "}", false, None)
                {
                    let inner: String = chars[i + 2..close].iter().collect();
                    if let Some((num_part, default_text)) = inner.split_once(':')
                        && let Ok(number) = num_part.parse::<usize>()
                    {
                        let default_len = default_text.chars().count();
                        clean.push_str(default_text);
                        stops.push(ParsedTabstop {
                            number,
                            start: clean_len,
                            end: clean_len + default_len,
                            default_text: default_text.to_string(),
                        });
                        clean_len += default_len;
                        i = close + 1;
                        continue;
                    }
                }
            }
        }

        clean.push(ch);
        clean_len += 1;
        i += 1;
    }

    (clean, stops)
}

/// The set of live placeholder ranges sharing one tabstop number; advanced and selected
/// together (synchronized editing of repeated placeholders).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabstopGroup {
    /// The tabstop number.
    pub number: usize,
    /// The member ranges, sorted by start offset.
    pub ranges: Vec<SelRange>,
    /// Palette index for decoration.
    pub color: usize,
}

/// One tabstop placeholder at an absolute document position, ready for registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbsoluteTabstop {
    /// The tabstop number.
    pub number: usize,
    /// Absolute start offset.
    pub start: usize,
    /// Absolute end offset.
    pub end: usize,
}

/// The live tabstop state. Empty when no snippet expansion is in flight.
#[derive(Debug, Clone, Default)]
pub struct TabstopState {
    groups: Vec<TabstopGroup>,
}

impl TabstopState {
    /// Create an empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if any groups are live.
    pub fn is_active(&self) -> bool {
        !self.groups.is_empty()
    }

    /// The live groups, ordered ascending by number. Exposed for host decoration.
    pub fn groups(&self) -> &[TabstopGroup] {
        &self.groups
    }

    /// Clear all groups (manual cursor exit, unrelated edit, or undo across the expansion).
    pub fn clear(&mut self) {
        self.groups.clear();
    }

    /// Register the placeholders of one expansion transaction atomically, replacing any
    /// previous groups. Stops sharing a number become one group; groups are sorted ascending.
    pub fn register(&mut self, stops: Vec<AbsoluteTabstop>) {
        self.groups.clear();
        let mut stops = stops;
        stops.sort_by(|a, b| a.number.cmp(&b.number).then(a.start.cmp(&b.start)));

        let mut colors_in_use: Vec<usize> = Vec::new();
        for stop in stops {
            match self.groups.last_mut() {
                Some(group) if group.number == stop.number => {
                    group.ranges.push(SelRange::new(stop.start, stop.end));
                }
                _ => {
                    let color = next_color(&colors_in_use);
                    colors_in_use.push(color);
                    self.groups.push(TabstopGroup {
                        number: stop.number,
                        ranges: vec![SelRange::new(stop.start, stop.end)],
                        color,
                    });
                }
            }
        }
    }

    /// Restore a previously recorded group set (redo of a snippet expansion).
    pub fn restore(&mut self, groups: Vec<TabstopGroup>) {
        self.groups = groups;
    }

    /// Select the current (front) group in the buffer. Called right after registration so the
    /// cursor lands in the first placeholder.
    pub fn select_current<B: HostBuffer>(&self, buffer: &mut B) -> bool {
        let Some(group) = self.groups.first() else {
            return false;
        };
        buffer.set_selections(group.ranges.clone(), 0);
        true
    }

    /// Advance to the next group.
    ///
    /// Removes the current group and selects the next one (multi-range selection when the
    /// group has several occurrences). If the next group's single range exactly contains the
    /// previous one, the caret merely moves to its end instead of re-selecting. If advancing
    /// produced no net cursor movement, the loop continues to the following group. Returns
    /// `false` only when no groups were live to begin with.
    pub fn advance<B: HostBuffer>(&mut self, buffer: &mut B) -> bool {
        if self.groups.is_empty() {
            return false;
        }
        let before: Vec<SelRange> = buffer.selections().to_vec();
        let mut prev = self.groups.remove(0);

        while let Some(next) = self.groups.first() {
            let mut selections = next.ranges.clone();

            if let (&[p], &[n]) = (&prev.ranges[..], &next.ranges[..])
                && n.min() <= p.min()
                && p.max() <= n.max()
                && (n.min(), n.max()) != (p.min(), p.max())
            {
                // Moving forward out of a nested stop, not re-selecting outward.
                selections = vec![SelRange::caret(n.max())];
            }

            buffer.set_selections(selections, 0);
            if buffer.selections() != &before[..] {
                return true;
            }
            // Zero net movement (e.g. a zero-width stop adjacent to the previous one):
            // consume it and keep going.
            prev = self.groups.remove(0);
        }

        // The last group was consumed; the cursor stays where the last edit left it.
        true
    }

    /// Shift all live ranges through a document edit; drop ranges swallowed by a deletion and
    /// groups left with no live ranges.
    pub fn map_through(&mut self, edit: &Edit) {
        for group in &mut self.groups {
            group.ranges.retain_mut(|range| {
                let (min, max) = (range.min(), range.max());
                // A range strictly inside the deleted span is gone.
                if min >= edit.start && max <= edit.end() && edit.deleted_len() > 0 && max > min {
                    return false;
                }
                range.anchor = edit.map_offset(range.anchor, range.anchor == min);
                range.head = edit.map_offset(range.head, range.head == min);
                true
            });
        }
        self.groups.retain(|g| !g.ranges.is_empty());
    }

    /// Clear all groups if any selection head lies outside every live range. Returns `true`
    /// if the state was cleared.
    pub fn deactivate_if_outside(&mut self, selections: &[SelRange]) -> bool {
        if self.groups.is_empty() {
            return false;
        }
        let all_inside = selections.iter().all(|sel| {
            self.groups
                .iter()
                .any(|g| g.ranges.iter().any(|r| r.contains(sel.head)))
        });
        if !all_inside {
            self.clear();
            return true;
        }
        false
    }
}
