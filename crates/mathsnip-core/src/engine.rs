//! The engine facade.
//!
//! [`SnippetEngine`] owns the snippet set, the settings, the region-classifier cache, and the
//! live tabstop state, and routes each keystroke through a fixed pipeline:
//!
//! 1. Tab with live tabstops advances to the next group.
//! 2. Snippet expansion.
//! 3. `/` in math runs autofraction.
//! 4. Tab/Enter inside a matrix-like environment run the matrix shortcuts.
//! 5. Tab in math runs tab-out.
//!
//! The first stage to consume the key wins; `false` from `handle_key` means the host should
//! perform its default behavior.
//!
//! Undo integration: every snippet transaction carries a [`EditTag::SnippetExpansion`] id, and
//! the engine keeps a record of the tabstop groups registered under that id. Undo and redo are
//! modeled as [`SnippetEffect`]s so the tabstop side effect is always inverted symmetrically
//! with the text change.

use std::collections::{HashMap, VecDeque};

use crate::buffer::{Edit, EditTag, HostBuffer, SelRange, Transaction, UndoHistory};
use crate::context::ContextProvider;
use crate::expansion::expand_snippets;
use crate::features;
use crate::key::{Key, KeyEvent};
use crate::settings::EngineSettings;
use crate::snippet::{Snippet, sort_snippets};
use crate::syntax::{MarkdownMathScanner, MathSource};
use crate::tabstop::{TabstopGroup, TabstopState};

/// Tabstop snapshots retained for redo; the oldest are dropped past this bound.
const MAX_EXPANSION_RECORDS: usize = 128;

/// A transaction effect the engine reacts to, pairing snippet text changes with their tabstop
/// side effects across undo/redo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnippetEffect {
    /// A snippet transaction (re)enters the document.
    Start(u64),
    /// The transaction finished applying; its tabstop groups are now live.
    End(u64),
    /// The transaction's effects are being removed (undo), newest side first.
    UndoneEnd(u64),
    /// The transaction itself has been removed from the document.
    UndoneStart(u64),
}

/// The top-level engine. Generic over the syntax oracle; defaults to the built-in Markdown
/// scanner.
pub struct SnippetEngine<S: MathSource = MarkdownMathScanner> {
    snippets: Vec<Snippet>,
    settings: EngineSettings,
    tabstops: TabstopState,
    contexts: ContextProvider<S>,
    /// Tabstop group snapshots keyed by expansion id, for redo re-registration. Bounded by
    /// [`MAX_EXPANSION_RECORDS`]; `record_order` tracks insertion order for eviction.
    records: HashMap<u64, Vec<TabstopGroup>>,
    record_order: VecDeque<u64>,
    next_expansion_id: u64,
}

impl SnippetEngine<MarkdownMathScanner> {
    /// Create an engine over the built-in Markdown scanner.
    pub fn new(settings: EngineSettings) -> Self {
        Self::with_source(MarkdownMathScanner::new(), settings)
    }
}

impl<S: MathSource> SnippetEngine<S> {
    /// Create an engine over a custom syntax oracle.
    pub fn with_source(source: S, settings: EngineSettings) -> Self {
        let contexts = ContextProvider::new(source, settings.math_code_languages.clone());
        Self {
            snippets: Vec::new(),
            settings,
            tabstops: TabstopState::new(),
            contexts,
            records: HashMap::new(),
            record_order: VecDeque::new(),
            next_expansion_id: 0,
        }
    }

    /// Replace the snippet set wholesale (configuration reload). The set is sorted here; the
    /// expansion pass relies on that order.
    pub fn set_snippets(&mut self, mut snippets: Vec<Snippet>) {
        sort_snippets(&mut snippets);
        self.snippets = snippets;
    }

    /// The current snippet set, in firing order.
    pub fn snippets(&self) -> &[Snippet] {
        &self.snippets
    }

    /// The current settings.
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Replace the settings wholesale.
    pub fn set_settings(&mut self, settings: EngineSettings) {
        self.contexts
            .set_math_languages(settings.math_code_languages.clone());
        self.settings = settings;
    }

    /// The live tabstop state, for host decoration.
    pub fn tabstops(&self) -> &TabstopState {
        &self.tabstops
    }

    /// Route one keystroke through the pipeline. Returns `true` if the engine consumed it.
    pub fn handle_key<B: HostBuffer>(&mut self, buffer: &mut B, key: &KeyEvent) -> bool {
        if key.ctrl_or_cmd {
            return false;
        }

        if key.key == Key::Tab
            && !key.shift
            && self.tabstops.is_active()
            && self.tabstops.advance(buffer)
        {
            return true;
        }

        if self.settings.snippets_enabled {
            let id = self.next_expansion_id;
            if let Some(report) = expand_snippets(
                buffer,
                &mut self.contexts,
                &self.snippets,
                key,
                &self.settings,
                &mut self.tabstops,
                id,
            ) {
                self.next_expansion_id += 1;
                self.process_effect(SnippetEffect::Start(id));
                self.process_effect(SnippetEffect::End(id));
                if report.run_enlarge {
                    self.auto_enlarge(buffer);
                }
                return true;
            }
        }

        let text = buffer.contents();
        let pos = buffer.selections()[buffer.primary_index()].max();
        let context = self.contexts.context_at(&text, pos, buffer.version());

        if self.settings.autofraction_enabled
            && key.typed_char() == Some('/')
            && context.mode.in_math()
        {
            let id = self.next_expansion_id;
            if features::run_autofraction(
                buffer,
                &context,
                &self.settings,
                &mut self.tabstops,
                id,
            ) {
                self.next_expansion_id += 1;
                self.contexts.invalidate();
                self.process_effect(SnippetEffect::Start(id));
                self.process_effect(SnippetEffect::End(id));
                return true;
            }
        }

        if self.settings.matrix_shortcuts_enabled
            && matches!(key.key, Key::Tab | Key::Enter)
            && context.mode.in_math()
            && features::is_inside_matrix(&text, pos, &self.settings)
            && features::handle_matrix_key(buffer, key, &mut self.tabstops)
        {
            self.contexts.invalidate();
            return true;
        }

        if self.settings.tabout_enabled
            && key.key == Key::Tab
            && !key.shift
            && context.mode.in_math()
            && features::run_tabout(buffer, &context)
        {
            self.tabstops.deactivate_if_outside(buffer.selections());
            return true;
        }

        false
    }

    /// Convenience for hosts driving the built-in buffer: route the character through the
    /// pipeline and fall back to plain insertion at every selection.
    ///
    /// Returns `true` when the engine consumed the key (no default insertion happened).
    pub fn type_char<B: HostBuffer>(&mut self, buffer: &mut B, ch: char) -> bool {
        let event = KeyEvent::char(ch);
        if self.handle_key(buffer, &event) {
            return true;
        }

        let mut ordered: Vec<SelRange> = buffer.selections().to_vec();
        ordered.sort_by(|a, b| b.min().cmp(&a.min()));
        let edits: Vec<Edit> = ordered
            .iter()
            .map(|sel| Edit::new(sel.min(), buffer.slice(sel.min(), sel.max()), ch.to_string()))
            .collect();
        buffer.apply(Transaction::new(edits.clone(), EditTag::Typing));
        for edit in &edits {
            self.tabstops.map_through(edit);
        }
        self.tabstops.deactivate_if_outside(buffer.selections());
        false
    }

    /// Notify the engine that the host moved the cursor without editing. Tabstop state is
    /// dropped once every caret has left the live placeholder ranges.
    pub fn notify_selection_changed<B: HostBuffer>(&mut self, buffer: &B) {
        self.tabstops.deactivate_if_outside(buffer.selections());
    }

    /// Notify the engine of a host-originated edit the engine did not produce itself.
    pub fn notify_edit(&mut self, edit: &Edit) {
        self.tabstops.map_through(edit);
        self.contexts.invalidate();
    }

    /// Undo one group. A snippet expansion retracts its tabstop registration together with
    /// its text; any other edit conservatively clears live tabstops.
    pub fn undo<B: UndoHistory>(&mut self, buffer: &mut B) -> bool {
        let Some(tag) = buffer.undo_group() else {
            return false;
        };
        match tag {
            EditTag::SnippetExpansion(id) => {
                self.process_effect(SnippetEffect::UndoneEnd(id));
                self.process_effect(SnippetEffect::UndoneStart(id));
            }
            _ => self.tabstops.clear(),
        }
        self.contexts.invalidate();
        true
    }

    /// Redo one group. Redoing a snippet expansion re-registers the tabstop groups recorded
    /// under its id, so placeholder navigation resumes exactly where it was.
    pub fn redo<B: UndoHistory>(&mut self, buffer: &mut B) -> bool {
        let Some(tag) = buffer.redo_group() else {
            return false;
        };
        match tag {
            EditTag::SnippetExpansion(id) => {
                self.process_effect(SnippetEffect::Start(id));
                self.process_effect(SnippetEffect::End(id));
            }
            _ => self.tabstops.clear(),
        }
        self.contexts.invalidate();
        true
    }

    /// Select the content of the math region containing the primary caret.
    pub fn select_current_equation<B: HostBuffer>(&mut self, buffer: &mut B) -> bool {
        let text = buffer.contents();
        let pos = buffer.selections()[buffer.primary_index()].max();
        let context = self.contexts.context_at(&text, pos, buffer.version());
        let Some(bounds) = context.bounds else {
            return false;
        };
        if context.mode.code {
            return false;
        }
        buffer.set_selections(vec![SelRange::new(bounds.inner_start, bounds.inner_end)], 0);
        true
    }

    /// Wrap the content of the math region containing the primary caret in `\boxed{...}`.
    pub fn box_current_equation<B: HostBuffer>(&mut self, buffer: &mut B) -> bool {
        let text = buffer.contents();
        let pos = buffer.selections()[buffer.primary_index()].max();
        let context = self.contexts.context_at(&text, pos, buffer.version());
        let Some(bounds) = context.bounds else {
            return false;
        };
        if !context.mode.in_math() {
            return false;
        }

        let open = "\\boxed{";
        let edits = vec![
            Edit::new(bounds.inner_end, "", "}"),
            Edit::new(bounds.inner_start, "", open),
        ];
        let caret = bounds.inner_end + open.chars().count() + 1;
        buffer.apply(
            Transaction::new(edits.clone(), EditTag::Other)
                .with_selections(vec![SelRange::caret(caret)], 0),
        );
        for edit in &edits {
            self.tabstops.map_through(edit);
        }
        self.contexts.invalidate();
        true
    }

    fn process_effect(&mut self, effect: SnippetEffect) {
        match effect {
            SnippetEffect::Start(id) => {
                // A redo of a known expansion re-registers its recorded groups; a fresh
                // expansion has no record yet.
                if let Some(groups) = self.records.get(&id) {
                    self.tabstops.restore(groups.clone());
                }
            }
            SnippetEffect::End(id) => {
                if self.tabstops.is_active() {
                    let snapshot = self.tabstops.groups().to_vec();
                    if self.records.insert(id, snapshot).is_none() {
                        self.record_order.push_back(id);
                        if self.record_order.len() > MAX_EXPANSION_RECORDS
                            && let Some(oldest) = self.record_order.pop_front()
                        {
                            self.records.remove(&oldest);
                        }
                    }
                }
            }
            SnippetEffect::UndoneEnd(_) => self.tabstops.clear(),
            SnippetEffect::UndoneStart(_) => {}
        }
    }

    fn auto_enlarge<B: HostBuffer>(&mut self, buffer: &mut B) {
        let text = buffer.contents();
        let pos = buffer.selections()[buffer.primary_index()].max();
        let context = self.contexts.context_at(&text, pos, buffer.version());
        if let Some(bounds) = context.bounds
            && context.mode.in_math()
            && features::enlarge_brackets(buffer, bounds, &self.settings, &mut self.tabstops)
        {
            self.contexts.invalidate();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::MemoryBuffer;
    use crate::snippet::{ModeMask, SnippetKind};

    fn engine_with(snippets: Vec<Snippet>) -> SnippetEngine {
        let mut engine = SnippetEngine::new(EngineSettings::default());
        engine.set_snippets(snippets);
        engine
    }

    fn auto_literal(trigger: &str, replacement: &str) -> Snippet {
        Snippet {
            kind: SnippetKind::Literal {
                trigger: trigger.to_string(),
            },
            replacement: replacement.to_string(),
            mask: ModeMask::math(),
            automatic: true,
            word_boundary: false,
            priority: 0,
            description: None,
        }
    }

    #[test]
    fn test_ctrl_chord_always_falls_through() {
        let mut engine = engine_with(vec![auto_literal("sr", "^{2}")]);
        let mut buf = MemoryBuffer::new("$as$");
        buf.set_caret(3);
        let event = KeyEvent {
            key: Key::Char('r'),
            shift: false,
            ctrl_or_cmd: true,
        };
        assert!(!engine.handle_key(&mut buf, &event));
        assert_eq!(buf.contents(), "$as$");
    }

    #[test]
    fn test_pipeline_prefers_tabstop_advance_over_tabout() {
        let mut engine = engine_with(vec![auto_literal("fr", r"\frac{$0}{$1}")]);
        let mut buf = MemoryBuffer::new("$f$");
        buf.set_caret(2);
        assert!(engine.type_char(&mut buf, 'r'));
        assert_eq!(buf.contents(), r"$\frac{}{}$");
        assert!(engine.tabstops().is_active());

        // Tab advances to the next placeholder instead of tabbing out past `}`.
        assert!(engine.handle_key(&mut buf, &KeyEvent::tab()));
        assert_eq!(buf.selections(), &[SelRange::caret(9)]);
    }

    #[test]
    fn test_expansion_records_stay_bounded() {
        let mut engine = engine_with(vec![auto_literal("fr", r"\frac{$0}{$1}")]);
        for _ in 0..MAX_EXPANSION_RECORDS + 50 {
            let mut buf = MemoryBuffer::new("$f$");
            buf.set_caret(2);
            assert!(engine.type_char(&mut buf, 'r'));
        }
        assert_eq!(engine.records.len(), MAX_EXPANSION_RECORDS);
        // The newest expansion's snapshot survives eviction.
        assert!(engine.records.contains_key(&(engine.next_expansion_id - 1)));
    }

    #[test]
    fn test_unhandled_char_inserts_at_selection() {
        let mut engine = engine_with(Vec::new());
        let mut buf = MemoryBuffer::new("ab");
        buf.set_caret(1);
        assert!(!engine.type_char(&mut buf, 'x'));
        assert_eq!(buf.contents(), "axb");
    }
}
