//! Reference text buffer and the host-buffer capability surface.
//!
//! The engine never mutates a document directly: it builds [`Transaction`]s of structured
//! [`Edit`]s (character offsets, half-open ranges) and applies them atomically through the
//! [`HostBuffer`] trait. A rejected or failed operation therefore leaves the buffer exactly as
//! it was.
//!
//! [`MemoryBuffer`] is the built-in implementation (rope-backed, with a tagged undo/redo
//! history). Hosts embedding the engine provide their own `HostBuffer`; the tags returned from
//! `undo`/`redo` are what lets the engine invert snippet side effects symmetrically.

use ropey::Rope;

/// A selection range in character offsets. `anchor == head` is a caret.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelRange {
    /// The fixed end of the selection.
    pub anchor: usize,
    /// The moving end of the selection (the caret).
    pub head: usize,
}

impl SelRange {
    /// Create a selection from `anchor` to `head`.
    pub fn new(anchor: usize, head: usize) -> Self {
        Self { anchor, head }
    }

    /// Create a caret (empty selection) at `pos`.
    pub fn caret(pos: usize) -> Self {
        Self { anchor: pos, head: pos }
    }

    /// The smaller offset.
    pub fn min(&self) -> usize {
        self.anchor.min(self.head)
    }

    /// The larger offset.
    pub fn max(&self) -> usize {
        self.anchor.max(self.head)
    }

    /// Returns `true` if this is a caret.
    pub fn is_empty(&self) -> bool {
        self.anchor == self.head
    }

    /// Returns `true` if `pos` lies within the selection (inclusive of both ends).
    pub fn contains(&self, pos: usize) -> bool {
        self.min() <= pos && pos <= self.max()
    }
}

/// A single structured text edit in character offsets.
///
/// `start` is an offset in the document at the time the edit is applied; the deleted range is
/// defined by the length of `deleted_text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    /// Start character offset of the edit.
    pub start: usize,
    /// Exact deleted text (may be empty).
    pub deleted_text: String,
    /// Exact inserted text (may be empty).
    pub inserted_text: String,
}

impl Edit {
    /// Create an edit replacing `deleted_text` at `start` with `inserted_text`.
    pub fn new(start: usize, deleted_text: impl Into<String>, inserted_text: impl Into<String>) -> Self {
        Self {
            start,
            deleted_text: deleted_text.into(),
            inserted_text: inserted_text.into(),
        }
    }

    /// Length of the deleted text in characters.
    pub fn deleted_len(&self) -> usize {
        self.deleted_text.chars().count()
    }

    /// Length of the inserted text in characters.
    pub fn inserted_len(&self) -> usize {
        self.inserted_text.chars().count()
    }

    /// Exclusive end offset of the deleted range in the pre-edit document.
    pub fn end(&self) -> usize {
        self.start + self.deleted_len()
    }

    /// The inverse edit (undoing this edit in the post-edit document).
    pub fn inverted(&self) -> Edit {
        Edit {
            start: self.start,
            deleted_text: self.inserted_text.clone(),
            inserted_text: self.deleted_text.clone(),
        }
    }

    /// Map a pre-edit offset into the post-edit document.
    ///
    /// Offsets inside the deleted range collapse to the start of the edit when `stick_left`
    /// is `true`, or to the end of the inserted text otherwise.
    pub fn map_offset(&self, offset: usize, stick_left: bool) -> usize {
        if offset < self.start {
            offset
        } else if offset >= self.end() {
            offset - self.deleted_len() + self.inserted_len()
        } else if stick_left {
            self.start
        } else {
            self.start + self.inserted_len()
        }
    }
}

/// A tag attached to a transaction, used for undo grouping and effect pairing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditTag {
    /// Ordinary typing or host-originated edits.
    Typing,
    /// A snippet expansion; the id pairs the transaction with its tabstop registration.
    SnippetExpansion(u64),
    /// An edit originating from the tabstop machinery itself (never exits tabstop mode).
    TabstopEdit,
    /// Anything else.
    Other,
}

/// An ordered list of edits applied atomically, plus the resulting selections.
///
/// Edits must be sorted by **descending** start offset and must not overlap, so applying them
/// in order never shifts the offsets of not-yet-applied edits.
#[derive(Debug, Clone)]
pub struct Transaction {
    /// The edits, sorted by descending start offset.
    pub edits: Vec<Edit>,
    /// The undo-grouping tag.
    pub tag: EditTag,
    /// Selections (and primary index) to install after applying, if any.
    pub selections_after: Option<(Vec<SelRange>, usize)>,
}

impl Transaction {
    /// Create a transaction from edits (sorted descending by start) and a tag.
    pub fn new(edits: Vec<Edit>, tag: EditTag) -> Self {
        Self {
            edits,
            tag,
            selections_after: None,
        }
    }

    /// Attach the selections to install after the transaction applies.
    pub fn with_selections(mut self, selections: Vec<SelRange>, primary: usize) -> Self {
        self.selections_after = Some((selections, primary));
        self
    }
}

/// The buffer capabilities the engine requires from a host.
pub trait HostBuffer {
    /// The entire document as a `String`.
    fn contents(&self) -> String;

    /// Total character count.
    fn len_chars(&self) -> usize;

    /// The text in `[start, end)` (character offsets, clamped to the document).
    fn slice(&self, start: usize, end: usize) -> String;

    /// The character at `offset`, if any.
    fn char_at(&self, offset: usize) -> Option<char>;

    /// Zero-based line index containing `offset`.
    fn line_of(&self, offset: usize) -> usize;

    /// Character offset of the start of `line`.
    fn line_start(&self, line: usize) -> usize;

    /// Character offset just past the last non-newline character of `line`.
    fn line_end(&self, line: usize) -> usize;

    /// Number of lines in the document.
    fn line_count(&self) -> usize;

    /// All selections (at least one; carets are empty selections).
    fn selections(&self) -> &[SelRange];

    /// Index of the primary selection.
    fn primary_index(&self) -> usize;

    /// Replace the selection set.
    fn set_selections(&mut self, selections: Vec<SelRange>, primary: usize);

    /// Apply a transaction atomically. Existing selections not covered by
    /// `selections_after` are mapped through the edits.
    fn apply(&mut self, transaction: Transaction);

    /// Monotonically increasing document version (bumped by every `apply`, `undo`, `redo`).
    fn version(&self) -> u64;
}

/// Buffers exposing a tagged undo/redo history. The engine wraps these to pair snippet
/// transactions with their tabstop side effects.
pub trait UndoHistory: HostBuffer {
    /// Undo the most recent group, returning its tag.
    fn undo_group(&mut self) -> Option<EditTag>;

    /// Redo the most recently undone group, returning its tag.
    fn redo_group(&mut self) -> Option<EditTag>;
}

struct HistoryGroup {
    tag: EditTag,
    /// Edits in the order they were applied (descending start offsets).
    edits: Vec<Edit>,
    selections_before: (Vec<SelRange>, usize),
    selections_after: (Vec<SelRange>, usize),
}

/// The built-in rope-backed buffer with a tagged undo/redo history.
pub struct MemoryBuffer {
    rope: Rope,
    selections: Vec<SelRange>,
    primary: usize,
    version: u64,
    undo_stack: Vec<HistoryGroup>,
    redo_stack: Vec<HistoryGroup>,
}

impl MemoryBuffer {
    /// Create a buffer from initial text, with a caret at offset 0.
    pub fn new(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
            selections: vec![SelRange::caret(0)],
            primary: 0,
            version: 0,
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
        }
    }

    /// Create an empty buffer.
    pub fn empty() -> Self {
        Self::new("")
    }

    /// The primary selection.
    pub fn primary_selection(&self) -> SelRange {
        self.selections[self.primary]
    }

    /// Place a single caret at `offset`.
    pub fn set_caret(&mut self, offset: usize) {
        let offset = offset.min(self.rope.len_chars());
        self.selections = vec![SelRange::caret(offset)];
        self.primary = 0;
    }

    /// Insert `text` at every selection (replacing non-empty selections), as one undo group.
    ///
    /// This is the host-side default behavior for a typed character the engine did not handle.
    pub fn insert_at_selections(&mut self, text: &str) {
        let mut ordered: Vec<SelRange> = self.selections.clone();
        ordered.sort_by(|a, b| b.min().cmp(&a.min()));

        let mut edits = Vec::with_capacity(ordered.len());
        for sel in &ordered {
            let deleted = self.slice(sel.min(), sel.max());
            edits.push(Edit::new(sel.min(), deleted, text));
        }
        self.apply(Transaction::new(edits, EditTag::Typing));
    }

    /// Undo the most recent group. Returns the group's tag, or `None` if nothing to undo.
    pub fn undo(&mut self) -> Option<EditTag> {
        let group = self.undo_stack.pop()?;
        // Invert in reverse application order.
        for edit in group.edits.iter().rev() {
            self.apply_raw(&edit.inverted());
        }
        let (sels, primary) = group.selections_before.clone();
        self.selections = sels;
        self.primary = primary;
        self.version += 1;
        let tag = group.tag;
        self.redo_stack.push(group);
        Some(tag)
    }

    /// Redo the most recently undone group. Returns the group's tag.
    pub fn redo(&mut self) -> Option<EditTag> {
        let group = self.redo_stack.pop()?;
        for edit in &group.edits {
            self.apply_raw(edit);
        }
        let (sels, primary) = group.selections_after.clone();
        self.selections = sels;
        self.primary = primary;
        self.version += 1;
        let tag = group.tag;
        self.undo_stack.push(group);
        Some(tag)
    }

    /// Depth of the undo stack.
    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    fn apply_raw(&mut self, edit: &Edit) {
        let start = edit.start.min(self.rope.len_chars());
        let del_end = (start + edit.deleted_len()).min(self.rope.len_chars());
        if del_end > start {
            self.rope.remove(start..del_end);
        }
        if !edit.inserted_text.is_empty() {
            self.rope.insert(start, &edit.inserted_text);
        }
    }

    fn clamp_selections(&mut self) {
        let len = self.rope.len_chars();
        for sel in &mut self.selections {
            sel.anchor = sel.anchor.min(len);
            sel.head = sel.head.min(len);
        }
        if self.primary >= self.selections.len() {
            self.primary = self.selections.len().saturating_sub(1);
        }
    }
}

impl UndoHistory for MemoryBuffer {
    fn undo_group(&mut self) -> Option<EditTag> {
        self.undo()
    }

    fn redo_group(&mut self) -> Option<EditTag> {
        self.redo()
    }
}

impl HostBuffer for MemoryBuffer {
    fn contents(&self) -> String {
        self.rope.to_string()
    }

    fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    fn slice(&self, start: usize, end: usize) -> String {
        let len = self.rope.len_chars();
        let start = start.min(len);
        let end = end.min(len).max(start);
        self.rope.slice(start..end).to_string()
    }

    fn char_at(&self, offset: usize) -> Option<char> {
        if offset < self.rope.len_chars() {
            Some(self.rope.char(offset))
        } else {
            None
        }
    }

    fn line_of(&self, offset: usize) -> usize {
        self.rope.char_to_line(offset.min(self.rope.len_chars()))
    }

    fn line_start(&self, line: usize) -> usize {
        let line = line.min(self.rope.len_lines().saturating_sub(1));
        self.rope.line_to_char(line)
    }

    fn line_end(&self, line: usize) -> usize {
        let line = line.min(self.rope.len_lines().saturating_sub(1));
        let start = self.rope.line_to_char(line);
        let raw: String = self.rope.line(line).to_string();
        let trimmed = raw.trim_end_matches(['\n', '\r']);
        start + trimmed.chars().count()
    }

    fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    fn selections(&self) -> &[SelRange] {
        &self.selections
    }

    fn primary_index(&self) -> usize {
        self.primary
    }

    fn set_selections(&mut self, selections: Vec<SelRange>, primary: usize) {
        if selections.is_empty() {
            return;
        }
        self.selections = selections;
        self.primary = primary.min(self.selections.len() - 1);
        self.clamp_selections();
    }

    fn apply(&mut self, transaction: Transaction) {
        if transaction.edits.is_empty() {
            return;
        }
        let selections_before = (self.selections.clone(), self.primary);

        for edit in &transaction.edits {
            self.apply_raw(edit);
            for sel in &mut self.selections {
                sel.anchor = edit.map_offset(sel.anchor, false);
                sel.head = edit.map_offset(sel.head, false);
            }
        }

        if let Some((sels, primary)) = &transaction.selections_after {
            self.selections = sels.clone();
            self.primary = (*primary).min(self.selections.len().saturating_sub(1));
        }
        self.clamp_selections();
        self.version += 1;

        self.undo_stack.push(HistoryGroup {
            tag: transaction.tag,
            edits: transaction.edits,
            selections_before,
            selections_after: (self.selections.clone(), self.primary),
        });
        self.redo_stack.clear();
    }

    fn version(&self) -> u64 {
        self.version
    }
}
