#![warn(missing_docs)]
//! Mathsnip Core - Headless LaTeX Snippet Expansion Engine
//!
//! # Overview
//!
//! `mathsnip-core` is a headless snippet engine for fast LaTeX input in Markdown-style
//! documents. It owns no UI and renders nothing: a host editor forwards keystrokes and
//! provides buffer access through the [`HostBuffer`] trait, and the engine answers with
//! structured, atomic [`Transaction`]s.
//!
//! # Core Features
//!
//! - **Snippet Expansion**: literal, regex, and selection-based (visual) triggers, with
//!   priority ordering and multi-cursor support
//! - **Tabstop Navigation**: `$N` / `${N:default}` placeholders with synchronized groups,
//!   Tab-driven advance, and undo/redo pairing
//! - **Region Classification**: cached text / inline-math / block-math / code detection,
//!   including text sub-environments like `\text{...}` nested in math
//! - **Editing Shortcuts**: autofraction (`/`), matrix row/column keys, auto-enlarged
//!   brackets, and tab-out of closing delimiters
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  SnippetEngine (keystroke pipeline)         │  ← Public API
//! ├─────────────────────────────────────────────┤
//! │  Features (autofraction, matrix, tabout, …) │  ← Editing Shortcuts
//! ├─────────────────────────────────────────────┤
//! │  Expansion Engine + Tabstop State Machine   │  ← Snippet Mechanics
//! ├─────────────────────────────────────────────┤
//! │  Context Classifier (ContextProvider)       │  ← Mode Gating
//! ├─────────────────────────────────────────────┤
//! │  Syntax Oracle (MathSource) + Tokenizer     │  ← Document Structure
//! ├─────────────────────────────────────────────┤
//! │  HostBuffer (transactions, undo tags)       │  ← Text Access
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use mathsnip_core::{
//!     EngineSettings, HostBuffer, MemoryBuffer, ModeMask, Snippet, SnippetEngine, SnippetKind,
//! };
//!
//! let mut engine = SnippetEngine::new(EngineSettings::default());
//! engine.set_snippets(vec![Snippet {
//!     kind: SnippetKind::Literal { trigger: "sr".to_string() },
//!     replacement: "^{2}".to_string(),
//!     mask: ModeMask::math(),
//!     automatic: true,
//!     word_boundary: false,
//!     priority: 0,
//!     description: None,
//! }]);
//!
//! let mut buffer = MemoryBuffer::new("$as$");
//! buffer.set_caret(3);
//! // Typing the final `r` of "sr" inside math expands the snippet.
//! assert!(engine.type_char(&mut buffer, 'r'));
//! assert_eq!(buffer.contents(), "$a^{2}$");
//! ```
//!
//! # Module Description
//!
//! - [`buffer`] - transactions, edits, and the host-buffer capability surface
//! - [`syntax`] - the math-region oracle and the built-in Markdown scanner
//! - [`context`] - the cached region classifier
//! - [`snippet`] - snippet definitions and matching
//! - [`tabstop`] - placeholder parsing and the tabstop state machine
//! - [`expansion`] - the multi-cursor matching & expansion pass
//! - [`features`] - autofraction, matrix shortcuts, auto-enlarge, tab-out
//! - [`engine`] - the keystroke pipeline facade
//! - [`brackets`] / [`tokenizer`] - LaTeX-aware text utilities
//!
//! # Offsets
//!
//! Every offset crossing a public API boundary is a **character offset** (Unicode scalar
//! values) and every range is half-open. Hosts indexing by UTF-8 or UTF-16 code units must
//! convert at the boundary.
//!
//! Snippet definitions are parsed from YAML by the companion crate `mathsnip-config`.

pub mod brackets;
pub mod buffer;
pub mod context;
pub mod engine;
pub mod expansion;
pub mod features;
pub mod key;
pub mod settings;
pub mod snippet;
pub mod syntax;
pub mod tabstop;
pub mod tokenizer;

pub use buffer::{Edit, EditTag, HostBuffer, MemoryBuffer, SelRange, Transaction, UndoHistory};
pub use context::{Bounds, Context, ContextProvider, Environment, Mode};
pub use engine::{SnippetEffect, SnippetEngine};
pub use expansion::{ExpansionReport, expand_snippets};
pub use key::{Key, KeyEvent};
pub use settings::{EngineSettings, TriggerKey};
pub use snippet::{
    MatchSpan, ModeMask, Snippet, SnippetKind, SnippetMatch, VISUAL_PLACEHOLDER,
    compile_trigger_pattern, sort_snippets,
};
pub use syntax::{CodeBlock, MarkdownMathScanner, MathRegion, MathSource};
pub use tabstop::{AbsoluteTabstop, ParsedTabstop, TabstopGroup, TabstopState, parse_tabstops};
