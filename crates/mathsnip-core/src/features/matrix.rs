//! Matrix/align environment shortcuts: Tab inserts a column separator, Enter a row break.

use crate::buffer::{Edit, EditTag, HostBuffer, SelRange, Transaction};
use crate::context::{Environment, is_within_environment};
use crate::key::{Key, KeyEvent};
use crate::settings::EngineSettings;
use crate::tabstop::TabstopState;

/// Returns `true` if `pos` lies inside a `\begin{...}`/`\end{...}` pair whose name is one of
/// the configured matrix-like environments. Same-name environments nest and are balanced.
pub fn is_inside_matrix(text: &str, pos: usize, settings: &EngineSettings) -> bool {
    settings.matrix_environments.iter().any(|name| {
        let env = Environment::new(format!("\\begin{{{name}}}"), format!("\\end{{{name}}}"));
        is_within_environment(text, pos, &env)
    })
}

/// Handle a keystroke inside a matrix-like environment.
///
/// - Tab inserts `" & "` (next column).
/// - Enter inserts `" \\"` plus a newline (next row).
/// - Shift+Enter moves the caret to the end of the next line without editing, so the user can
///   hop over a row that already exists.
pub fn handle_matrix_key<B: HostBuffer>(
    buffer: &mut B,
    key: &KeyEvent,
    tabstops: &mut TabstopState,
) -> bool {
    let pos = buffer.selections()[buffer.primary_index()].max();

    match key.key {
        Key::Tab if !key.shift => insert_literal(buffer, pos, " & ", tabstops),
        Key::Enter if key.shift => {
            let line = buffer.line_of(pos);
            if line + 1 >= buffer.line_count() {
                return false;
            }
            buffer.set_selections(vec![SelRange::caret(buffer.line_end(line + 1))], 0);
            true
        }
        Key::Enter => insert_literal(buffer, pos, " \\\\\n", tabstops),
        _ => false,
    }
}

fn insert_literal<B: HostBuffer>(
    buffer: &mut B,
    pos: usize,
    text: &str,
    tabstops: &mut TabstopState,
) -> bool {
    let edit = Edit::new(pos, "", text);
    let caret = pos + text.chars().count();
    buffer.apply(
        Transaction::new(vec![edit.clone()], EditTag::Typing)
            .with_selections(vec![SelRange::caret(caret)], 0),
    );
    tabstops.map_through(&edit);
    true
}
