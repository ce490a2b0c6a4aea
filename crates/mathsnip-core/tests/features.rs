use mathsnip_core::{
    EngineSettings, HostBuffer, KeyEvent, MemoryBuffer, ModeMask, SelRange, Snippet,
    SnippetEngine, SnippetKind,
};

fn engine() -> SnippetEngine {
    SnippetEngine::new(EngineSettings::default())
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
fn test_autofraction_takes_whole_word() {
    let mut engine = engine();
    let mut buf = MemoryBuffer::new("$ab$");
    buf.set_caret(3);

    assert!(engine.type_char(&mut buf, '/'));
    assert_eq!(buf.contents(), r"$\frac{ab}{}$");
    // Caret lands in the empty denominator.
    assert_eq!(buf.selections(), &[SelRange::caret(11)]);
    assert!(engine.tabstops().is_active());
}

#[test]
fn test_autofraction_stops_at_operator() {
    let mut engine = engine();
    let mut buf = MemoryBuffer::new("$a+b$");
    buf.set_caret(4);

    assert!(engine.type_char(&mut buf, '/'));
    assert_eq!(buf.contents(), r"$a+\frac{b}{}$");
    assert_eq!(buf.selections(), &[SelRange::caret(12)]);
}

#[test]
fn test_autofraction_unwraps_bracket_group() {
    let mut engine = engine();
    let mut buf = MemoryBuffer::new("$(a+b)$");
    buf.set_caret(6);

    assert!(engine.type_char(&mut buf, '/'));
    assert_eq!(buf.contents(), r"$\frac{a+b}{}$");
    assert_eq!(buf.selections(), &[SelRange::caret(12)]);
}

#[test]
fn test_autofraction_uses_selection_as_numerator() {
    let mut engine = engine();
    let mut buf = MemoryBuffer::new("$x+y$");
    buf.set_selections(vec![SelRange::new(1, 4)], 0);

    assert!(engine.type_char(&mut buf, '/'));
    assert_eq!(buf.contents(), r"$\frac{x+y}{}$");
    assert_eq!(buf.selections(), &[SelRange::caret(12)]);
}

#[test]
fn test_autofraction_in_display_math_stays_on_its_line() {
    let mut engine = engine();
    let mut buf = MemoryBuffer::new("$$\nx\n$$");
    buf.set_caret(4);

    assert!(engine.type_char(&mut buf, '/'));
    // The numerator walk never crosses the line break above `x`.
    assert_eq!(buf.contents(), "$$\n\\frac{x}{}\n$$");
    assert_eq!(buf.selections(), &[SelRange::caret(12)]);
}

#[test]
fn test_autofraction_stops_at_unmatched_open_bracket() {
    let mut engine = engine();
    let mut buf = MemoryBuffer::new("$f(a$");
    buf.set_caret(4);

    assert!(engine.type_char(&mut buf, '/'));
    assert_eq!(buf.contents(), r"$f(\frac{a}{}$");
    assert_eq!(buf.selections(), &[SelRange::caret(12)]);
}

#[test]
fn test_slash_outside_math_is_plain_typing() {
    let mut engine = engine();
    let mut buf = MemoryBuffer::new("ab");
    buf.set_caret(2);

    assert!(!engine.type_char(&mut buf, '/'));
    assert_eq!(buf.contents(), "ab/");
}

#[test]
fn test_autofraction_skips_excluded_environment() {
    let mut engine = engine();
    // Inside the argument of an unclosed \frac{.
    let mut buf = MemoryBuffer::new(r"$\frac{ab");
    buf.set_caret(9);

    assert!(!engine.type_char(&mut buf, '/'));
    assert_eq!(buf.contents(), "$\\frac{ab/");
}

#[test]
fn test_matrix_tab_inserts_column() {
    let mut engine = engine();
    let mut buf = MemoryBuffer::new(r"$\begin{pmatrix}1\end{pmatrix}$");
    buf.set_caret(17);

    assert!(engine.handle_key(&mut buf, &KeyEvent::tab()));
    assert_eq!(buf.contents(), "$\\begin{pmatrix}1 & \\end{pmatrix}$");
    assert_eq!(buf.selections(), &[SelRange::caret(20)]);
}

#[test]
fn test_matrix_enter_inserts_row() {
    let mut engine = engine();
    let mut buf = MemoryBuffer::new(r"$\begin{pmatrix}1\end{pmatrix}$");
    buf.set_caret(17);

    assert!(engine.handle_key(&mut buf, &KeyEvent::enter()));
    assert_eq!(buf.contents(), "$\\begin{pmatrix}1 \\\\\n\\end{pmatrix}$");
}

#[test]
fn test_matrix_shift_enter_hops_a_row() {
    let mut engine = engine();
    let text = "$$\n\\begin{cases}a \\\\\nb\n\\end{cases}\n$$\n";
    let mut buf = MemoryBuffer::new(text);
    buf.set_caret(17);

    assert!(engine.handle_key(&mut buf, &KeyEvent::shift_enter()));
    // End of the "b" row.
    assert_eq!(buf.selections(), &[SelRange::caret(22)]);
    assert_eq!(buf.contents(), text);
}

#[test]
fn test_enter_outside_matrix_falls_through() {
    let mut engine = engine();
    let mut buf = MemoryBuffer::new("$x+y$");
    buf.set_caret(3);

    assert!(!engine.handle_key(&mut buf, &KeyEvent::enter()));
    assert_eq!(buf.contents(), "$x+y$");
}

#[test]
fn test_tabout_jumps_past_closing_bracket() {
    let mut engine = engine();
    let mut buf = MemoryBuffer::new("$(a)b$");
    buf.set_caret(2);

    assert!(engine.handle_key(&mut buf, &KeyEvent::tab()));
    assert_eq!(buf.selections(), &[SelRange::caret(4)]);
    assert_eq!(buf.contents(), "$(a)b$");
}

#[test]
fn test_tabout_exits_inline_math() {
    let mut engine = engine();
    let mut buf = MemoryBuffer::new("$x$");
    buf.set_caret(2);

    assert!(engine.handle_key(&mut buf, &KeyEvent::tab()));
    assert_eq!(buf.selections(), &[SelRange::caret(3)]);
}

#[test]
fn test_tab_in_prose_falls_through() {
    let mut engine = engine();
    let mut buf = MemoryBuffer::new("plain text");
    buf.set_caret(5);

    assert!(!engine.handle_key(&mut buf, &KeyEvent::tab()));
}

#[test]
fn test_expansion_triggers_bracket_enlargement() {
    let mut e = engine();
    e.set_snippets(vec![auto_literal("sm", r"(\sum)")]);
    let mut buf = MemoryBuffer::new("$s$");
    buf.set_caret(2);

    assert!(e.type_char(&mut buf, 'm'));
    assert_eq!(buf.contents(), r"$\left(\sum\right)$");
}

#[test]
fn test_select_current_equation() {
    let mut engine = engine();
    let mut buf = MemoryBuffer::new("Prose $x+y$ more.");
    buf.set_caret(8);

    assert!(engine.select_current_equation(&mut buf));
    assert_eq!(buf.selections(), &[SelRange::new(7, 10)]);

    buf.set_caret(2);
    assert!(!engine.select_current_equation(&mut buf));
}

#[test]
fn test_box_current_equation() {
    let mut engine = engine();
    let mut buf = MemoryBuffer::new("$x+y$");
    buf.set_caret(3);

    assert!(engine.box_current_equation(&mut buf));
    assert_eq!(buf.contents(), r"$\boxed{x+y}$");
    // Caret after the inserted closing brace.
    assert_eq!(buf.selections(), &[SelRange::caret(12)]);
}
