use mathsnip_config::{ConfigError, default_snippets, load_str};
use mathsnip_core::{ModeMask, SnippetKind};

#[test]
fn test_load_literal_snippet() {
    let loaded = load_str(
        r#"
snippets:
  - trigger: sr
    replacement: '^{2}'
    options: mA
"#,
    )
    .unwrap();
    assert!(loaded.errors.is_empty());
    assert_eq!(loaded.snippets.len(), 1);

    let snippet = &loaded.snippets[0];
    assert!(matches!(
        &snippet.kind,
        SnippetKind::Literal { trigger } if trigger == "sr"
    ));
    assert_eq!(snippet.mask, ModeMask::math());
    assert!(snippet.automatic);
    assert!(!snippet.word_boundary);
    assert_eq!(snippet.priority, 0);
}

#[test]
fn test_regex_trigger_forms_are_equivalent() {
    let loaded = load_str(
        r#"
snippets:
  - trigger: '([A-Za-z])(\d)'
    replacement: '[[0]]_{[[1]]}'
    options: rmA
  - trigger:
      regex: '([A-Za-z])(\d)'
    replacement: '[[0]]_{[[1]]}'
    options: mA
"#,
    )
    .unwrap();
    assert!(loaded.errors.is_empty());
    assert_eq!(loaded.snippets.len(), 2);
    for snippet in &loaded.snippets {
        match &snippet.kind {
            SnippetKind::Pattern { regex, source } => {
                assert_eq!(source, r"([A-Za-z])(\d)");
                // The anchor is appended at compile time.
                assert!(regex.as_str().ends_with('$'));
            }
            other => panic!("expected a pattern snippet, got {other:?}"),
        }
    }
}

#[test]
fn test_variable_substitution_in_regex_trigger() {
    let loaded = load_str(
        r#"
variables:
  MYSET: 'foo|bar'
snippets:
  - trigger: '(${MYSET})'
    replacement: '\[[0]]'
    options: rmA
"#,
    )
    .unwrap();
    assert!(loaded.errors.is_empty());
    match &loaded.snippets[0].kind {
        SnippetKind::Pattern { source, .. } => assert_eq!(source, "(foo|bar)"),
        other => panic!("expected a pattern snippet, got {other:?}"),
    }
}

#[test]
fn test_unknown_variable_rejects_only_that_record() {
    let loaded = load_str(
        r#"
snippets:
  - trigger: '(${NOPE})'
    replacement: 'x'
    options: rmA
  - trigger: ok
    replacement: 'y'
    options: mA
"#,
    )
    .unwrap();
    assert_eq!(loaded.snippets.len(), 1);
    assert_eq!(loaded.errors.len(), 1);
    match &loaded.errors[0] {
        ConfigError::UnknownVariable { name, .. } => assert_eq!(name, "NOPE"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_malformed_record_does_not_discard_the_rest() {
    let loaded = load_str(
        r#"
snippets:
  - trigger: good1
    replacement: 'a'
    options: mA
  - replacement: 'missing trigger'
  - trigger: bad_options
    replacement: 'b'
    options: mz
  - trigger: good2
    replacement: 'c'
    options: tA
"#,
    )
    .unwrap();
    assert_eq!(loaded.snippets.len(), 2);
    assert_eq!(loaded.errors.len(), 2);
    assert!(matches!(loaded.errors[0], ConfigError::BadRecord { index: 1, .. }));
    assert!(matches!(
        loaded.errors[1],
        ConfigError::BadOptions { letter: 'z', .. }
    ));
}

#[test]
fn test_bad_regex_is_reported_with_trigger() {
    let loaded = load_str(
        r#"
snippets:
  - trigger: '([unclosed'
    replacement: 'x'
    options: rmA
"#,
    )
    .unwrap();
    assert!(loaded.snippets.is_empty());
    match &loaded.errors[0] {
        ConfigError::BadRegex { trigger, .. } => assert_eq!(trigger, "([unclosed"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_visual_snippet_validation() {
    let loaded = load_str(
        r#"
snippets:
  - trigger: U
    replacement: '\underbrace{${VISUAL}}_{$0}'
    options: mv
  - trigger: UU
    replacement: '\vec{${VISUAL}}'
    options: mv
  - trigger: V
    replacement: '\vec{}'
    options: mv
"#,
    )
    .unwrap();
    assert_eq!(loaded.snippets.len(), 1);
    assert!(matches!(
        loaded.snippets[0].kind,
        SnippetKind::Visual { trigger: 'U' }
    ));
    assert!(matches!(
        loaded.errors[0],
        ConfigError::BadVisualTrigger { .. }
    ));
    assert!(matches!(
        loaded.errors[1],
        ConfigError::MissingVisualPlaceholder { .. }
    ));
}

#[test]
fn test_whole_file_yaml_error_is_fatal() {
    assert!(matches!(
        load_str("snippets: ["),
        Err(ConfigError::Yaml(_))
    ));
}

#[test]
fn test_priority_and_description_carry_through() {
    let loaded = load_str(
        r#"
snippets:
  - trigger: sr
    replacement: '^{2}'
    options: mA
    priority: 10
    description: Square
"#,
    )
    .unwrap();
    assert_eq!(loaded.snippets[0].priority, 10);
    assert_eq!(loaded.snippets[0].description.as_deref(), Some("Square"));
}

#[test]
fn test_default_set_loads() {
    let snippets = default_snippets();
    assert!(snippets.len() >= 20);
    // The set mixes all three kinds.
    assert!(snippets
        .iter()
        .any(|s| matches!(s.kind, SnippetKind::Literal { .. })));
    assert!(snippets
        .iter()
        .any(|s| matches!(s.kind, SnippetKind::Pattern { .. })));
    assert!(snippets
        .iter()
        .any(|s| matches!(s.kind, SnippetKind::Visual { .. })));
}
