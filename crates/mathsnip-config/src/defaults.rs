//! The built-in snippet set.
//!
//! Used when a host supplies no configuration, and as fixture data for integration tests.
//! Kept in the same YAML dialect users author, so it exercises the full loader path.

use mathsnip_core::Snippet;

use crate::compiler::load_str;

/// YAML source of the built-in set.
pub const DEFAULT_SNIPPETS_YAML: &str = r#"
snippets:
  - trigger: mk
    replacement: '$$0$'
    options: tAw
    description: Inline math
  - trigger: dm
    replacement: "$$\n$0\n$$"
    options: tAw
    description: Display math
  - trigger: sr
    replacement: '^{2}'
    options: mA
  - trigger: cb
    replacement: '^{3}'
    options: mA
  - trigger: sq
    replacement: '\sqrt{$0}$1'
    options: mAw
  - trigger: ff
    replacement: '\frac{$0}{$1}'
    options: mAw
  - trigger: beg
    replacement: "\\begin{$0}\n$1\n\\end{$0}"
    options: MAw
  - trigger: pmat
    replacement: "\\begin{pmatrix}\n$0\n\\end{pmatrix}"
    options: mAw
  - trigger: '->'
    replacement: '\to'
    options: mA
  - trigger: '!='
    replacement: '\neq'
    options: mA
  - trigger: '<='
    replacement: '\leq'
    options: mA
  - trigger: '>='
    replacement: '\geq'
    options: mA
  - trigger: xx
    replacement: '\times'
    options: mAw
  - trigger: sum
    replacement: '\sum_{${0:i=1}}^{${1:N}}'
    options: mAw
  - trigger: int
    replacement: '\int_{${0:a}}^{${1:b}}'
    options: mAw
  - trigger: lim
    replacement: '\lim_{${0:n} \to ${1:\infty}}'
    options: mAw
  - trigger: '([A-Za-z])(\d)'
    replacement: '[[0]]_{[[1]]}'
    options: rmA
    description: Auto-subscript
  - trigger: '\b(${GREEK})'
    replacement: '\[[0]]'
    options: rmA
    description: Greek letters
  - trigger: '\b(${SYMBOL})'
    replacement: '\[[0]]'
    options: rmA
    description: Common symbols
  - trigger: U
    replacement: '\underbrace{${VISUAL}}_{$0}'
    options: mv
  - trigger: B
    replacement: '\boxed{${VISUAL}}'
    options: mv
"#;

/// Compile the built-in set.
pub fn default_snippets() -> Vec<Snippet> {
    let loaded = load_str(DEFAULT_SNIPPETS_YAML).expect("built-in snippet set parses");
    debug_assert!(
        loaded.errors.is_empty(),
        "built-in snippet set compiles cleanly: {:?}",
        loaded.errors
    );
    loaded.snippets
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_set_compiles_without_errors() {
        let loaded = load_str(DEFAULT_SNIPPETS_YAML).unwrap();
        assert!(loaded.errors.is_empty(), "{:?}", loaded.errors);
        assert!(!loaded.snippets.is_empty());
    }
}
