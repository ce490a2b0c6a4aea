//! Trigger variables.
//!
//! Variables are `${NAME}` references expanded into regex triggers once, at load time. The
//! built-in table covers the common alternation lists (Greek letters, symbol commands); user
//! files may add to it or shadow entries. Expansion is a single pass, so variable values
//! never reference other variables.

use regex::Regex;
use std::collections::HashMap;

/// The built-in variable table. Keys are bare names; triggers reference them as `${NAME}`.
pub fn builtin_variables() -> HashMap<String, String> {
    [
        (
            "GREEK",
            "alpha|beta|gamma|Gamma|delta|Delta|epsilon|varepsilon|zeta|eta|theta|Theta|iota\
             |kappa|lambda|Lambda|mu|nu|xi|Xi|pi|Pi|rho|sigma|Sigma|tau|upsilon|Upsilon|phi\
             |varphi|Phi|chi|psi|Psi|omega|Omega",
        ),
        (
            "SYMBOL",
            "hbar|ell|nabla|infty|dots|mapsto|setminus|mid|cap|cup|land|lor|subseteq|subset\
             |implies|impliedby|iff|exists|forall|equiv|neq|geq|leq|gg|ll|sim|simeq|approx\
             |propto|cdot|oplus|otimes|times|star|perp|partial",
        ),
        ("SHORT_SYMBOL", "to|pm|mp"),
    ]
    .iter()
    .map(|(name, value)| (name.to_string(), value.to_string()))
    .collect()
}

fn variable_pattern() -> Regex {
    Regex::new(r"\$\{([A-Z_][A-Z_0-9]*)\}").expect("static variable pattern compiles")
}

/// Substitute every `${NAME}` reference in `trigger`. On an unknown name, returns that name
/// as the error.
pub fn substitute_variables(
    trigger: &str,
    variables: &HashMap<String, String>,
) -> Result<String, String> {
    let mut missing: Option<String> = None;
    let expanded = variable_pattern().replace_all(trigger, |caps: &regex::Captures<'_>| {
        let name = &caps[1];
        match variables.get(name) {
            Some(value) => value.clone(),
            None => {
                missing.get_or_insert_with(|| name.to_string());
                String::new()
            }
        }
    });
    match missing {
        Some(name) => Err(name),
        None => Ok(expanded.into_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substitution() {
        let vars = builtin_variables();
        let out = substitute_variables(r"\b(${SHORT_SYMBOL})", &vars).unwrap();
        assert_eq!(out, r"\b(to|pm|mp)");
    }

    #[test]
    fn test_unknown_variable_is_reported() {
        let vars = builtin_variables();
        assert_eq!(
            substitute_variables("${NO_SUCH_VAR}", &vars),
            Err("NO_SUCH_VAR".to_string())
        );
    }

    #[test]
    fn test_user_entry_shadows_builtin() {
        let mut vars = builtin_variables();
        vars.insert("GREEK".to_string(), "alpha".to_string());
        assert_eq!(
            substitute_variables("(${GREEK})", &vars).unwrap(),
            "(alpha)"
        );
    }

    #[test]
    fn test_no_reference_passes_through() {
        let vars = builtin_variables();
        assert_eq!(
            substitute_variables("([A-Za-z])", &vars).unwrap(),
            "([A-Za-z])"
        );
    }
}
