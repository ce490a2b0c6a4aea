//! Auxiliary shortcut features.
//!
//! Thin policy layers over the region classifier, the text utilities, and the expansion
//! engine. Each implements one specific editing behavior and reports whether it consumed the
//! keystroke; `false` always means "fall through to default editor behavior".

mod autofraction;
mod enlarge;
mod matrix;
mod tabout;

pub use autofraction::run_autofraction;
pub use enlarge::enlarge_brackets;
pub use matrix::{handle_matrix_key, is_inside_matrix};
pub use tabout::run_tabout;
