//! A lightweight LaTeX lexer.
//!
//! Produces offset-tagged tokens for comments, command/escape sequences, and single characters.
//! Whitespace is skipped (it never becomes a token) but still advances the position, so token
//! offsets always index into the original text.
//!
//! This is the basis for delimiter-aware navigation that must not confuse `\{` with `{`.

/// The kind of a lexed token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// `%` up to (excluding) the end of the line.
    Comment,
    /// `\` followed by one or more ASCII letters (a command name such as `\frac`).
    Command,
    /// `\` followed by a single non-letter character (e.g. `\{`, `\$`).
    EscapedSymbol,
    /// Any other single non-whitespace character.
    Char,
}

/// A single token with its half-open character-offset range and raw text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Start character offset (inclusive).
    pub start: usize,
    /// End character offset (exclusive).
    pub end: usize,
    /// The raw text of the token.
    pub text: String,
    /// The token kind.
    pub kind: TokenKind,
}

impl Token {
    /// Length of the token in characters.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Returns `true` if the token is empty (never produced by [`tokenize`]).
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Tokenize a LaTeX fragment.
///
/// Invariant: concatenating all token texts, re-inserting the whitespace gaps that were
/// skipped, reconstructs the input exactly.
pub fn tokenize(text: &str) -> Vec<Token> {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];

        if ch.is_whitespace() {
            i += 1;
            continue;
        }

        if ch == '%' {
            let start = i;
            while i < chars.len() && chars[i] != '\n' {
                i += 1;
            }
            tokens.push(Token {
                start,
                end: i,
                text: chars[start..i].iter().collect(),
                kind: TokenKind::Comment,
            });
            continue;
        }

        if ch == '\\' {
            let start = i;
            i += 1;
            if i < chars.len() && chars[i].is_ascii_alphabetic() {
                while i < chars.len() && chars[i].is_ascii_alphabetic() {
                    i += 1;
                }
                tokens.push(Token {
                    start,
                    end: i,
                    text: chars[start..i].iter().collect(),
                    kind: TokenKind::Command,
                });
            } else if i < chars.len() {
                i += 1;
                tokens.push(Token {
                    start,
                    end: i,
                    text: chars[start..i].iter().collect(),
                    kind: TokenKind::EscapedSymbol,
                });
            } else {
                // Trailing lone backslash.
                tokens.push(Token {
                    start,
                    end: i,
                    text: "\\".to_string(),
                    kind: TokenKind::Char,
                });
            }
            continue;
        }

        tokens.push(Token {
            start: i,
            end: i + 1,
            text: ch.to_string(),
            kind: TokenKind::Char,
        });
        i += 1;
    }

    tokens
}
