//! Cheap static analysis over a parsed [`Ast`], run once at compile time so
//! the Matcher can skip scan positions that provably cannot start a match
//! instead of trying every position blindly.
//!
//! This generalizes the idea behind an alternate, unused byte-oriented
//! search-plan design in the source crate (`leading_literal`, scoped here to
//! `char` instead of `u8` since this engine matches Unicode scalars, not
//! bytes) to the one piece of it worth carrying forward: a required leading
//! literal run.

use crate::ast::Ast;

/// A literal run every match of a pattern must begin with. Empty when no
/// such run could be proven (the pattern may start with arbitrary input).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Prefix {
    pub literal: Vec<char>,
}

impl Prefix {
    pub fn is_empty(&self) -> bool {
        self.literal.is_empty()
    }
}

/// Extracts the longest literal prefix every match of `ast` must start with.
///
/// Only the unambiguous shapes count: a leading run of single-character
/// `CharSet`s, threaded through non-capturing concatenation and groups.
/// Anything that can match zero characters (`*`, `?`, `{0,n}`) or branches
/// (`Alternation`) stops the walk — the accumulated prefix up to that point
/// is still valid, just not extended further.
pub fn required_prefix(ast: &Ast) -> Prefix {
    let mut literal = Vec::new();
    accumulate(ast, &mut literal);
    Prefix { literal }
}

/// Walks `ast` appending literal characters to `out`; returns whether the
/// caller should keep accumulating from whatever follows `ast` in sequence.
fn accumulate(ast: &Ast, out: &mut Vec<char>) -> bool {
    match ast {
        Ast::CharSet(set) => match set.as_single_char() {
            Some(c) => {
                out.push(c);
                true
            }
            None => false,
        },
        Ast::Group { child, .. } => accumulate(child, out),
        Ast::Concat(parts) => {
            for part in parts {
                if !accumulate(part, out) {
                    return false;
                }
            }
            true
        }
        _ => false,
    }
}

/// Returns whether `haystack` could possibly contain `needle` anywhere at or
/// after `from`, without running the automaton. A cheap rejection test the
/// Matcher can use before attempting a full match at a candidate position.
pub fn contains_from(haystack: &[char], needle: &[char], from: usize) -> bool {
    if needle.is_empty() {
        return true;
    }
    if from >= haystack.len() || needle.len() > haystack.len() - from {
        return false;
    }
    haystack[from..].windows(needle.len()).any(|w| w == needle)
}
