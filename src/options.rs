//! Compile-time options controlling case sensitivity, anchor semantics, and
//! dot behavior. These are properties of a whole `Regex`, not of any one
//! expression node, so they are threaded through the Compiler and Matcher
//! rather than stored on the AST.

/// Options accepted by [`crate::regex::Regex::compile_with_options`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Options {
    /// Fold ASCII letter case when matching literals and ranges.
    pub case_insensitive: bool,
    /// `^`/`$` additionally match immediately after/before `\n`.
    pub multiline: bool,
    /// `.` matches `\n` too, instead of excluding it.
    pub dot_matches_line_separators: bool,
}
