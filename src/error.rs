//! Error types. `ParseError` and `CompileError` are internal, position
//! aware enums; compiling a pattern folds whichever one fired into the
//! single public [`Error`] type.

use thiserror::Error;

/// Errors raised while turning pattern text into an [`crate::ast::Ast`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("pattern must not be empty")]
    EmptyPattern { at: usize },

    #[error("quantifier has nothing to repeat")]
    NotQuantifiable { at: usize },

    #[error("unmatched opening parenthesis")]
    UnmatchedOpenParen { at: usize },

    #[error("unmatched closing parenthesis")]
    UnmatchedCloseParen { at: usize },

    #[error("missing closing bracket ']'")]
    MissingCloseBracket { at: usize },

    #[error("character class must not be empty")]
    EmptyCharClass { at: usize },

    #[error("character range is reversed (start must not be after end)")]
    ReversedRange { at: usize },

    #[error("unescaped delimiter '/' in character group")]
    UnescapedDelimiter { at: usize },

    #[error("unknown unicode category '{name}'")]
    UnknownCategory { name: String, at: usize },

    #[error("missing closing '}}' in repetition")]
    MissingRepeatBrace { at: usize },

    #[error("invalid repetition bound")]
    InvalidRepeatBound { at: usize },

    #[error("single-bound repetition '{{0}}' is not allowed")]
    ZeroSingleBoundRepeat { at: usize },

    #[error("unsupported construct after '(?'")]
    UnsupportedGroupConstruct { at: usize },

    #[error("trailing backslash")]
    TrailingBackslash { at: usize },

    #[error("'\\0' is not a valid backreference")]
    InvalidBackreferenceZero { at: usize },

    #[error("unexpected character '{found}'")]
    UnexpectedChar { found: char, at: usize },
}

impl ParseError {
    pub fn at(&self) -> usize {
        match self {
            ParseError::EmptyPattern { at }
            | ParseError::NotQuantifiable { at }
            | ParseError::UnmatchedOpenParen { at }
            | ParseError::UnmatchedCloseParen { at }
            | ParseError::MissingCloseBracket { at }
            | ParseError::EmptyCharClass { at }
            | ParseError::ReversedRange { at }
            | ParseError::UnescapedDelimiter { at }
            | ParseError::UnknownCategory { at, .. }
            | ParseError::MissingRepeatBrace { at }
            | ParseError::InvalidRepeatBound { at }
            | ParseError::ZeroSingleBoundRepeat { at }
            | ParseError::UnsupportedGroupConstruct { at }
            | ParseError::TrailingBackslash { at }
            | ParseError::InvalidBackreferenceZero { at }
            | ParseError::UnexpectedChar { at, .. } => *at,
        }
    }
}

/// Errors raised while lowering a validated AST into an instruction list.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CompileError {
    #[error("program counter overflow")]
    ProgramOverflow,

    #[error("backreference to non-existent group {group}")]
    InvalidBackreference { group: usize, at: usize },

    #[error("repetition upper bound is less than its lower bound")]
    RangeOutOfOrder { at: usize },
}

impl CompileError {
    pub fn at(&self) -> usize {
        match self {
            CompileError::ProgramOverflow => 0,
            CompileError::InvalidBackreference { at, .. } => *at,
            CompileError::RangeOutOfOrder { at } => *at,
        }
    }
}

/// The single error type surfaced to callers of [`crate::regex::Regex::compile`].
///
/// Matching itself never fails: a pattern that cannot match a given input
/// simply yields no results, so only compiling a pattern can return this.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} (at offset {index})")]
pub struct Error {
    pub message: String,
    pub index: usize,
    pub pattern: String,
}

impl Error {
    pub(crate) fn from_parse(e: ParseError, pattern: &str) -> Self {
        Error { message: e.to_string(), index: e.at(), pattern: pattern.to_string() }
    }

    pub(crate) fn from_compile(e: CompileError, pattern: &str) -> Self {
        Error { message: e.to_string(), index: e.at(), pattern: pattern.to_string() }
    }
}
