//! Public entry point. Compiling a pattern is the only fallible operation;
//! the resulting [`Regex`] runs to completion on every input, same as the
//! source crate's split between a fallible `compile` and an infallible
//! `eval`/`eval_from_start`.

use crate::analysis::{contains_from, required_prefix, Prefix};
use crate::compiler::compile;
use crate::error::Error;
use crate::instruction::Instruction;
use crate::matcher::{self, MatchResult};
use crate::options::Options;
use crate::parser::parse;

/// One match produced by [`Regex::matches`]: the full match text plus each
/// capture group's text (`None` for a group the match never entered).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    pub full_match: String,
    pub groups: Vec<Option<String>>,
}

/// A pattern compiled into a runnable program. Immutable once built, so a
/// `Regex` may be shared across threads for read-only matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Regex {
    program: Vec<Instruction>,
    options: Options,
    capture_slots: usize,
    prefix: Prefix,
}

impl Regex {
    /// Parses and compiles `pattern` with default options.
    pub fn compile(pattern: &str) -> Result<Regex, Error> {
        Regex::compile_with_options(pattern, Options::default())
    }

    /// Parses and compiles `pattern` under explicit matching options.
    pub fn compile_with_options(pattern: &str, options: Options) -> Result<Regex, Error> {
        let ast = parse(pattern).map_err(|e| Error::from_parse(e, pattern))?;
        let prefix = required_prefix(&ast);
        let capture_slots = ast.max_capture_index() + 1;
        let program = compile(&ast, options).map_err(|e| Error::from_compile(e, pattern))?;
        Ok(Regex { program, options, capture_slots, prefix })
    }

    /// Number of capturing groups, not counting the whole match.
    pub fn number_of_capture_groups(&self) -> usize {
        self.capture_slots - 1
    }

    /// Whether `input` contains a match starting at any position.
    pub fn is_match(&self, input: &str) -> bool {
        let chars: Vec<char> = input.chars().collect();
        self.candidate_starts(&chars, 0).any(|start| {
            matcher::match_at(&self.program, &self.options, &chars, start, self.capture_slots).is_some()
        })
    }

    /// Every non-overlapping match, left to right.
    pub fn matches(&self, input: &str) -> Vec<Match> {
        let chars: Vec<char> = input.chars().collect();
        let mut results = Vec::new();
        let mut pos = 0;
        while pos <= chars.len() {
            match self.find_from(&chars, pos) {
                Some(result) => {
                    pos = if result.end > result.start { result.end } else { result.end + 1 };
                    results.push(to_match(&chars, result));
                }
                None => break,
            }
        }
        results
    }

    fn find_from(&self, chars: &[char], from: usize) -> Option<MatchResult> {
        self.candidate_starts(chars, from)
            .find_map(|start| matcher::match_at(&self.program, &self.options, chars, start, self.capture_slots))
    }

    /// Start positions worth attempting: restricted to where the required
    /// literal prefix actually occurs, when one was proven at compile time
    /// and the pattern isn't case-insensitive (folding would invalidate the
    /// literal comparison); every position in order otherwise.
    fn candidate_starts<'a>(&'a self, chars: &'a [char], from: usize) -> Box<dyn Iterator<Item = usize> + 'a> {
        if self.prefix.is_empty() || self.options.case_insensitive {
            return Box::new(from..=chars.len());
        }
        let needle = &self.prefix.literal;
        if !contains_from(chars, needle, from) {
            return Box::new(std::iter::empty());
        }
        let last_start = chars.len().saturating_sub(needle.len());
        Box::new((from..=last_start).filter(move |&start| &chars[start..start + needle.len()] == needle.as_slice()))
    }
}

fn to_match(chars: &[char], result: MatchResult) -> Match {
    let full_match: String = chars[result.start..result.end].iter().collect();
    let groups = result
        .groups
        .into_iter()
        .skip(1)
        .map(|span| span.map(|(s, e)| chars[s..e].iter().collect()))
        .collect();
    Match { full_match, groups }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_match_respects_literal_prefix() {
        let re = Regex::compile("foobar").unwrap();
        assert!(re.is_match("xxfoobarxx"));
        assert!(!re.is_match("foobaz"));
    }

    #[test]
    fn test_matches_returns_captures() {
        let re = Regex::compile(r"(\w+)@(\w+)").unwrap();
        let found = re.matches("contact alice@example or bob@example");
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].full_match, "alice@example");
        assert_eq!(found[0].groups, vec![Some("alice".to_string()), Some("example".to_string())]);
        assert_eq!(found[1].full_match, "bob@example");
    }

    #[test]
    fn test_number_of_capture_groups() {
        let re = Regex::compile(r"(a)(b(c))").unwrap();
        assert_eq!(re.number_of_capture_groups(), 3);
        let none = Regex::compile("abc").unwrap();
        assert_eq!(none.number_of_capture_groups(), 0);
    }

    #[test]
    fn test_case_insensitive_option() {
        let options = Options { case_insensitive: true, ..Options::default() };
        let re = Regex::compile_with_options("HELLO", options).unwrap();
        assert!(re.is_match("say hello there"));
    }

    #[test]
    fn test_compile_error_reports_pattern_and_offset() {
        let err = Regex::compile("a{2,1}").unwrap_err();
        assert_eq!(err.pattern, "a{2,1}");
        assert_eq!(err.index, 1);
    }

    #[test]
    fn test_empty_match_sequence_does_not_loop_forever() {
        let re = Regex::compile("x*").unwrap();
        let found = re.matches("aa");
        assert_eq!(found.len(), 3);
        assert!(found.iter().all(|m| m.full_match.is_empty()));
    }
}
