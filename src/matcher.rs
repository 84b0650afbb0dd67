//! Runs a compiled program against an input against a fixed or scanning
//! starting position.
//!
//! The execution strategy mirrors the source's evaluator: an explicit stack
//! of `State`s standing in for NFA threads, `Split` pushing the
//! lower-priority branch for later and falling through to the higher-priority
//! one, and a per-thread `visited` set keyed on `(pc, position)` to cut off
//! threads that would otherwise loop forever on zero-width repeats.
//!
//! That dedup key is sound only when two threads reaching the same `(pc,
//! position)` are guaranteed to behave identically from there on, which is
//! true for every instruction except `Backref` — its outcome depends on
//! capture contents, not just position. So backreference dedup additionally
//! folds in the capture slots, and a pattern containing no `Backref` at all
//! skips that cost.

use std::collections::HashSet;

use crate::ast::AnchorKind;
use crate::charset::is_word;
use crate::instruction::Instruction;
use crate::options::Options;

/// One successful match: the scalar-index span it covers, plus the span of
/// each capture group (`None` for a group the match never entered).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    pub start: usize,
    pub end: usize,
    pub groups: Vec<Option<(usize, usize)>>,
}

#[derive(Debug, Clone)]
struct State {
    pc: usize,
    pos: usize,
    capture_start: Vec<Option<usize>>,
    capture_end: Vec<Option<usize>>,
}

impl State {
    fn new(start: usize, capture_slots: usize) -> Self {
        Self { pc: 0, pos: start, capture_start: vec![None; capture_slots], capture_end: vec![None; capture_slots] }
    }
}

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
struct StateKey {
    pc: usize,
    pos: usize,
    captures: Option<(Vec<Option<usize>>, Vec<Option<usize>>)>,
}

impl StateKey {
    fn from_state(state: &State, track_captures: bool) -> Self {
        let captures =
            track_captures.then(|| (state.capture_start.clone(), state.capture_end.clone()));
        Self { pc: state.pc, pos: state.pos, captures }
    }
}

fn is_word_boundary(input: &[char], pos: usize) -> bool {
    let prev = if pos == 0 { None } else { input.get(pos - 1).copied() };
    let curr = input.get(pos).copied();
    prev.map(is_word).unwrap_or(false) != curr.map(is_word).unwrap_or(false)
}

fn eval_assert(kind: AnchorKind, options: &Options, input: &[char], pos: usize) -> bool {
    match kind {
        AnchorKind::Start => pos == 0 || (options.multiline && input.get(pos - 1) == Some(&'\n')),
        AnchorKind::End => pos == input.len() || (options.multiline && input.get(pos) == Some(&'\n')),
        AnchorKind::WordBoundary => is_word_boundary(input, pos),
        AnchorKind::NonWordBoundary => !is_word_boundary(input, pos),
    }
}

fn eval_backref(group: usize, options: &Options, state: &mut State, input: &[char]) -> bool {
    let (Some(start), Some(end)) =
        (state.capture_start.get(group).copied().flatten(), state.capture_end.get(group).copied().flatten())
    else {
        return false;
    };
    if end < start || end > input.len() || state.pos > input.len() {
        return false;
    }
    let len = end - start;
    if input.len() - state.pos < len {
        return false;
    }
    let matched = if options.case_insensitive {
        (0..len).all(|i| input[start + i].to_ascii_lowercase() == input[state.pos + i].to_ascii_lowercase())
    } else {
        input[start..end] == input[state.pos..state.pos + len]
    };
    if matched {
        state.pos += len;
        state.pc += 1;
    }
    matched
}

/// Runs `program` starting at input position `start`, returning the first
/// (highest-priority) successful thread.
fn run_from(
    program: &[Instruction],
    input: &[char],
    options: &Options,
    start: usize,
    capture_slots: usize,
    has_backref: bool,
) -> Option<State> {
    let mut stack = vec![State::new(start, capture_slots)];
    let mut visited = HashSet::new();

    while let Some(mut state) = stack.pop() {
        loop {
            let key = StateKey::from_state(&state, has_backref);
            if !visited.insert(key) {
                break;
            }

            let Some(instruction) = program.get(state.pc) else { break };

            match instruction {
                Instruction::Consume(set) => match input.get(state.pos) {
                    Some(&c) if set.contains(c) => {
                        state.pc += 1;
                        state.pos += 1;
                    }
                    _ => break,
                },
                Instruction::Assert(kind) => {
                    if !eval_assert(*kind, options, input, state.pos) {
                        break;
                    }
                    state.pc += 1;
                }
                Instruction::SaveStart(index) => {
                    match state.capture_start.get_mut(*index) {
                        Some(slot) => *slot = Some(state.pos),
                        None => break,
                    }
                    state.pc += 1;
                }
                Instruction::SaveEnd(index) => {
                    match state.capture_end.get_mut(*index) {
                        Some(slot) => *slot = Some(state.pos),
                        None => break,
                    }
                    state.pc += 1;
                }
                Instruction::Backref(index) => {
                    if !eval_backref(*index, options, &mut state, input) {
                        break;
                    }
                }
                Instruction::Split(left, right) => {
                    let mut right_state = state.clone();
                    right_state.pc = *right;
                    stack.push(right_state);
                    state.pc = *left;
                }
                Instruction::Jump(addr) => state.pc = *addr,
                Instruction::Match => return Some(state),
            }
        }
    }

    None
}

/// Attempts an anchored match at `start`, returning the span it consumed and
/// every capture group's span.
pub fn match_at(
    program: &[Instruction],
    options: &Options,
    input: &[char],
    start: usize,
    capture_slots: usize,
) -> Option<MatchResult> {
    let has_backref = program.iter().any(|i| matches!(i, Instruction::Backref(_)));
    let end_state = run_from(program, input, options, start, capture_slots, has_backref)?;
    let groups = end_state
        .capture_start
        .iter()
        .zip(end_state.capture_end.iter())
        .map(|(s, e)| s.zip(*e))
        .collect();
    Some(MatchResult { start, end: end_state.pos, groups })
}

/// Returns whether `program` matches `input` starting at any position.
pub fn is_match(program: &[Instruction], options: &Options, input: &[char], capture_slots: usize) -> bool {
    let has_backref = program.iter().any(|i| matches!(i, Instruction::Backref(_)));
    (0..=input.len()).any(|start| run_from(program, input, options, start, capture_slots, has_backref).is_some())
}

/// Returns the leftmost match at or after `from`, scanning forward one
/// position at a time.
pub fn find_from(
    program: &[Instruction],
    options: &Options,
    input: &[char],
    from: usize,
    capture_slots: usize,
) -> Option<MatchResult> {
    for start in from..=input.len() {
        if let Some(result) = match_at(program, options, input, start, capture_slots) {
            return Some(result);
        }
    }
    None
}

/// Returns every non-overlapping match left to right. An empty match
/// advances the next search position by one scalar to guarantee progress.
pub fn find_all(
    program: &[Instruction],
    options: &Options,
    input: &[char],
    capture_slots: usize,
) -> Vec<MatchResult> {
    let mut results = Vec::new();
    let mut pos = 0;
    while pos <= input.len() {
        match find_from(program, options, input, pos, capture_slots) {
            Some(result) => {
                pos = if result.end > result.start { result.end } else { result.end + 1 };
                results.push(result);
            }
            None => break,
        }
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::compile;
    use crate::parser::parse;

    fn compile_pattern(pattern: &str) -> (Vec<Instruction>, usize) {
        let ast = parse(pattern).unwrap();
        let capture_slots = ast.max_capture_index() + 1;
        let program = compile(&ast, Options::default()).unwrap();
        (program, capture_slots)
    }

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn test_is_match_basic() {
        let (program, slots) = compile_pattern("abc");
        assert!(is_match(&program, &Options::default(), &chars("xxabcxx"), slots));
        assert!(!is_match(&program, &Options::default(), &chars("xyz"), slots));
    }

    #[test]
    fn test_backreference_match_and_mismatch() {
        let (program, slots) = compile_pattern("(abc)\\1");
        assert!(is_match(&program, &Options::default(), &chars("abcabc"), slots));
        assert!(!is_match(&program, &Options::default(), &chars("abcabd"), slots));
    }

    #[test]
    fn test_unresolved_backreference_fails() {
        let (program, slots) = compile_pattern("(a)?\\1");
        assert!(!is_match(&program, &Options::default(), &chars("a"), slots));
        assert!(!is_match(&program, &Options::default(), &chars(""), slots));
        assert!(is_match(&program, &Options::default(), &chars("aa"), slots));
    }

    #[test]
    fn test_anchors_respect_multiline_option() {
        let (program, slots) = compile_pattern("^b");
        let input = chars("a\nb");
        assert!(!is_match(&program, &Options::default(), &input, slots));
        let multiline = Options { multiline: true, ..Options::default() };
        assert!(is_match(&program, &multiline, &input, slots));
    }

    #[test]
    fn test_word_boundary() {
        let (program, slots) = compile_pattern(r"\bcat\b");
        assert!(is_match(&program, &Options::default(), &chars("a cat sat"), slots));
        assert!(!is_match(&program, &Options::default(), &chars("category"), slots));
    }

    #[test]
    fn test_find_from_reports_span_and_groups() {
        let (program, slots) = compile_pattern(r"(\d+)-(\d+)");
        let input = chars("order 12-34 today");
        let m = find_from(&program, &Options::default(), &input, 0, slots).unwrap();
        assert_eq!((m.start, m.end), (6, 11));
        assert_eq!(m.groups[1], Some((6, 8)));
        assert_eq!(m.groups[2], Some((9, 11)));
    }

    #[test]
    fn test_find_all_non_overlapping() {
        let (program, slots) = compile_pattern(r"\d+");
        let input = chars("a1 b22 c333");
        let results = find_all(&program, &Options::default(), &input, slots);
        let spans: Vec<_> = results.iter().map(|m| (m.start, m.end)).collect();
        assert_eq!(spans, vec![(1, 2), (4, 6), (8, 11)]);
    }

    #[test]
    fn test_find_all_empty_matches_advance() {
        let (program, slots) = compile_pattern(r"a*");
        let input = chars("baab");
        let results = find_all(&program, &Options::default(), &input, slots);
        let spans: Vec<_> = results.iter().map(|m| (m.start, m.end)).collect();
        assert_eq!(spans, vec![(0, 0), (1, 3), (3, 3), (4, 4)]);
    }
}
