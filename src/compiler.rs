//! Lowers a validated [`Ast`] into a flat [`Instruction`] program.
//!
//! Following the source's split between parse-time and compile-time
//! checks: the Parser accepts `{2,1}` syntactically, and it is this module
//! that rejects it (`CompileError::RangeOutOfOrder`), together with
//! out-of-range backreferences.

use crate::ast::{Ast, QuantifierKind};
use crate::charset::CharSet;
use crate::error::CompileError;
use crate::instruction::Instruction;
use crate::options::Options;

#[derive(Default, Debug)]
struct Compiler {
    p_counter: usize,
    instructions: Vec<Instruction>,
    options: Options,
}

impl Compiler {
    fn increment_p_counter(&mut self) -> Result<(), CompileError> {
        self.p_counter = self.p_counter.checked_add(1).ok_or(CompileError::ProgramOverflow)?;
        Ok(())
    }

    fn next_address(&self) -> Result<usize, CompileError> {
        self.p_counter.checked_add(1).ok_or(CompileError::ProgramOverflow)
    }

    fn push_instruction(&mut self, instruction: Instruction) -> Result<usize, CompileError> {
        let index = self.p_counter;
        self.increment_p_counter()?;
        self.instructions.push(instruction);
        Ok(index)
    }

    fn patch_split_right(&mut self, split_index: usize, target: usize) -> Result<(), CompileError> {
        match self.instructions.get_mut(split_index) {
            Some(Instruction::Split(_, right)) => {
                *right = target;
                Ok(())
            }
            _ => Err(CompileError::ProgramOverflow),
        }
    }

    fn patch_split_left(&mut self, split_index: usize, target: usize) -> Result<(), CompileError> {
        match self.instructions.get_mut(split_index) {
            Some(Instruction::Split(left, _)) => {
                *left = target;
                Ok(())
            }
            _ => Err(CompileError::ProgramOverflow),
        }
    }

    fn patch_jump(&mut self, jump_index: usize, target: usize) -> Result<(), CompileError> {
        match self.instructions.get_mut(jump_index) {
            Some(Instruction::Jump(addr)) => {
                *addr = target;
                Ok(())
            }
            _ => Err(CompileError::ProgramOverflow),
        }
    }

    fn compiled_set(&self, set: &CharSet) -> CharSet {
        if self.options.case_insensitive {
            set.ascii_case_folded()
        } else {
            set.clone()
        }
    }

    fn gen_expr(&mut self, ast: &Ast) -> Result<(), CompileError> {
        match ast {
            Ast::Empty => Ok(()),
            Ast::CharSet(set) => {
                let set = self.compiled_set(set);
                self.push_instruction(Instruction::Consume(set))?;
                Ok(())
            }
            Ast::Dot => {
                let set = if self.options.dot_matches_line_separators {
                    CharSet::any()
                } else {
                    CharSet::any_except_newline()
                };
                self.push_instruction(Instruction::Consume(set))?;
                Ok(())
            }
            Ast::Anchor(kind) => {
                self.push_instruction(Instruction::Assert(*kind))?;
                Ok(())
            }
            Ast::Backreference { group, .. } => {
                self.push_instruction(Instruction::Backref(*group))?;
                Ok(())
            }
            Ast::Group { index, child } => match index {
                Some(idx) => self.gen_capture(child, *idx),
                None => self.gen_expr(child),
            },
            Ast::Alternation(branches) => self.gen_alternation(branches),
            Ast::Concat(parts) => {
                for part in parts {
                    self.gen_expr(part)?;
                }
                Ok(())
            }
            Ast::Quantified { child, quantifier } => {
                let greedy = !quantifier.lazy;
                match quantifier.kind {
                    QuantifierKind::ZeroOrMore => self.gen_zero_or_more(child, greedy),
                    QuantifierKind::OneOrMore => self.gen_one_or_more(child, greedy),
                    QuantifierKind::ZeroOrOne => self.gen_zero_or_one(child, greedy),
                    QuantifierKind::Range { lower, upper } => {
                        if let Some(upper) = upper {
                            if upper < lower {
                                return Err(CompileError::RangeOutOfOrder { at: quantifier.at });
                            }
                        }
                        self.gen_repeat(child, greedy, lower, upper)
                    }
                }
            }
        }
    }

    fn gen_capture(&mut self, expr: &Ast, index: usize) -> Result<(), CompileError> {
        self.push_instruction(Instruction::SaveStart(index))?;
        self.gen_expr(expr)?;
        self.push_instruction(Instruction::SaveEnd(index))?;
        Ok(())
    }

    fn gen_zero_or_more(&mut self, expr: &Ast, greedy: bool) -> Result<(), CompileError> {
        let expr_entry = self.next_address()?;
        let split = if greedy { Instruction::Split(expr_entry, 0) } else { Instruction::Split(0, expr_entry) };
        let split_index = self.push_instruction(split)?;
        self.gen_expr(expr)?;
        self.push_instruction(Instruction::Jump(split_index))?;

        let out = self.p_counter;
        if greedy { self.patch_split_right(split_index, out) } else { self.patch_split_left(split_index, out) }
    }

    fn gen_one_or_more(&mut self, expr: &Ast, greedy: bool) -> Result<(), CompileError> {
        let loop_entry = self.p_counter;
        self.gen_expr(expr)?;

        let out = self.next_address()?;
        if greedy {
            self.push_instruction(Instruction::Split(loop_entry, out))?;
        } else {
            self.push_instruction(Instruction::Split(out, loop_entry))?;
        }
        Ok(())
    }

    fn gen_zero_or_one(&mut self, expr: &Ast, greedy: bool) -> Result<(), CompileError> {
        let expr_entry = self.next_address()?;
        let split = if greedy { Instruction::Split(expr_entry, 0) } else { Instruction::Split(0, expr_entry) };
        let split_index = self.push_instruction(split)?;
        self.gen_expr(expr)?;

        let out = self.p_counter;
        if greedy { self.patch_split_right(split_index, out) } else { self.patch_split_left(split_index, out) }
    }

    fn gen_repeat(
        &mut self,
        expr: &Ast,
        greedy: bool,
        min: u32,
        max: Option<u32>,
    ) -> Result<(), CompileError> {
        for _ in 0..min {
            self.gen_expr(expr)?;
        }
        match max {
            Some(max_count) => {
                if max_count <= min {
                    return Ok(());
                }
                for _ in min..max_count {
                    self.gen_zero_or_one(expr, greedy)?;
                }
                Ok(())
            }
            None => self.gen_zero_or_more(expr, greedy),
        }
    }

    fn gen_alternation(&mut self, branches: &[Ast]) -> Result<(), CompileError> {
        match branches {
            [] => Ok(()),
            [only] => self.gen_expr(only),
            [first, rest @ ..] => {
                let left_entry = self.next_address()?;
                let split_index = self.push_instruction(Instruction::Split(left_entry, 0))?;

                self.gen_expr(first)?;
                let jump_index = self.push_instruction(Instruction::Jump(0))?;

                let right_entry = self.p_counter;
                self.patch_split_right(split_index, right_entry)?;
                self.gen_alternation(rest)?;

                let out = self.p_counter;
                self.patch_jump(jump_index, out)
            }
        }
    }

    fn finish(mut self) -> Result<Vec<Instruction>, CompileError> {
        self.push_instruction(Instruction::Match)?;
        Ok(self.instructions)
    }
}

/// Walks `ast` in the same left-to-right order the Parser builds it in,
/// rejecting any `\N` whose group `N` has not been fully closed by the time
/// the backreference is reached -- that covers both a plain forward
/// reference (`\1(a)`, group 1 not opened yet) and a self-reference to an
/// enclosing group that is still open (`(\1)`, `(a)(\2)`), neither of which
/// a bare "group index exists somewhere in the pattern" check catches.
fn validate_backreferences(
    ast: &Ast,
    open: &mut Vec<usize>,
    closed: &mut std::collections::HashSet<usize>,
) -> Result<(), CompileError> {
    match ast {
        Ast::Backreference { group, at } => {
            if *group == 0 || open.contains(group) || !closed.contains(group) {
                Err(CompileError::InvalidBackreference { group: *group, at: *at })
            } else {
                Ok(())
            }
        }
        Ast::Group { index: Some(k), child } => {
            open.push(*k);
            validate_backreferences(child, open, closed)?;
            open.pop();
            closed.insert(*k);
            Ok(())
        }
        Ast::Group { index: None, child } => validate_backreferences(child, open, closed),
        Ast::Quantified { child, .. } => validate_backreferences(child, open, closed),
        Ast::Concat(parts) => {
            for part in parts {
                validate_backreferences(part, open, closed)?;
            }
            Ok(())
        }
        Ast::Alternation(branches) => {
            for branch in branches {
                validate_backreferences(branch, open, closed)?;
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

/// Compiles `ast` into an executable program under `options`.
pub fn compile(ast: &Ast, options: Options) -> Result<Vec<Instruction>, CompileError> {
    validate_backreferences(ast, &mut Vec::new(), &mut std::collections::HashSet::new())?;

    let mut compiler = Compiler { options, ..Compiler::default() };
    compiler.gen_expr(ast)?;
    compiler.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn literal(c: char) -> Instruction {
        let mut set = CharSet::new();
        set.insert(c);
        Instruction::Consume(set)
    }

    #[test]
    fn test_compile_literal_sequence() {
        let ast = parse("abc").unwrap();
        let program = compile(&ast, Options::default()).unwrap();
        assert_eq!(program, vec![literal('a'), literal('b'), literal('c'), Instruction::Match]);
    }

    #[test]
    fn test_compile_alternation_nary() {
        let ast = parse("a|b|c").unwrap();
        let program = compile(&ast, Options::default()).unwrap();
        assert_eq!(
            program,
            vec![
                Instruction::Split(1, 3),
                literal('a'),
                Instruction::Jump(7),
                Instruction::Split(4, 6),
                literal('b'),
                Instruction::Jump(7),
                literal('c'),
                Instruction::Match,
            ]
        );
    }

    #[test]
    fn test_compile_star() {
        let ast = parse("a*").unwrap();
        let program = compile(&ast, Options::default()).unwrap();
        assert_eq!(
            program,
            vec![Instruction::Split(1, 3), literal('a'), Instruction::Jump(0), Instruction::Match]
        );
    }

    #[test]
    fn test_compile_lazy_star() {
        let ast = parse("a*?").unwrap();
        let program = compile(&ast, Options::default()).unwrap();
        assert_eq!(
            program,
            vec![Instruction::Split(3, 1), literal('a'), Instruction::Jump(0), Instruction::Match]
        );
    }

    #[test]
    fn test_compile_repeat_range() {
        let ast = parse("a{2,3}").unwrap();
        let program = compile(&ast, Options::default()).unwrap();
        assert_eq!(
            program,
            vec![literal('a'), literal('a'), Instruction::Split(3, 4), literal('a'), Instruction::Match]
        );
    }

    #[test]
    fn test_compile_range_out_of_order_rejected() {
        let ast = parse("a{2,1}").unwrap();
        let err = compile(&ast, Options::default()).unwrap_err();
        assert!(matches!(err, CompileError::RangeOutOfOrder { .. }));
    }

    #[test]
    fn test_compile_invalid_backreference() {
        let ast = parse("(a)\\2").unwrap();
        let err = compile(&ast, Options::default()).unwrap_err();
        assert_eq!(err, CompileError::InvalidBackreference { group: 2, at: 4 });
    }

    #[test]
    fn test_compile_rejects_self_reference_to_own_open_group() {
        let ast = parse("(\\1)").unwrap();
        let err = compile(&ast, Options::default()).unwrap_err();
        assert!(matches!(err, CompileError::InvalidBackreference { group: 1, .. }));
    }

    #[test]
    fn test_compile_rejects_forward_reference_to_sibling_group() {
        // group 2's own backreference, still inside group 2 -- not yet closed.
        let ast = parse("(a)(\\2)").unwrap();
        let err = compile(&ast, Options::default()).unwrap_err();
        assert!(matches!(err, CompileError::InvalidBackreference { group: 2, .. }));
    }

    #[test]
    fn test_compile_rejects_backreference_before_its_group_opens() {
        let ast = parse("\\1(a)").unwrap();
        let err = compile(&ast, Options::default()).unwrap_err();
        assert!(matches!(err, CompileError::InvalidBackreference { group: 1, .. }));
    }

    #[test]
    fn test_compile_accepts_backreference_to_already_closed_group() {
        let ast = parse("(a)(b)\\1").unwrap();
        assert!(compile(&ast, Options::default()).is_ok());
    }

    #[test]
    fn test_compile_case_insensitive_literal() {
        let ast = parse("[a-f]").unwrap();
        let options = Options { case_insensitive: true, ..Options::default() };
        let program = compile(&ast, options).unwrap();
        match &program[0] {
            Instruction::Consume(set) => {
                assert!(set.contains('c'));
                assert!(set.contains('C'));
            }
            _ => panic!("expected Consume"),
        }
    }

    #[test]
    fn test_compile_non_capturing_group_emits_no_saves() {
        let ast = parse("(?:ab)").unwrap();
        let program = compile(&ast, Options::default()).unwrap();
        assert_eq!(program, vec![literal('a'), literal('b'), Instruction::Match]);
    }
}
