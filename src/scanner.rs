//! A position-tracked cursor over a pattern's scalars, used by the Parser.
//!
//! Everything here works in Unicode scalars rather than bytes, so `pos()`
//! is a scalar offset and lines up with the offsets reported in `Error`.

#[derive(Debug, Clone)]
pub struct Scanner {
    input: Vec<char>,
    pos: usize,
    /// Logical end of the scannable region; shrinks when `read_from_end`
    /// strips a trailing sentinel.
    end: usize,
}

impl Scanner {
    pub fn new(pattern: &str) -> Self {
        let input: Vec<char> = pattern.chars().collect();
        let end = input.len();
        Self { input, pos: 0, end }
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Rewinds the cursor to a previously observed position, used by the
    /// parser to backtrack out of a tentative quantifier parse.
    pub fn set_pos(&mut self, pos: usize) {
        self.pos = pos;
    }

    pub fn is_at_end(&self) -> bool {
        self.pos >= self.end
    }

    /// Looks at the next scalar without consuming it.
    pub fn peek(&self) -> Option<char> {
        self.peek_at(0)
    }

    pub fn peek_at(&self, offset: usize) -> Option<char> {
        let idx = self.pos + offset;
        if idx < self.end {
            self.input.get(idx).copied()
        } else {
            None
        }
    }

    /// Consumes and returns the next scalar, or `None` at the end.
    pub fn read_one(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    /// Consumes `expected` if it is next, returning whether it matched.
    pub fn try_read(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Consumes `literal` in full if it matches at the current position,
    /// leaving the cursor untouched otherwise.
    pub fn try_read_str(&mut self, literal: &str) -> bool {
        let chars: Vec<char> = literal.chars().collect();
        for (i, c) in chars.iter().enumerate() {
            if self.peek_at(i) != Some(*c) {
                return false;
            }
        }
        self.pos += chars.len();
        true
    }

    /// Consumes a maximal run of scalars matching `pred`, returning the run
    /// and its `(start, end)` offsets.
    pub fn read_while<F: Fn(char) -> bool>(&mut self, pred: F) -> (String, (usize, usize)) {
        let start = self.pos;
        let mut out = String::new();
        while let Some(c) = self.peek() {
            if !pred(c) {
                break;
            }
            out.push(c);
            self.pos += 1;
        }
        (out, (start, self.pos))
    }

    /// Consumes scalars up to and including the first occurrence of
    /// `delim`, returning the text before it and its `(start, end)`
    /// offsets. Leaves the cursor untouched and returns `None` if `delim`
    /// does not appear before the logical end.
    pub fn read_until(&mut self, delim: char) -> Option<(String, (usize, usize))> {
        let start = self.pos;
        let mut idx = self.pos;
        while idx < self.end {
            if self.input[idx] == delim {
                let text: String = self.input[start..idx].iter().collect();
                self.pos = idx + 1;
                return Some((text, (start, idx)));
            }
            idx += 1;
        }
        None
    }

    /// Consumes a run of ASCII decimal digits and parses it, or returns
    /// `None` (without consuming anything) if the next scalar is not a
    /// digit.
    pub fn read_int(&mut self) -> Option<(u32, (usize, usize))> {
        if !matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            return None;
        }
        let (digits, span) = self.read_while(|c| c.is_ascii_digit());
        digits.parse::<u32>().ok().map(|n| (n, span))
    }

    /// If the logical end currently carries `sentinel` as its last
    /// scalar, strips it from the scannable region and returns `true`.
    pub fn read_from_end(&mut self, sentinel: char) -> bool {
        if self.end > self.pos && self.input[self.end - 1] == sentinel {
            self.end -= 1;
            true
        } else {
            false
        }
    }

    /// Length of the scannable region, irrespective of `pos`.
    pub fn len(&self) -> usize {
        self.end
    }
}
