//! Character sets used by character classes (`[...]`), `\d \s \w` and their
//! negations, and the curated Unicode categories reachable through `\p{X}`.
//!
//! `CharSet` is the mutable builder the Parser fills in while it walks a
//! `[...]` group; once built it is frozen into the AST and never mutated
//! again (the Compiler only reads it).

/// Inclusive range over Unicode scalar values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharRange {
    pub start: char,
    pub end: char,
}

impl CharRange {
    pub fn new(start: char, end: char) -> Self {
        Self { start, end }
    }

    pub fn single(c: char) -> Self {
        Self { start: c, end: c }
    }

    pub fn contains(&self, c: char) -> bool {
        self.start <= c && c <= self.end
    }
}

/// One of the curated Unicode general-category groups this engine supports.
///
/// Full Unicode property coverage is out of scope; these tables cover the
/// common Basic Latin / Latin-1 / general punctuation blocks plus a
/// representative slice of the wider ranges, which is enough for everyday
/// text without claiming exhaustive UAX #44 coverage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// Punctuation (`P*`).
    P,
    /// Titlecase letter (`Lt`).
    Lt,
    /// Lowercase letter (`Ll`).
    Ll,
    /// Number (`N*`).
    N,
    /// Symbol (`S*`).
    S,
}

impl Category {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "P" => Some(Category::P),
            "Lt" => Some(Category::Lt),
            "Ll" => Some(Category::Ll),
            "N" => Some(Category::N),
            "S" => Some(Category::S),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Category::P => "P",
            Category::Lt => "Lt",
            Category::Ll => "Ll",
            Category::N => "N",
            Category::S => "S",
        }
    }

    fn ranges(&self) -> &'static [(char, char)] {
        match self {
            // ASCII/Latin-1 punctuation plus the General Punctuation block.
            Category::P => &[
                ('!', '#'),
                ('%', '*'),
                (',', '/'),
                (':', ';'),
                ('?', '@'),
                ('[', ']'),
                ('_', '_'),
                ('{', '{'),
                ('}', '}'),
                ('\u{00A1}', '\u{00A1}'),
                ('\u{00AB}', '\u{00AB}'),
                ('\u{00B7}', '\u{00B7}'),
                ('\u{00BB}', '\u{00BB}'),
                ('\u{2010}', '\u{2027}'),
                ('\u{2030}', '\u{205E}'),
            ],
            // Unicode defines very few titlecase letters: the digraphs
            // Dž/Lj/Nj/Dz plus a handful of archaic forms.
            Category::Lt => &[
                ('\u{01C5}', '\u{01C5}'),
                ('\u{01C8}', '\u{01C8}'),
                ('\u{01CB}', '\u{01CB}'),
                ('\u{01F2}', '\u{01F2}'),
            ],
            Category::Ll => &[('a', 'z'), ('\u{00DF}', '\u{00F6}'), ('\u{00F8}', '\u{00FF}')],
            Category::N => &[
                ('0', '9'),
                ('\u{00B2}', '\u{00B3}'),
                ('\u{00B9}', '\u{00B9}'),
                ('\u{00BC}', '\u{00BE}'),
                ('\u{2070}', '\u{2079}'),
                ('\u{2080}', '\u{2089}'),
            ],
            Category::S => &[
                ('$', '$'),
                ('+', '+'),
                ('<', '>'),
                ('^', '^'),
                ('`', '`'),
                ('|', '|'),
                ('~', '~'),
                ('\u{00A2}', '\u{00A6}'),
                ('\u{00A8}', '\u{00A9}'),
                ('\u{00AC}', '\u{00AC}'),
                ('\u{00AE}', '\u{00B1}'),
            ],
        }
    }

    fn contains(&self, c: char) -> bool {
        self.ranges().iter().any(|&(s, e)| s <= c && c <= e)
    }
}

/// One contribution to a `CharSet`: either a literal range or a named,
/// independently-negatable predefined class.
#[derive(Debug, Clone, PartialEq, Eq)]
enum SetAtom {
    Range(CharRange),
    Digit(bool),
    Whitespace(bool),
    Word(bool),
    Category(Category, bool),
}

impl SetAtom {
    fn matches(&self, c: char) -> bool {
        match self {
            SetAtom::Range(r) => r.contains(c),
            SetAtom::Digit(neg) => is_digit(c) != *neg,
            SetAtom::Whitespace(neg) => is_whitespace(c) != *neg,
            SetAtom::Word(neg) => is_word(c) != *neg,
            SetAtom::Category(cat, neg) => cat.contains(c) != *neg,
        }
    }
}

/// Returns whether `c` is an ASCII decimal digit (the `\d` class).
pub fn is_digit(c: char) -> bool {
    c.is_ascii_digit()
}

/// Returns whether `c` belongs to the `\s` class.
pub fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | '\u{0B}' | '\u{0C}')
}

/// Returns whether `c` belongs to the `\w` class.
pub fn is_word(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Returns the extra ranges needed to cover the opposite-case counterpart
/// of whatever part of `r` falls in `a-z`/`A-Z`. Bounded to at most 26
/// scalars of work regardless of how wide `r` itself is.
fn ascii_case_fold_range(r: CharRange) -> Vec<CharRange> {
    let mut extra = Vec::new();
    let lower_overlap = (r.start.max('a'), r.end.min('z'));
    if lower_overlap.0 <= lower_overlap.1 {
        for c in lower_overlap.0..=lower_overlap.1 {
            extra.push(CharRange::single(c.to_ascii_uppercase()));
        }
    }
    let upper_overlap = (r.start.max('A'), r.end.min('Z'));
    if upper_overlap.0 <= upper_overlap.1 {
        for c in upper_overlap.0..=upper_overlap.1 {
            extra.push(CharRange::single(c.to_ascii_lowercase()));
        }
    }
    extra
}

/// A set of Unicode scalars, built incrementally from ranges and named
/// classes and then queried with `contains`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CharSet {
    atoms: Vec<SetAtom>,
    negated: bool,
}

impl CharSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a single scalar to the set.
    pub fn insert(&mut self, c: char) {
        self.atoms.push(SetAtom::Range(CharRange::single(c)));
    }

    /// Adds an inclusive range to the set. Caller guarantees `start <= end`.
    pub fn insert_range(&mut self, start: char, end: char) {
        self.atoms.push(SetAtom::Range(CharRange::new(start, end)));
    }

    /// Folds `other`'s contributions into `self`. `other` must not itself be
    /// top-level negated (predefined-class constructors below never set the
    /// top-level flag; only `[^...]` negation does, via `invert`).
    pub fn union(&mut self, other: &CharSet) {
        debug_assert!(!other.negated, "cannot union a top-level-negated set");
        self.atoms.extend(other.atoms.iter().cloned());
    }

    /// Flips the top-level negation flag (`[^...]`).
    pub fn invert(&mut self) {
        self.negated = !self.negated;
    }

    pub fn is_negated(&self) -> bool {
        self.negated
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    pub fn contains(&self, c: char) -> bool {
        let any = self.atoms.iter().any(|a| a.matches(c));
        any != self.negated
    }

    pub fn digit() -> Self {
        Self { atoms: vec![SetAtom::Digit(false)], negated: false }
    }

    pub fn not_digit() -> Self {
        Self { atoms: vec![SetAtom::Digit(true)], negated: false }
    }

    pub fn whitespace() -> Self {
        Self { atoms: vec![SetAtom::Whitespace(false)], negated: false }
    }

    pub fn not_whitespace() -> Self {
        Self { atoms: vec![SetAtom::Whitespace(true)], negated: false }
    }

    pub fn word() -> Self {
        Self { atoms: vec![SetAtom::Word(false)], negated: false }
    }

    pub fn not_word() -> Self {
        Self { atoms: vec![SetAtom::Word(true)], negated: false }
    }

    pub fn category(cat: Category) -> Self {
        Self { atoms: vec![SetAtom::Category(cat, false)], negated: false }
    }

    pub fn not_category(cat: Category) -> Self {
        Self { atoms: vec![SetAtom::Category(cat, true)], negated: false }
    }

    /// The full scalar range, used for `.` when it should match everything
    /// including line terminators.
    pub fn any() -> Self {
        Self {
            atoms: vec![SetAtom::Range(CharRange::new('\u{0000}', '\u{10FFFF}'))],
            negated: false,
        }
    }

    /// `.` excluding `\n`, the default (non-`dotMatchesLineSeparators`) dot.
    pub fn any_except_newline() -> Self {
        let mut set = Self::new();
        set.insert_range('\u{0000}', '\u{0009}');
        set.insert_range('\u{000B}', '\u{10FFFF}');
        set
    }

    /// Returns a copy with an ASCII-letter case-folded counterpart added
    /// for every literal range, so that e.g. a compiled `[a-f]` also
    /// accepts `A`..`F`. Predefined classes (`\w`, categories, ...)
    /// already straddle case and are left untouched. Applied once at
    /// compile time for `caseInsensitive`, never per comparison.
    pub fn ascii_case_folded(&self) -> CharSet {
        let mut folded = self.clone();
        for atom in &self.atoms {
            if let SetAtom::Range(r) = atom {
                for extra in ascii_case_fold_range(*r) {
                    folded.atoms.push(SetAtom::Range(extra));
                }
            }
        }
        folded
    }

    /// If this set is exactly one literal scalar, returns it.
    pub fn as_single_char(&self) -> Option<char> {
        if self.negated || self.atoms.len() != 1 {
            return None;
        }
        match self.atoms[0] {
            SetAtom::Range(r) if r.start == r.end => Some(r.start),
            _ => None,
        }
    }
}
