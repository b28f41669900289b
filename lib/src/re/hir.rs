/*! High-level intermediate representation (HIR) for regular expressions.

The [`Hir`] is the tree produced by [`crate::re::parser::Parser`]. It is
consumed twice: by the Thompson compiler, which turns it into a NFA, and by
the optimizer in [`crate::re::fast`], which looks for idioms that can be
matched by a specialized scanner. Negated classes are already resolved into
their complement by the parser, but the shorthand classes (`\d`, `\w`, `\s`
and their negations) keep their own variant so that the optimizer can
recognize them.
*/

use std::fmt::{Debug, Formatter};

use bitvec::array::BitArray;
use bitvec::order::Lsb0;

/// High level intermediate representation (HIR) for a regular expression.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Hir {
    /// Matches the empty string.
    Empty,
    /// Matches a specific byte.
    Literal(u8),
    /// Matches any byte, including `\n`.
    AnyByte,
    /// Matches one of the shorthand classes `\d`, `\D`, `\w`, `\W`, `\s`
    /// and `\S`.
    Perl(PerlClass),
    /// Matches any byte in the class.
    Class(ClassBytes),
    /// Matches `sub` at least `min` times and at most `max` times. When
    /// `max` is `None` there's no upper bound. Star, plus and optional are
    /// repetitions with bounds `{0,}`, `{1,}` and `{0,1}` respectively.
    Repetition(Repetition),
    /// Matches the items one after the other.
    Concat(Vec<Hir>),
    /// Matches any of the alternatives. Alternatives are kept in the order
    /// they appear in the pattern.
    Alternation(Vec<Hir>),
    /// A parenthesized group.
    Group(Group),
    /// Zero-length assertion.
    Look(Look),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Repetition {
    pub min: u32,
    pub max: Option<u32>,
    pub sub: Box<Hir>,
}

/// A parenthesized group. `index` is `None` for non-capturing groups like
/// `(?:abc)`, and the capture index (starting at 1) otherwise.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Group {
    pub index: Option<u32>,
    pub name: Option<String>,
    pub sub: Box<Hir>,
}

/// Zero-length assertions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Look {
    /// Start of the text (`\A`, or `^` without multi-line mode).
    StartText,
    /// End of the text (`\Z`).
    EndText,
    /// End of the text, or right before a `\n` that is the last byte of
    /// the text (`$` without multi-line mode).
    EndTextOrFinalNewline,
    /// Start of a line (`^` in multi-line mode).
    StartLine,
    /// End of a line (`$` in multi-line mode).
    EndLine,
    /// Word boundary (`\b`).
    WordBoundary,
    /// Not a word boundary (`\B`).
    NotWordBoundary,
}

/// Shorthand classes. `negated` is true for `\D`, `\W` and `\S`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct PerlClass {
    pub kind: PerlClassKind,
    pub negated: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum PerlClassKind {
    Digit,
    Word,
    Space,
}

impl PerlClass {
    /// Returns the class as a set of byte ranges.
    pub fn to_class(self) -> ClassBytes {
        let ranges: &[(u8, u8)] = match self.kind {
            PerlClassKind::Digit => &[(b'0', b'9')],
            PerlClassKind::Word => {
                &[(b'0', b'9'), (b'A', b'Z'), (b'_', b'_'), (b'a', b'z')]
            }
            PerlClassKind::Space => &[(b'\t', b'\r'), (b' ', b' ')],
        };
        let mut class = ClassBytes::new(
            ranges.iter().map(|(start, end)| ByteRange::new(*start, *end)),
        );
        if self.negated {
            class.negate();
        }
        class
    }
}

/// A single range of bytes, both ends inclusive.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct ByteRange {
    pub start: u8,
    pub end: u8,
}

impl ByteRange {
    pub fn new(start: u8, end: u8) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self { start: end, end: start }
        }
    }
}

impl Debug for ByteRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.start == self.end {
            write!(f, "{:#04x}", self.start)
        } else {
            write!(f, "{:#04x}-{:#04x}", self.start, self.end)
        }
    }
}

/// A set of bytes expressed as sorted, non-overlapping and non-adjacent
/// ranges.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct ClassBytes {
    ranges: Vec<ByteRange>,
}

impl ClassBytes {
    pub fn new<I: IntoIterator<Item = ByteRange>>(ranges: I) -> Self {
        let mut class = Self { ranges: ranges.into_iter().collect() };
        class.canonicalize();
        class
    }

    /// A class that contains every byte except `\n`. This is what `.`
    /// matches by default.
    pub fn any_except_newline() -> Self {
        Self::new([ByteRange::new(0x00, 0x09), ByteRange::new(0x0B, 0xFF)])
    }

    #[inline]
    pub fn ranges(&self) -> &[ByteRange] {
        self.ranges.as_slice()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn push(&mut self, range: ByteRange) {
        self.ranges.push(range);
        self.canonicalize();
    }

    pub fn union(&mut self, other: &ClassBytes) {
        self.ranges.extend_from_slice(other.ranges());
        self.canonicalize();
    }

    /// Replaces the class with its complement.
    pub fn negate(&mut self) {
        let mut negated = Vec::with_capacity(self.ranges.len() + 1);
        let mut next: u16 = 0;
        for range in &self.ranges {
            if (range.start as u16) > next {
                negated.push(ByteRange::new(next as u8, range.start - 1));
            }
            next = range.end as u16 + 1;
        }
        if next <= 0xFF {
            negated.push(ByteRange::new(next as u8, 0xFF));
        }
        self.ranges = negated;
    }

    /// Adds the other case of every ASCII letter in the class.
    pub fn case_fold(&mut self) {
        let mut folded = Vec::new();
        for range in &self.ranges {
            for (lo, hi, delta) in
                [(b'a', b'z', -32_i16), (b'A', b'Z', 32_i16)]
            {
                let start = range.start.max(lo);
                let end = range.end.min(hi);
                if start <= end {
                    folded.push(ByteRange::new(
                        (start as i16 + delta) as u8,
                        (end as i16 + delta) as u8,
                    ));
                }
            }
        }
        self.ranges.append(&mut folded);
        self.canonicalize();
    }

    /// Returns the class as a 256-bit set.
    pub fn to_byte_set(&self) -> ByteSet {
        let mut set = ByteSet::empty();
        for range in &self.ranges {
            for b in range.start..=range.end {
                set.insert(b);
            }
        }
        set
    }

    fn canonicalize(&mut self) {
        self.ranges.sort();
        let mut merged: Vec<ByteRange> = Vec::with_capacity(self.ranges.len());
        for range in self.ranges.drain(..) {
            match merged.last_mut() {
                Some(last) if range.start as u16 <= last.end as u16 + 1 => {
                    last.end = last.end.max(range.end);
                }
                _ => merged.push(range),
            }
        }
        self.ranges = merged;
    }
}

/// A set of bytes represented as a 256-bits bitmap.
#[derive(Clone, Copy, Default, PartialEq, Eq)]
pub struct ByteSet(BitArray<[u64; 4], Lsb0>);

impl ByteSet {
    /// Creates an empty set.
    pub fn empty() -> Self {
        Self(BitArray::ZERO)
    }

    /// Adds a byte to the set.
    #[inline]
    pub fn insert(&mut self, byte: u8) {
        self.0.set(byte as usize, true);
    }

    /// Returns true if the set contains the byte.
    #[inline]
    pub fn contains(&self, byte: u8) -> bool {
        self.0[byte as usize]
    }

    /// Number of bytes in the set.
    pub fn len(&self) -> usize {
        self.0.count_ones()
    }

    /// Returns true if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.0.not_any()
    }

    /// Returns true if every byte in `self` is also in `other`.
    pub fn is_subset(&self, other: &ByteSet) -> bool {
        self.iter().all(|b| other.contains(b))
    }

    /// Iterator over the bytes in the set, in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        self.0.iter_ones().map(|b| b as u8)
    }
}

impl Debug for ByteSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.iter().map(|b| b as char)).finish()
    }
}

/// Returns true if `byte` belongs to the `\w` class.
#[inline(always)]
pub(crate) fn is_word_byte(byte: u8) -> bool {
    byte == b'_' || byte.is_ascii_alphanumeric()
}

/// Returns the bytes in the `\w` class.
pub(crate) fn word_bytes() -> ByteSet {
    PerlClass { kind: PerlClassKind::Word, negated: false }
        .to_class()
        .to_byte_set()
}

impl Hir {
    pub fn repetition(sub: Hir, min: u32, max: Option<u32>) -> Hir {
        Hir::Repetition(Repetition { min, max, sub: Box::new(sub) })
    }

    /// Returns the concatenation of the given expressions. Empty
    /// concatenations become [`Hir::Empty`] and single-item ones are
    /// replaced by the item itself.
    pub fn concat(mut subs: Vec<Hir>) -> Hir {
        match subs.len() {
            0 => Hir::Empty,
            1 => subs.pop().unwrap_or(Hir::Empty),
            _ => Hir::Concat(subs),
        }
    }

    /// Returns the alternation of the given expressions. Single-item
    /// alternations are replaced by the item itself.
    pub fn alternation(mut subs: Vec<Hir>) -> Hir {
        match subs.len() {
            0 => Hir::Empty,
            1 => subs.pop().unwrap_or(Hir::Empty),
            _ => Hir::Alternation(subs),
        }
    }

    /// Strips any group wrapping the expression.
    pub fn unwrap_groups(&self) -> &Hir {
        let mut hir = self;
        while let Hir::Group(group) = hir {
            hir = group.sub.as_ref();
        }
        hir
    }

    /// If the expression matches exactly one byte out of a set, returns
    /// that set.
    pub fn single_byte_class(&self) -> Option<ClassBytes> {
        match self.unwrap_groups() {
            Hir::Literal(b) => Some(ClassBytes::new([ByteRange::new(*b, *b)])),
            Hir::AnyByte => Some(ClassBytes::new([ByteRange::new(0, 0xFF)])),
            Hir::Perl(perl) => Some(perl.to_class()),
            Hir::Class(class) => Some(class.clone()),
            _ => None,
        }
    }

    /// Returns the length (in bytes) of the longest string matched by this
    /// HIR, or `None` if it's unbounded.
    pub fn maximum_len(&self) -> Option<usize> {
        match self {
            Hir::Empty | Hir::Look(_) => Some(0),
            Hir::Literal(_) | Hir::AnyByte | Hir::Perl(_) | Hir::Class(_) => {
                Some(1)
            }
            Hir::Repetition(rep) => {
                let max = rep.max?;
                rep.sub.maximum_len()?.checked_mul(max as usize)
            }
            Hir::Concat(items) => items
                .iter()
                .try_fold(0_usize, |acc, h| acc.checked_add(h.maximum_len()?)),
            Hir::Alternation(alts) => alts
                .iter()
                .try_fold(0_usize, |acc, h| Some(acc.max(h.maximum_len()?))),
            Hir::Group(group) => group.sub.maximum_len(),
        }
    }

    /// Returns the length (in bytes) of the shortest string matched by
    /// this HIR. A return value of `0` means that the HIR can match an
    /// empty string.
    pub fn minimum_len(&self) -> usize {
        match self {
            Hir::Empty | Hir::Look(_) => 0,
            Hir::Literal(_) | Hir::AnyByte | Hir::Perl(_) | Hir::Class(_) => 1,
            Hir::Repetition(rep) => {
                rep.sub.minimum_len().saturating_mul(rep.min as usize)
            }
            Hir::Concat(items) => items
                .iter()
                .fold(0_usize, |acc, h| acc.saturating_add(h.minimum_len())),
            Hir::Alternation(alts) => {
                alts.iter().map(|h| h.minimum_len()).min().unwrap_or(0)
            }
            Hir::Group(group) => group.sub.minimum_len(),
        }
    }

    /// If the HIR represents a literal sequence of bytes, returns the
    /// bytes.
    pub fn as_literal_bytes(&self) -> Option<Vec<u8>> {
        match self.unwrap_groups() {
            Hir::Literal(b) => Some(vec![*b]),
            Hir::Concat(items) => items
                .iter()
                .map(|item| match item.unwrap_groups() {
                    Hir::Literal(b) => Some(*b),
                    _ => None,
                })
                .collect(),
            _ => None,
        }
    }
}
