/*! Pattern analysis and specialized matching strategies.

Many regular expressions found in practice follow a few idioms that can be
matched much faster than by running the DFA at every position in the input:

- Runs of digits (`\d+`, `[0-9]+`) and runs of non-whitespace bytes (`\S+`)
  can be located with the chunked scanners in [`scan`].

- Words delimited by word boundaries, like `\b[a-z]{4,}\b`, match entire
  words, so the input can be processed word by word.

- Patterns anchored to the start of the text, like `^abc`, can only match at
  offset 0.

- Patterns that contain a literal, like `[a-z]+@[a-z]+\.com` or
  `\d{4}-\d{2}-\d{2}`, can only match around the occurrences of the literal.
  The literal is located with `memchr::memmem`, and the DFA is executed only
  at the positions where a match containing the literal could start.

The [`analyze`] function inspects the HIR and selects the most appropriate
[`Strategy`]. Every strategy produces exactly the same matches as the
generic one, which runs the DFA at each position that can start a match.
*/

use memchr::memmem::Finder;
use memchr::{memchr, memchr2, memchr3};

use crate::re::atoms::literal_quality;
use crate::re::hir::{
    word_bytes, ByteSet, ClassBytes, Hir, Look, PerlClass, PerlClassKind,
};
use crate::re::thompson::Nfa;

pub(crate) mod scan;


/// Maximum distance between the start of a match and the literal used by
/// [`Strategy::PrefixScan`]. When the parts of the pattern that precede the
/// literal can be longer, the window is considered unbounded.
pub const MAX_WINDOW: usize = 64;

/// Strategy used for finding matches.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Strategy {
    /// Runs the DFA at every position that can start a match.
    Generic,
    /// The pattern matches runs of digits (`\d+` or `[0-9]+`).
    Digits,
    /// The pattern matches runs of non-whitespace bytes (`\S+` or
    /// `[^\s]+`).
    NonSpace,
    /// The pattern matches whole words composed only of bytes in `class`,
    /// with a length between `min` and `max` bytes, as in
    /// `\b[a-z]{4,}\b`.
    WordBoundary {
        /// Bytes allowed in the word. They are all word bytes.
        class: ByteSet,
        /// Minimum length of the word.
        min: usize,
        /// Maximum length of the word, `None` means unbounded.
        max: Option<usize>,
    },
    /// The pattern starts with `\A` (or `^` without multi-line mode), so it
    /// can match only at the start of the text.
    AnchoredStart,
    /// Every match contains `literal`. Matches start at most `before` bytes
    /// before an occurrence of the literal, and end at most `after` bytes
    /// after it. `None` means that the distance is unbounded, or larger than
    /// [`MAX_WINDOW`].
    PrefixScan {
        /// The literal contained in every match.
        literal: Vec<u8>,
        /// Maximum distance from the start of the match to the literal.
        before: Option<usize>,
        /// Maximum distance from the end of the literal to the end of the
        /// match.
        after: Option<usize>,
    },
}

/// Prefilter that locates the positions where a match can start, based on
/// the first byte of the match.
#[derive(Clone, Debug)]
pub(crate) enum Prefilter {
    Byte(u8),
    Byte2(u8, u8),
    Byte3(u8, u8, u8),
    Set(ByteSet),
}

impl Prefilter {
    /// Creates a prefilter that accepts the bytes in `set`. Returns `None`
    /// when all bytes are accepted.
    fn new(set: ByteSet) -> Option<Self> {
        let bytes = set.iter().collect::<Vec<_>>();
        match bytes.as_slice() {
            [a] => Some(Prefilter::Byte(*a)),
            [a, b] => Some(Prefilter::Byte2(*a, *b)),
            [a, b, c] => Some(Prefilter::Byte3(*a, *b, *c)),
            bytes if bytes.len() == 256 => None,
            _ => Some(Prefilter::Set(set)),
        }
    }

    /// Returns the position of the first byte at or after `from` that can
    /// start a match.
    #[inline]
    pub fn find(&self, text: &[u8], from: usize) -> Option<usize> {
        let haystack = text.get(from..)?;
        let pos = match self {
            Prefilter::Byte(a) => memchr(*a, haystack),
            Prefilter::Byte2(a, b) => memchr2(*a, *b, haystack),
            Prefilter::Byte3(a, b, c) => memchr3(*a, *b, *c, haystack),
            Prefilter::Set(set) => {
                haystack.iter().position(|b| set.contains(*b))
            }
        };
        pos.map(|pos| pos + from)
    }
}

/// The result of analyzing a regular expression.
#[derive(Clone, Debug)]
pub struct OptimizationInfo {
    strategy: Strategy,
    first_bytes: Option<ByteSet>,
    prefilter: Option<Prefilter>,
    finder: Option<Finder<'static>>,
}

impl OptimizationInfo {
    /// Information for the generic strategy, which doesn't depend on the
    /// shape of the pattern.
    pub(crate) fn generic(nfa: &Nfa) -> Self {
        let first_bytes = nfa.first_bytes();
        Self {
            strategy: Strategy::Generic,
            prefilter: first_bytes.and_then(Prefilter::new),
            first_bytes,
            finder: None,
        }
    }

    /// The strategy selected for the pattern.
    #[inline]
    pub fn strategy(&self) -> &Strategy {
        &self.strategy
    }

    /// Bytes that can appear at the start of a match. `None` if the pattern
    /// can match the empty string.
    #[inline]
    pub fn first_bytes(&self) -> Option<&ByteSet> {
        self.first_bytes.as_ref()
    }

    #[inline]
    pub(crate) fn prefilter(&self) -> Option<&Prefilter> {
        self.prefilter.as_ref()
    }

    /// Searcher for the literal in [`Strategy::PrefixScan`].
    #[inline]
    pub(crate) fn finder(&self) -> Option<&Finder<'static>> {
        self.finder.as_ref()
    }
}

/// Analyzes a regular expression and selects the strategy for matching it.
/// `nfa` must be the result of compiling `hir`.
pub(crate) fn analyze(hir: &Hir, nfa: &Nfa) -> OptimizationInfo {
    let mut info = OptimizationInfo::generic(nfa);

    let strategy = digits(hir)
        .or_else(|| non_space(hir))
        .or_else(|| word_boundary(hir))
        .or_else(|| anchored_start(hir))
        .or_else(|| prefix_scan(hir));

    if let Some(strategy) = strategy {
        if let Strategy::PrefixScan { literal, .. } = &strategy {
            info.finder = Some(Finder::new(literal).into_owned());
        }
        info.strategy = strategy;
    }

    info
}

/// If `hir` is `C+` with `C` being a single-byte class, returns `C`.
fn one_or_more(hir: &Hir) -> Option<ClassBytes> {
    match hir.unwrap_groups() {
        Hir::Repetition(rep) if rep.min == 1 && rep.max.is_none() => {
            rep.sub.single_byte_class()
        }
        _ => None,
    }
}

fn digits(hir: &Hir) -> Option<Strategy> {
    let digit = PerlClass { kind: PerlClassKind::Digit, negated: false };
    (one_or_more(hir)? == digit.to_class()).then_some(Strategy::Digits)
}

fn non_space(hir: &Hir) -> Option<Strategy> {
    let non_space = PerlClass { kind: PerlClassKind::Space, negated: true };
    (one_or_more(hir)? == non_space.to_class()).then_some(Strategy::NonSpace)
}

/// Detects `\b C{min,max} \b`, where `C` contains only word bytes.
fn word_boundary(hir: &Hir) -> Option<Strategy> {
    let Hir::Concat(items) = hir.unwrap_groups() else {
        return None;
    };

    let [first, middle, last] = items.as_slice() else {
        return None;
    };

    if first.unwrap_groups() != &Hir::Look(Look::WordBoundary)
        || last.unwrap_groups() != &Hir::Look(Look::WordBoundary)
    {
        return None;
    }

    let Hir::Repetition(rep) = middle.unwrap_groups() else {
        return None;
    };

    let class = rep.sub.single_byte_class()?.to_byte_set();

    if middle.minimum_len() == 0
        || class.is_empty()
        || !class.is_subset(&word_bytes())
    {
        return None;
    }

    Some(Strategy::WordBoundary {
        class,
        min: rep.min as usize,
        max: rep.max.map(|max| max as usize),
    })
}

fn anchored_start(hir: &Hir) -> Option<Strategy> {
    let first = match hir.unwrap_groups() {
        Hir::Concat(items) => items.first()?,
        hir => hir,
    };
    (first.unwrap_groups() == &Hir::Look(Look::StartText))
        .then_some(Strategy::AnchoredStart)
}

/// Looks for the best literal among the items of the top-level
/// concatenation.
fn prefix_scan(hir: &Hir) -> Option<Strategy> {
    let items = match hir.unwrap_groups() {
        Hir::Concat(items) => items.as_slice(),
        hir => std::slice::from_ref(hir),
    };

    // Maximum length of a sequence of items. `None` if unbounded or larger
    // than the window.
    let window = |items: &[Hir]| {
        items
            .iter()
            .try_fold(0_usize, |acc, item| {
                acc.checked_add(item.maximum_len()?)
            })
            .filter(|len| *len <= MAX_WINDOW)
    };

    let mut best: Option<(i32, usize, usize, Vec<u8>)> = None;
    let mut i = 0;

    while i < items.len() {
        let Some(mut literal) = items[i].as_literal_bytes() else {
            i += 1;
            continue;
        };

        let start = i;
        i += 1;

        while let Some(bytes) =
            items.get(i).and_then(|item| item.as_literal_bytes())
        {
            literal.extend(bytes);
            i += 1;
        }

        let quality = literal_quality(&literal);
        if best.as_ref().map_or(true, |(q, ..)| quality > *q) {
            best = Some((quality, start, i, literal));
        }
    }

    let (_, start, end, literal) = best?;

    Some(Strategy::PrefixScan {
        literal,
        before: window(&items[..start]),
        after: window(&items[end..]),
    })
}
