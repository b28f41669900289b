use std::ops::Range;
use std::sync::Arc;

use crate::re::dfa::{DfaStats, LazyDfa};
use crate::re::fast::{scan, Strategy};
use crate::regex::Program;

/// Represents a match of a regular expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Match {
    start: usize,
    end: usize,
}

impl Match {
    #[inline]
    pub(crate) fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end);
        Self { start, end }
    }

    /// Offset where the match starts.
    #[inline]
    pub fn start(&self) -> usize {
        self.start
    }

    /// Offset where the match ends (exclusive).
    #[inline]
    pub fn end(&self) -> usize {
        self.end
    }

    /// Range within the text where the match was found.
    #[inline]
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Length of the match in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Returns true if the match is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Returns the matched bytes. `text` must be the text where the match
    /// was found.
    #[inline]
    pub fn as_bytes<'t>(&self, text: &'t [u8]) -> &'t [u8] {
        &text[self.range()]
    }
}

/// Finds matches of a compiled regular expression.
///
/// Each executor has its own cache of DFA states, but shares the compiled
/// regular expression with the [`crate::Regex`] it was created from, and with
/// other executors. An executor can be used for matching any number of texts
/// sequentially, and the DFA states built while matching one text are reused
/// with the next ones. Use one executor per thread for matching in parallel.
pub struct Executor {
    program: Arc<Program>,
    dfa: LazyDfa,
}

impl Executor {
    pub(crate) fn new(program: Arc<Program>) -> Self {
        let dfa = LazyDfa::new(&program.nfa)
            .cache_limit(program.config.dfa_cache_limit);
        Self { program, dfa }
    }

    /// Finds the first match in `text`.
    pub fn find(&mut self, text: &[u8]) -> Option<Match> {
        self.find_at(text, 0)
    }

    /// Finds the first match that starts at or after `start`.
    ///
    /// The bytes before `start` are not part of any match, but they are
    /// taken into account by assertions like `\b`.
    pub fn find_at(&mut self, text: &[u8], start: usize) -> Option<Match> {
        if start > text.len() {
            return None;
        }

        let program = self.program.as_ref();
        let dfa = &mut self.dfa;

        match program.optimization.strategy() {
            Strategy::Generic => find_generic(dfa, program, text, start),
            Strategy::Digits => scan::find_digit_run(text, start)
                .map(|(start, end)| Match::new(start, end)),
            Strategy::NonSpace => scan::find_non_whitespace_run(text, start)
                .map(|(start, end)| Match::new(start, end)),
            Strategy::WordBoundary { class, min, max } => {
                let mut pos = start;
                while let Some(word_start) = scan::find_word_byte(text, pos) {
                    let word_end = scan::find_non_word_byte(text, word_start)
                        .unwrap_or(text.len());
                    let len = word_end - word_start;
                    if scan::is_word_boundary(text, word_start)
                        && len >= *min
                        && max.map_or(true, |max| len <= max)
                        && text[word_start..word_end]
                            .iter()
                            .all(|b| class.contains(*b))
                    {
                        return Some(Match::new(word_start, word_end));
                    }
                    pos = word_end;
                }
                None
            }
            Strategy::AnchoredStart => {
                if start > 0 {
                    return None;
                }
                dfa.find_at(&program.nfa, text, 0)
                    .map(|end| Match::new(0, end))
            }
            Strategy::PrefixScan { before, .. } => {
                find_with_literal(dfa, program, text, start, *before)
            }
        }
    }

    /// Finds all the non-overlapping matches in `text`, in the order in
    /// which they appear.
    ///
    /// After a non-empty match, the search resumes at the end of the match,
    /// so an empty match can follow it immediately. After an empty match
    /// the search resumes at the next byte.
    pub fn find_all(&mut self, text: &[u8]) -> Vec<Match> {
        let mut matches = Vec::new();
        let mut pos = 0;
        while let Some(m) = self.find_at(text, pos) {
            pos = if m.is_empty() { m.end + 1 } else { m.end };
            matches.push(m);
        }
        matches
    }

    /// Finds the longest match that starts at offset 0.
    pub fn match_prefix(&mut self, text: &[u8]) -> Option<Match> {
        self.dfa
            .find_at(&self.program.nfa, text, 0)
            .map(|end| Match::new(0, end))
    }

    /// Returns statistics about the executor's DFA cache.
    pub fn stats(&self) -> DfaStats {
        self.dfa.stats()
    }
}

/// Tries every position that can start a match, from left to right.
fn find_generic(
    dfa: &mut LazyDfa,
    program: &Program,
    text: &[u8],
    start: usize,
) -> Option<Match> {
    let nfa = &program.nfa;

    // Without a prefilter the pattern can match an empty string, and
    // therefore the end of the text must be tried too.
    let Some(prefilter) = program.optimization.prefilter() else {
        return (start..=text.len()).find_map(|pos| {
            dfa.find_at(nfa, text, pos).map(|end| Match::new(pos, end))
        });
    };

    let mut pos = start;
    while let Some(candidate) = prefilter.find(text, pos) {
        if let Some(end) = dfa.find_at(nfa, text, candidate) {
            return Some(Match::new(candidate, end));
        }
        pos = candidate + 1;
    }

    None
}

/// Uses the literal contained in every match for locating the positions
/// where matches can start. A match can start at most `before` bytes
/// before the literal (anywhere before it if `None`).
fn find_with_literal(
    dfa: &mut LazyDfa,
    program: &Program,
    text: &[u8],
    start: usize,
    before: Option<usize>,
) -> Option<Match> {
    let finder = program.optimization.finder()?;
    let nfa = &program.nfa;

    // Positions below `next_start` were already tried.
    let mut next_start = start;
    let mut pos = start;

    while let Some(offset) = finder.find(&text[pos..]) {
        let literal_pos = pos + offset;

        let first = match before {
            Some(before) => literal_pos.saturating_sub(before).max(next_start),
            None => next_start,
        };

        for candidate in first..=literal_pos {
            if let Some(end) = dfa.find_at(nfa, text, candidate) {
                return Some(Match::new(candidate, end));
            }
        }

        next_start = literal_pos + 1;
        pos = literal_pos + 1;
    }

    None
}
