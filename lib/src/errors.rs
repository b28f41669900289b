use std::fmt::{Display, Formatter};

use thiserror::Error;

/// Errors returned while compiling a regular expression.
#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum Error {
    /// The pattern is not a valid regular expression.
    #[error(transparent)]
    ParseError(#[from] ParseError),

    /// The pattern is valid, but its automaton can't be built.
    #[error(transparent)]
    BuildError(#[from] BuildError),
}

/// An error found while parsing the source of a regular expression.
///
/// `offset` is the position within the pattern (in bytes) where the parser
/// detected the problem.
#[derive(Error, Debug, Clone, Eq, PartialEq)]
#[error("{kind} at offset {offset}")]
pub struct ParseError {
    kind: ParseErrorKind,
    offset: usize,
}

impl ParseError {
    pub(crate) fn new(kind: ParseErrorKind, offset: usize) -> Self {
        Self { kind, offset }
    }

    /// The kind of error.
    #[inline]
    pub fn kind(&self) -> ParseErrorKind {
        self.kind
    }

    /// Offset within the pattern where the error was detected.
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }
}

/// Kinds of errors reported by [`ParseError`].
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[non_exhaustive]
pub enum ParseErrorKind {
    /// The pattern ended while an atom, escape or group was still open.
    UnexpectedEnd,
    /// Malformed escape sequence, like `\xZZ`.
    InvalidEscape,
    /// Malformed character class, like `[z-a]` or `[]`.
    InvalidClass,
    /// A character class was opened with `[` but never closed.
    UnclosedClass,
    /// Malformed counted repetition, like `a{3,1}` or `a{1,x}`.
    InvalidQuantifier,
    /// A quantifier doesn't have anything to repeat, like in `*a` or `a**`.
    NothingToRepeat,
    /// Non-greedy quantifiers (`*?`, `+?`, `??`, `{n,m}?`) can't be
    /// expressed by a DFA and are rejected.
    UnsupportedLazyQuantifier,
    /// Unbalanced parenthesis, like in `(ab` or `ab)`.
    UnbalancedParenthesis,
    /// Group syntax other than `(...)`, `(?:...)` and `(?P<name>...)`.
    UnsupportedGroup,
    /// Groups are nested too deeply.
    NestingTooDeep,
}

impl Display for ParseErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnexpectedEnd => write!(f, "unexpected end of pattern"),
            Self::InvalidEscape => write!(f, "invalid escape sequence"),
            Self::InvalidClass => write!(f, "invalid character class"),
            Self::UnclosedClass => write!(f, "unterminated character set"),
            Self::InvalidQuantifier => write!(f, "invalid repetition"),
            Self::NothingToRepeat => write!(f, "nothing to repeat"),
            Self::UnsupportedLazyQuantifier => {
                write!(f, "non-greedy quantifiers are not supported")
            }
            Self::UnbalancedParenthesis => write!(f, "unbalanced parenthesis"),
            Self::UnsupportedGroup => write!(f, "unsupported group syntax"),
            Self::NestingTooDeep => write!(f, "groups nested too deeply"),
        }
    }
}

/// Errors returned while building the automaton for a parsed regexp.
#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum BuildError {
    /// The NFA would have more states than allowed by
    /// [`crate::Config::nfa_size_limit`].
    #[error("regexp too large (more than {limit} NFA states)")]
    TooLarge {
        /// The limit that was exceeded.
        limit: usize,
    },

    /// A counted repetition like `a{5000}` exceeds
    /// the maximum number of repetitions.
    #[error("repetition count too large (max: {max})")]
    RepetitionTooLarge {
        /// Maximum number of repetitions allowed.
        max: u32,
    },
}
