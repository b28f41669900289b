/*! This module parses, compiles, and executes regular expressions.

A pattern goes through the following stages:

1. The [`parser::Parser`] turns the pattern into a high-level intermediate
   representation (HIR), represented by the [`hir::Hir`] type.
2. The [`thompson::Compiler`] builds a NFA from the HIR, using the
   [Thompson's construction][1] algorithm.
3. The optimizer in [`fast`] inspects the HIR looking for idioms that can be
   matched with a specialized scanner, like runs of digits, or patterns that
   contain a literal that can be located with `memchr` before running the
   automaton.
4. At match time, the NFA is executed by the lazy DFA in [`dfa`], which
   builds DFA states on demand and caches them, so that each byte in the
   input is processed in constant time once the relevant states exist.

The semantics reproduce the ones of Python's `re` module in ASCII mode, with
the exception that the match found at a given starting position is always
the longest one (see the crate's documentation).

[1]: https://en.wikipedia.org/wiki/Thompson%27s_construction
*/

pub mod bitmapset;
pub mod dfa;
pub mod fast;
pub mod hir;
pub mod parser;
pub mod thompson;

mod atoms;

/// Maximum number of repetitions allowed in counted repetitions like
/// `a{n,m}`. Counted repetitions are expanded while building the NFA, so
/// this value limits how much a single repetition can grow the automaton.
pub const MAX_REPETITIONS: u32 = 1000;
