/*! A lazily built DFA for executing the NFA produced by the Thompson
compiler.

The DFA is built with the subset construction, but only the states that are
actually reached while matching are created. Each DFA state represents a set
of NFA states, plus the information about the previous byte that is needed
for evaluating assertions like `^`, `$` and `\b`. Assertions are not
evaluated when a state is created, but when its transitions are computed,
because at that point both the previous byte and the next one are known.

Matches are delayed by one byte: a DFA state "matches before byte B" if the
NFA reaches its MATCH state before consuming B. This is what allows `\b` and
`$` to look at the byte that follows the match.
*/

pub use lazy::DfaStats;
pub(crate) use lazy::*;

mod lazy;
