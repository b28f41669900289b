/*! A regexp compiler based on the [Thompson's construction][1] algorithm.

The compiler walks the [`crate::re::hir::Hir`] and produces a NFA where each
state is an entry in a vector, and transitions refer to other states by their
index. Every sub-expression is compiled into a fragment with a single entry
state and a list of "holes", which are transitions that still don't have a
target. Fragments are glued together by patching the holes of one fragment
with the entry state of the next one, as described in Russ Cox's article
[Regular Expression Matching Can Be Simple And Fast][2].

Counted repetitions are expanded: `e{2,4}` is compiled as `ee(e(e)?)?`, so
the NFA doesn't need counters and can be converted into a DFA by the subset
construction. The maximum number of repetitions is capped by
[`crate::re::MAX_REPETITIONS`].

[1]: https://en.wikipedia.org/wiki/Thompson%27s_construction
[2]: https://swtch.com/~rsc/regexp/regexp1.html
*/

pub(crate) use compiler::Compiler;
pub(crate) use nfa::*;

mod compiler;
mod nfa;

#[cfg(test)]
mod tests;
