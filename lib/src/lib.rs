/*! A regular expression engine with the semantics of Python's `re` module.

Patterns are parsed and matched the way Python 3 does it with the `re.ASCII`
flag: the classes `\d`, `\w` and `\s` cover only ASCII bytes, quantifiers
are greedy, and [`Regex::find_all`] returns the same matches as
`re.finditer`, including the empty ones. Texts are arbitrary byte slices.

Unlike Python's backtracking engine, matching is done with a DFA that is
built lazily from a Thompson NFA, so the time required for a search is
linear in the length of the text, regardless of the pattern. The price is
that constructions that can't be expressed by a finite automaton, like
backreferences or non-greedy quantifiers, are not supported. Among the
alternatives that match at the same position the longest one is reported.

Before matching, the pattern is analyzed. Many common patterns, like `\d+`,
`\b[a-z]{4,}\b` or `\d{4}-\d{2}-\d{2}`, are matched with a specialized
[`Strategy`] that scans the text in chunks, or jumps between occurrences of
a literal, instead of running the DFA at every position.

# Example

```rust
let re = pyregex::compile(r"\d{4}-\d{2}-\d{2}").unwrap();
let text = b"from 2024-01-15 to 2024-02-29";

let dates = re
    .find_all(text)
    .iter()
    .map(|m| m.as_bytes(text))
    .collect::<Vec<_>>();

assert_eq!(dates, vec![b"2024-01-15", b"2024-02-29"]);
```
*/

#![deny(missing_docs)]

pub use config::Config;

pub use errors::BuildError;
pub use errors::Error;
pub use errors::ParseError;
pub use errors::ParseErrorKind;

pub use re::dfa::DfaStats;
pub use re::fast::OptimizationInfo;
pub use re::fast::Strategy;
pub use re::fast::MAX_WINDOW;
pub use re::hir::ByteSet;
pub use re::MAX_REPETITIONS;

pub use regex::Executor;
pub use regex::FindIter;
pub use regex::Match;
pub use regex::Regex;
pub use regex::RegexBuilder;

mod config;
mod errors;
mod re;
mod regex;

#[cfg(test)]
mod tests;

/// Compiles a regular expression with the default configuration.
///
/// This is a shortcut for [`Regex::new`].
pub fn compile<P: AsRef<[u8]>>(pattern: P) -> Result<Regex, Error> {
    Regex::new(pattern)
}
