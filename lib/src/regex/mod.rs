use std::fmt::{Debug, Formatter};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bstr::{BString, ByteSlice};
use log::debug;

use crate::config::Config;
use crate::errors::Error;
use crate::re::dfa::DfaStats;
use crate::re::fast::{self, OptimizationInfo, Strategy};
use crate::re::parser::Parser;
use crate::re::thompson::{Compiler, Nfa};

pub use executor::{Executor, Match};

mod executor;


/// A compiled regular expression, shared by every [`Executor`] created
/// for it.
pub(crate) struct Program {
    pattern: BString,
    config: Config,
    nfa: Nfa,
    optimization: OptimizationInfo,
}

impl Program {
    fn new(pattern: &[u8], config: &Config) -> Result<Self, Error> {
        let hir = Parser::new()
            .case_insensitive(config.case_insensitive)
            .dot_matches_new_line(config.dot_matches_new_line)
            .multi_line(config.multi_line)
            .parse(pattern)?;

        let nfa = Compiler::new()
            .size_limit(config.nfa_size_limit)
            .compile(&hir)?;

        let optimization = if config.optimize {
            fast::analyze(&hir, &nfa)
        } else {
            OptimizationInfo::generic(&nfa)
        };

        debug!(
            "compiled regexp `{}`: {} NFA states, strategy: {:?}",
            pattern.as_bstr(),
            nfa.len(),
            optimization.strategy()
        );

        Ok(Self {
            pattern: BString::from(pattern),
            config: config.clone(),
            nfa,
            optimization,
        })
    }
}

/// A compiled regular expression.
///
/// `Regex` can be shared between threads. Matching methods take `&self`,
/// and use an internal [`Executor`] protected by a mutex, so concurrent
/// calls on the same `Regex` are serialized. For matching in parallel,
/// create one executor per thread with [`Regex::executor`].
///
/// ```
/// let re = pyregex::compile(r"\d+").unwrap();
/// let text = "test123foo456";
///
/// let matches = re
///     .find_iter(text)
///     .map(|m| &text[m.range()])
///     .collect::<Vec<_>>();
///
/// assert_eq!(matches, vec!["123", "456"]);
/// ```
pub struct Regex {
    program: Arc<Program>,
    executor: Mutex<Executor>,
}

impl Regex {
    /// Compiles a regular expression with the default configuration.
    ///
    /// The pattern is a sequence of bytes, it doesn't need to be valid
    /// UTF-8. Bytes outside the ASCII range match themselves.
    pub fn new<P: AsRef<[u8]>>(pattern: P) -> Result<Self, Error> {
        Self::with_config(pattern, &Config::default())
    }

    /// Compiles a regular expression with the given configuration.
    pub fn with_config<P: AsRef<[u8]>>(
        pattern: P,
        config: &Config,
    ) -> Result<Self, Error> {
        let program = Arc::new(Program::new(pattern.as_ref(), config)?);
        let executor = Mutex::new(Executor::new(Arc::clone(&program)));
        Ok(Self { program, executor })
    }

    /// Returns a [`RegexBuilder`] for configuring how the pattern is
    /// compiled.
    pub fn builder<P: AsRef<[u8]>>(pattern: P) -> RegexBuilder {
        RegexBuilder::new(pattern)
    }

    /// Finds the first match in `text`, like Python's `re.search`.
    pub fn find<T: AsRef<[u8]> + ?Sized>(&self, text: &T) -> Option<Match> {
        self.lock().find(text.as_ref())
    }

    /// Finds the first match that starts at or after `start`, like
    /// Python's `Pattern.search(text, start)`.
    pub fn find_at<T: AsRef<[u8]> + ?Sized>(
        &self,
        text: &T,
        start: usize,
    ) -> Option<Match> {
        self.lock().find_at(text.as_ref(), start)
    }

    /// Finds all the non-overlapping matches in `text`, like Python's
    /// `re.finditer`.
    pub fn find_all<T: AsRef<[u8]> + ?Sized>(&self, text: &T) -> Vec<Match> {
        self.lock().find_all(text.as_ref())
    }

    /// Returns an iterator over the non-overlapping matches in `text`. The
    /// matches are the same returned by [`Regex::find_all`], but they are
    /// found one at a time.
    pub fn find_iter<'r, 't, T: AsRef<[u8]> + ?Sized>(
        &'r self,
        text: &'t T,
    ) -> FindIter<'r, 't> {
        FindIter { regex: self, text: text.as_ref(), pos: 0 }
    }

    /// Returns true if the regular expression matches anywhere in `text`.
    pub fn is_match<T: AsRef<[u8]> + ?Sized>(&self, text: &T) -> bool {
        self.find(text).is_some()
    }

    /// Returns the match that starts at offset 0, like Python's
    /// `re.match`.
    pub fn match_prefix<T: AsRef<[u8]> + ?Sized>(
        &self,
        text: &T,
    ) -> Option<Match> {
        self.lock().match_prefix(text.as_ref())
    }

    /// The pattern this regular expression was compiled from.
    pub fn as_bytes(&self) -> &[u8] {
        self.program.pattern.as_slice()
    }

    /// The configuration used for compiling the regular expression.
    pub fn config(&self) -> &Config {
        &self.program.config
    }

    /// Number of capturing groups in the pattern.
    pub fn captures_len(&self) -> usize {
        self.program.nfa.captures_len()
    }

    /// Names of the capturing groups, in the order in which they appear in
    /// the pattern. Unnamed groups are `None`.
    pub fn capture_names(&self) -> impl Iterator<Item = Option<&str>> {
        self.program.nfa.capture_names()
    }

    /// The strategy used for finding matches.
    pub fn strategy(&self) -> &Strategy {
        self.program.optimization.strategy()
    }

    /// The result of analyzing the pattern.
    pub fn optimization(&self) -> &OptimizationInfo {
        &self.program.optimization
    }

    /// Statistics about the DFA cache of the internal executor.
    pub fn stats(&self) -> DfaStats {
        self.lock().stats()
    }

    /// Creates a new [`Executor`] with its own DFA cache.
    pub fn executor(&self) -> Executor {
        Executor::new(Arc::clone(&self.program))
    }

    fn lock(&self) -> MutexGuard<'_, Executor> {
        // The executor's state is consistent even if a thread panicked
        // while holding the lock.
        self.executor.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Clone for Regex {
    fn clone(&self) -> Self {
        Self {
            program: Arc::clone(&self.program),
            executor: Mutex::new(self.executor()),
        }
    }
}

impl Debug for Regex {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Regex").field(&self.as_bytes().as_bstr()).finish()
    }
}

impl std::str::FromStr for Regex {
    type Err = Error;

    fn from_str(pattern: &str) -> Result<Self, Self::Err> {
        Self::new(pattern)
    }
}

/// Iterator returned by [`Regex::find_iter`].
pub struct FindIter<'r, 't> {
    regex: &'r Regex,
    text: &'t [u8],
    pos: usize,
}

impl Iterator for FindIter<'_, '_> {
    type Item = Match;

    fn next(&mut self) -> Option<Self::Item> {
        let m = self.regex.lock().find_at(self.text, self.pos)?;
        self.pos = if m.is_empty() { m.end() + 1 } else { m.end() };
        Some(m)
    }
}

/// Configures and compiles a [`Regex`].
///
/// ```
/// let re = pyregex::RegexBuilder::new("^hello$")
///     .case_insensitive(true)
///     .multi_line(true)
///     .build()
///     .unwrap();
///
/// assert!(re.is_match("say\nHello\n"));
/// ```
#[derive(Debug, Clone)]
pub struct RegexBuilder {
    pattern: BString,
    config: Config,
}

impl RegexBuilder {
    /// Creates a builder with the default configuration.
    pub fn new<P: AsRef<[u8]>>(pattern: P) -> Self {
        Self {
            pattern: BString::from(pattern.as_ref()),
            config: Config::default(),
        }
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// ASCII letters match both their lowercase and uppercase forms.
    pub fn case_insensitive(mut self, yes: bool) -> Self {
        self.config.case_insensitive = yes;
        self
    }

    /// The dot (`.`) matches `\n` too.
    pub fn dot_matches_new_line(mut self, yes: bool) -> Self {
        self.config.dot_matches_new_line = yes;
        self
    }

    /// `^` and `$` match at the start and end of each line.
    pub fn multi_line(mut self, yes: bool) -> Self {
        self.config.multi_line = yes;
        self
    }

    /// Enables or disables the specialized matching strategies.
    pub fn optimize(mut self, yes: bool) -> Self {
        self.config.optimize = yes;
        self
    }

    /// Maximum number of NFA states the pattern can produce.
    pub fn nfa_size_limit(mut self, limit: usize) -> Self {
        self.config.nfa_size_limit = limit;
        self
    }

    /// Maximum number of DFA states kept by each executor.
    pub fn dfa_cache_limit(mut self, limit: usize) -> Self {
        self.config.dfa_cache_limit = limit;
        self
    }

    /// Compiles the regular expression.
    pub fn build(&self) -> Result<Regex, Error> {
        Regex::with_config(&self.pattern, &self.config)
    }
}
