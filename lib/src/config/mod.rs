use serde::{Deserialize, Serialize};

/// Options that control how a regular expression is compiled and matched.
///
/// The defaults reproduce Python's `re` module with the `re.ASCII` flag and
/// no other flags. `Config` can be serialized and deserialized, so hosts can
/// keep it in their own configuration files.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// ASCII letters match both their lowercase and uppercase forms
    /// (`re.IGNORECASE`).
    pub case_insensitive: bool,
    /// The dot (`.`) matches `\n` too (`re.DOTALL`).
    pub dot_matches_new_line: bool,
    /// `^` and `$` match at the start and end of each line, not only at
    /// the start and end of the text (`re.MULTILINE`).
    pub multi_line: bool,
    /// Analyze the pattern and use a specialized scanning strategy when
    /// one applies. When false every pattern is matched by the generic
    /// lazy DFA.
    pub optimize: bool,
    /// Maximum number of NFA states a pattern can produce.
    pub nfa_size_limit: usize,
    /// Maximum number of DFA states kept by each executor. When exceeded,
    /// the cache is cleared before the next search.
    pub dfa_cache_limit: usize,
}

impl Config {
    /// Default value for [`Config::nfa_size_limit`].
    pub const DEFAULT_NFA_SIZE_LIMIT: usize = 100_000;

    /// Default value for [`Config::dfa_cache_limit`].
    pub const DEFAULT_DFA_CACHE_LIMIT: usize = 10_000;
}

impl Default for Config {
    fn default() -> Config {
        Config {
            case_insensitive: false,
            dot_matches_new_line: false,
            multi_line: false,
            optimize: cfg!(feature = "fast-paths"),
            nfa_size_limit: Self::DEFAULT_NFA_SIZE_LIMIT,
            dfa_cache_limit: Self::DEFAULT_DFA_CACHE_LIMIT,
        }
    }
}
