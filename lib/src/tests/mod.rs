/*! End-to-end tests. */
use itertools::Itertools;
use pretty_assertions::assert_eq;

use crate::{Regex, RegexBuilder};

/// Patterns used in the benchmarks.
const BENCH_PATTERNS: &[&str] = &[
    r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}",
    r"https?://[^\s]+",
    r"\(\d{3}\)\s?\d{3}-\d{4}|\d{3}-\d{3}-\d{4}",
    r"\d+",
    r"[0-9]+",
    r"\b[a-z]{4,}\b",
    r"\d{4}-\d{2}-\d{2}",
    r"[0-9]{4}-[0-9]{2}-[0-9]{2}",
    r"\b\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}\b",
    r"#[0-9a-fA-F]{6}",
    r"v?\d+\.\d+\.\d+",
    r"[a-z]+\d+",
];

/// Patterns that exercise the other strategies and corner cases.
const OTHER_PATTERNS: &[&str] = &[
    r"\S+",
    r"[^\s]+",
    r"\b\w{4}\b",
    r"\b[0-9]+\b",
    r"\bthe\b",
    r"^Contact",
    r"\A\w+",
    r"x.{3}y",
    r"o.{70}o",
    r"a*",
    r"",
    r"\B\w",
    r"(?:ab|a)c?",
    r"[^a-z]+$",
];

const CORPUS: &[&str] = &[
    "Contact john.doe@example.com or visit https://example.org/path?q=1 ",
    "Call (555) 123-4567 or 555-987-6543. ",
    "Released v1.2.3 on 2024-01-15, build 20240115 and 1.10.0-rc1. ",
    "Server 192.168.1.254 and 10.0.0.1 but not 1234.5.6.7 ",
    "Colors #ff00AA #123abc #xyz123 #ABCDEF0 ",
    "user42 abc123 test_99 x123y xaaay ",
    "the quick brown fox jumps over the lazy dog\n",
    "\tTabs\x0bvertical\x0cfeed\r\nabcabc aac ab ",
    "mail@host, a@b.co. x@y.z @@ abc@ ",
];

/// Builds a text by concatenating the fragments in the corpus in a
/// pseudo-random order.
fn corpus(fragments: usize) -> String {
    let mut seed: u32 = 0x1234_5678;
    let mut text = String::new();
    for _ in 0..fragments {
        seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
        text.push_str(CORPUS[(seed >> 16) as usize % CORPUS.len()]);
    }
    text
}

macro_rules! assert_matches {
    ($pattern:expr, $text:expr, [$($m:expr),* $(,)?]) => {{
        let expected: Vec<(usize, usize, &str)> = vec![$($m),*];
        let text: &str = $text;
        let re = crate::compile($pattern).unwrap();
        let found = re
            .find_all(text)
            .iter()
            .map(|m| (m.start(), m.end(), &text[m.range()]))
            .collect::<Vec<_>>();
        assert_eq!(
            found, expected,
            "pattern: {:?}, text: {:?}",
            $pattern, text
        );
    }};
}

/// Checks that the specialized strategy selected for `pattern` finds the
/// same matches as the generic one.
fn assert_same_as_generic(pattern: &str, text: &str) {
    let fast = Regex::new(pattern).unwrap();
    let generic = RegexBuilder::new(pattern).optimize(false).build().unwrap();

    assert_eq!(
        fast.find_all(text),
        generic.find_all(text),
        "pattern: {:?}, strategy: {:?}",
        pattern,
        fast.strategy()
    );

    for start in 0..=text.len() {
        assert_eq!(
            fast.find_at(text, start),
            generic.find_at(text, start),
            "pattern: {:?}, start: {}, strategy: {:?}",
            pattern,
            start,
            fast.strategy()
        );
    }
}

#[test]
fn literals() {
    assert_matches!("hello", "hello world", [(0, 5, "hello")]);
    assert_matches!("world", "hello world", [(6, 11, "world")]);
    assert_matches!("test", "testing", [(0, 4, "test")]);
    assert_matches!("abc", "xabcx", [(1, 4, "abc")]);
    assert_matches!("a", "", []);
}

#[test]
fn dot() {
    assert_matches!(".", "abc", [(0, 1, "a"), (1, 2, "b"), (2, 3, "c")]);
    assert_matches!("a.c", "abc adc", [(0, 3, "abc"), (4, 7, "adc")]);
    assert_matches!(".*", "test", [(0, 4, "test"), (4, 4, "")]);
    assert_matches!("a.c", "a\nc", []);
}

#[test]
fn perl_classes() {
    assert_matches!(r"\d", "a1b2c3", [(1, 2, "1"), (3, 4, "2"), (5, 6, "3")]);
    assert_matches!(r"\d+", "test123foo456", [(4, 7, "123"), (10, 13, "456")]);
    assert_matches!(
        r"\d\d\d",
        "abc123def456",
        [(3, 6, "123"), (9, 12, "456")]
    );
    assert_matches!(
        r"\w",
        "a_1 b",
        [(0, 1, "a"), (1, 2, "_"), (2, 3, "1"), (4, 5, "b")]
    );
    assert_matches!(
        r"\w+",
        "hello world_123",
        [(0, 5, "hello"), (6, 15, "world_123")]
    );
    assert_matches!(
        r"\s",
        "a b\tc\nd",
        [(1, 2, " "), (3, 4, "\t"), (5, 6, "\n")]
    );
    assert_matches!(r"\s+", "a  b\t\tc", [(1, 3, "  "), (4, 6, "\t\t")]);
    assert_matches!(r"\D", "a1b2", [(0, 1, "a"), (2, 3, "b")]);
    assert_matches!(r"\W", "a_1 b", [(3, 4, " ")]);
    assert_matches!(
        r"\S+",
        "a b  c",
        [(0, 1, "a"), (2, 3, "b"), (5, 6, "c")]
    );
}

#[test]
fn ascii_classes() {
    let word = Regex::new(r"\w").unwrap();
    let space = Regex::new(r"\s").unwrap();
    let digit = Regex::new(r"\d").unwrap();

    let count = |re: &Regex| (0..=u8::MAX).filter(|b| re.is_match(&[*b])).count();

    assert_eq!(count(&word), 63);
    assert_eq!(count(&digit), 10);
    assert_eq!(
        (0..=u8::MAX).filter(|b| space.is_match(&[*b])).collect::<Vec<_>>(),
        vec![0x09, 0x0A, 0x0B, 0x0C, 0x0D, 0x20]
    );
}

#[test]
fn custom_classes() {
    assert_matches!(
        r"[abc]",
        "abcdef",
        [(0, 1, "a"), (1, 2, "b"), (2, 3, "c")]
    );
    assert_matches!(r"[a-z]", "A1b2C3d", [(2, 3, "b"), (6, 7, "d")]);
    assert_matches!(
        r"[a-zA-Z]",
        "a1B2c",
        [(0, 1, "a"), (2, 3, "B"), (4, 5, "c")]
    );
    assert_matches!(r"[0-9]+", "test123", [(4, 7, "123")]);
    assert_matches!(r"[^0-9]", "a1b2", [(0, 1, "a"), (2, 3, "b")]);
    assert_matches!(r"[^a-z]+", "ab12CD34ef", [(2, 8, "12CD34")]);
    assert_matches!(r"[\d.]+", "v1.2", [(1, 4, "1.2")]);
    assert_matches!(r"[]a]+", "x]a]", [(1, 4, "]a]")]);
}

#[test]
fn quantifiers() {
    assert_matches!(
        r"a*",
        "baaab",
        [(0, 0, ""), (1, 4, "aaa"), (4, 4, ""), (5, 5, "")]
    );
    assert_matches!(
        r"ab*c",
        "ac abc abbc",
        [(0, 2, "ac"), (3, 6, "abc"), (7, 11, "abbc")]
    );
    assert_matches!(r"a+", "baaab", [(1, 4, "aaa")]);
    assert_matches!(r"a+", "aaa", [(0, 3, "aaa")]);
    assert_matches!(r"\d+", "a123b456", [(1, 4, "123"), (5, 8, "456")]);
    assert_matches!(
        r"colou?r",
        "color colour",
        [(0, 5, "color"), (6, 12, "colour")]
    );
    assert_matches!(r"ab?c", "ac abc", [(0, 2, "ac"), (3, 6, "abc")]);
    assert_matches!(r"a*", "b", [(0, 0, ""), (1, 1, "")]);
    assert_matches!(r"a*", "ab", [(0, 1, "a"), (1, 1, ""), (2, 2, "")]);
}

#[test]
fn counted_repetitions() {
    assert_matches!(r"\d{3}", "12 123 1234", [(3, 6, "123"), (7, 10, "123")]);
    assert_matches!(r"a{2}", "a aa aaa", [(2, 4, "aa"), (5, 7, "aa")]);
    assert_matches!(
        r"\d{2,4}",
        "1 12 123 1234 12345",
        [(2, 4, "12"), (5, 8, "123"), (9, 13, "1234"), (14, 18, "1234")]
    );
    assert_matches!(
        r"a{1,3}",
        "a aa aaa aaaa",
        [
            (0, 1, "a"),
            (2, 4, "aa"),
            (5, 8, "aaa"),
            (9, 12, "aaa"),
            (12, 13, "a")
        ]
    );
    assert_matches!(r"a{2,}", "a aaaaa", [(2, 7, "aaaaa")]);
    // Braces that don't follow an atom are literals.
    assert_matches!(r"{a}", "x{a}", [(1, 4, "{a}")]);
}

#[test]
fn anchors() {
    assert_matches!(r"^hello", "hello world", [(0, 5, "hello")]);
    assert_matches!(r"^hello", "say hello", []);
    assert_matches!(r"^\d+", "123test", [(0, 3, "123")]);
    assert_matches!(r"world$", "hello world", [(6, 11, "world")]);
    assert_matches!(r"world$", "world hello", []);
    assert_matches!(r"\d+$", "test123", [(4, 7, "123")]);
    assert_matches!(r"\Aab\Z", "ab", [(0, 2, "ab")]);
    assert_matches!(r"^", "ab", [(0, 0, "")]);
    assert_matches!(r"$", "ab", [(2, 2, "")]);
    // `$` also matches right before a `\n` that ends the text.
    assert_matches!(r"world$", "hello world\n", [(6, 11, "world")]);
    assert_matches!(r"a$", "a\n\n", []);
    assert_matches!(r"$", "ab\n", [(2, 2, ""), (3, 3, "")]);
    assert_matches!(r"a\Z", "a\n", []);
}

#[test]
fn multi_line_anchors() {
    let re = RegexBuilder::new(r"^\w+$").multi_line(true).build().unwrap();
    let text = "one\ntwo three\nfour";

    assert_eq!(
        re.find_all(text).iter().map(|m| m.range()).collect::<Vec<_>>(),
        vec![0..3, 14..18]
    );
}

#[test]
fn word_boundaries() {
    assert_matches!(r"\bword\b", "word words sword", [(0, 4, "word")]);
    assert_matches!(r"\btest\b", "test testing retest", [(0, 4, "test")]);
    assert_matches!(
        r"\b\w{4}\b",
        "the jump make code",
        [(4, 8, "jump"), (9, 13, "make"), (14, 18, "code")]
    );
    assert_matches!(
        r"\b[A-Z][a-z]+\b",
        "Hello World",
        [(0, 5, "Hello"), (6, 11, "World")]
    );
    assert_matches!(r"\Bor\B", "or word", [(4, 6, "or")]);
    assert_matches!(r"\b", "ab", [(0, 0, ""), (2, 2, "")]);
}

#[test]
fn alternations() {
    assert_matches!(
        r"cat|dog",
        "I have a cat and a dog",
        [(9, 12, "cat"), (19, 22, "dog")]
    );
    assert_matches!(
        r"red|blue|green",
        "red blue green yellow",
        [(0, 3, "red"), (4, 8, "blue"), (9, 14, "green")]
    );
    assert_matches!(
        r"\d+|[a-z]+",
        "123 abc 456 def",
        [(0, 3, "123"), (4, 7, "abc"), (8, 11, "456"), (12, 15, "def")]
    );
    assert_matches!(r"cat|c", "cat", [(0, 3, "cat")]);
    // Python reports `a` here, the longest alternative is preferred.
    assert_matches!(r"a|ab", "ab", [(0, 2, "ab")]);
}

#[test]
fn groups() {
    assert_matches!(r"(ab)+", "ab abab", [(0, 2, "ab"), (3, 7, "abab")]);
    assert_matches!(r"(\d+)", "test123", [(4, 7, "123")]);
    assert_matches!(r"(\w+)@(\w+)", "user@domain", [(0, 11, "user@domain")]);
    assert_matches!(r"(?:ab|cd){2}", "abcd cdab ab", [(0, 4, "abcd"), (5, 9, "cdab")]);
    assert_matches!(r"(?P<year>\d{4})", "in 2024", [(3, 7, "2024")]);
}

#[test]
fn complex_patterns() {
    assert_matches!(
        r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]+",
        "test@example.com",
        [(0, 16, "test@example.com")]
    );
    assert_matches!(
        r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}",
        "Contact john.doe@example.com or a@b.co.",
        [(8, 28, "john.doe@example.com"), (32, 38, "a@b.co")]
    );
    assert_matches!(r"\d{4}-\d{2}-\d{2}", "2024-01-15", [(0, 10, "2024-01-15")]);
    assert_matches!(
        r"https?://[^\s]+",
        "see http://a.b/c and https://x.y",
        [(4, 16, "http://a.b/c"), (21, 32, "https://x.y")]
    );
    assert_matches!(
        r"\b\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}\b",
        "ip 192.168.1.254, not 1234.5.6.7",
        [(3, 16, "192.168.1.254")]
    );
    assert_matches!(
        r"\(\d{3}\)\s?\d{3}-\d{4}|\d{3}-\d{3}-\d{4}",
        "(555) 123-4567 or 555-987-6543",
        [(0, 14, "(555) 123-4567"), (18, 30, "555-987-6543")]
    );
    assert_matches!(
        r"v?\d+\.\d+\.\d+",
        "v1.2.3 and 10.20.30",
        [(0, 6, "v1.2.3"), (11, 19, "10.20.30")]
    );
}

#[test]
fn empty_matches() {
    assert_matches!(
        r"",
        "test",
        [(0, 0, ""), (1, 1, ""), (2, 2, ""), (3, 3, ""), (4, 4, "")]
    );
    assert_matches!(r"", "", [(0, 0, "")]);
    assert_matches!(r"x*", "", [(0, 0, "")]);
}

#[test]
fn escapes() {
    assert_matches!(r"\.", "a.b", [(1, 2, ".")]);
    assert_matches!(r"\*", "2*3", [(1, 2, "*")]);
    assert_matches!(r"\+", "1+2", [(1, 2, "+")]);
    assert_matches!(r"\?", "what?", [(4, 5, "?")]);
    assert_matches!(r"\[", "[test]", [(0, 1, "[")]);
    assert_matches!(r"\]", "[test]", [(5, 6, "]")]);
    assert_matches!(r"\(", "(a)", [(0, 1, "(")]);
    assert_matches!(r"\)", "(a)", [(2, 3, ")")]);
    assert_matches!(r"\\", "a\\b", [(1, 2, "\\")]);
    assert_matches!(r"\x41\t", "xA\t", [(1, 3, "A\t")]);
}

#[test]
fn case_insensitive() {
    let re = RegexBuilder::new(r"[a-c]+x").case_insensitive(true).build().unwrap();

    assert_eq!(
        re.find_all("ABcX abx zx").iter().map(|m| m.range()).collect::<Vec<_>>(),
        vec![0..4, 5..8]
    );
}

#[test]
fn binary_text() {
    let re = Regex::new(r"\x00\xff+").unwrap();
    let text = b"a\x00\xff\xff\x00b";

    assert_eq!(
        re.find_all(text).iter().map(|m| m.range()).collect::<Vec<_>>(),
        vec![1..4]
    );
}

#[test]
fn strategies_agree_with_generic() {
    let text = corpus(12);
    for pattern in BENCH_PATTERNS.iter().chain(OTHER_PATTERNS) {
        assert_same_as_generic(pattern, &text);
    }
}

#[test]
fn matches_are_ordered_and_disjoint() {
    let text = corpus(40);
    for pattern in BENCH_PATTERNS.iter().chain(OTHER_PATTERNS) {
        let re = Regex::new(pattern).unwrap();
        let matches = re.find_all(&text);

        for m in &matches {
            assert!(m.start() <= m.end() && m.end() <= text.len());
        }

        for (a, b) in matches.iter().tuple_windows() {
            assert!(
                a.end() <= b.start() && a.start() < b.start(),
                "pattern: {:?}, {:?} overlaps {:?}",
                pattern,
                a,
                b
            );
        }
    }
}

#[test]
fn results_are_deterministic() {
    let text = corpus(20);
    for pattern in BENCH_PATTERNS {
        let first = Regex::new(pattern).unwrap();
        let second = Regex::new(pattern).unwrap();

        assert_eq!(first.find_all(&text), second.find_all(&text));
        assert_eq!(first.find_all(&text), first.find_all(&text));
    }
}

#[test]
fn dfa_cache_is_stable() {
    let text = corpus(50);
    for pattern in BENCH_PATTERNS {
        let re = RegexBuilder::new(pattern).optimize(false).build().unwrap();

        let matches = re.find_all(&text);
        let stats = re.stats();

        assert_eq!(re.find_all(&text), matches);
        assert_eq!(re.stats(), stats, "pattern: {:?}", pattern);
        assert_eq!(stats.clears, 0);
    }
}

#[test]
fn dfa_cache_limit() {
    let text = corpus(20);
    for pattern in BENCH_PATTERNS {
        let unlimited = Regex::new(pattern).unwrap();
        let limited = RegexBuilder::new(pattern)
            .optimize(false)
            .dfa_cache_limit(4)
            .build()
            .unwrap();

        assert_eq!(limited.find_all(&text), unlimited.find_all(&text));
        assert_eq!(limited.find_all(&text), unlimited.find_all(&text));
    }

    let re = RegexBuilder::new(r"[a-z]+@[a-z]+\.[a-z]{2,}")
        .optimize(false)
        .dfa_cache_limit(4)
        .build()
        .unwrap();

    re.find_all(&text);
    assert!(re.stats().clears > 0);
}

#[test]
fn large_texts() {
    let text = "ab ".repeat(100_000) + "2024-01-15";

    let re = Regex::new(r"\d{4}-\d{2}-\d{2}").unwrap();
    assert_eq!(
        re.find(&text).map(|m| m.range()),
        Some(300_000..300_010)
    );

    let re = Regex::new(r"\b[a-z]{3,}\b").unwrap();
    assert_eq!(re.find(&text), None);

    let re = Regex::new(r"(a|b)*c").unwrap();
    assert_eq!(re.find(&text), None);
}
