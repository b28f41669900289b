use pretty_assertions::assert_eq;

use crate::errors::BuildError;
use crate::re::hir::{ClassBytes, Hir};
use crate::re::parser::Parser;

use super::{Compiler, LookSet, Nfa};

fn compile(re: &str) -> Nfa {
    let hir = Parser::new().parse(re.as_bytes()).unwrap();
    Compiler::new().compile(&hir).unwrap()
}

macro_rules! assert_re_code {
    ($re:expr, $start:expr, $code:expr) => {{
        let nfa = compile($re);
        assert_eq!($code, nfa.to_string());
        assert_eq!($start, nfa.start());
    }};
}

#[test]
fn re_code_1() {
    assert_re_code!(
        "ab",
        1,
        r#"00: MATCH
01: BYTE 0x61 -> 2
02: BYTE 0x62 -> 0
"#
    );
}

#[test]
fn re_code_2() {
    assert_re_code!(
        "a*",
        2,
        r#"00: MATCH
01: BYTE 0x61 -> 2
02: SPLIT 1, 0
"#
    );

    assert_re_code!(
        "a+",
        1,
        r#"00: MATCH
01: BYTE 0x61 -> 2
02: SPLIT 1, 0
"#
    );

    assert_re_code!(
        "a?",
        2,
        r#"00: MATCH
01: BYTE 0x61 -> 0
02: SPLIT 1, 0
"#
    );
}

#[test]
fn re_code_3() {
    assert_re_code!(
        "cat|c",
        5,
        r#"00: MATCH
01: BYTE 0x63 -> 2
02: BYTE 0x61 -> 3
03: BYTE 0x74 -> 0
04: BYTE 0x63 -> 0
05: SPLIT 1, 4
"#
    );
}

#[test]
fn re_code_4() {
    assert_re_code!(
        "a{1,3}",
        1,
        r#"00: MATCH
01: BYTE 0x61 -> 3
02: BYTE 0x61 -> 5
03: SPLIT 2, 0
04: BYTE 0x61 -> 0
05: SPLIT 4, 0
"#
    );

    assert_re_code!(
        "a{2}",
        1,
        r#"00: MATCH
01: BYTE 0x61 -> 2
02: BYTE 0x61 -> 0
"#
    );

    assert_re_code!(
        "a{2,}",
        1,
        r#"00: MATCH
01: BYTE 0x61 -> 2
02: BYTE 0x61 -> 3
03: SPLIT 2, 0
"#
    );
}

#[test]
fn re_code_5() {
    assert_re_code!(
        "[_a-c]x",
        1,
        r#"00: MATCH
01: BYTE 0x5f -> 2 | RANGE 0x61-0x63 -> 2
02: BYTE 0x78 -> 0
"#
    );

    assert_re_code!(
        ".",
        1,
        r#"00: MATCH
01: RANGE 0x00-0x09 -> 0 | RANGE 0x0b-0xff -> 0
"#
    );
}

#[test]
fn empty_class() {
    let hir = Hir::Class(ClassBytes::default());
    let nfa = Compiler::new().compile(&hir).unwrap();
    assert_eq!("00: MATCH\n01: FAIL\n", nfa.to_string());
    assert_eq!(1, nfa.start());
}

#[test]
fn re_code_6() {
    assert_re_code!(
        "^a$",
        1,
        r#"00: MATCH
01: LOOK StartText -> 2
02: BYTE 0x61 -> 3
03: LOOK EndTextOrFinalNewline -> 0
"#
    );

    assert_re_code!(
        r"a\Z",
        1,
        r#"00: MATCH
01: BYTE 0x61 -> 2
02: LOOK EndText -> 0
"#
    );

    assert_re_code!(
        "(a|)b",
        3,
        r#"00: MATCH
01: BYTE 0x61 -> 4
02: EPS -> 4
03: SPLIT 1, 2
04: BYTE 0x62 -> 0
"#
    );
}

#[test]
fn captures() {
    let nfa = compile("(a)(?P<name>b)(?:c)");
    assert_eq!(nfa.captures_len(), 2);
    assert_eq!(nfa.capture_names().collect::<Vec<_>>(), vec![None, Some("name")]);

    let nfa = compile("abc");
    assert_eq!(nfa.captures_len(), 0);
}

#[test]
fn first_bytes() {
    let bytes = |re: &str| {
        compile(re).first_bytes().map(|set| set.iter().collect::<Vec<_>>())
    };

    assert_eq!(bytes("abc|d"), Some(vec![b'a', b'd']));
    assert_eq!(bytes("a*b"), Some(vec![b'a', b'b']));
    assert_eq!(bytes(r"\bfoo"), Some(vec![b'f']));
    assert_eq!(bytes("[0-2]x"), Some(vec![b'0', b'1', b'2']));
    assert_eq!(bytes("a*"), None);
    assert_eq!(bytes("(?:)"), None);
    assert_eq!(bytes("^$"), None);
}

#[test]
fn looks() {
    use crate::re::hir::Look;

    let nfa = compile(r"^\bx");
    assert!(nfa.looks().contains(Look::StartText));
    assert!(nfa.looks().contains(Look::WordBoundary));
    assert!(!nfa.looks().contains(Look::EndText));

    let nfa = compile("a$");
    assert!(nfa.looks().contains(Look::EndTextOrFinalNewline));
    assert!(!nfa.looks().contains(Look::EndText));
    assert_eq!(compile("x").looks(), LookSet::default());
}

#[test]
fn build_errors() {
    let hir = Parser::new().parse(b"a{1001}").unwrap();
    assert_eq!(
        Compiler::new().compile(&hir).unwrap_err(),
        BuildError::RepetitionTooLarge { max: 1000 }
    );

    let hir = Parser::new().parse(b"a{20}").unwrap();
    assert_eq!(
        Compiler::new().size_limit(10).compile(&hir).unwrap_err(),
        BuildError::TooLarge { limit: 10 }
    );

    let hir = Parser::new().parse(b"a{9}").unwrap();
    assert_eq!(Compiler::new().size_limit(10).compile(&hir).unwrap().len(), 10);
}
