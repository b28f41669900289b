/*! A hand-written recursive-descent parser for regular expressions.

The grammar accepted by the parser is:

```text
alternation := concat ('|' concat)*
concat      := term*
term        := atom quantifier?
quantifier  := '*' | '+' | '?' | '{' min? (',' max?)? '}'
atom        := literal | '.' | '^' | '$' | '\' escape | '[' class ']'
             | '(' alternation ')' | '(?:' alternation ')'
             | '(?P<' name '>' alternation ')'
```

The parser looks one byte ahead at most, except when deciding whether a `{`
that doesn't follow an atom is a misplaced quantifier or a literal brace.
*/

use crate::errors::{ParseError, ParseErrorKind};
use crate::re::hir::{
    ByteRange, ClassBytes, Group, Hir, Look, PerlClass, PerlClassKind,
};

/// Maximum nesting level for groups.
const MAX_NESTING: u32 = 256;

/// A regular expression parser.
///
/// Takes the source of a regular expression and produces its corresponding
/// [`Hir`].
pub(crate) struct Parser {
    case_insensitive: bool,
    dot_matches_new_line: bool,
    multi_line: bool,
}

impl Parser {
    pub fn new() -> Self {
        Self {
            case_insensitive: false,
            dot_matches_new_line: false,
            multi_line: false,
        }
    }

    /// ASCII letters in literals and classes match both cases.
    pub fn case_insensitive(mut self, yes: bool) -> Self {
        self.case_insensitive = yes;
        self
    }

    /// If true, the dot (`.`) matches newline characters too.
    pub fn dot_matches_new_line(mut self, yes: bool) -> Self {
        self.dot_matches_new_line = yes;
        self
    }

    /// If true, `^` and `$` match at line boundaries.
    pub fn multi_line(mut self, yes: bool) -> Self {
        self.multi_line = yes;
        self
    }

    /// Parses the regexp and returns its HIR.
    pub fn parse(&self, pattern: &[u8]) -> Result<Hir, ParseError> {
        let mut state = ParserState {
            parser: self,
            pattern,
            pos: 0,
            depth: 0,
            next_capture: 1,
        };

        let hir = state.alternation()?;

        // The only way `alternation` can return before the end of the
        // pattern is finding a closing parenthesis without its opening
        // counterpart.
        if state.pos < pattern.len() {
            return Err(state.error(ParseErrorKind::UnbalancedParenthesis));
        }

        Ok(hir)
    }
}

/// Either a single byte or a set of bytes, as found inside a class.
enum ClassItem {
    Byte(u8),
    Set(ClassBytes),
}

struct ParserState<'a> {
    parser: &'a Parser,
    pattern: &'a [u8],
    pos: usize,
    depth: u32,
    next_capture: u32,
}

impl<'a> ParserState<'a> {
    #[inline]
    fn peek(&self) -> Option<u8> {
        self.pattern.get(self.pos).copied()
    }

    #[inline]
    fn peek_at(&self, n: usize) -> Option<u8> {
        self.pattern.get(self.pos + n).copied()
    }

    #[inline]
    fn bump(&mut self) -> Option<u8> {
        let byte = self.peek()?;
        self.pos += 1;
        Some(byte)
    }

    fn eat(&mut self, byte: u8) -> bool {
        if self.peek() == Some(byte) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn error(&self, kind: ParseErrorKind) -> ParseError {
        ParseError::new(kind, self.pos)
    }

    fn error_at(&self, kind: ParseErrorKind, offset: usize) -> ParseError {
        ParseError::new(kind, offset)
    }

    fn alternation(&mut self) -> Result<Hir, ParseError> {
        let mut alternatives = vec![self.concat()?];
        while self.eat(b'|') {
            alternatives.push(self.concat()?);
        }
        Ok(Hir::alternation(alternatives))
    }

    fn concat(&mut self) -> Result<Hir, ParseError> {
        let mut items = Vec::new();
        while !matches!(self.peek(), None | Some(b'|') | Some(b')')) {
            items.push(self.term()?);
        }
        Ok(Hir::concat(items))
    }

    fn term(&mut self) -> Result<Hir, ParseError> {
        let atom = self.atom()?;

        let quantifier_start = self.pos;
        let (min, max) = match self.peek() {
            Some(b'*') => {
                self.bump();
                (0, None)
            }
            Some(b'+') => {
                self.bump();
                (1, None)
            }
            Some(b'?') => {
                self.bump();
                (0, Some(1))
            }
            Some(b'{') => self.counted_repetition()?,
            _ => return Ok(atom),
        };

        if matches!(atom, Hir::Look(_)) {
            return Err(self.error_at(
                ParseErrorKind::NothingToRepeat,
                quantifier_start,
            ));
        }

        if self.peek() == Some(b'?') {
            return Err(self.error(ParseErrorKind::UnsupportedLazyQuantifier));
        }

        Ok(Hir::repetition(atom, min, max))
    }

    /// Parses `{min,max}`, `{min,}`, `{,max}` or `{n}`. The current
    /// position must be at the opening brace.
    fn counted_repetition(
        &mut self,
    ) -> Result<(u32, Option<u32>), ParseError> {
        let open = self.pos;
        self.bump();

        let min = self.decimal()?;
        let (min, max) = if self.eat(b',') {
            let max = self.decimal()?;
            (min.unwrap_or(0), max)
        } else {
            match min {
                Some(n) => (n, Some(n)),
                None => {
                    return Err(
                        self.error_at(ParseErrorKind::InvalidQuantifier, open)
                    )
                }
            }
        };

        match self.bump() {
            Some(b'}') => {}
            Some(_) => {
                return Err(
                    self.error_at(ParseErrorKind::InvalidQuantifier, open)
                )
            }
            None => {
                return Err(self.error(ParseErrorKind::UnexpectedEnd));
            }
        }

        if matches!(max, Some(max) if max < min) {
            return Err(self.error_at(ParseErrorKind::InvalidQuantifier, open));
        }

        Ok((min, max))
    }

    /// Parses a decimal number, if any.
    fn decimal(&mut self) -> Result<Option<u32>, ParseError> {
        let start = self.pos;
        let mut value: u32 = 0;
        while let Some(digit @ b'0'..=b'9') = self.peek() {
            value = value
                .checked_mul(10)
                .and_then(|v| v.checked_add((digit - b'0') as u32))
                .ok_or_else(|| {
                    self.error_at(ParseErrorKind::InvalidQuantifier, start)
                })?;
            self.bump();
        }
        Ok(if self.pos > start { Some(value) } else { None })
    }

    /// Returns true if the text at the current position has the form of a
    /// counted repetition.
    fn looks_like_counted_repetition(&self) -> bool {
        let rest = &self.pattern[self.pos..];
        let Some(close) = rest.iter().position(|b| *b == b'}') else {
            return false;
        };
        let inner = &rest[1..close];
        !inner.is_empty()
            && inner.iter().all(|b| b.is_ascii_digit() || *b == b',')
            && inner.iter().filter(|b| **b == b',').count() <= 1
            && inner != b","
    }

    fn atom(&mut self) -> Result<Hir, ParseError> {
        let start = self.pos;
        let byte = self.peek().ok_or_else(|| {
            self.error(ParseErrorKind::UnexpectedEnd)
        })?;

        match byte {
            b'(' => self.group(),
            b'[' => self.class(),
            b'\\' => self.escape(),
            b'.' => {
                self.bump();
                if self.parser.dot_matches_new_line {
                    Ok(Hir::AnyByte)
                } else {
                    Ok(Hir::Class(ClassBytes::any_except_newline()))
                }
            }
            b'^' => {
                self.bump();
                Ok(Hir::Look(if self.parser.multi_line {
                    Look::StartLine
                } else {
                    Look::StartText
                }))
            }
            b'$' => {
                self.bump();
                Ok(Hir::Look(if self.parser.multi_line {
                    Look::EndLine
                } else {
                    Look::EndTextOrFinalNewline
                }))
            }
            b'*' | b'+' | b'?' => {
                Err(self.error_at(ParseErrorKind::NothingToRepeat, start))
            }
            b'{' if self.looks_like_counted_repetition() => {
                Err(self.error_at(ParseErrorKind::NothingToRepeat, start))
            }
            _ => {
                self.bump();
                Ok(self.literal(byte))
            }
        }
    }

    fn literal(&self, byte: u8) -> Hir {
        if self.parser.case_insensitive && byte.is_ascii_alphabetic() {
            Hir::Class(ClassBytes::new([
                ByteRange::new(
                    byte.to_ascii_uppercase(),
                    byte.to_ascii_uppercase(),
                ),
                ByteRange::new(
                    byte.to_ascii_lowercase(),
                    byte.to_ascii_lowercase(),
                ),
            ]))
        } else {
            Hir::Literal(byte)
        }
    }

    fn group(&mut self) -> Result<Hir, ParseError> {
        let open = self.pos;
        self.bump();

        let (index, name) = if self.eat(b'?') {
            match self.bump() {
                Some(b':') => (None, None),
                Some(b'P') if self.eat(b'<') => {
                    let name = self.group_name()?;
                    (Some(self.new_capture_index()), Some(name))
                }
                Some(_) => {
                    return Err(
                        self.error_at(ParseErrorKind::UnsupportedGroup, open)
                    )
                }
                None => return Err(self.error(ParseErrorKind::UnexpectedEnd)),
            }
        } else {
            (Some(self.new_capture_index()), None)
        };

        self.depth += 1;
        if self.depth > MAX_NESTING {
            return Err(self.error_at(ParseErrorKind::NestingTooDeep, open));
        }

        let sub = self.alternation()?;

        if !self.eat(b')') {
            return Err(
                self.error_at(ParseErrorKind::UnbalancedParenthesis, open)
            );
        }

        self.depth -= 1;

        Ok(Hir::Group(Group { index, name, sub: Box::new(sub) }))
    }

    fn new_capture_index(&mut self) -> u32 {
        let index = self.next_capture;
        self.next_capture += 1;
        index
    }

    /// Parses the name in `(?P<name>...)`, including the closing `>`.
    fn group_name(&mut self) -> Result<String, ParseError> {
        let start = self.pos;
        loop {
            match self.bump() {
                Some(b'>') => break,
                Some(b) if b == b'_' || b.is_ascii_alphanumeric() => {}
                Some(_) => {
                    return Err(
                        self.error_at(ParseErrorKind::UnsupportedGroup, start)
                    )
                }
                None => return Err(self.error(ParseErrorKind::UnexpectedEnd)),
            }
        }
        let name = &self.pattern[start..self.pos - 1];
        if name.is_empty() || name[0].is_ascii_digit() {
            return Err(self.error_at(ParseErrorKind::UnsupportedGroup, start));
        }
        Ok(String::from_utf8_lossy(name).into_owned())
    }

    fn escape(&mut self) -> Result<Hir, ParseError> {
        let start = self.pos;
        self.bump();

        let byte = self
            .bump()
            .ok_or_else(|| self.error(ParseErrorKind::UnexpectedEnd))?;

        let perl = |kind, negated| Ok(Hir::Perl(PerlClass { kind, negated }));

        match byte {
            b'd' => perl(PerlClassKind::Digit, false),
            b'D' => perl(PerlClassKind::Digit, true),
            b'w' => perl(PerlClassKind::Word, false),
            b'W' => perl(PerlClassKind::Word, true),
            b's' => perl(PerlClassKind::Space, false),
            b'S' => perl(PerlClassKind::Space, true),
            b'b' => Ok(Hir::Look(Look::WordBoundary)),
            b'B' => Ok(Hir::Look(Look::NotWordBoundary)),
            b'A' => Ok(Hir::Look(Look::StartText)),
            b'Z' => Ok(Hir::Look(Look::EndText)),
            // Back-references can't be matched by a finite automaton.
            b'1'..=b'9' => {
                Err(self.error_at(ParseErrorKind::InvalidEscape, start))
            }
            _ => {
                let byte = self.escaped_byte(byte, start)?;
                Ok(self.literal(byte))
            }
        }
    }

    /// Translates escape sequences that represent a single byte, like `\n`
    /// or `\x41`. `byte` is the byte that follows the backslash. Any byte
    /// without a special meaning represents itself.
    fn escaped_byte(
        &mut self,
        byte: u8,
        start: usize,
    ) -> Result<u8, ParseError> {
        Ok(match byte {
            b'n' => b'\n',
            b't' => b'\t',
            b'r' => b'\r',
            b'f' => 0x0C,
            b'v' => 0x0B,
            b'a' => 0x07,
            b'0' => 0x00,
            b'x' => {
                let hex = self.pattern.get(self.pos..self.pos + 2);
                let value = hex
                    .and_then(|hex| std::str::from_utf8(hex).ok())
                    .and_then(|hex| u8::from_str_radix(hex, 16).ok())
                    .ok_or_else(|| {
                        self.error_at(ParseErrorKind::InvalidEscape, start)
                    })?;
                self.pos += 2;
                value
            }
            other => other,
        })
    }

    fn class(&mut self) -> Result<Hir, ParseError> {
        let open = self.pos;
        self.bump();

        let negated = self.eat(b'^');
        let mut class = ClassBytes::default();
        let mut first = true;

        loop {
            match self.peek() {
                None => {
                    return Err(self.error_at(ParseErrorKind::UnclosedClass, open))
                }
                Some(b']') if !first => {
                    self.bump();
                    break;
                }
                _ => {}
            }

            first = false;

            let item_start = self.pos;
            let lo = match self.class_item(open)? {
                ClassItem::Byte(b) => b,
                ClassItem::Set(set) => {
                    class.union(&set);
                    continue;
                }
            };

            // A dash is a range operator unless it's the last byte in the
            // class, as in `[a-]`.
            if self.peek() == Some(b'-')
                && !matches!(self.peek_at(1), Some(b']') | None)
            {
                self.bump();
                let hi = match self.class_item(open)? {
                    ClassItem::Byte(b) => b,
                    ClassItem::Set(_) => {
                        return Err(self.error_at(
                            ParseErrorKind::InvalidClass,
                            item_start,
                        ))
                    }
                };
                if hi < lo {
                    return Err(
                        self.error_at(ParseErrorKind::InvalidClass, item_start)
                    );
                }
                class.push(ByteRange::new(lo, hi));
            } else {
                class.push(ByteRange::new(lo, lo));
            }
        }

        if self.parser.case_insensitive {
            class.case_fold();
        }

        if negated {
            class.negate();
        }

        // A class that can't match any byte, like `[^\x00-\xff]`.
        if class.is_empty() {
            return Err(self.error_at(ParseErrorKind::InvalidClass, open));
        }

        Ok(Hir::Class(class))
    }

    fn class_item(&mut self, open: usize) -> Result<ClassItem, ParseError> {
        let start = self.pos;
        let byte = self
            .bump()
            .ok_or_else(|| self.error_at(ParseErrorKind::UnclosedClass, open))?;

        if byte != b'\\' {
            return Ok(ClassItem::Byte(byte));
        }

        let escaped = self
            .bump()
            .ok_or_else(|| self.error_at(ParseErrorKind::UnclosedClass, open))?;

        let perl = |kind, negated| {
            Ok(ClassItem::Set(PerlClass { kind, negated }.to_class()))
        };

        match escaped {
            b'd' => perl(PerlClassKind::Digit, false),
            b'D' => perl(PerlClassKind::Digit, true),
            b'w' => perl(PerlClassKind::Word, false),
            b'W' => perl(PerlClassKind::Word, true),
            b's' => perl(PerlClassKind::Space, false),
            b'S' => perl(PerlClassKind::Space, true),
            // Inside a class `\b` means backspace.
            b'b' => Ok(ClassItem::Byte(0x08)),
            _ => Ok(ClassItem::Byte(self.escaped_byte(escaped, start)?)),
        }
    }
}
