//! Hand-rolled recursive-descent parser turning regex surface syntax into [`NfaBuilder`]
//! operations. No external regex-syntax crate is used: the grammar is small and the fragment
//! composition feature (mixing literal text with pre-built NFA fragments) doesn't map cleanly
//! onto a general-purpose AST anyway.

use crate::internal::char_class::CharClass;
use crate::internal::nfa::NfaBuilder;
use std::iter::Peekable;
use std::str::Chars;

/// A parse error. The grammar only ever produces one kind of failure; callers distinguish cases
/// by message, matching the spec's single-kind `RegExpError`.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{0}")]
pub(crate) struct RegExpError(pub(crate) String);

fn err(msg: impl Into<String>) -> RegExpError {
    RegExpError(msg.into())
}

/// One element of a composable pattern sequence: either literal regex text or a pre-built
/// fragment that behaves, syntactically, like a single parenthesized atom.
pub(crate) enum FragmentPart {
    Text(String),
    Fragment(NfaBuilder),
}

/// Private-use code points stand in for fragment placeholders while the unified text is
/// tokenized, so fragments flow through the ordinary atom/postfix/group machinery for free.
const PLACEHOLDER_BASE: u32 = 0xE000;
const PLACEHOLDER_MAX: u32 = 0xF8FF;

/// Parses a plain regex string.
pub(crate) fn parse(pattern: &str) -> Result<NfaBuilder, RegExpError> {
    let mut parser = Parser {
        chars: pattern.chars().peekable(),
        fragments: Vec::new(),
    };
    let result = parser.parse_alternation(0)?;
    if parser.chars.peek().is_some() {
        return Err(err(format!(
            "unexpected character '{}' (unbalanced group?)",
            parser.chars.peek().unwrap()
        )));
    }
    Ok(result)
}

/// Parses a composable sequence of literal text and pre-built fragments, as if the whole sequence
/// were wrapped in one outer group.
pub(crate) fn parse_fragments(parts: Vec<FragmentPart>) -> Result<NfaBuilder, RegExpError> {
    let mut unified = String::new();
    let mut fragments = Vec::new();
    for part in parts {
        match part {
            FragmentPart::Text(t) => unified.push_str(&t),
            FragmentPart::Fragment(f) => {
                let code = PLACEHOLDER_BASE + fragments.len() as u32;
                if code > PLACEHOLDER_MAX {
                    return Err(err("too many composed fragments in one pattern sequence"));
                }
                unified.push(char::from_u32(code).expect("within BMP private-use range"));
                fragments.push(f);
            }
        }
    }
    let mut parser = Parser {
        chars: unified.chars().peekable(),
        fragments,
    };
    let result = parser.parse_alternation(0)?;
    if parser.chars.peek().is_some() {
        return Err(err("unexpected trailing character (unbalanced group?)"));
    }
    Ok(result)
}

struct Parser<'a> {
    chars: Peekable<Chars<'a>>,
    fragments: Vec<NfaBuilder>,
}

impl<'a> Parser<'a> {
    /// Parses `a|b|c|...` at the current group depth. A single operand is returned unwrapped; two
    /// or more become an n-ary branch.
    fn parse_alternation(&mut self, depth: u32) -> Result<NfaBuilder, RegExpError> {
        let mut operands = vec![self.parse_concat(depth)?];
        while self.chars.peek() == Some(&'|') {
            self.chars.next();
            operands.push(self.parse_concat(depth)?);
        }
        Ok(NfaBuilder::branch(operands))
    }

    fn parse_concat(&mut self, depth: u32) -> Result<NfaBuilder, RegExpError> {
        let mut result = NfaBuilder::new();
        loop {
            match self.chars.peek() {
                None => break,
                Some('|') => break,
                Some(')') if depth > 0 => break,
                _ => {
                    let unit = self.parse_repeat_unit(depth)?;
                    result.append(unit);
                }
            }
        }
        Ok(result)
    }

    /// Parses one atom, then an optional postfix `* + ? {m,n}` applying only to that atom.
    fn parse_repeat_unit(&mut self, depth: u32) -> Result<NfaBuilder, RegExpError> {
        let atom = self.parse_atom(depth)?;
        match self.chars.peek() {
            Some('*') => {
                self.chars.next();
                let mut a = atom;
                a.any();
                Ok(a)
            }
            Some('+') => {
                self.chars.next();
                let mut a = atom;
                a.one_or_more();
                Ok(a)
            }
            Some('?') => {
                self.chars.next();
                let mut a = atom;
                a.unnecessary();
                Ok(a)
            }
            Some('{') => self.parse_counted_repeat(atom),
            _ => Ok(atom),
        }
    }

    fn parse_counted_repeat(&mut self, atom: NfaBuilder) -> Result<NfaBuilder, RegExpError> {
        self.chars.next(); // consume '{'
        let lo = self.parse_number()?;
        match self.chars.next() {
            Some('}') => {
                if lo == 0 {
                    return Err(err("illegal repetition count {0}"));
                }
                Ok(NfaBuilder::repeat(&atom, lo, lo))
            }
            Some(',') => {
                if self.chars.peek() == Some(&'}') {
                    self.chars.next();
                    return Ok(NfaBuilder::repeat_at_least(&atom, lo));
                }
                let hi = self.parse_number()?;
                match self.chars.next() {
                    Some('}') => {
                        if hi < lo {
                            return Err(err(format!("illegal repetition bounds {{{lo},{hi}}}: max < min")));
                        }
                        if lo == 0 && hi == 0 {
                            return Err(err("illegal repetition count {0,0}"));
                        }
                        Ok(NfaBuilder::repeat(&atom, lo, hi))
                    }
                    _ => Err(err("expected '}' closing repetition count")),
                }
            }
            _ => Err(err("expected ',' or '}' in repetition count")),
        }
    }

    fn parse_number(&mut self) -> Result<u32, RegExpError> {
        let mut digits = String::new();
        while let Some(c) = self.chars.peek() {
            if c.is_ascii_digit() {
                digits.push(*c);
                self.chars.next();
            } else {
                break;
            }
        }
        if digits.is_empty() {
            return Err(err("expected a number in repetition count"));
        }
        digits.parse::<u32>().map_err(|_| err("repetition count out of range"))
    }

    fn parse_atom(&mut self, depth: u32) -> Result<NfaBuilder, RegExpError> {
        let c = self.chars.next().ok_or_else(|| err("unexpected end of pattern"))?;
        let code = c as u32;
        if (PLACEHOLDER_BASE..=PLACEHOLDER_MAX).contains(&code) {
            let index = (code - PLACEHOLDER_BASE) as usize;
            return self
                .fragments
                .get(index)
                .cloned()
                .ok_or_else(|| err("internal fragment placeholder out of range"));
        }
        match c {
            '(' => {
                let inner = self.parse_alternation(depth + 1)?;
                match self.chars.next() {
                    Some(')') => Ok(inner),
                    _ => Err(err("unterminated group: expected ')'")),
                }
            }
            '.' => Ok(NfaBuilder::atom(CharClass::any())),
            '[' => self.parse_class(),
            '\\' => self.parse_escape(),
            ')' | '*' | '+' | '?' | '{' | '}' | '|' | ']' | '^' | '-' => {
                Err(err(format!("unexpected metacharacter '{c}' outside escape or class")))
            }
            _ => Ok(NfaBuilder::atom(CharClass::single(to_code_unit(c)?))),
        }
    }

    fn parse_escape(&mut self) -> Result<NfaBuilder, RegExpError> {
        let c = self.chars.next().ok_or_else(|| err("dangling '\\' at end of pattern"))?;
        if let Some(class) = predefined_escape_class(c) {
            return Ok(NfaBuilder::atom(class));
        }
        match c {
            '-' | '(' | ')' | '*' | '+' | '.' | '[' | ']' | '?' | '\\' | '^' | '{' | '}' | '|' => {
                Ok(NfaBuilder::atom(CharClass::single(to_code_unit(c)?)))
            }
            _ => Err(err(format!("illegal escape sequence '\\{c}'"))),
        }
    }

    fn parse_class(&mut self) -> Result<NfaBuilder, RegExpError> {
        let negate = if self.chars.peek() == Some(&'^') {
            self.chars.next();
            true
        } else {
            false
        };
        let mut class = CharClass::empty();
        let mut saw_member = false;
        loop {
            match self.chars.peek() {
                None => return Err(err("unterminated character class: expected ']'")),
                Some(']') => {
                    self.chars.next();
                    break;
                }
                Some('\\') => {
                    self.chars.next();
                    let c = self
                        .chars
                        .next()
                        .ok_or_else(|| err("dangling '\\' inside character class"))?;
                    if let Some(predefined) = predefined_escape_class(c) {
                        class = class.union(&predefined);
                    } else {
                        class = class.union(&CharClass::single(to_code_unit(c)?));
                    }
                    saw_member = true;
                }
                Some(_) => {
                    let lo = to_code_unit(self.chars.next().unwrap())?;
                    if self.chars.peek() == Some(&'-') {
                        let mut lookahead = self.chars.clone();
                        lookahead.next();
                        if lookahead.peek().is_some() && lookahead.peek() != Some(&']') {
                            self.chars.next(); // consume '-'
                            let hi = to_code_unit(self.chars.next().unwrap())?;
                            if hi < lo {
                                return Err(err(format!(
                                    "illegal character range '{}'-'{}': end before start",
                                    lo, hi
                                )));
                            }
                            class = class.union(&CharClass::from_range(
                                crate::internal::char_class::PlainCharRange::new(lo, hi),
                            ));
                            saw_member = true;
                            continue;
                        }
                    }
                    class = class.union(&CharClass::single(lo));
                    saw_member = true;
                }
            }
        }
        if !saw_member {
            return Err(err("empty character class '[]'"));
        }
        if negate {
            class = class.inverse();
        }
        Ok(NfaBuilder::atom(class))
    }
}

fn predefined_escape_class(c: char) -> Option<CharClass> {
    match c {
        'd' => Some(CharClass::digit()),
        'D' => Some(CharClass::digit().inverse()),
        'w' => Some(CharClass::word()),
        'W' => Some(CharClass::word().inverse()),
        's' => Some(CharClass::blank()),
        'S' => Some(CharClass::blank().inverse()),
        _ => None,
    }
}

fn to_code_unit(c: char) -> Result<u16, RegExpError> {
    u16::try_from(c as u32).map_err(|_| err(format!("character '{c}' outside the supported U+0000..U+FFFF alphabet")))
}
