//! Wildcard pattern compilation and matching.
//!
//! # Grammar
//! - `*` matches zero or more characters, excluding `/`
//! - `**` matches zero or more characters, including `/`
//! - `\` makes the next character literal
//! - anything else matches itself
//!
//! # Design Decisions
//! - Wildcards are lazy: the shortest capture that lets the rest match wins
//! - Captures are addressed by a single digit; `0` is the whole input
//! - No regex; matching memoizes failed positions, so hostile request
//!   names cost polynomial time in the worst case

use std::collections::HashSet;
use std::fmt;

/// Number of addressable capture slots (`0`..=`9`).
const SLOTS: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Literal(String),
    /// `*`
    Segment,
    /// `**`
    Path,
}

/// A compiled wildcard pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WildcardPattern {
    source: String,
    tokens: Vec<Token>,
}

/// Substrings captured by a successful match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Captures {
    slots: [Option<String>; SLOTS],
}

impl Captures {
    /// The capture for `index` (`'0'`..=`'9'`).
    pub fn get(&self, index: char) -> Option<&str> {
        let slot = index.to_digit(10)? as usize;
        self.slots.get(slot)?.as_deref()
    }

    /// Number of wildcard captures, excluding the whole-input slot.
    pub fn len(&self) -> usize {
        self.slots[1..].iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// True if `pattern` contains a wildcard.
pub fn is_wildcard(pattern: &str) -> bool {
    pattern.contains('*')
}

impl WildcardPattern {
    pub fn compile(pattern: &str) -> Self {
        let mut tokens = Vec::new();
        let mut literal = String::new();
        let mut chars = pattern.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '\\' => match chars.next() {
                    Some(escaped) => literal.push(escaped),
                    None => literal.push('\\'),
                },
                '*' => {
                    if !literal.is_empty() {
                        tokens.push(Token::Literal(std::mem::take(&mut literal)));
                    }
                    if chars.peek() == Some(&'*') {
                        chars.next();
                        tokens.push(Token::Path);
                    } else {
                        tokens.push(Token::Segment);
                    }
                }
                other => literal.push(other),
            }
        }
        if !literal.is_empty() {
            tokens.push(Token::Literal(literal));
        }

        Self {
            source: pattern.to_string(),
            tokens,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Match the whole of `input`, returning its captures.
    pub fn matches(&self, input: &str) -> Option<Captures> {
        let mut matcher = Matcher::new(&self.tokens, input);
        if !matcher.run(0, 0) {
            return None;
        }
        let found = matcher.found;
        let mut captures = Captures::default();
        captures.slots[0] = Some(input.to_string());
        for (slot, value) in captures.slots[1..].iter_mut().zip(found) {
            *slot = Some(value.to_string());
        }
        Some(captures)
    }
}

impl fmt::Display for WildcardPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Backtracking matcher state for one input.
///
/// Whether the tokens from `index` on match the input from `offset` on does
/// not depend on how that position was reached, so failed positions are
/// remembered and never explored twice. This bounds a lookup by
/// tokens × input length × input length.
struct Matcher<'p, 'i> {
    tokens: &'p [Token],
    input: &'i str,
    found: Vec<&'i str>,
    failed: HashSet<(usize, usize)>,
}

impl<'p, 'i> Matcher<'p, 'i> {
    fn new(tokens: &'p [Token], input: &'i str) -> Self {
        Self {
            tokens,
            input,
            found: Vec::new(),
            failed: HashSet::new(),
        }
    }

    fn run(&mut self, index: usize, offset: usize) -> bool {
        if self.failed.contains(&(index, offset)) {
            return false;
        }
        let matched = self.step(index, offset);
        if !matched {
            self.failed.insert((index, offset));
        }
        matched
    }

    fn step(&mut self, index: usize, offset: usize) -> bool {
        let (tokens, input) = (self.tokens, self.input);
        let Some(token) = tokens.get(index) else {
            return offset == input.len();
        };

        match token {
            Token::Literal(literal) => {
                input[offset..].starts_with(literal.as_str())
                    && self.run(index + 1, offset + literal.len())
            }
            Token::Segment | Token::Path => {
                let crosses_slash = *token == Token::Path;
                let mut end = offset;
                loop {
                    self.found.push(&input[offset..end]);
                    if self.run(index + 1, end) {
                        return true;
                    }
                    self.found.pop();

                    let Some(next) = input[end..].chars().next() else {
                        return false;
                    };
                    if next == '/' && !crosses_slash {
                        return false;
                    }
                    end += next.len_utf8();
                }
            }
        }
    }
}
