//! Splits filter text into tags, attribute tests, keywords and parentheses.
//!
//! Words run to the next whitespace or parenthesis. Quotes may appear anywhere
//! in a word and protect spaces; a quoted keyword is an ordinary word.

use std::iter::Peekable;
use std::str::Chars;

/// A problem found while splitting the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexerError {
    /// What went wrong.
    pub message: String,
    /// Byte offset of the word containing the problem.
    pub position: usize,
}

impl std::fmt::Display for LexerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at position {}", self.message, self.position)
    }
}

impl std::error::Error for LexerError {}

/// Tokens plus any lexing problems.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexerResult {
    /// Tokens in input order.
    pub tokens: Vec<PositionedToken>,
    /// Any errors encountered (unterminated quotes).
    pub errors: Vec<LexerError>,
}

/// A token and the byte offset where it starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionedToken {
    /// Token kind and payload.
    pub token: FilterToken,
    /// Byte offset into the filter text.
    pub position: usize,
}

/// A token in a filter expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterToken {
    // ==================== Operators ====================
    /// The `and` keyword.
    And,

    /// The `or` keyword.
    Or,

    /// The `not` keyword or `!`.
    Not,

    /// Opening parenthesis `(`.
    OpenParen,

    /// Closing parenthesis `)`.
    CloseParen,

    // ==================== Leaves ====================
    /// A tag test: `+name` (include) or `-name` (exclude).
    Tag { include: bool, name: String },

    /// An attribute comparison: `name[.modifier]:value`.
    Attribute {
        name: String,
        modifier: Option<String>,
        value: String,
    },

    /// Any other word; never valid in a filter.
    Word(String),
}

impl std::fmt::Display for FilterToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FilterToken::And => f.write_str("and"),
            FilterToken::Or => f.write_str("or"),
            FilterToken::Not => f.write_str("not"),
            FilterToken::OpenParen => f.write_str("("),
            FilterToken::CloseParen => f.write_str(")"),
            FilterToken::Tag { include, name } => {
                write!(f, "{}{}", if *include { '+' } else { '-' }, name)
            }
            FilterToken::Attribute {
                name,
                modifier,
                value,
            } => match modifier {
                Some(m) => write!(f, "{name}.{m}:{value}"),
                None => write!(f, "{name}:{value}"),
            },
            FilterToken::Word(w) => f.write_str(w),
        }
    }
}

/// Filter lexer over a borrowed string.
pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    /// Byte offset of the next unread character.
    position: usize,
    /// Problems collected so far.
    errors: Vec<LexerError>,
}

impl<'a> Lexer<'a> {
    /// Starts lexing `input` from offset 0.
    pub fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
            position: 0,
            errors: Vec::new(),
        }
    }

    fn peek(&mut self) -> Option<&char> {
        self.chars.peek()
    }

    /// Advances one character, tracking the byte offset.
    fn next_char(&mut self) -> Option<char> {
        let c = self.chars.next();
        if let Some(ch) = c {
            self.position += ch.len_utf8();
        }
        c
    }

    fn skip_whitespace(&mut self) {
        while let Some(&c) = self.peek() {
            if c.is_whitespace() {
                self.next_char();
            } else {
                break;
            }
        }
    }

    /// Reads a quoted section (single or double quotes) into `out`.
    ///
    /// Returns false if the closing quote is missing.
    fn read_quoted(&mut self, quote_char: char, out: &mut String) -> bool {
        self.next_char();

        while let Some(c) = self.next_char() {
            if c == quote_char {
                return true;
            }
            if c == '\\' {
                if let Some(escaped) = self.next_char() {
                    out.push(escaped);
                }
            } else {
                out.push(c);
            }
        }
        false
    }

    /// Reads a word up to whitespace or a parenthesis; quotes may span spaces.
    ///
    /// Returns the text and whether any part of it was quoted.
    fn read_word(&mut self, start: usize) -> (String, bool) {
        let mut word = String::new();
        let mut quoted = false;
        while let Some(&c) = self.peek() {
            if c.is_whitespace() || c == '(' || c == ')' {
                break;
            }
            if c == '"' || c == '\'' {
                quoted = true;
                if !self.read_quoted(c, &mut word) {
                    self.errors.push(LexerError {
                        message: "unterminated quote".to_string(),
                        position: start,
                    });
                    break;
                }
                continue;
            }
            word.push(c);
            self.next_char();
        }
        (word, quoted)
    }

    /// Reads one token; `None` once only whitespace remains.
    pub fn next_token(&mut self) -> Option<PositionedToken> {
        self.skip_whitespace();

        let c = *self.peek()?;
        let token_start = self.position;

        let token = match c {
            '(' => {
                self.next_char();
                FilterToken::OpenParen
            }
            ')' => {
                self.next_char();
                FilterToken::CloseParen
            }
            '!' => {
                self.next_char();
                FilterToken::Not
            }
            _ => {
                let (word, quoted) = self.read_word(token_start);
                classify(word, quoted)
            }
        };

        Some(PositionedToken {
            token,
            position: token_start,
        })
    }

    /// Token kinds only, for tests.
    #[cfg(test)]
    pub fn tokenize(self) -> Vec<FilterToken> {
        self.tokenize_with_errors()
            .tokens
            .into_iter()
            .map(|pt| pt.token)
            .collect()
    }

    /// Runs the lexer to the end of the input.
    pub fn tokenize_with_errors(mut self) -> LexerResult {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token() {
            tokens.push(token);
        }
        LexerResult {
            tokens,
            errors: self.errors,
        }
    }
}

/// Returns true if the text is a valid attribute name.
fn is_attribute_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Decides what kind of token a word is.
fn classify(word: String, quoted: bool) -> FilterToken {
    if !quoted {
        match word.to_ascii_lowercase().as_str() {
            "and" => return FilterToken::And,
            "or" => return FilterToken::Or,
            "not" => return FilterToken::Not,
            _ => {}
        }
    }

    if let Some(rest) = word.strip_prefix('+').or_else(|| word.strip_prefix('-')) {
        if !rest.is_empty() && !rest.contains(':') {
            return FilterToken::Tag {
                include: word.starts_with('+'),
                name: rest.to_string(),
            };
        }
    }

    if let Some((head, value)) = word.split_once(':') {
        let (name, modifier) = match head.split_once('.') {
            Some((n, m)) => (n, Some(m)),
            None => (head, None),
        };
        if is_attribute_name(name) && modifier.map_or(true, is_attribute_name) {
            return FilterToken::Attribute {
                name: name.to_string(),
                modifier: modifier.map(str::to_string),
                value: value.to_string(),
            };
        }
    }

    FilterToken::Word(word)
}
