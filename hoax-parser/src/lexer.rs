// hoax-parser - Lexer for Hoax
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Lexer (tokeniser) for Hoax source code.
//!
//! Converts a source string into a stream of tokens, each tagged with the
//! location where it starts.

use std::fmt;
use std::iter::Peekable;
use std::str::Chars;

use crate::error::{ReaderError, ReaderErrorKind};
use crate::expr::{Location, MAX_SYMBOL_LEN};

/// A token produced by the lexer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    LParen, // (
    RParen, // )
    Int(i64),
    Symbol(String),
    Eof,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::Int(n) => write!(f, "{}", n),
            Token::Symbol(s) => write!(f, "{}", s),
            Token::Eof => write!(f, "EOF"),
        }
    }
}

/// The lexer converts source code into tokens.
pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    line: u32,
    column: u32,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given source code.
    pub fn new(source: &'a str) -> Self {
        Lexer {
            chars: source.chars().peekable(),
            line: 1,
            column: 1,
        }
    }

    /// Get the next token and the location it starts at.
    pub fn next_token(&mut self) -> Result<(Token, Location), ReaderError> {
        self.skip_whitespace_and_comments();

        let start = self.location();
        let c = match self.peek() {
            Some(c) => c,
            None => return Ok((Token::Eof, start)),
        };

        let token = match c {
            '(' => {
                self.advance();
                Token::LParen
            }
            ')' => {
                self.advance();
                Token::RParen
            }
            '-' => self.read_negative_or_symbol(start)?,
            '0'..='9' => self.read_integer(String::new(), start)?,
            _ if is_symbol_char(c) => self.read_symbol(String::new(), start)?,
            _ => return Err(self.error(ReaderErrorKind::UnexpectedCharacter(c))),
        };
        Ok((token, start))
    }

    /// Collect all tokens into a vector.
    pub fn tokenize(&mut self) -> Result<Vec<Token>, ReaderError> {
        let mut tokens = Vec::new();
        loop {
            let (token, _) = self.next_token()?;
            if matches!(token, Token::Eof) {
                break;
            }
            tokens.push(token);
        }
        Ok(tokens)
    }

    /// The location of the next unread character.
    pub fn location(&self) -> Location {
        Location::new(self.line, self.column)
    }

    // ========================================================================
    // Internal helpers
    // ========================================================================

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.chars.next();
        if let Some(ch) = c {
            if ch == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        c
    }

    fn error(&self, kind: ReaderErrorKind) -> ReaderError {
        ReaderError::new(kind, self.location())
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.advance();
                }
                Some(';') => {
                    // Skip to end of line
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                _ => break,
            }
        }
    }

    fn read_negative_or_symbol(&mut self, start: Location) -> Result<Token, ReaderError> {
        self.advance(); // consume -
        match self.peek() {
            Some(c) if c.is_ascii_digit() => self.read_integer("-".into(), start),
            _ => self.read_symbol("-".into(), start),
        }
    }

    fn read_integer(&mut self, mut digits: String, start: Location) -> Result<Token, ReaderError> {
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                digits.push(c);
                self.advance();
            } else if is_symbol_char(c) {
                return Err(self.error(ReaderErrorKind::UnexpectedCharacter(c)));
            } else {
                break;
            }
        }

        digits
            .parse::<i64>()
            .map(Token::Int)
            .map_err(|_| ReaderError::new(ReaderErrorKind::IntegerOutOfRange(digits), start))
    }

    fn read_symbol(&mut self, mut name: String, start: Location) -> Result<Token, ReaderError> {
        while let Some(c) = self.peek() {
            if is_symbol_char(c) {
                name.push(c);
                self.advance();
            } else {
                break;
            }
        }

        if name.len() > MAX_SYMBOL_LEN {
            return Err(ReaderError::new(
                ReaderErrorKind::SymbolTooLong(name.len()),
                start,
            ));
        }
        Ok(Token::Symbol(name))
    }
}

/// Check if a character can appear in a symbol.
fn is_symbol_char(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || matches!(
            c,
            '?' | '!'
                | '.'
                | '+'
                | '-'
                | '*'
                | '/'
                | '<'
                | '='
                | '>'
                | ':'
                | '$'
                | '%'
                | '^'
                | '&'
                | '_'
                | '~'
        )
}

// ============================================================================
// Tests
// ============================================================================
