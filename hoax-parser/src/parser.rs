// hoax-parser - Reader for Hoax
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Recursive descent reader for Hoax source code.
//!
//! Converts tokens into expressions interned in an [`ExprStore`] and hands
//! back one top-level [`Handle`] per call.

use crate::error::{ReaderError, ReaderErrorKind};
use crate::expr::{Expr, ExprStore, Handle, Location, MAX_NESTING_DEPTH};
use crate::lexer::{Lexer, Token};

/// The reader converts tokens into stored expressions.
pub struct Reader<'a> {
    lexer: Lexer<'a>,
    current: Token,
    /// Where `current` starts.
    location: Location,
    /// Lists currently open.
    depth: usize,
}

impl<'a> Reader<'a> {
    /// Create a new reader for the given source code.
    pub fn new(source: &'a str) -> Result<Self, ReaderError> {
        let mut lexer = Lexer::new(source);
        let (current, location) = lexer.next_token()?;
        Ok(Reader {
            lexer,
            current,
            location,
            depth: 0,
        })
    }

    /// Read a single top-level expression into `store`.
    /// Returns None if at end of input.
    pub fn read_expr(&mut self, store: &mut ExprStore) -> Result<Option<Handle>, ReaderError> {
        if matches!(self.current, Token::Eof) {
            return Ok(None);
        }
        self.read_form(store).map(Some)
    }

    /// Read every remaining expression into `store`.
    pub fn read_all(&mut self, store: &mut ExprStore) -> Result<Vec<Handle>, ReaderError> {
        let mut forms = Vec::new();
        while let Some(form) = self.read_expr(store)? {
            forms.push(form);
        }
        Ok(forms)
    }

    /// Read a string and return all of its expressions (convenience function).
    pub fn read_all_str(source: &str, store: &mut ExprStore) -> Result<Vec<Handle>, ReaderError> {
        Reader::new(source)?.read_all(store)
    }

    /// Read a string and return its first expression (convenience function).
    pub fn read_str(source: &str, store: &mut ExprStore) -> Result<Option<Handle>, ReaderError> {
        Reader::new(source)?.read_expr(store)
    }

    // ========================================================================
    // Internal reading methods
    // ========================================================================

    fn advance(&mut self) -> Result<Token, ReaderError> {
        let (next, location) = self.lexer.next_token()?;
        self.location = location;
        Ok(std::mem::replace(&mut self.current, next))
    }

    fn read_form(&mut self, store: &mut ExprStore) -> Result<Handle, ReaderError> {
        let start = self.location;
        match self.advance()? {
            Token::Int(n) => Ok(store.intern_at(Expr::Integer(n), start)),
            Token::Symbol(name) => {
                let sym = store.intern_symbol(&name);
                Ok(store.intern_at(Expr::Symbol(sym), start))
            }
            Token::LParen => {
                if self.depth == MAX_NESTING_DEPTH {
                    return Err(ReaderError::new(ReaderErrorKind::TooDeep, start));
                }
                self.depth += 1;
                let list = self.read_list(store, start);
                self.depth -= 1;
                list
            }
            Token::RParen => Err(ReaderError::new(
                ReaderErrorKind::UnexpectedClosingParen,
                start,
            )),
            Token::Eof => Err(ReaderError::new(
                ReaderErrorKind::UnexpectedEof { open: start },
                start,
            )),
        }
    }

    /// Read list elements up to the closing paren. `(` is already consumed.
    fn read_list(&mut self, store: &mut ExprStore, open: Location) -> Result<Handle, ReaderError> {
        let mut items = Vec::new();
        loop {
            match self.current {
                Token::RParen => {
                    self.advance()?;
                    break;
                }
                Token::Eof => {
                    return Err(ReaderError::new(
                        ReaderErrorKind::UnexpectedEof { open },
                        self.location,
                    ));
                }
                _ => items.push(self.read_form(store)?),
            }
        }

        // () reads as the canonical nil
        if items.is_empty() {
            return Ok(Handle::NIL);
        }

        // Build back to front so every cell gets the list's location
        let mut tail = Handle::NIL;
        for &item in items.iter().rev() {
            tail = store.intern_at(Expr::Cons { car: item, cdr: tail }, open);
        }
        Ok(tail)
    }
}

// ============================================================================
// Tests
// ============================================================================
