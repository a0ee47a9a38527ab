// hoax-parser - Expression store and reader for the Hoax language
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! # hoax-parser
//!
//! The expression store shared by the Hoax reader, compiler and VM, plus the
//! reader that fills it from source text.
//!
//! ```
//! use hoax_parser::{ExprStore, Reader};
//!
//! let mut store = ExprStore::new();
//! let form = Reader::read_str("(+ 1 2)", &mut store).unwrap().unwrap();
//! assert_eq!(store.list_length(form), 3);
//! ```

pub mod error;
pub mod expr;
pub mod lexer;
pub mod parser;

pub use error::{ReaderError, ReaderErrorKind};
pub use expr::{
    Expr, ExprDisplay, ExprStore, Handle, Location, MAX_NESTING_DEPTH, MAX_SYMBOL_LEN, Native,
    NativeCtx, NativeFn, Symbol,
};
pub use lexer::{Lexer, Token};
pub use parser::Reader;
