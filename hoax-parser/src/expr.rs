// hoax-parser - Expression store for the Hoax language
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Tagged expressions and the append-only store that owns them.
//!
//! Every expression lives in an [`ExprStore`] and is referred to by a
//! [`Handle`], an index into the store. Cons cells hold handles rather than
//! references, so list structure never borrows from the store.
//!
//! # Handle zero
//!
//! Handle `0` is reserved for the canonical `nil` expression. It is created
//! when the store is created and is what an empty list reads as.
//!
//! # Mutation
//!
//! Stored expressions are immutable, with one exception: [`ExprStore::cons_append`]
//! splices a new cell onto the `cdr` of the last cell of a list. The VM uses it
//! to collect native-call arguments.

use std::collections::HashSet;
use std::fmt;
use std::io::Write;
use std::rc::Rc;

/// Longest symbol text the reader accepts, in bytes.
pub const MAX_SYMBOL_LEN: usize = 255;

/// Deepest list nesting the reader and compiler accept.
pub const MAX_NESTING_DEPTH: usize = 256;

/// Handles are positive `i32` values so they index safely on every target.
const MAX_EXPRS: usize = 1 << 31;

// ============================================================================
// Handles and source locations
// ============================================================================

/// An index into an [`ExprStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(u32);

impl Handle {
    /// The canonical `nil` expression.
    pub const NIL: Handle = Handle(0);

    /// Position of this handle in its store.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A position in source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Location {
    /// Source line number (1-indexed).
    pub line: u32,
    /// Source column number (1-indexed).
    pub column: u32,
}

impl Location {
    /// Create a new Location.
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

// ============================================================================
// Symbols
// ============================================================================

/// Symbol text shared between the store, constant pools and the globals table.
///
/// Symbols are interned per store, so every occurrence of `foo` read into the
/// same store points at the same allocation.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(Rc<str>);

impl Symbol {
    /// Create a symbol that is not interned in any store.
    pub fn new(name: &str) -> Self {
        Symbol(Rc::from(name))
    }

    /// The symbol's text.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length of the symbol's text in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the symbol has no text.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({})", &*self.0)
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// ============================================================================
// Native functions
// ============================================================================

/// What a native function gets to work with while it runs.
pub struct NativeCtx<'a> {
    /// The store the argument list lives in.
    pub store: &'a mut ExprStore,
    /// Where `display`-style output goes.
    pub out: &'a mut dyn Write,
}

/// Signature of a native function.
///
/// `args` is a proper list of exactly `arity` elements, in source order.
pub type NativeFn = fn(&mut NativeCtx<'_>, args: Handle) -> Result<Expr, String>;

/// A host function callable from Hoax code through the globals table.
#[derive(Clone)]
pub struct Native {
    pub name: Symbol,
    pub func: NativeFn,
    pub arity: u8,
}

impl Native {
    /// Create a new native function descriptor.
    pub fn new(name: &str, arity: u8, func: NativeFn) -> Self {
        Native {
            name: Symbol::new(name),
            func,
            arity,
        }
    }
}

impl PartialEq for Native {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.arity == other.arity
            && std::ptr::fn_addr_eq(self.func, other.func)
    }
}

impl fmt::Debug for Native {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Native")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Expressions
// ============================================================================

/// A Hoax expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Nil,
    Boolean(bool),
    Integer(i64),
    Symbol(Symbol),
    Cons { car: Handle, cdr: Handle },
    Native(Native),
}

impl Expr {
    #[inline]
    pub fn is_nil(&self) -> bool {
        matches!(self, Expr::Nil)
    }

    #[inline]
    pub fn is_boolean(&self) -> bool {
        matches!(self, Expr::Boolean(_))
    }

    #[inline]
    pub fn is_integer(&self) -> bool {
        matches!(self, Expr::Integer(_))
    }

    #[inline]
    pub fn is_symbol(&self) -> bool {
        matches!(self, Expr::Symbol(_))
    }

    #[inline]
    pub fn is_cons(&self) -> bool {
        matches!(self, Expr::Cons { .. })
    }

    #[inline]
    pub fn is_native(&self) -> bool {
        matches!(self, Expr::Native(_))
    }

    /// The integer value, if this is an integer.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Expr::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// The symbol, if this is a symbol.
    pub fn as_symbol(&self) -> Option<&Symbol> {
        match self {
            Expr::Symbol(sym) => Some(sym),
            _ => None,
        }
    }

    /// Name of this expression's type, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Expr::Nil => "nil",
            Expr::Boolean(_) => "boolean",
            Expr::Integer(_) => "integer",
            Expr::Symbol(_) => "symbol",
            Expr::Cons { .. } => "cons",
            Expr::Native(_) => "native",
        }
    }
}

// ============================================================================
// The store
// ============================================================================

/// Append-only arena of expressions.
#[derive(Debug)]
pub struct ExprStore {
    exprs: Vec<Expr>,
    /// Source location per expression, parallel to `exprs`.
    locations: Vec<Option<Location>>,
    symbols: HashSet<Rc<str>>,
}

impl ExprStore {
    /// Create a store holding only the canonical `nil` at handle 0.
    pub fn new() -> Self {
        let mut store = ExprStore {
            exprs: Vec::with_capacity(1024),
            locations: Vec::with_capacity(1024),
            symbols: HashSet::new(),
        };
        store.intern(Expr::Nil);
        store
    }

    /// Append an expression and return its handle.
    ///
    /// # Panics
    ///
    /// Aborts if the handle space is exhausted. Handles are used as indices
    /// everywhere, so there is no way to carry on.
    pub fn intern(&mut self, expr: Expr) -> Handle {
        assert!(
            self.exprs.len() < MAX_EXPRS,
            "expression store exhausted: {} entries",
            self.exprs.len()
        );
        if let Expr::Cons { car, cdr } = &expr {
            debug_assert!(car.index() < self.exprs.len() && cdr.index() < self.exprs.len());
        }
        let handle = Handle(self.exprs.len() as u32);
        self.exprs.push(expr);
        self.locations.push(None);
        handle
    }

    /// Append an expression read from source at `location`.
    pub fn intern_at(&mut self, expr: Expr, location: Location) -> Handle {
        let handle = self.intern(expr);
        self.locations[handle.index()] = Some(location);
        handle
    }

    /// Number of stored expressions, including the reserved `nil`.
    pub fn len(&self) -> usize {
        self.exprs.len()
    }

    /// Always false: handle 0 exists from construction.
    pub fn is_empty(&self) -> bool {
        self.exprs.is_empty()
    }

    /// Look up an expression.
    ///
    /// # Panics
    ///
    /// Panics if `handle` did not come from this store.
    #[inline]
    pub fn get(&self, handle: Handle) -> &Expr {
        &self.exprs[handle.index()]
    }

    /// Look up an expression, returning `None` for foreign handles.
    pub fn try_get(&self, handle: Handle) -> Option<&Expr> {
        self.exprs.get(handle.index())
    }

    /// Source location of an expression, if it came from the reader.
    pub fn location(&self, handle: Handle) -> Option<Location> {
        self.locations.get(handle.index()).copied().flatten()
    }

    // ------------------------------------------------------------------------
    // Typed constructors
    // ------------------------------------------------------------------------

    /// The canonical `nil`.
    #[inline]
    pub fn nil(&self) -> Handle {
        Handle::NIL
    }

    pub fn boolean(&mut self, value: bool) -> Handle {
        self.intern(Expr::Boolean(value))
    }

    pub fn integer(&mut self, value: i64) -> Handle {
        self.intern(Expr::Integer(value))
    }

    pub fn symbol(&mut self, name: &str) -> Handle {
        let sym = self.intern_symbol(name);
        self.intern(Expr::Symbol(sym))
    }

    pub fn cons(&mut self, car: Handle, cdr: Handle) -> Handle {
        self.intern(Expr::Cons { car, cdr })
    }

    pub fn native(&mut self, native: Native) -> Handle {
        self.intern(Expr::Native(native))
    }

    /// Share symbol text with every other use of the same name in this store.
    pub fn intern_symbol(&mut self, name: &str) -> Symbol {
        if let Some(existing) = self.symbols.get(name) {
            return Symbol(Rc::clone(existing));
        }
        let text: Rc<str> = Rc::from(name);
        self.symbols.insert(Rc::clone(&text));
        Symbol(text)
    }

    /// Build a proper list from `items`, in order.
    pub fn list(&mut self, items: &[Handle]) -> Handle {
        items
            .iter()
            .rev()
            .fold(Handle::NIL, |tail, &item| self.cons(item, tail))
    }

    // ------------------------------------------------------------------------
    // Predicates
    // ------------------------------------------------------------------------

    pub fn is_nil(&self, handle: Handle) -> bool {
        self.get(handle).is_nil()
    }

    pub fn is_boolean(&self, handle: Handle) -> bool {
        self.get(handle).is_boolean()
    }

    pub fn is_integer(&self, handle: Handle) -> bool {
        self.get(handle).is_integer()
    }

    pub fn is_symbol(&self, handle: Handle) -> bool {
        self.get(handle).is_symbol()
    }

    pub fn is_cons(&self, handle: Handle) -> bool {
        self.get(handle).is_cons()
    }

    pub fn is_native(&self, handle: Handle) -> bool {
        self.get(handle).is_native()
    }

    // ------------------------------------------------------------------------
    // Lists
    // ------------------------------------------------------------------------

    /// The `car` of a cons cell.
    pub fn car(&self, handle: Handle) -> Option<Handle> {
        match self.get(handle) {
            Expr::Cons { car, .. } => Some(*car),
            _ => None,
        }
    }

    /// The `cdr` of a cons cell.
    pub fn cdr(&self, handle: Handle) -> Option<Handle> {
        match self.get(handle) {
            Expr::Cons { cdr, .. } => Some(*cdr),
            _ => None,
        }
    }

    /// Number of cons cells reached by walking `cdr` from `handle`.
    pub fn list_length(&self, handle: Handle) -> usize {
        self.list_length_of(self.get(handle))
    }

    fn list_length_of(&self, expr: &Expr) -> usize {
        let mut length = 0;
        let mut current = expr;
        while let Expr::Cons { cdr, .. } = current {
            length += 1;
            current = self.get(*cdr);
        }
        length
    }

    /// The `car`s of a list, in order. Stops at the first non-cons `cdr`.
    pub fn list_items(&self, handle: Handle) -> Vec<Handle> {
        let mut items = Vec::new();
        let mut current = handle;
        while let Expr::Cons { car, cdr } = self.get(current) {
            items.push(*car);
            current = *cdr;
        }
        items
    }

    /// Append `item` to the end of `list` in place and return the list.
    ///
    /// Appending to `nil` (or any non-cons) starts a new one-element list.
    pub fn cons_append(&mut self, list: Handle, item: Handle) -> Handle {
        let cell = self.cons(item, Handle::NIL);
        if !self.is_cons(list) {
            return cell;
        }

        let mut last = list;
        while let Some(next) = self.cdr(last).filter(|&next| self.is_cons(next)) {
            last = next;
        }
        if let Expr::Cons { cdr, .. } = &mut self.exprs[last.index()] {
            *cdr = cell;
        }
        list
    }

    /// Build a fresh list holding the elements of `list` in reverse order.
    pub fn cons_reverse(&mut self, list: Handle) -> Handle {
        self.list_items(list)
            .into_iter()
            .fold(Handle::NIL, |acc, item| self.cons(item, acc))
    }

    // ------------------------------------------------------------------------
    // Truthiness and printing
    // ------------------------------------------------------------------------

    /// Whether `expr` counts as true in a conditional.
    ///
    /// Returns `None` for symbols, whose truthiness is undefined.
    pub fn truthiness(&self, expr: &Expr) -> Option<bool> {
        match expr {
            Expr::Nil => Some(false),
            Expr::Boolean(b) => Some(*b),
            Expr::Integer(n) => Some(*n != 0),
            Expr::Cons { .. } => Some(self.list_length_of(expr) != 0),
            Expr::Native(_) => Some(true),
            Expr::Symbol(_) => None,
        }
    }

    /// Printable view of an expression.
    pub fn display<'a>(&'a self, expr: &'a Expr) -> ExprDisplay<'a> {
        ExprDisplay { store: self, expr }
    }

    /// Printable view of a stored expression.
    pub fn display_handle(&self, handle: Handle) -> ExprDisplay<'_> {
        self.display(self.get(handle))
    }
}

impl Default for ExprStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Formats an expression against the store its cons cells point into.
pub struct ExprDisplay<'a> {
    store: &'a ExprStore,
    expr: &'a Expr,
}

impl fmt::Display for ExprDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.expr {
            Expr::Nil => write!(f, "nil"),
            Expr::Boolean(true) => write!(f, "t"),
            Expr::Boolean(false) => write!(f, "f"),
            Expr::Integer(n) => write!(f, "{}", n),
            Expr::Symbol(sym) => write!(f, "{}", sym),
            Expr::Native(native) => write!(f, "#<native {}/{}>", native.name, native.arity),
            Expr::Cons { car, cdr } => {
                write!(f, "({}", self.store.display_handle(*car))?;
                let mut rest = self.store.get(*cdr);
                loop {
                    match rest {
                        Expr::Cons { car, cdr } => {
                            write!(f, " {}", self.store.display_handle(*car))?;
                            rest = self.store.get(*cdr);
                        }
                        Expr::Nil => break,
                        tail => {
                            write!(f, " . {}", self.store.display(tail))?;
                            break;
                        }
                    }
                }
                write!(f, ")")
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn show(store: &ExprStore, handle: Handle) -> String {
        store.display_handle(handle).to_string()
    }

    #[test]
    fn test_handle_zero_is_nil() {
        let store = ExprStore::new();
        assert_eq!(store.len(), 1);
        assert!(store.is_nil(Handle::NIL));
        assert_eq!(store.nil(), Handle::NIL);
    }

    #[test]
    fn test_intern_is_append_only() {
        let mut store = ExprStore::new();
        let a = store.integer(1);
        let b = store.integer(1);
        assert_ne!(a, b);
        assert_eq!(a.index() + 1, b.index());
        assert_eq!(store.get(a), store.get(b));
    }

    #[test]
    fn test_symbols_share_text() {
        let mut store = ExprStore::new();
        let a = store.intern_symbol("foo");
        let b = store.intern_symbol("foo");
        assert!(Rc::ptr_eq(&a.0, &b.0));
        assert_eq!(a.as_str(), "foo");
    }

    #[test]
    fn test_predicates() {
        let mut store = ExprStore::new();
        let int = store.integer(3);
        let sym = store.symbol("x");
        let cell = store.cons(int, Handle::NIL);
        let t = store.boolean(true);
        assert!(store.is_integer(int));
        assert!(store.is_symbol(sym));
        assert!(store.is_cons(cell));
        assert!(store.is_boolean(t));
        assert!(!store.is_native(int));
    }

    #[test]
    fn test_list_length() {
        let mut store = ExprStore::new();
        let items: Vec<_> = (1..=4).map(|n| store.integer(n)).collect();
        let list = store.list(&items);
        assert_eq!(store.list_length(list), 4);
        assert_eq!(store.list_length(Handle::NIL), 0);
        assert_eq!(store.list_items(list), items);
    }

    #[test]
    fn test_list_length_of_dotted_pair() {
        let mut store = ExprStore::new();
        let a = store.integer(1);
        let b = store.integer(2);
        let pair = store.cons(a, b);
        assert_eq!(store.list_length(pair), 1);
    }

    #[test]
    fn test_cons_append_mutates_last_cell() {
        let mut store = ExprStore::new();
        let one = store.integer(1);
        let two = store.integer(2);
        let three = store.integer(3);

        let list = store.cons_append(Handle::NIL, one);
        let same = store.cons_append(list, two);
        assert_eq!(list, same);
        store.cons_append(list, three);

        assert_eq!(store.list_length(list), 3);
        assert_eq!(show(&store, list), "(1 2 3)");
    }

    #[test]
    fn test_cons_reverse() {
        let mut store = ExprStore::new();
        let items: Vec<_> = (1..=3).map(|n| store.integer(n)).collect();
        let list = store.list(&items);
        let reversed = store.cons_reverse(list);
        assert_eq!(show(&store, reversed), "(3 2 1)");
        // The original list is untouched
        assert_eq!(show(&store, list), "(1 2 3)");
        assert_eq!(store.cons_reverse(Handle::NIL), Handle::NIL);
    }

    #[test]
    fn test_truthiness() {
        let mut store = ExprStore::new();
        let a = store.integer(1);
        let cell = store.cons(a, Handle::NIL);
        let cell = store.get(cell).clone();

        assert_eq!(store.truthiness(&Expr::Nil), Some(false));
        assert_eq!(store.truthiness(&Expr::Boolean(true)), Some(true));
        assert_eq!(store.truthiness(&Expr::Boolean(false)), Some(false));
        assert_eq!(store.truthiness(&Expr::Integer(0)), Some(false));
        assert_eq!(store.truthiness(&Expr::Integer(-7)), Some(true));
        assert_eq!(store.truthiness(&cell), Some(true));
        assert_eq!(store.truthiness(&Expr::Symbol(Symbol::new("x"))), None);
    }

    #[test]
    fn test_native_truthy() {
        fn noop(_: &mut NativeCtx<'_>, _: Handle) -> Result<Expr, String> {
            Ok(Expr::Nil)
        }
        let store = ExprStore::new();
        let native = Expr::Native(Native::new("noop", 0, noop));
        assert_eq!(store.truthiness(&native), Some(true));
    }

    #[test]
    fn test_display() {
        let mut store = ExprStore::new();
        let one = store.integer(1);
        let two = store.integer(2);
        let pair = store.cons(one, two);
        let sym = store.symbol("foo");
        let nested = store.list(&[sym, pair, Handle::NIL]);

        assert_eq!(show(&store, pair), "(1 . 2)");
        assert_eq!(show(&store, nested), "(foo (1 . 2) nil)");
        assert_eq!(store.display(&Expr::Boolean(true)).to_string(), "t");
        assert_eq!(store.display(&Expr::Integer(-3)).to_string(), "-3");
    }

    #[test]
    fn test_locations() {
        let mut store = ExprStore::new();
        let a = store.intern_at(Expr::Integer(1), Location::new(2, 5));
        let b = store.integer(2);
        assert_eq!(store.location(a), Some(Location::new(2, 5)));
        assert_eq!(store.location(b), None);
        assert_eq!(Location::new(2, 5).to_string(), "2:5");
    }
}
