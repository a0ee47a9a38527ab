// hoax-vm - Bytecode compiler and virtual machine for the Hoax language
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Code generation: walks expressions in an [`ExprStore`] and writes bytecode
//! into a [`Module`].
//!
//! | expression | code |
//! |---|---|
//! | integer, native | `CONSTANT n` |
//! | `t` / `f` / `nil` | `TRUE` / `FALSE` / `NIL` |
//! | other symbol | `CONSTANT sym`, `LOAD_VAR` |
//! | `(if c a b)` | see [`compile_if`](super::emit::control::compile_if) |
//! | `(define x v)` | `<v>`, `CONSTANT x`, `STORE_VAR` |
//! | `(builtin args..)` | `<args..>`, the builtin's opcode |
//! | `(f args..)` | `<args..>`, `CONSTANT f`, `CALL` |

use hoax_parser::{Expr, ExprStore, Handle, Location, MAX_NESTING_DEPTH, Reader, Symbol};

use crate::module::Module;
use crate::opcode::Instruction;

use super::builtins::{Builtin, BuiltinTable};
use super::emit::{BytecodeEmitter, control};
use super::types::{CompileError, CompileErrorKind, Result};

/// Compiles expressions into modules.
///
/// The compiler holds no per-compilation state, so one instance can serve
/// any number of modules and stores.
#[derive(Debug, Clone, Default)]
pub struct Compiler {
    builtins: BuiltinTable,
}

impl Compiler {
    /// Create a new compiler.
    pub fn new() -> Self {
        Compiler {
            builtins: BuiltinTable::new(),
        }
    }

    /// The built-in operations this compiler resolves statically.
    pub fn builtins(&self) -> &BuiltinTable {
        &self.builtins
    }

    /// Compile one expression followed by `RETURN`.
    pub fn compile(&self, store: &ExprStore, expr: Handle, module: &mut Module) -> Result<()> {
        self.compile_all(store, &[expr], module)
    }

    /// Compile a sequence of top-level expressions followed by `RETURN`.
    ///
    /// The value of every expression but the last is dropped with `POP`. An
    /// empty sequence returns `nil`. If an expression fails to compile, the
    /// module is rolled back to where that expression started.
    pub fn compile_all(
        &self,
        store: &ExprStore,
        exprs: &[Handle],
        module: &mut Module,
    ) -> Result<()> {
        if exprs.is_empty() {
            module.emit(Instruction::Nil);
        }

        for (i, &expr) in exprs.iter().enumerate() {
            let mark = module.mark();
            if i > 0 {
                module.emit(Instruction::Pop);
            }
            if let Err(e) = self.compile_expr(store, expr, module) {
                module.rollback(mark);
                tracing::debug!(form = i, error = %e, "compilation failed");
                return Err(e);
            }
        }

        module.emit(Instruction::Return);
        tracing::debug!(
            forms = exprs.len(),
            bytes = module.len(),
            constants = module.constants().len(),
            "compiled module"
        );
        Ok(())
    }

    /// Read every expression in `source` and compile them with [`compile_all`](Self::compile_all).
    ///
    /// A reader error leaves the module untouched.
    pub fn compile_source(
        &self,
        source: &str,
        store: &mut ExprStore,
        module: &mut Module,
    ) -> Result<()> {
        let exprs = Reader::read_all_str(source, store)?;
        self.compile_all(store, &exprs, module)
    }

    /// Compile a single expression without a trailing `RETURN`.
    ///
    /// On error the module is left exactly as it was.
    pub fn compile_expr(
        &self,
        store: &ExprStore,
        expr: Handle,
        module: &mut Module,
    ) -> Result<()> {
        let mark = module.mark();
        let result = self.codegen(store, module).compile_expr(expr);
        if result.is_err() {
            module.rollback(mark);
        }
        result
    }

    /// Compile a call to the built-in `name` with already-read arguments.
    pub fn compile_builtin_call(
        &self,
        store: &ExprStore,
        name: &str,
        args: &[Handle],
        module: &mut Module,
    ) -> Result<()> {
        let builtin = *self
            .builtins
            .get(name)
            .ok_or_else(|| CompileErrorKind::UnknownBuiltin(name.to_string()))?;

        let mark = module.mark();
        let result = self.codegen(store, module).compile_builtin(builtin, args, None);
        if result.is_err() {
            module.rollback(mark);
        }
        result
    }

    fn codegen<'a>(&'a self, store: &'a ExprStore, module: &'a mut Module) -> CodeGen<'a> {
        CodeGen {
            store,
            module,
            builtins: &self.builtins,
            depth: 0,
        }
    }
}

// ============================================================================
// Code generation for a single compilation
// ============================================================================

struct CodeGen<'a> {
    store: &'a ExprStore,
    module: &'a mut Module,
    builtins: &'a BuiltinTable,
    /// Lists currently being compiled.
    depth: usize,
}

impl BytecodeEmitter for CodeGen<'_> {
    fn emit(&mut self, instruction: Instruction) {
        self.module.emit(instruction);
    }

    fn emit_constant(&mut self, value: Expr) -> Result<()> {
        let idx = self
            .module
            .add_constant(value)
            .ok_or(CompileErrorKind::TooManyConstants)?;
        self.emit(Instruction::Constant(idx));
        Ok(())
    }

    fn emit_jump(&mut self, instruction: Instruction) -> usize {
        let operand = self.module.current_offset() + 1;
        self.emit(instruction);
        operand
    }

    fn patch_jump(&mut self, operand: usize) -> Result<()> {
        // Offsets count from the byte after the two operand bytes
        let distance = self.module.current_offset() - (operand + 2);
        let offset =
            u16::try_from(distance).map_err(|_| CompileErrorKind::JumpTooLarge(distance))?;
        self.module.patch_u16(operand, offset);
        Ok(())
    }

    fn compile_expr(&mut self, expr: Handle) -> Result<()> {
        let result = match self.store.get(expr) {
            Expr::Nil => {
                self.emit(Instruction::Nil);
                Ok(())
            }
            Expr::Boolean(true) => {
                self.emit(Instruction::True);
                Ok(())
            }
            Expr::Boolean(false) => {
                self.emit(Instruction::False);
                Ok(())
            }
            Expr::Integer(n) => self.emit_constant(Expr::Integer(*n)),
            Expr::Native(native) => self.emit_constant(Expr::Native(native.clone())),
            Expr::Symbol(sym) => self.compile_symbol(sym),
            Expr::Cons { .. } if self.depth == MAX_NESTING_DEPTH => {
                Err(CompileErrorKind::TooDeep.into())
            }
            Expr::Cons { .. } => {
                self.depth += 1;
                let result = self.compile_list(expr);
                self.depth -= 1;
                result
            }
        };
        result.map_err(|e| locate(e, self.store.location(expr)))
    }
}

impl CodeGen<'_> {
    fn compile_symbol(&mut self, sym: &Symbol) -> Result<()> {
        match sym.as_str() {
            "t" => self.emit(Instruction::True),
            "f" => self.emit(Instruction::False),
            "nil" => self.emit(Instruction::Nil),
            _ => {
                self.emit_constant(Expr::Symbol(sym.clone()))?;
                self.emit(Instruction::LoadVar);
            }
        }
        Ok(())
    }

    fn compile_list(&mut self, list: Handle) -> Result<()> {
        let items = self.store.list_items(list);
        let (&head, args) = match items.split_first() {
            Some(split) => split,
            None => {
                self.emit(Instruction::Nil);
                return Ok(());
            }
        };

        let name = match self.store.get(head) {
            Expr::Symbol(sym) => sym.clone(),
            other => {
                let found = self.store.display(other).to_string();
                return Err(self.error(CompileErrorKind::ExpectedSymbol(found), head));
            }
        };

        match name.as_str() {
            "if" => {
                self.check_arity("if", 3, args, list)?;
                control::compile_if(self, args[0], args[1], args[2])
            }
            "define" => {
                self.check_arity("define", 2, args, list)?;
                self.compile_define(args[0], args[1])
            }
            "t" | "f" | "nil" => Err(self.error(
                CompileErrorKind::UnknownFunction(name.as_str().to_string()),
                head,
            )),
            _ => match self.builtins.get(name.as_str()) {
                Some(&builtin) => self.compile_builtin(builtin, args, Some(list)),
                None => self.compile_dynamic_call(name, args),
            },
        }
    }

    /// `(define name value)`: bind a global and leave the value on the stack.
    fn compile_define(&mut self, target: Handle, value: Handle) -> Result<()> {
        let name = match self.store.get(target) {
            Expr::Symbol(sym) => sym.clone(),
            other => {
                let found = self.store.display(other).to_string();
                return Err(self.error(CompileErrorKind::ExpectedSymbol(found), target));
            }
        };

        self.compile_expr(value)?;
        self.emit_constant(Expr::Symbol(name))?;
        self.emit(Instruction::StoreVar);
        Ok(())
    }

    fn compile_builtin(
        &mut self,
        builtin: Builtin,
        args: &[Handle],
        call: Option<Handle>,
    ) -> Result<()> {
        if args.len() != builtin.arity {
            let kind = CompileErrorKind::ArityMismatch {
                form: builtin.name.to_string(),
                expected: builtin.arity,
                got: args.len(),
            };
            return Err(match call {
                Some(call) => self.error(kind, call),
                None => kind.into(),
            });
        }

        for &arg in args {
            self.compile_expr(arg)?;
        }
        self.module.write_op(builtin.op);
        Ok(())
    }

    /// Arguments first, then the callee's name for `CALL` to resolve.
    fn compile_dynamic_call(&mut self, name: Symbol, args: &[Handle]) -> Result<()> {
        for &arg in args {
            self.compile_expr(arg)?;
        }
        self.emit_constant(Expr::Symbol(name))?;
        self.emit(Instruction::Call);
        Ok(())
    }

    fn check_arity(
        &self,
        form: &str,
        expected: usize,
        args: &[Handle],
        at: Handle,
    ) -> Result<()> {
        if args.len() == expected {
            return Ok(());
        }
        Err(self.error(
            CompileErrorKind::ArityMismatch {
                form: form.to_string(),
                expected,
                got: args.len(),
            },
            at,
        ))
    }

    fn error(&self, kind: CompileErrorKind, at: Handle) -> CompileError {
        CompileError::new(kind, self.store.location(at))
    }
}

/// Attach `location` to an error that does not have one yet.
fn locate(mut err: CompileError, location: Option<Location>) -> CompileError {
    if err.location.is_none() && !matches!(err.kind, CompileErrorKind::Reader(_)) {
        err.location = location;
    }
    err
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opcode::OpCode;

    fn compile_str(src: &str) -> (ExprStore, Result<Module>) {
        let mut store = ExprStore::new();
        let mut module = Module::new();
        let result = Compiler::new()
            .compile_source(src, &mut store, &mut module)
            .map(|_| module);
        (store, result)
    }

    fn code(src: &str) -> Vec<u8> {
        compile_str(src).1.unwrap().code().to_vec()
    }

    fn error_kind(src: &str) -> CompileErrorKind {
        compile_str(src).1.unwrap_err().kind
    }

    fn bytes(instructions: &[Instruction]) -> Vec<u8> {
        let mut out = Vec::new();
        for instruction in instructions {
            instruction.encode(&mut out);
        }
        out
    }

    #[test]
    fn test_integer_literal() {
        let (_, module) = compile_str("42");
        let module = module.unwrap();
        assert_eq!(
            module.code(),
            bytes(&[Instruction::Constant(0), Instruction::Return])
        );
        assert_eq!(module.constants(), &[Expr::Integer(42)]);
    }

    #[test]
    fn test_builtin_arguments_in_order() {
        let (_, module) = compile_str("(- 10 3)");
        let module = module.unwrap();
        assert_eq!(
            module.code(),
            bytes(&[
                Instruction::Constant(0),
                Instruction::Constant(1),
                Instruction::Sub,
                Instruction::Return
            ])
        );
        assert_eq!(module.constants(), &[Expr::Integer(10), Expr::Integer(3)]);
    }

    #[test]
    fn test_reserved_symbols() {
        assert_eq!(
            code("(cons t (cons f nil))"),
            bytes(&[
                Instruction::True,
                Instruction::False,
                Instruction::Nil,
                Instruction::Cons,
                Instruction::Cons,
                Instruction::Return
            ])
        );
    }

    #[test]
    fn test_symbol_loads_global() {
        let (_, module) = compile_str("x");
        let module = module.unwrap();
        assert_eq!(
            module.code(),
            bytes(&[
                Instruction::Constant(0),
                Instruction::LoadVar,
                Instruction::Return
            ])
        );
        assert_eq!(module.constants()[0].as_symbol().unwrap().as_str(), "x");
    }

    #[test]
    fn test_if_layout() {
        assert_eq!(
            code("(if 0 1 2)"),
            bytes(&[
                Instruction::Constant(0),
                Instruction::Jmf(5),
                Instruction::Constant(1),
                Instruction::Jmp(2),
                Instruction::Constant(2),
                Instruction::Return
            ])
        );
    }

    #[test]
    fn test_define() {
        let (_, module) = compile_str("(define x 5)");
        let module = module.unwrap();
        assert_eq!(
            module.code(),
            bytes(&[
                Instruction::Constant(0),
                Instruction::Constant(1),
                Instruction::StoreVar,
                Instruction::Return
            ])
        );
        assert_eq!(module.constants()[1].as_symbol().unwrap().as_str(), "x");
    }

    #[test]
    fn test_dynamic_call() {
        let (_, module) = compile_str("(add 1 2)");
        let module = module.unwrap();
        assert_eq!(
            module.code(),
            bytes(&[
                Instruction::Constant(0),
                Instruction::Constant(1),
                Instruction::Constant(2),
                Instruction::Call,
                Instruction::Return
            ])
        );
        assert_eq!(module.constants()[2].as_symbol().unwrap().as_str(), "add");
    }

    #[test]
    fn test_multiple_forms_pop_between() {
        assert_eq!(
            code("t f"),
            bytes(&[
                Instruction::True,
                Instruction::Pop,
                Instruction::False,
                Instruction::Return
            ])
        );
        assert_eq!(code(""), bytes(&[Instruction::Nil, Instruction::Return]));
    }

    #[test]
    fn test_non_reader_atoms() {
        let mut store = ExprStore::new();
        let mut module = Module::new();
        let t = store.boolean(true);
        Compiler::new().compile(&store, t, &mut module).unwrap();
        assert_eq!(module.code(), bytes(&[Instruction::True, Instruction::Return]));
    }

    #[test]
    fn test_builtin_arity_mismatch_emits_nothing() {
        let (_, result) = compile_str("(+ 1)");
        let err = result.unwrap_err();
        assert_eq!(
            err.kind,
            CompileErrorKind::ArityMismatch {
                form: "+".into(),
                expected: 2,
                got: 1
            }
        );
        assert_eq!(err.location, Some(Location::new(1, 1)));

        let mut store = ExprStore::new();
        let mut module = Module::new();
        let form = Reader::read_str("(+ 1)", &mut store).unwrap().unwrap();
        assert!(Compiler::new().compile(&store, form, &mut module).is_err());
        assert!(module.is_empty());
        assert!(module.constants().is_empty());
    }

    #[test]
    fn test_failed_form_is_rolled_back() {
        let mut store = ExprStore::new();
        let mut module = Module::new();
        let forms = Reader::read_all_str("1 (car 1 2)", &mut store).unwrap();
        let err = Compiler::new()
            .compile_all(&store, &forms, &mut module)
            .unwrap_err();
        assert!(matches!(err.kind, CompileErrorKind::ArityMismatch { .. }));
        // Only the first form survives: no POP, no RETURN
        assert_eq!(module.code(), bytes(&[Instruction::Constant(0)]));
        assert_eq!(module.constants(), &[Expr::Integer(1)]);
    }

    #[test]
    fn test_if_arity() {
        assert_eq!(
            error_kind("(if 1 2)"),
            CompileErrorKind::ArityMismatch {
                form: "if".into(),
                expected: 3,
                got: 2
            }
        );
    }

    #[test]
    fn test_error_in_branch_discards_whole_if() {
        let mut store = ExprStore::new();
        let mut module = Module::new();
        let form = Reader::read_str("(if 1 2 (car))", &mut store).unwrap().unwrap();
        assert!(Compiler::new().compile_expr(&store, form, &mut module).is_err());
        assert!(module.is_empty());
    }

    #[test]
    fn test_expected_symbol() {
        let (_, result) = compile_str("\n  ((car x) 1)");
        let err = result.unwrap_err();
        assert_eq!(
            err.kind,
            CompileErrorKind::ExpectedSymbol("(car x)".into())
        );
        assert_eq!(err.location, Some(Location::new(2, 4)));
        assert_eq!(error_kind("(1 2)"), CompileErrorKind::ExpectedSymbol("1".into()));
    }

    #[test]
    fn test_define_needs_symbol() {
        assert_eq!(
            error_kind("(define 1 2)"),
            CompileErrorKind::ExpectedSymbol("1".into())
        );
    }

    #[test]
    fn test_literal_head() {
        assert_eq!(
            error_kind("(nil 1)"),
            CompileErrorKind::UnknownFunction("nil".into())
        );
    }

    #[test]
    fn test_too_many_constants() {
        let src: String = (0..300).map(|n| format!("{} ", n)).collect();
        assert_eq!(error_kind(&src), CompileErrorKind::TooManyConstants);
    }

    #[test]
    fn test_jump_too_large() {
        // A balanced tree of conses over `t` doubles in size with each level
        let mut store = ExprStore::new();
        let cons = store.symbol("cons");
        let mut tree = store.symbol("t");
        for _ in 0..16 {
            tree = store.list(&[cons, tree, tree]);
        }
        let if_sym = store.symbol("if");
        let t = store.symbol("t");
        let f = store.symbol("f");
        let form = store.list(&[if_sym, t, tree, f]);

        let mut module = Module::new();
        let err = Compiler::new()
            .compile(&store, form, &mut module)
            .unwrap_err();
        assert!(matches!(err.kind, CompileErrorKind::JumpTooLarge(n) if n > u16::MAX as usize));
        assert!(module.is_empty());
    }

    /// `depth` nested `(car ...)` forms around `1`, built without the reader.
    fn nested_cars(store: &mut ExprStore, depth: usize) -> Handle {
        let car = store.symbol("car");
        let mut form = store.integer(1);
        for _ in 0..depth {
            form = store.list(&[car, form]);
        }
        form
    }

    #[test]
    fn test_nesting_limit() {
        let mut store = ExprStore::new();
        let compiler = Compiler::new();

        let mut module = Module::new();
        let deepest = nested_cars(&mut store, MAX_NESTING_DEPTH);
        compiler.compile(&store, deepest, &mut module).unwrap();
        let mut expected = vec![Instruction::Constant(0)];
        expected.extend(std::iter::repeat_n(Instruction::Car, MAX_NESTING_DEPTH));
        expected.push(Instruction::Return);
        assert_eq!(module.code(), bytes(&expected));

        let mut module = Module::new();
        let too_deep = nested_cars(&mut store, MAX_NESTING_DEPTH + 1);
        let err = compiler.compile(&store, too_deep, &mut module).unwrap_err();
        assert_eq!(err.kind, CompileErrorKind::TooDeep);
        assert!(module.is_empty());
    }

    #[test]
    fn test_very_deep_form_is_an_error() {
        let mut store = ExprStore::new();
        let mut module = Module::new();
        let form = nested_cars(&mut store, 5000);
        let err = Compiler::new().compile(&store, form, &mut module).unwrap_err();
        assert_eq!(err.kind, CompileErrorKind::TooDeep);
        assert!(module.is_empty());
    }

    #[test]
    fn test_reader_error_propagates() {
        assert!(matches!(error_kind("(+ 1"), CompileErrorKind::Reader(_)));
    }

    #[test]
    fn test_compile_builtin_call() {
        let mut store = ExprStore::new();
        let mut module = Module::new();
        let compiler = Compiler::new();
        let one = store.integer(1);

        compiler
            .compile_builtin_call(&store, "display", &[one], &mut module)
            .unwrap();
        assert_eq!(module.code()[2], u8::from(OpCode::Display));

        let err = compiler
            .compile_builtin_call(&store, "hello", &[], &mut module)
            .unwrap_err();
        assert_eq!(err.kind, CompileErrorKind::UnknownBuiltin("hello".into()));
    }
}
