// hoax-embed - Engine implementation
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! The Engine struct - main entry point for embedding Hoax.

use std::io::Write;
use std::path::Path;

use hoax_core::{DEFAULT_CAPACITY, GlobalEnv, register_natives};
use hoax_parser::{Expr, ExprStore, Handle, Native, NativeFn, Reader};
use hoax_vm::{CompileError, Compiler, DEFAULT_STACK_SIZE, Module, Vm, VmConfig, disassemble};

use crate::error::{Error, Result};

/// Engine settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Maximum VM operand stack depth.
    pub stack_size: usize,
    /// Number of slots in the global table.
    pub globals_capacity: usize,
    /// Start with instruction tracing on.
    pub debug: bool,
}

impl EngineConfig {
    /// The VM half of these settings.
    pub fn vm_config(&self) -> VmConfig {
        VmConfig {
            stack_size: self.stack_size,
            debug: self.debug,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            stack_size: DEFAULT_STACK_SIZE,
            globals_capacity: DEFAULT_CAPACITY,
            debug: false,
        }
    }
}

/// The result of one REPL line.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// The printed value.
    pub value: String,
    /// The compiled code, when debug mode was on before the line ran.
    pub disassembly: Option<String>,
    /// Whether the line ran `quit`.
    pub halted: bool,
}

/// The Hoax scripting engine.
///
/// Owns the expression store, the global environment, one reusable
/// [`Module`] and the [`Vm`]. Every evaluation clears the module and
/// compiles into it afresh, while the store and globals persist.
///
/// # Thread Safety
///
/// **`Engine` is NOT thread-safe.** Symbols share text through `Rc`, so an
/// engine and the values it hands out must stay on one thread.
///
/// # Example
///
/// ```rust
/// use hoax_embed::Engine;
///
/// let mut engine = Engine::new().unwrap();
/// let result = engine.eval("(define x 21) (* x 2)").unwrap();
/// assert_eq!(engine.display(&result), "42");
/// ```
pub struct Engine {
    store: ExprStore,
    globals: GlobalEnv,
    module: Module,
    compiler: Compiler,
    vm: Vm,
}

impl Engine {
    /// Create an engine with default settings and the standard natives.
    pub fn new() -> Result<Self> {
        Self::with_config(EngineConfig::default())
    }

    /// Create an engine writing `display` output to stdout.
    pub fn with_config(config: EngineConfig) -> Result<Self> {
        Self::from_parts(config, Vm::with_config(config.vm_config()))
    }

    /// Create an engine writing `display` output to `out`.
    pub fn with_output(config: EngineConfig, out: Box<dyn Write>) -> Result<Self> {
        Self::from_parts(config, Vm::with_output(config.vm_config(), out))
    }

    fn from_parts(config: EngineConfig, vm: Vm) -> Result<Self> {
        let mut globals = GlobalEnv::with_capacity(config.globals_capacity);
        register_natives(&mut globals)?;
        Ok(Engine {
            store: ExprStore::new(),
            globals,
            module: Module::new(),
            compiler: Compiler::new(),
            vm,
        })
    }

    /// Evaluate every expression in `code` as one module.
    ///
    /// Returns the value of the last expression, or `nil` for empty input.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The code contains syntax errors
    /// - Any expression fails to compile (nothing runs)
    /// - Execution fails
    pub fn eval(&mut self, code: &str) -> Result<Expr> {
        self.compile_only(code)?;
        self.run()
    }

    /// Evaluate one line of interactive input.
    ///
    /// Returns `None` when the line holds no expressions. In debug mode the
    /// compiled code is included in the result. Errors leave the engine
    /// ready for the next line.
    pub fn eval_line(&mut self, line: &str) -> Result<Option<Evaluation>> {
        let forms = Reader::read_all_str(line, &mut self.store).map_err(CompileError::from)?;
        if forms.is_empty() {
            return Ok(None);
        }

        self.module.clear();
        self.compiler
            .compile_all(&self.store, &forms, &mut self.module)?;
        let disassembly = self
            .vm
            .is_debug()
            .then(|| disassemble(&self.module, &self.store));

        let value = self.run()?;
        Ok(Some(Evaluation {
            value: self.display(&value),
            disassembly,
            halted: self.is_halted(),
        }))
    }

    /// Evaluate a file of Hoax code.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read (not found, permission denied)
    /// - The file contains syntax or compile errors
    /// - Execution fails
    pub fn eval_file(&mut self, path: impl AsRef<Path>) -> Result<Expr> {
        let path = path.as_ref();
        let code = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), bytes = code.len(), "evaluating file");
        self.eval(&code)
    }

    /// Compile `code` into the engine's module without running it.
    pub fn compile_only(&mut self, code: &str) -> Result<&Module> {
        self.module.clear();
        self.compiler
            .compile_source(code, &mut self.store, &mut self.module)?;
        Ok(&self.module)
    }

    /// Compile `code` and return its disassembly.
    pub fn disassemble(&mut self, code: &str) -> Result<String> {
        self.compile_only(code)?;
        Ok(disassemble(&self.module, &self.store))
    }

    /// Run whatever the module currently holds.
    pub fn run(&mut self) -> Result<Expr> {
        Ok(self
            .vm
            .run(&self.module, &mut self.store, &mut self.globals)?)
    }

    /// Look up a global.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Expr> {
        self.globals.get(name)
    }

    /// Bind a global, replacing any previous value.
    pub fn set(&mut self, name: &str, value: Expr) -> Result<()> {
        let name = self.store.intern_symbol(name);
        self.globals.set(name, value)?;
        Ok(())
    }

    /// Register a native function under `name`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use hoax_embed::{Engine, Expr, Handle, NativeCtx};
    ///
    /// fn double(ctx: &mut NativeCtx<'_>, args: Handle) -> Result<Expr, String> {
    ///     let first = ctx.store.car(args).ok_or("double: missing argument")?;
    ///     match ctx.store.get(first) {
    ///         Expr::Integer(n) => n.checked_mul(2).map(Expr::Integer).ok_or("double: overflow".into()),
    ///         other => Err(format!("double: expected integer, got {}", other.type_name())),
    ///     }
    /// }
    ///
    /// let mut engine = Engine::new().unwrap();
    /// engine.register_native("double", 1, double).unwrap();
    /// let result = engine.eval("(double 21)").unwrap();
    /// assert_eq!(result, Expr::Integer(42));
    /// ```
    pub fn register_native(&mut self, name: &str, arity: u8, func: NativeFn) -> Result<()> {
        self.globals.define_native(Native::new(name, arity, func))?;
        Ok(())
    }

    /// Print a value the way the REPL does.
    #[must_use]
    pub fn display(&self, value: &Expr) -> String {
        self.store.display(value).to_string()
    }

    /// Print a stored expression.
    #[must_use]
    pub fn display_handle(&self, handle: Handle) -> String {
        self.store.display_handle(handle).to_string()
    }

    /// Whether `quit` has stopped the VM.
    pub fn is_halted(&self) -> bool {
        self.vm.state() == hoax_vm::VmState::Halted
    }

    /// Clear a halt so the engine runs again. Globals are kept.
    pub fn reset(&mut self) {
        self.vm.reset();
    }

    pub fn is_debug(&self) -> bool {
        self.vm.is_debug()
    }

    pub fn set_debug(&mut self, debug: bool) {
        self.vm.set_debug(debug);
    }

    #[must_use]
    pub fn vm(&self) -> &Vm {
        &self.vm
    }

    pub fn vm_mut(&mut self) -> &mut Vm {
        &mut self.vm
    }

    #[must_use]
    pub fn store(&self) -> &ExprStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut ExprStore {
        &mut self.store
    }

    #[must_use]
    pub fn globals(&self) -> &GlobalEnv {
        &self.globals
    }

    /// The most recently compiled module.
    #[must_use]
    pub fn module(&self) -> &Module {
        &self.module
    }
}
