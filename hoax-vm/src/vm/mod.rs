// hoax-vm - Bytecode compiler and virtual machine for the Hoax language
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Stack-based virtual machine for executing Hoax bytecode.
//!
//! A [`Vm`] owns its operand stack and output sink. The module it runs, the
//! expression store and the global environment are borrowed for the length
//! of one [`Vm::run`].
//!
//! ```
//! use hoax_core::GlobalEnv;
//! use hoax_parser::{Expr, ExprStore};
//! use hoax_vm::{Compiler, Module, Vm};
//!
//! let mut store = ExprStore::new();
//! let mut globals = GlobalEnv::new();
//! let mut module = Module::new();
//! Compiler::new()
//!     .compile_source("(* 6 7)", &mut store, &mut module)
//!     .unwrap();
//!
//! let mut vm = Vm::new();
//! let result = vm.run(&module, &mut store, &mut globals).unwrap();
//! assert_eq!(result, Expr::Integer(42));
//! ```

pub mod error;
pub mod handlers;
pub mod stack;

use std::fmt;
use std::io::{self, Write};

use hoax_core::GlobalEnv;
use hoax_parser::{Expr, ExprStore};

use crate::disasm::format_instruction;
use crate::module::Module;
use crate::opcode::{Instruction, decode};

pub use error::{Result, RuntimeError};
pub use handlers::control::ControlFlow;
pub use stack::ValueStack;

/// Operand stack depth used by [`VmConfig::default`].
pub const DEFAULT_STACK_SIZE: usize = 128;

/// VM settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VmConfig {
    /// Maximum operand stack depth.
    pub stack_size: usize,
    /// Start with instruction tracing on.
    pub debug: bool,
}

impl Default for VmConfig {
    fn default() -> Self {
        VmConfig {
            stack_size: DEFAULT_STACK_SIZE,
            debug: false,
        }
    }
}

/// Where the VM is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VmState {
    /// Never run, reset, or stopped by an error.
    Idle,
    Running,
    /// Stopped by `HALT`. Further runs fail until [`Vm::reset`].
    Halted,
    /// Finished with `RETURN`.
    Returned,
}

/// Everything one run borrows from its caller.
pub(crate) struct Context<'a> {
    pub module: &'a Module,
    pub store: &'a mut ExprStore,
    pub globals: &'a mut GlobalEnv,
}

/// The Hoax virtual machine.
pub struct Vm {
    /// Operand stack.
    stack: ValueStack,

    /// Offset of the next instruction in the running module.
    ip: usize,

    state: VmState,

    /// Trace each instruction at `info` level.
    debug: bool,

    /// Where `display` writes.
    out: Box<dyn Write>,
}

impl Vm {
    /// Create a VM with default settings, writing to stdout.
    pub fn new() -> Self {
        Self::with_config(VmConfig::default())
    }

    /// Create a VM writing to stdout.
    pub fn with_config(config: VmConfig) -> Self {
        Self::with_output(config, Box::new(io::stdout()))
    }

    /// Create a VM writing `display` output to `out`.
    pub fn with_output(config: VmConfig, out: Box<dyn Write>) -> Self {
        Vm {
            stack: ValueStack::new(config.stack_size),
            ip: 0,
            state: VmState::Idle,
            debug: config.debug,
            out,
        }
    }

    /// Execute `module` from its first byte.
    ///
    /// Returns the value left by `RETURN` or `HALT`. A VM that has halted
    /// refuses to run until [`reset`](Self::reset) is called.
    pub fn run(
        &mut self,
        module: &Module,
        store: &mut ExprStore,
        globals: &mut GlobalEnv,
    ) -> Result<Expr> {
        if self.state == VmState::Halted {
            return Err(RuntimeError::Halted);
        }

        self.stack.clear();
        self.ip = 0;
        self.state = VmState::Running;
        tracing::debug!(
            bytes = module.len(),
            constants = module.constants().len(),
            "running module"
        );

        let mut ctx = Context {
            module,
            store,
            globals,
        };
        let result = self.run_loop(&mut ctx);
        let flushed = self.out.flush();
        let result = result.and_then(|value| flushed.map(|()| value).map_err(RuntimeError::from));

        match &result {
            Ok(value) => {
                tracing::debug!(state = ?self.state, result = %ctx.store.display(value), "run finished")
            }
            Err(e) => {
                self.state = VmState::Idle;
                tracing::debug!(error = %e, ip = self.ip, "run failed");
            }
        }
        result
    }

    /// Return to `Idle` with an empty stack, clearing a halt.
    pub fn reset(&mut self) {
        self.stack.clear();
        self.ip = 0;
        self.state = VmState::Idle;
    }

    pub fn state(&self) -> VmState {
        self.state
    }

    /// Whether instruction tracing is on.
    pub fn is_debug(&self) -> bool {
        self.debug
    }

    pub fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
    }

    /// The operand stack, bottom first, as the last run left it.
    pub fn stack(&self) -> &[Expr] {
        self.stack.as_slice()
    }

    /// Maximum operand stack depth.
    pub fn stack_size(&self) -> usize {
        self.stack.limit()
    }

    /// Replace the output sink, returning the old one.
    pub fn set_output(&mut self, out: Box<dyn Write>) -> Box<dyn Write> {
        std::mem::replace(&mut self.out, out)
    }

    fn run_loop(&mut self, ctx: &mut Context<'_>) -> Result<Expr> {
        loop {
            let offset = self.ip;
            let (instruction, next) = decode(ctx.module.code(), offset)?;
            self.ip = next;

            if self.debug {
                tracing::info!(
                    depth = self.stack.len(),
                    "{}",
                    format_instruction(ctx.module, ctx.store, offset, instruction)
                );
            }

            match instruction {
                // Literals & stack - handled inline
                Instruction::Constant(idx) => {
                    let value = ctx
                        .module
                        .constant(idx)
                        .cloned()
                        .ok_or(RuntimeError::InvalidConstant { offset, idx })?;
                    self.stack.push(value)?;
                }
                Instruction::True => self.stack.push(Expr::Boolean(true))?,
                Instruction::False => self.stack.push(Expr::Boolean(false))?,
                Instruction::Nil => self.stack.push(Expr::Nil)?,
                Instruction::Pop => {
                    self.stack.pop()?;
                }

                // Arithmetic - delegated to handler
                Instruction::Add | Instruction::Sub | Instruction::Mul | Instruction::Div => {
                    self.execute_arithmetic(instruction.opcode())?;
                }

                // Heap - delegated to handler
                Instruction::Cons | Instruction::Car | Instruction::Cdr => {
                    self.execute_heap(instruction.opcode(), ctx.store)?;
                }

                // Variables - delegated to handler
                Instruction::LoadVar | Instruction::StoreVar => {
                    self.execute_variables(instruction.opcode(), ctx)?;
                }

                // VM builtins - delegated to handler
                Instruction::Display | Instruction::ToggleDebug => {
                    self.execute_builtin(instruction.opcode(), ctx.store)?;
                }

                // Control flow - delegated to handler
                Instruction::Jmp(_)
                | Instruction::Jmf(_)
                | Instruction::Call
                | Instruction::Return
                | Instruction::Halt => match self.execute_control(instruction, ctx)? {
                    ControlFlow::Continue => {}
                    ControlFlow::Return(result) => return Ok(result),
                },
            }
        }
    }
}

impl Default for Vm {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Vm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Vm")
            .field("stack", &self.stack)
            .field("ip", &self.ip)
            .field("state", &self.state)
            .field("debug", &self.debug)
            .finish_non_exhaustive()
    }
}
