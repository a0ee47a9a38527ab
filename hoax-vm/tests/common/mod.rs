// hoax-vm - Common test utilities
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Shared helpers for the VM integration tests.
//!
//! # Usage
//!
//! ```ignore
//! mod common;
//! use common::*;
//! ```
//!
//! - [`Session`] - store, globals, module and VM wired together
//! - [`capture_logs`] - run a closure and collect what it logs
//! - [`compile_and_run`] - run source in a fresh session, printing the result
//! - [`expect_error`] - assert that source fails with a matching message

#![allow(dead_code)]

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;
use std::sync::{Arc, Mutex};

pub use hoax_core::{GlobalEnv, register_natives};
pub use hoax_parser::{Expr, ExprStore, Handle, Reader};
pub use hoax_vm::{Compiler, Instruction, Module, OpCode, RuntimeError, Vm, VmConfig, VmState};

/// An in-memory output sink that can be read back after the VM has it.
#[derive(Clone, Default)]
pub struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8(self.0.borrow().clone()).unwrap()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Log sink shared with a `tracing` subscriber, which must be `Send + Sync`.
#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Run `f` with a subscriber installed for this thread and return its result
/// along with everything logged.
pub fn capture_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
    let logs = LogBuffer::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .without_time()
        .finish();
    let value = tracing::subscriber::with_default(subscriber, f);
    let text = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
    (value, text)
}

/// Everything needed to compile and run source, with natives registered.
pub struct Session {
    pub store: ExprStore,
    pub globals: GlobalEnv,
    pub module: Module,
    pub compiler: Compiler,
    pub vm: Vm,
    pub output: SharedBuffer,
}

impl Session {
    pub fn new() -> Self {
        Self::with_config(VmConfig::default(), GlobalEnv::new())
    }

    pub fn with_config(config: VmConfig, mut globals: GlobalEnv) -> Self {
        register_natives(&mut globals).unwrap();
        let output = SharedBuffer::default();
        Session {
            store: ExprStore::new(),
            globals,
            module: Module::new(),
            compiler: Compiler::new(),
            vm: Vm::with_output(config, Box::new(output.clone())),
            output,
        }
    }

    /// Compile `src` into the cleared module and run it.
    pub fn eval(&mut self, src: &str) -> Result<Expr, String> {
        self.module.clear();
        self.compiler
            .compile_source(src, &mut self.store, &mut self.module)
            .map_err(|e| format!("compile error: {}", e))?;
        self.run()
    }

    /// Run whatever is in the module.
    pub fn run(&mut self) -> Result<Expr, String> {
        self.vm
            .run(&self.module, &mut self.store, &mut self.globals)
            .map_err(|e| e.to_string())
    }

    /// Evaluate and print the result.
    pub fn eval_str(&mut self, src: &str) -> Result<String, String> {
        let value = self.eval(src)?;
        Ok(self.store.display(&value).to_string())
    }

    /// Load hand-assembled code and constants into the module.
    pub fn load(&mut self, constants: Vec<Expr>, code: &[Instruction]) {
        self.module.clear();
        for constant in constants {
            self.module.add_constant(constant).unwrap();
        }
        for instruction in code {
            self.module.emit(*instruction);
        }
    }
}

/// Run `src` in a fresh session and print the result.
pub fn compile_and_run(src: &str) -> Result<String, String> {
    Session::new().eval_str(src)
}

/// Assert that `src` fails with an error containing `expected_pattern`.
pub fn expect_error(src: &str, expected_pattern: &str) {
    match compile_and_run(src) {
        Err(e) => {
            assert!(
                e.to_lowercase().contains(&expected_pattern.to_lowercase()),
                "Error '{}' should contain '{}' for source: {}",
                e,
                expected_pattern,
                src
            );
        }
        Ok(val) => {
            panic!(
                "Expected error containing '{}', but got success: {} for source: {}",
                expected_pattern, val, src
            );
        }
    }
}
