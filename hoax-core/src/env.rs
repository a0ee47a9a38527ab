// hoax-core - Global environment
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! The global environment: an open-addressed table from names to expressions.
//!
//! The table has a fixed number of slots chosen at construction. It is not
//! allocated until the first write and never grows. Collisions are resolved
//! by linear probing, wrapping at the end of the table.
//!
//! ```
//! use hoax_core::GlobalEnv;
//! use hoax_parser::{Expr, Symbol};
//!
//! let mut env = GlobalEnv::new();
//! env.set(Symbol::new("x"), Expr::Integer(1)).unwrap();
//! assert_eq!(env.get("x"), Some(&Expr::Integer(1)));
//! assert_eq!(env.get("y"), None);
//! ```

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use hoax_parser::{Expr, Native, Symbol};

use crate::error::{EnvError, Result};

/// Slot count used by [`GlobalEnv::new`].
pub const DEFAULT_CAPACITY: usize = 1024;

#[derive(Debug, Clone)]
struct Slot {
    key: Symbol,
    value: Expr,
}

/// Global bindings shared by the compiler's output and the VM.
#[derive(Debug, Clone)]
pub struct GlobalEnv {
    /// Empty until the first write.
    slots: Vec<Option<Slot>>,
    capacity: usize,
    len: usize,
}

/// Where a probe for a key ended up.
enum Probe {
    Found(usize),
    Vacant(usize),
    Full,
}

impl GlobalEnv {
    /// Create an environment with [`DEFAULT_CAPACITY`] slots.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create an environment with a fixed number of slots (at least one).
    pub fn with_capacity(capacity: usize) -> Self {
        GlobalEnv {
            slots: Vec::new(),
            capacity: capacity.max(1),
            len: 0,
        }
    }

    /// Number of slots the table will ever have.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of bound names.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether the slot array has been allocated yet.
    pub fn is_allocated(&self) -> bool {
        !self.slots.is_empty()
    }

    /// Look up a binding.
    pub fn get(&self, name: &str) -> Option<&Expr> {
        match self.probe(name) {
            Probe::Found(idx) => self.slots[idx].as_ref().map(|slot| &slot.value),
            Probe::Vacant(_) | Probe::Full => None,
        }
    }

    /// Check if a name is bound.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Bind `name` to `value`, returning the previous value if there was one.
    ///
    /// Rebinding an existing name always succeeds. Binding a new name fails
    /// with [`EnvError::Full`] once every slot is taken.
    pub fn set(&mut self, name: Symbol, value: Expr) -> Result<Option<Expr>> {
        if self.slots.is_empty() {
            self.slots = vec![None; self.capacity];
        }

        match self.probe(name.as_str()) {
            Probe::Found(idx) => {
                let slot = self.slots[idx].as_mut().map(|slot| &mut slot.value);
                Ok(slot.map(|old| std::mem::replace(old, value)))
            }
            Probe::Vacant(idx) => {
                self.slots[idx] = Some(Slot { key: name, value });
                self.len += 1;
                Ok(None)
            }
            Probe::Full => Err(EnvError::Full {
                name: name.as_str().to_string(),
                capacity: self.capacity,
            }),
        }
    }

    /// Bind a native function under its own name.
    pub fn define_native(&mut self, native: Native) -> Result<()> {
        let name = native.name.clone();
        self.set(name, Expr::Native(native))?;
        Ok(())
    }

    /// Iterate over all bindings in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (&Symbol, &Expr)> {
        self.slots
            .iter()
            .flatten()
            .map(|slot| (&slot.key, &slot.value))
    }

    fn probe(&self, name: &str) -> Probe {
        if self.slots.is_empty() {
            return Probe::Vacant(0);
        }

        let start = slot_index(name, self.capacity);
        for step in 0..self.capacity {
            let idx = (start + step) % self.capacity;
            match &self.slots[idx] {
                None => return Probe::Vacant(idx),
                Some(slot) if slot.key.as_str() == name => return Probe::Found(idx),
                Some(_) => {}
            }
        }
        Probe::Full
    }
}

impl Default for GlobalEnv {
    fn default() -> Self {
        Self::new()
    }
}

/// Home slot for a name. `DefaultHasher::new` uses fixed keys, so the layout
/// is the same from run to run.
fn slot_index(name: &str, capacity: usize) -> usize {
    let mut hasher = DefaultHasher::new();
    name.hash(&mut hasher);
    (hasher.finish() % capacity as u64) as usize
}

// ============================================================================
// Tests
// ============================================================================
