//! Runtime variable scopes, linked into a chain via `enclosing`.
//!
//! Environments are shared (`Rc<RefCell<_>>`) because closures capture the
//! environment active at their definition point and keep it alive after the
//! defining block has exited.  Reference cycles (a function value stored in
//! the environment it captured) are expected for self-referential local
//! functions and are not treated as leaks.
//!
//! `get`/`assign` walk the chain dynamically and are used for globals;
//! `get_at`/`assign_at` hop a resolver-computed number of links and touch
//! only that scope's own table, which is what makes shadowing-after-capture
//! behave lexically.
//!
//! All fallible operations return a message-only `Err(String)`; the
//! interpreter attaches the source line when converting to a runtime error.

use crate::value::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Debug, Default)]
pub struct Environment {
    values: HashMap<String, Value>,
    enclosing: Option<Rc<RefCell<Environment>>>,
}

impl Environment {
    /// A root environment with no parent (the globals table).
    pub fn new() -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: None,
        }
    }

    /// A child environment chained to `enclosing`.
    pub fn with_enclosing(enclosing: Rc<RefCell<Environment>>) -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: Some(enclosing),
        }
    }

    /// Insert or overwrite `name` in *this* scope's own table.  Never fails;
    /// redefinition in the same scope is allowed.
    pub fn define(&mut self, name: &str, value: Value) {
        self.values.insert(name.to_string(), value);
    }

    /// Read `name`, walking enclosing links outward.
    pub fn get(&self, name: &str) -> Result<Value, String> {
        if let Some(value) = self.values.get(name) {
            Ok(value.clone())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow().get(name)
        } else {
            Err(format!("Undefined variable '{}'.", name))
        }
    }

    /// Mutate an *existing* binding, walking enclosing links outward.
    /// Assignment never implicitly declares.
    pub fn assign(&mut self, name: &str, value: Value) -> Result<(), String> {
        if self.values.contains_key(name) {
            self.values.insert(name.to_string(), value);
            Ok(())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow_mut().assign(name, value)
        } else {
            Err(format!("Undefined variable '{}'.", name))
        }
    }

    /// Read `name` directly from the scope exactly `depth` hops up the
    /// chain, bypassing the dynamic walk (and any same-named binding
    /// introduced in an intervening scope after resolution).
    pub fn get_at(env: &Rc<RefCell<Environment>>, depth: usize, name: &str) -> Result<Value, String> {
        let target: Rc<RefCell<Environment>> = Self::ancestor(env, depth)?;

        let value: Option<Value> = target.borrow().values.get(name).cloned();

        value.ok_or_else(|| format!("Undefined variable '{}'.", name))
    }

    /// Write `name` directly in the scope exactly `depth` hops up the chain.
    pub fn assign_at(
        env: &Rc<RefCell<Environment>>,
        depth: usize,
        name: &str,
        value: Value,
    ) -> Result<(), String> {
        let target: Rc<RefCell<Environment>> = Self::ancestor(env, depth)?;

        let result: Result<(), String> = match target.borrow_mut().values.get_mut(name) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(format!("Undefined variable '{}'.", name)),
        };

        result
    }

    /// Follow exactly `depth` enclosing links.  The resolver guarantees the
    /// chain is deep enough; a short chain is an internal invariant breach.
    fn ancestor(
        env: &Rc<RefCell<Environment>>,
        depth: usize,
    ) -> Result<Rc<RefCell<Environment>>, String> {
        let mut current: Rc<RefCell<Environment>> = Rc::clone(env);

        for _ in 0..depth {
            let next: Option<Rc<RefCell<Environment>>> = current.borrow().enclosing.clone();

            current = next.ok_or_else(|| {
                format!("Internal error: no enclosing environment at depth {}.", depth)
            })?;
        }

        Ok(current)
    }
}
