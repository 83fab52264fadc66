// Copyright 2026 The Exprcalc Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Injectable callable registries.
//!
//! The scanner and evaluator never resolve names against an ambient global
//! namespace; the caller supplies explicit tables mapping a name to a
//! declared arity plus an invocation closure.  One registry instance serves
//! free functions, a second one serves methods exposed by the evaluation
//! context.  Names are case-insensitive.

use std::collections::HashMap;
use std::rc::Rc;

use crate::value::Value;

pub type CallableFn = Rc<dyn Fn(&[Value]) -> Option<Value>>;

/// A named callable: declared positional-parameter count plus the closure
/// to invoke.  Returning `None` is the failure signal.
#[derive(Clone)]
pub struct Callable {
    arity: usize,
    f: CallableFn,
}

impl Callable {
    pub fn new<F>(arity: usize, f: F) -> Self
    where
        F: Fn(&[Value]) -> Option<Value> + 'static,
    {
        Callable {
            arity,
            f: Rc::new(f),
        }
    }

    pub fn arity(&self) -> usize {
        self.arity
    }

    pub fn call(&self, args: &[Value]) -> Option<Value> {
        (self.f)(args)
    }
}

#[derive(Clone, Default)]
pub struct Registry {
    entries: HashMap<String, Callable>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a callable under `name`.  A later definition with the same
    /// name (in any casing) replaces the earlier one.
    pub fn define<F>(&mut self, name: &str, arity: usize, f: F)
    where
        F: Fn(&[Value]) -> Option<Value> + 'static,
    {
        self.entries
            .insert(name.to_lowercase(), Callable::new(arity, f));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(&name.to_lowercase())
    }

    pub fn get(&self, name: &str) -> Option<&Callable> {
        self.entries.get(&name.to_lowercase())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod test {
    use super::Registry;
    use crate::value::Value;

    #[test]
    fn lookup_is_case_insensitive() {
        let mut reg = Registry::new();
        assert!(reg.is_empty());
        reg.define("Cos", 1, |args| {
            Some(Value::Float(args[0].as_f64().cos()))
        });

        assert!(!reg.is_empty());
        assert_eq!(1, reg.len());
        assert!(reg.contains("cos"));
        assert!(reg.contains("COS"));
        assert!(!reg.contains("cosh"));
        assert_eq!(1, reg.get("cos").map(|c| c.arity()).unwrap_or(0));
    }

    #[test]
    fn redefinition_replaces() {
        let mut reg = Registry::new();
        reg.define("f", 1, |_| Some(Value::Int(1)));
        reg.define("F", 2, |_| Some(Value::Int(2)));

        assert_eq!(1, reg.len());
        let f = reg.get("f").unwrap();
        assert_eq!(2, f.arity());
        assert_eq!(Some(Value::Int(2)), f.call(&[]));
    }

    #[test]
    fn failure_signal() {
        let mut reg = Registry::new();
        reg.define("fails", 0, |_| None);
        assert_eq!(None, reg.get("fails").unwrap().call(&[]));
    }
}
