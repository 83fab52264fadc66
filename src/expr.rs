// Copyright 2026 The Exprcalc Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::collections::HashMap;
use std::rc::Rc;

use crate::common::{ExprResult, Result};
use crate::config_err;
use crate::interpreter::{self, EvalEnv};
use crate::registry::Registry;
use crate::token::{Scanner, Token};
use crate::value::Value;

pub type CallbackFn = Rc<dyn Fn(&str) -> Option<Value>>;

/// A variable bound to a single-argument callback.  The callback is invoked
/// with the variable's name; returning `None` signals a non-numeric result.
/// `ident` is the callback's registered identity, checked against the
/// function allow-list when one is set.
#[derive(Clone)]
pub struct Callback {
    ident: String,
    f: CallbackFn,
}

impl Callback {
    pub fn new<F>(ident: &str, f: F) -> Self
    where
        F: Fn(&str) -> Option<Value> + 'static,
    {
        Callback {
            ident: ident.to_string(),
            f: Rc::new(f),
        }
    }

    pub fn ident(&self) -> &str {
        &self.ident
    }

    pub(crate) fn call(&self, name: &str) -> Option<Value> {
        (self.f)(name)
    }
}

/// A variable binding: either a constant or a callback resolved at
/// evaluation time.  The type admits nothing else, so "bound value is
/// numeric or a one-parameter callback" holds by construction.
#[derive(Clone)]
pub enum Binding {
    Const(Value),
    Callback(Callback),
}

impl From<Value> for Binding {
    fn from(v: Value) -> Self {
        Binding::Const(v)
    }
}

impl From<i64> for Binding {
    fn from(n: i64) -> Self {
        Binding::Const(Value::Int(n))
    }
}

impl From<f64> for Binding {
    fn from(n: f64) -> Self {
        Binding::Const(Value::Float(n))
    }
}

impl From<Callback> for Binding {
    fn from(cb: Callback) -> Self {
        Binding::Callback(cb)
    }
}

/// An expression plus everything needed to evaluate it: variable bindings,
/// the function/method registries, an optional allow-list, and the result
/// of the last `parse` call.
///
/// Not internally synchronized: callers that need to mutate bindings while
/// another evaluation is in flight must add their own locking or cloning
/// discipline.
pub struct Expression {
    text: String,
    variables: HashMap<String, Binding>,
    allow_list: Vec<String>,
    functions: Registry,
    methods: Registry,
    tokens: Vec<Token>,
    output: Vec<Token>,
}

impl Expression {
    /// Creates a context for `text` with the given initial bindings.  Fails
    /// with a config error on empty text or an invalid binding name.
    pub fn new(text: &str, variables: Vec<(&str, Binding)>) -> Result<Expression> {
        if text.is_empty() {
            return config_err!(EmptyExpression);
        }

        let mut expr = Expression {
            text: text.to_string(),
            variables: HashMap::new(),
            allow_list: Vec::new(),
            functions: Registry::new(),
            methods: Registry::new(),
            tokens: Vec::new(),
            output: Vec::new(),
        };
        for (name, value) in variables {
            expr.set_variable(name, value)?;
        }

        Ok(expr)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Binds `name` (trimmed) to a constant or callback.  Names must be
    /// non-empty and must not themselves read as numbers.
    pub fn set_variable(&mut self, name: &str, value: impl Into<Binding>) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return config_err!(EmptyVariableName);
        }
        if name.parse::<f64>().is_ok() {
            return config_err!(NumericVariableName, name.to_string());
        }

        self.variables.insert(name.to_string(), value.into());
        Ok(())
    }

    pub fn variable(&self, name: &str) -> Option<&Binding> {
        self.variables.get(name)
    }

    pub fn variables(&self) -> &HashMap<String, Binding> {
        &self.variables
    }

    /// Restricts which named functions, methods, and variable callbacks may
    /// be invoked during evaluation.  Names are stored lowercased; an empty
    /// list means no restriction.
    pub fn set_function_allowlist<S: AsRef<str>>(&mut self, names: impl IntoIterator<Item = S>) {
        self.allow_list = names
            .into_iter()
            .map(|n| n.as_ref().to_lowercase())
            .collect();
    }

    /// Injects the ambient free-function registry.
    pub fn set_functions(&mut self, functions: Registry) {
        self.functions = functions;
    }

    /// Injects the registry of methods exposed by the evaluation context.
    pub fn set_methods(&mut self, methods: Registry) {
        self.methods = methods;
    }

    pub fn functions_mut(&mut self) -> &mut Registry {
        &mut self.functions
    }

    pub fn methods_mut(&mut self) -> &mut Registry {
        &mut self.methods
    }

    /// Scans the expression, rebuilding the token history and the postfix
    /// output queue from scratch.  Returns the full token sequence.
    pub fn parse(&mut self) -> ExprResult<&[Token]> {
        self.tokens.clear();
        self.output.clear();

        let scanner = Scanner::new(&self.text, &self.variables, &self.functions, &self.methods);
        let (tokens, output) = scanner.scan()?;
        self.tokens = tokens;
        self.output = output;

        Ok(&self.tokens)
    }

    /// Evaluates the postfix sequence produced by the last `parse` call.
    /// Before any successful parse the queue is empty and the result is
    /// `None`.
    pub fn evaluate(&self) -> ExprResult<Option<Value>> {
        interpreter::evaluate(
            &self.output,
            &EvalEnv {
                variables: &self.variables,
                allow_list: &self.allow_list,
                functions: &self.functions,
                methods: &self.methods,
            },
        )
    }
}

#[cfg(test)]
mod test {
    use super::{Binding, Callback, Expression};
    use crate::common::{ErrorCode, ErrorKind};
    use crate::value::Value;

    #[test]
    fn empty_expression_rejected() {
        let err = Expression::new("", vec![]).err().unwrap();
        assert_eq!(ErrorKind::Config, err.kind);
        assert_eq!(ErrorCode::EmptyExpression, err.code);
    }

    #[test]
    fn invalid_variable_names_rejected() {
        for name in ["0", "123", "1.5", "", "  ", "\t"] {
            let err = Expression::new("1 + x", vec![(name, Binding::from(1))])
                .err()
                .unwrap();
            assert_eq!(ErrorKind::Config, err.kind, "name {name:?}");
        }
    }

    #[test]
    fn variable_names_are_trimmed() {
        let mut e = Expression::new("x", vec![]).unwrap();
        e.set_variable("  x  ", 3).unwrap();
        assert!(e.variable("x").is_some());
        assert!(e.variable("  x  ").is_none());
    }

    #[test]
    fn bindings_accessible() {
        let e = Expression::new(
            "x * y",
            vec![
                ("x", Binding::from(2)),
                ("y", Binding::from(Callback::new("cb", |_| Some(Value::Int(1))))),
            ],
        )
        .unwrap();

        assert_eq!(2, e.variables().len());
        assert!(matches!(e.variable("x"), Some(Binding::Const(Value::Int(2)))));
        match e.variable("y") {
            Some(Binding::Callback(cb)) => assert_eq!("cb", cb.ident()),
            _ => panic!("expected callback binding"),
        }
    }

    #[test]
    fn allowlist_is_lowercased() {
        let mut e = Expression::new("1", vec![]).unwrap();
        e.set_function_allowlist(["SIN", "Cos"]);
        let mut names = e.allow_list.clone();
        names.sort();
        assert_eq!(vec!["cos".to_string(), "sin".to_string()], names);
    }

    #[test]
    fn evaluate_before_parse_is_absent() {
        let e = Expression::new("1 + 2", vec![]).unwrap();
        assert_eq!(Ok(None), e.evaluate());
    }

    #[test]
    fn failed_parse_leaves_bindings_untouched() {
        let mut e = Expression::new("1 + nope", vec![("x", Binding::from(1))]).unwrap();
        assert!(e.parse().is_err());
        assert_eq!(1, e.variables().len());
    }
}
