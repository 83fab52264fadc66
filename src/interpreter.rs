// Copyright 2026 The Exprcalc Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::collections::HashMap;

use smallvec::SmallVec;

use crate::common::ExprResult;
use crate::eval_err;
use crate::expr::Binding;
use crate::registry::Registry;
use crate::token::{Token, TokenKind};
use crate::value::Value;

/// Everything the postfix walk needs from the owning `Expression`.
pub(crate) struct EvalEnv<'a> {
    pub variables: &'a HashMap<String, Binding>,
    pub allow_list: &'a [String],
    pub functions: &'a Registry,
    pub methods: &'a Registry,
}

impl EvalEnv<'_> {
    fn allows(&self, name: &str) -> bool {
        self.allow_list.is_empty() || self.allow_list.contains(&name.to_lowercase())
    }
}

/// Walks a postfix token sequence with a single value stack.  An empty
/// sequence yields `None`; otherwise the result is the value left on top of
/// the stack.
pub(crate) fn evaluate(output: &[Token], env: &EvalEnv) -> ExprResult<Option<Value>> {
    let mut stack: SmallVec<[Value; 8]> = SmallVec::new();

    for token in output {
        match token.kind {
            TokenKind::Number => {
                let Some(v) = token.value else {
                    return eval_err!(UnknownToken, token);
                };
                stack.push(v);
            }
            TokenKind::Variable => {
                let Some(binding) = env.variables.get(&token.text) else {
                    return eval_err!(UndefinedVariable, token);
                };
                match binding {
                    Binding::Const(v) => stack.push(*v),
                    Binding::Callback(cb) => {
                        if !env.allows(cb.ident()) {
                            return eval_err!(FunctionBlacklisted, token);
                        }
                        match cb.call(&token.text) {
                            Some(v) => stack.push(v),
                            None => return eval_err!(NonNumericResult, token),
                        }
                    }
                }
            }
            TokenKind::Operator => {
                // the first pop is the right operand
                let (Some(b), Some(a)) = (stack.pop(), stack.pop()) else {
                    return eval_err!(MalformedExpression, token);
                };
                let v = match token.text.as_str() {
                    "+" => a + b,
                    "-" => a - b,
                    "*" => a * b,
                    "/" => a / b,
                    "^" => a.pow(b),
                    "%" => a % b,
                    _ => return eval_err!(UnknownToken, token),
                };
                stack.push(v);
            }
            TokenKind::Function | TokenKind::Method => {
                if !env.allows(&token.text) {
                    return eval_err!(FunctionBlacklisted, token);
                }
                let registry = match token.kind {
                    TokenKind::Method => env.methods,
                    _ => env.functions,
                };
                let Some(callable) = registry.get(&token.text) else {
                    return eval_err!(UnknownFunction, token);
                };

                let mut args: SmallVec<[Value; 4]> = SmallVec::new();
                for _ in 0..callable.arity() {
                    let Some(v) = stack.pop() else {
                        return eval_err!(MalformedExpression, token);
                    };
                    args.push(v);
                }
                // popping reversed the arguments; restore source order
                args.reverse();

                match callable.call(&args) {
                    Some(v) => stack.push(v),
                    None => return eval_err!(FunctionCallFailed, token),
                }
            }
            _ => {
                return if token.text == ")" {
                    eval_err!(MismatchedParentheses, token)
                } else {
                    eval_err!(UnknownToken, token)
                };
            }
        }
    }

    Ok(stack.pop())
}
