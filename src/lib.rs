// Copyright 2026 The Exprcalc Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Arithmetic expression parsing and evaluation.
//!
//! Expressions are plain text: numeric literals (decimal, hex, binary,
//! scientific notation), the binary operators `+ - * / ^ %` with the usual
//! precedence and associativity, parentheses, named variables (constants or
//! single-argument callbacks), and calls into caller-supplied function and
//! method registries.  Scanning and shunting-yard resolution happen in a
//! single pass; evaluation walks the resulting postfix sequence with a
//! value stack.

#![forbid(unsafe_code)]

pub mod common;
mod expr;
mod interpreter;
mod registry;
mod token;
mod value;

pub use self::common::{Error, ErrorCode, ErrorKind, ExprError, ExprResult, Loc, Result};
pub use self::expr::{Binding, Callback, Expression};
pub use self::registry::{Callable, Registry};
pub use self::token::{Token, TokenKind};
pub use self::value::Value;
