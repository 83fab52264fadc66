// Copyright 2026 The Exprcalc Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Numeric values flowing through evaluation.
//!
//! Literals and results are either signed integers or double-precision
//! floats.  Integer arithmetic promotes to float when a result is not
//! representable (overflow, uneven division, negative exponents) instead of
//! wrapping; division or remainder by integer zero is left to the platform's
//! native semantics.

use std::fmt;
use std::ops::{Add, Div, Mul, Rem, Sub};

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Int(i64),
    Float(f64),
}

impl Value {
    pub fn as_f64(self) -> f64 {
        match self {
            Value::Int(n) => n as f64,
            Value::Float(n) => n,
        }
    }

    pub fn is_int(self) -> bool {
        matches!(self, Value::Int(_))
    }

    /// Exponentiation: integer base and non-negative integer exponent stay
    /// integer when representable, everything else goes through `powf`.
    pub fn pow(self, rhs: Value) -> Value {
        match (self, rhs) {
            (Value::Int(a), Value::Int(b)) if b >= 0 => u32::try_from(b)
                .ok()
                .and_then(|e| a.checked_pow(e))
                .map(Value::Int)
                .unwrap_or_else(|| Value::Float((a as f64).powf(b as f64))),
            (a, b) => Value::Float(a.as_f64().powf(b.as_f64())),
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(n) => write!(f, "{n}"),
        }
    }
}

impl Add for Value {
    type Output = Value;

    fn add(self, rhs: Value) -> Value {
        match (self, rhs) {
            (Value::Int(a), Value::Int(b)) => a
                .checked_add(b)
                .map(Value::Int)
                .unwrap_or_else(|| Value::Float(a as f64 + b as f64)),
            (a, b) => Value::Float(a.as_f64() + b.as_f64()),
        }
    }
}

impl Sub for Value {
    type Output = Value;

    fn sub(self, rhs: Value) -> Value {
        match (self, rhs) {
            (Value::Int(a), Value::Int(b)) => a
                .checked_sub(b)
                .map(Value::Int)
                .unwrap_or_else(|| Value::Float(a as f64 - b as f64)),
            (a, b) => Value::Float(a.as_f64() - b.as_f64()),
        }
    }
}

impl Mul for Value {
    type Output = Value;

    fn mul(self, rhs: Value) -> Value {
        match (self, rhs) {
            (Value::Int(a), Value::Int(b)) => a
                .checked_mul(b)
                .map(Value::Int)
                .unwrap_or_else(|| Value::Float(a as f64 * b as f64)),
            (a, b) => Value::Float(a.as_f64() * b.as_f64()),
        }
    }
}

impl Div for Value {
    type Output = Value;

    fn div(self, rhs: Value) -> Value {
        match (self, rhs) {
            // stays integer only when evenly divisible
            (Value::Int(a), Value::Int(b)) => {
                if a % b == 0 {
                    Value::Int(a / b)
                } else {
                    Value::Float(a as f64 / b as f64)
                }
            }
            (a, b) => Value::Float(a.as_f64() / b.as_f64()),
        }
    }
}

impl Rem for Value {
    type Output = Value;

    fn rem(self, rhs: Value) -> Value {
        match (self, rhs) {
            (Value::Int(a), Value::Int(b)) => Value::Int(a % b),
            (a, b) => Value::Float(a.as_f64() % b.as_f64()),
        }
    }
}
