// Copyright 2026 The Exprcalc Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::fmt;
use std::{error, result};

use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    NoError, // will never be produced
    UnknownToken,
    UnknownFunction,
    UndefinedVariable,
    MultipleDecimalPoints,
    InvalidScientificNotation,
    LeadingZeroExponent,
    MismatchedParentheses,
    MalformedExpression,
    FunctionBlacklisted,
    NonNumericResult,
    FunctionCallFailed,
    EmptyExpression,
    EmptyVariableName,
    NumericVariableName,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use ErrorCode::*;
        let name = match self {
            NoError => "no_error",
            UnknownToken => "unknown_token",
            UnknownFunction => "unknown_function",
            UndefinedVariable => "undefined_variable",
            MultipleDecimalPoints => "multiple_decimal_points",
            InvalidScientificNotation => "invalid_scientific_notation",
            LeadingZeroExponent => "leading_zero_exponent",
            MismatchedParentheses => "mismatched_parentheses",
            MalformedExpression => "malformed_expression",
            FunctionBlacklisted => "function_blacklisted",
            NonNumericResult => "non_numeric_result",
            FunctionCallFailed => "function_call_failed",
            EmptyExpression => "empty_expression",
            EmptyVariableName => "empty_variable_name",
            NumericVariableName => "numeric_variable_name",
        };

        write!(f, "{name}")
    }
}

/// Loc describes a location in an expression by the starting point and ending
/// point.  Expressions are strings typed by humans -- u16 is long enough.
#[derive(PartialEq, Eq, Clone, Copy, Debug, Default, Hash, Serialize, Deserialize)]
pub struct Loc {
    pub start: u16,
    pub end: u16,
}

impl Loc {
    pub fn new(start: usize, end: usize) -> Self {
        Loc {
            start: start as u16,
            end: end as u16,
        }
    }

    /// union takes a second Loc and returns the inclusive range from the
    /// start of the earlier token to the end of the later token.
    pub fn union(&self, rhs: &Self) -> Self {
        Loc {
            start: self.start.min(rhs.start),
            end: self.end.max(rhs.end),
        }
    }
}

impl fmt::Display for Loc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start, self.end)
    }
}

/// An error produced while scanning or evaluating an expression.  Carries the
/// offending token text and the span in the source where it began.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExprError {
    pub code: ErrorCode,
    pub token: String,
    pub loc: Loc,
}

impl fmt::Display for ExprError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}: '{}'", self.loc, self.code, self.token)
    }
}

impl error::Error for ExprError {}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    Expression,
}

/// A top-level error: configuration/contract violations raised by
/// construction and binding mutation, or a wrapped expression error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    pub kind: ErrorKind,
    pub code: ErrorCode,
    pub details: Option<String>,
}

impl Error {
    pub fn new(kind: ErrorKind, code: ErrorCode, details: Option<String>) -> Self {
        Error {
            kind,
            code,
            details,
        }
    }

    pub fn get_details(&self) -> Option<String> {
        self.details.clone()
    }
}

impl From<ExprError> for Error {
    fn from(err: ExprError) -> Self {
        Error {
            kind: ErrorKind::Expression,
            code: err.code,
            details: Some(err.token),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let kind = match self.kind {
            ErrorKind::Config => "ConfigError",
            ErrorKind::Expression => "ExpressionError",
        };
        match self.details {
            Some(ref details) => write!(f, "{}{{{}: {}}}", kind, self.code, details),
            None => write!(f, "{}{{{}}}", kind, self.code),
        }
    }
}

impl error::Error for Error {}

pub type Result<T> = result::Result<T, Error>;
pub type ExprResult<T> = result::Result<T, ExprError>;

#[macro_export]
macro_rules! lex_err(
    ($code:tt, $token:expr, $start:expr, $end:expr) => {{
        use $crate::common::{ErrorCode, ExprError, Loc};
        Err(ExprError {
            code: ErrorCode::$code,
            token: $token,
            loc: Loc::new($start, $end),
        })
    }}
);

#[macro_export]
macro_rules! eval_err(
    ($code:tt, $token:expr) => {{
        use $crate::common::{ErrorCode, ExprError};
        Err(ExprError {
            code: ErrorCode::$code,
            token: $token.text.clone(),
            loc: $token.loc,
        })
    }}
);

#[macro_export]
macro_rules! config_err {
    ($code:tt, $str:expr) => {{
        use $crate::common::{Error, ErrorCode, ErrorKind};
        Err(Error::new(ErrorKind::Config, ErrorCode::$code, Some($str)))
    }};
    ($code:tt) => {{
        use $crate::common::{Error, ErrorCode, ErrorKind};
        Err(Error::new(ErrorKind::Config, ErrorCode::$code, None))
    }};
}

#[test]
fn test_loc_basics() {
    let a = Loc { start: 3, end: 7 };
    assert_eq!(a, Loc::new(3, 7));

    let b = Loc { start: 4, end: 11 };
    assert_eq!(Loc::new(3, 11), a.union(&b));

    let c = Loc { start: 1, end: 5 };
    assert_eq!(Loc::new(1, 7), a.union(&c));
}

#[test]
fn test_error_display() {
    let err = ExprError {
        code: ErrorCode::UnknownFunction,
        token: "foock".to_string(),
        loc: Loc::new(2, 7),
    };
    assert_eq!("2:7:unknown_function: 'foock'", format!("{err}"));

    let err: Error = err.into();
    assert_eq!(ErrorKind::Expression, err.kind);
    assert_eq!(Some("foock".to_string()), err.get_details());
    assert_eq!("ExpressionError{unknown_function: foock}", format!("{err}"));

    let err = Error::new(ErrorKind::Config, ErrorCode::EmptyExpression, None);
    assert_eq!(None, err.get_details());
    assert_eq!("ConfigError{empty_expression}", format!("{err}"));
}
