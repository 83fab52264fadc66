// Copyright 2026 The Exprcalc Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

// Scanning and shunting-yard resolution are fused in a single left-to-right
// pass: deciding whether a `-` is a sign flip requires looking back into the
// token history that the same pass is producing.

use std::collections::HashMap;
use std::str::CharIndices;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use unicode_xid::UnicodeXID;

use crate::common::{ExprResult, Loc};
use crate::expr::Binding;
use crate::lex_err;
use crate::registry::Registry;
use crate::value::Value;


const HIGH_PRECEDENCE: u8 = 4;
const MEDIUM_PRECEDENCE: u8 = 3;
const LOW_PRECEDENCE: u8 = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Assoc {
    Left,
    Right,
}

fn operator_rule(op: &str) -> (u8, Assoc) {
    match op {
        "^" => (HIGH_PRECEDENCE, Assoc::Right),
        "*" | "/" | "%" => (MEDIUM_PRECEDENCE, Assoc::Left),
        _ => (LOW_PRECEDENCE, Assoc::Left),
    }
}

/// The kind of a scanned token.  The enum is closed, so every token the
/// scanner produces is one of these variants; `Unknown` exists only as the
/// normalization target for tokens that survive into evaluation without a
/// meaningful classification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenKind {
    Number,
    Operator,
    LParen,
    RParen,
    Function,
    Method,
    Variable,
    Comma,
    Unknown,
}

/// An immutable scanned token: its kind, the original lexeme (or resolved
/// name), the literal value for numbers, and the span where it began.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub value: Option<Value>,
    pub loc: Loc,
}

impl Token {
    pub fn new(kind: TokenKind, text: &str, loc: Loc) -> Self {
        Token {
            kind,
            text: text.to_string(),
            value: None,
            loc,
        }
    }

    pub fn number(text: &str, value: Value, loc: Loc) -> Self {
        Token {
            kind: TokenKind::Number,
            text: text.to_string(),
            value: Some(value),
            loc,
        }
    }
}

/// One-shot scanner over an expression.  Produces the complete token history
/// (diagnostic artifact) and the postfix output queue (evaluation plan) in a
/// single pass, driving the operator stack as tokens are recognized.
pub(crate) struct Scanner<'a> {
    text: &'a str,
    chars: CharIndices<'a>,
    lookahead: Option<(usize, char)>,
    variables: &'a HashMap<String, Binding>,
    functions: &'a Registry,
    methods: &'a Registry,
    tokens: Vec<Token>,
    output: Vec<Token>,
    stack: SmallVec<[Token; 16]>,
    // span of a `-` that denotes a sign flip, not subtraction
    pending_negative: Option<Loc>,
}

impl<'a> Scanner<'a> {
    pub(crate) fn new(
        text: &'a str,
        variables: &'a HashMap<String, Binding>,
        functions: &'a Registry,
        methods: &'a Registry,
    ) -> Self {
        let mut s = Scanner {
            text,
            chars: text.char_indices(),
            lookahead: None,
            variables,
            functions,
            methods,
            tokens: Vec::new(),
            output: Vec::new(),
            stack: SmallVec::new(),
            pending_negative: None,
        };
        s.bump();
        s
    }

    pub(crate) fn scan(mut self) -> ExprResult<(Vec<Token>, Vec<Token>)> {
        while let Some((i, c)) = self.lookahead {
            if matches!(c, ' ' | '\t' | '\r' | '\n') {
                self.bump();
                continue;
            }

            // A pending sign flip must resolve before any other token is
            // processed, so nested unary minuses compose and an exponent
            // still binds before the synthesized multiply.
            if let Some(loc) = self.pending_negative.take() {
                self.synthesize_sign_flip(loc);
            }

            if is_number_start(c) {
                let tok = self.number(i)?;
                self.push_output(tok);
                continue;
            }

            if is_identifier_start(c) {
                let tok = self.identifier(i)?;
                match tok.kind {
                    TokenKind::Function | TokenKind::Method => self.push_operator(tok),
                    _ => self.push_output(tok),
                }
                continue;
            }

            match c {
                ',' => {
                    // argument separator: recorded in the history only
                    self.tokens
                        .push(Token::new(TokenKind::Comma, ",", Loc::new(i, i + 1)));
                    self.bump();
                }
                '+' | '-' | '*' | '/' | '^' | '%' => {
                    if c == '-' && self.minus_is_sign_flip() {
                        self.pending_negative = Some(Loc::new(i, i + 1));
                        self.bump();
                    } else {
                        let op = &self.text[i..i + 1];
                        self.resolve_operator_precedence(op);
                        let tok = Token::new(TokenKind::Operator, op, Loc::new(i, i + 1));
                        self.push_operator(tok);
                        self.bump();
                    }
                }
                '(' => {
                    let tok = Token::new(TokenKind::LParen, "(", Loc::new(i, i + 1));
                    self.push_operator(tok);
                    self.bump();
                }
                ')' => {
                    self.tokens
                        .push(Token::new(TokenKind::RParen, ")", Loc::new(i, i + 1)));
                    self.bump();
                    self.resolve_parentheses(i)?;
                }
                _ => {
                    return lex_err!(UnknownToken, c.to_string(), i, i + c.len_utf8());
                }
            }
        }

        // drain remaining operators; a leftover LParen was never closed
        while let Some(op) = self.stack.pop() {
            if op.kind == TokenKind::LParen {
                return lex_err!(
                    MismatchedParentheses,
                    op.text,
                    op.loc.start as usize,
                    op.loc.end as usize
                );
            }
            self.output.push(op);
        }

        Ok((self.tokens, self.output))
    }

    // ── cursor helpers ──────────────────────────────────────────────────

    fn bump(&mut self) -> Option<(usize, char)> {
        self.bump_n(1)
    }

    fn bump_n(&mut self, n: usize) -> Option<(usize, char)> {
        assert!(n > 0);
        self.lookahead = self.chars.nth(n - 1);
        self.lookahead
    }

    fn take_while<F>(&mut self, mut keep_going: F) -> Option<usize>
    where
        F: FnMut(char) -> bool,
    {
        loop {
            match self.lookahead {
                None => {
                    return None;
                }
                Some((idx1, c)) => {
                    if keep_going(c) {
                        self.bump();
                    } else {
                        return Some(idx1);
                    }
                }
            }
        }
    }

    fn cursor(&self) -> usize {
        self.lookahead.map_or(self.text.len(), |(i, _)| i)
    }

    // ── token history / output / stack ──────────────────────────────────

    fn push_output(&mut self, tok: Token) {
        self.tokens.push(tok.clone());
        self.output.push(tok);
    }

    fn push_operator(&mut self, tok: Token) {
        self.tokens.push(tok.clone());
        self.stack.push(tok);
    }

    fn minus_is_sign_flip(&self) -> bool {
        match self.tokens.last() {
            None => true,
            Some(t) => matches!(t.kind, TokenKind::Operator | TokenKind::Comma),
        }
    }

    /// Rewrites a unary `-` as `-1 *`: the constant goes straight to the
    /// output, the multiply goes onto the stack without precedence
    /// resolution so that a pending `^` still binds first.
    fn synthesize_sign_flip(&mut self, loc: Loc) {
        self.push_output(Token::number("-1", Value::Int(-1), loc));
        self.push_operator(Token::new(TokenKind::Operator, "*", loc));
    }

    fn resolve_operator_precedence(&mut self, new_op: &str) {
        let (new_prec, new_assoc) = operator_rule(new_op);
        while let Some(top) = self.stack.last() {
            if top.kind == TokenKind::LParen {
                break;
            }
            let top_wins = match top.kind {
                // a call resolves before any operator touches its result
                TokenKind::Function | TokenKind::Method => true,
                _ => {
                    let (top_prec, _) = operator_rule(&top.text);
                    top_prec > new_prec || (top_prec == new_prec && new_assoc == Assoc::Left)
                }
            };
            if !top_wins {
                break;
            }
            if let Some(top) = self.stack.pop() {
                self.output.push(top);
            }
        }
    }

    fn resolve_parentheses(&mut self, close_pos: usize) -> ExprResult<()> {
        loop {
            match self.stack.pop() {
                Some(op) if op.kind == TokenKind::LParen => return Ok(()),
                Some(op) => self.output.push(op),
                None => {
                    return lex_err!(
                        MismatchedParentheses,
                        ")".to_string(),
                        close_pos,
                        close_pos + 1
                    );
                }
            }
        }
    }

    // ── number literals ─────────────────────────────────────────────────

    fn number(&mut self, idx0: usize) -> ExprResult<Token> {
        let rest = self.text[idx0..].as_bytes();
        if rest.len() > 2 && rest[0] == b'0' {
            match rest[1] {
                b'x' | b'X' => return Ok(self.radix_number(idx0, 16)),
                b'b' | b'B' => return Ok(self.radix_number(idx0, 2)),
                _ => {}
            }
        }
        self.decimal_number(idx0)
    }

    /// Hex (`0x`) and binary (`0b`) literals.  Zero digits after the prefix
    /// yields 0; a literal wider than i64 promotes to float.
    fn radix_number(&mut self, idx0: usize, radix: u32) -> Token {
        self.bump_n(2); // skip the 0x/0b prefix
        let end = self
            .take_while(|c| c.is_digit(radix))
            .unwrap_or(self.text.len());
        let digits = &self.text[idx0 + 2..end];
        let value = match i64::from_str_radix(digits, radix) {
            Ok(n) => Value::Int(n),
            Err(_) if digits.is_empty() => Value::Int(0),
            // wider than i64: accumulate the digits as a float
            Err(_) => Value::Float(
                digits
                    .chars()
                    .filter_map(|c| c.to_digit(radix))
                    .fold(0f64, |acc, d| acc * f64::from(radix) + f64::from(d)),
            ),
        };
        Token::number(&self.text[idx0..end], value, Loc::new(idx0, end))
    }

    fn decimal_number(&mut self, idx0: usize) -> ExprResult<Token> {
        let mut saw_decimal = false;
        // a leading dot reads as `0.`
        if let Some((_, '.')) = self.lookahead {
            saw_decimal = true;
            self.bump();
        }

        loop {
            match self.lookahead {
                Some((_, c)) if c.is_ascii_digit() => {
                    self.bump();
                }
                Some((i, '.')) => {
                    if saw_decimal {
                        return lex_err!(
                            MultipleDecimalPoints,
                            self.text[idx0..i].to_string(),
                            i,
                            i + 1
                        );
                    }
                    saw_decimal = true;
                    self.bump();
                }
                Some((i, 'e' | 'E')) => {
                    return self.exponent(idx0, i, saw_decimal);
                }
                _ => break,
            }
        }

        let end = self.cursor();
        let lexeme = &self.text[idx0..end];
        let value = if saw_decimal {
            Value::Float(parse_mantissa(lexeme))
        } else {
            match lexeme.parse::<i64>() {
                Ok(n) => Value::Int(n),
                Err(_) => Value::Float(lexeme.parse::<f64>().unwrap_or(f64::INFINITY)),
            }
        };

        Ok(Token::number(lexeme, value, Loc::new(idx0, end)))
    }

    /// Scientific notation: `e`/`E`, an optional single `-`, then at least
    /// one digit.  A leading zero in the exponent digits is rejected even
    /// for negative exponents -- `E-02` is invalid by design.
    fn exponent(&mut self, idx0: usize, e_idx: usize, saw_decimal: bool) -> ExprResult<Token> {
        self.bump(); // consume the e/E

        let mut negative = false;
        if let Some((_, '-')) = self.lookahead {
            negative = true;
            self.bump();
        }

        let digits_start = match self.lookahead {
            Some((i, c)) if c.is_ascii_digit() => {
                if c == '0' {
                    return lex_err!(
                        LeadingZeroExponent,
                        self.text[idx0..i + 1].to_string(),
                        idx0,
                        i + 1
                    );
                }
                i
            }
            _ => {
                let end = self.cursor();
                return lex_err!(
                    InvalidScientificNotation,
                    self.text[idx0..end].to_string(),
                    idx0,
                    end
                );
            }
        };

        let end = self
            .take_while(|c| c.is_ascii_digit())
            .unwrap_or(self.text.len());
        let lexeme = &self.text[idx0..end];
        let exp: i32 = self.text[digits_start..end].parse().unwrap_or(i32::MAX);

        let value = if saw_decimal || negative {
            let exp = if negative { -exp } else { exp };
            let mantissa = parse_mantissa(&self.text[idx0..e_idx]);
            Value::Float(mantissa * 10f64.powi(exp))
        } else {
            let mantissa = &self.text[idx0..e_idx];
            match mantissa.parse::<i64>() {
                Ok(m) => u32::try_from(exp)
                    .ok()
                    .and_then(|e| 10i64.checked_pow(e))
                    .and_then(|scale| m.checked_mul(scale))
                    .map(Value::Int)
                    .unwrap_or_else(|| Value::Float(parse_mantissa(mantissa) * 10f64.powi(exp))),
                Err(_) => Value::Float(parse_mantissa(mantissa) * 10f64.powi(exp)),
            }
        };

        Ok(Token::number(lexeme, value, Loc::new(idx0, end)))
    }

    // ── identifiers ─────────────────────────────────────────────────────

    /// Consumes an identifier and classifies it by peeking past trailing
    /// whitespace: a following `(` makes it a call (method registry first,
    /// then function registry), anything else makes it a variable reference.
    fn identifier(&mut self, idx0: usize) -> ExprResult<Token> {
        let end = self
            .take_while(is_identifier_continue)
            .unwrap_or(self.text.len());
        let name = &self.text[idx0..end];
        let loc = Loc::new(idx0, end);

        while matches!(self.lookahead, Some((_, ' ' | '\t' | '\r' | '\n'))) {
            self.bump();
        }

        match self.lookahead {
            Some((_, '(')) => {
                if self.methods.contains(name) {
                    Ok(Token::new(TokenKind::Method, name, loc))
                } else if self.functions.contains(name) {
                    Ok(Token::new(TokenKind::Function, name, loc))
                } else {
                    lex_err!(UnknownFunction, name.to_string(), idx0, end)
                }
            }
            _ => {
                if self.variables.contains_key(name) {
                    Ok(Token::new(TokenKind::Variable, name, loc))
                } else {
                    lex_err!(UndefinedVariable, name.to_string(), idx0, end)
                }
            }
        }
    }
}

/// Parses a decimal mantissa, tolerating a leading or trailing dot the way
/// the scanner produces them (`.5`, `1.`).
fn parse_mantissa(lexeme: &str) -> f64 {
    let s: std::borrow::Cow<str> = if lexeme.starts_with('.') {
        format!("0{lexeme}").into()
    } else {
        lexeme.into()
    };
    s.parse().unwrap_or(0.0)
}

fn is_number_start(c: char) -> bool {
    c.is_ascii_digit() || c == '.'
}

fn is_identifier_start(c: char) -> bool {
    UnicodeXID::is_xid_start(c) || c == '_'
}

fn is_identifier_continue(c: char) -> bool {
    UnicodeXID::is_xid_continue(c)
}
