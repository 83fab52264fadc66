// Copyright 2026 The Exprcalc Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use exprcalc::{Expression, Value};
use proptest::prelude::*;

fn eval(text: &str) -> Value {
    let mut e = Expression::new(text, vec![]).unwrap();
    e.parse().unwrap();
    e.evaluate().unwrap().unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    // Literal roundtrip tests: format a number, scan it back, compare.

    #[test]
    fn decimal_integer_roundtrip(n in 0..=i64::MAX) {
        prop_assert_eq!(Value::Int(n), eval(&n.to_string()));
    }

    #[test]
    fn negated_integer_roundtrip(n in 1..=i64::MAX) {
        // a leading minus scans as a sign flip, so -n comes back as
        // -1 * n rather than as a negative literal
        prop_assert_eq!(Value::Int(-n), eval(&format!("-{n}")));
    }

    #[test]
    fn hex_roundtrip(n in 0..=i64::MAX) {
        prop_assert_eq!(Value::Int(n), eval(&format!("0x{n:X}")));
        prop_assert_eq!(Value::Int(n), eval(&format!("0x{n:x}")));
    }

    #[test]
    fn binary_roundtrip(n in 0..=i64::MAX) {
        prop_assert_eq!(Value::Int(n), eval(&format!("0b{n:b}")));
    }

    #[test]
    fn fractional_roundtrip(n in 0u32..1_000_000, d in 1u32..=6) {
        // fixed-point formatting only; `{:e}` output carries exponent
        // digits that the scanner's leading-zero rule rejects
        let text = format!("{:.*}", d as usize, n as f64 / 1000.0);
        let expected: f64 = text.parse().unwrap();
        prop_assert_eq!(Value::Float(expected), eval(&text));
    }

    #[test]
    fn addition_of_literals_matches_i64(a in 0..=i64::MAX / 2, b in 0..=i64::MAX / 2) {
        prop_assert_eq!(Value::Int(a + b), eval(&format!("{a} + {b}")));
    }
}
