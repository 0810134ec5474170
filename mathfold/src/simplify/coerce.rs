//! Choice of literal representation for freshly produced values

use crate::config::{MathConfig, NumberType, SimplifyOptions};
use crate::literal::{fraction_to_f64, Literal};
use bigdecimal::BigDecimal;
use num_rational::Rational64;
use std::str::FromStr;

/// Pick the representation to store for a new literal
///
/// Decimals and fractions are never re-coerced. A complex value with a zero
/// imaginary part is treated as its real part.
pub fn coerce(value: Literal, config: &MathConfig, options: &SimplifyOptions) -> Literal {
    match value {
        Literal::Number(n) => coerce_real(n, config, options),
        Literal::Complex(c) if c.im == 0.0 => coerce_real(c.re, config, options),
        Literal::Matrix(items) => Literal::Matrix(
            items
                .into_iter()
                .map(|item| coerce(item, config, options))
                .collect(),
        ),
        other => other,
    }
}

fn coerce_real(n: f64, config: &MathConfig, options: &SimplifyOptions) -> Literal {
    match config.number {
        NumberType::BigNumber => match decimal_from_f64(n) {
            Some(d) => Literal::Decimal(d),
            None => Literal::Number(n),
        },
        NumberType::Fraction => match Rational64::approximate_float(n) {
            Some(r) if n.is_finite() => Literal::Fraction(r),
            _ => Literal::Number(n),
        },
        NumberType::Number => match exact_fraction(n, options) {
            Some(r) => Literal::Fraction(r),
            None => Literal::Number(n),
        },
    }
}

fn decimal_from_f64(n: f64) -> Option<BigDecimal> {
    if !n.is_finite() {
        return None;
    }
    BigDecimal::from_str(&n.to_string()).ok()
}

/// Exact rational equal to `n`, if one exists within the configured limit
pub fn exact_fraction(n: f64, options: &SimplifyOptions) -> Option<Rational64> {
    if !options.exact_fractions || !n.is_finite() {
        return None;
    }
    let candidate = Rational64::approximate_float(n)?;
    if fraction_to_f64(&candidate) != n {
        return None;
    }
    let limit = options.fractions_limit.unwrap_or(u64::MAX);
    let within = candidate.numer().unsigned_abs() < limit && candidate.denom().unsigned_abs() < limit;
    within.then_some(candidate)
}
