//! Default math library
//!
//! Exact fractions use checked `i64` arithmetic; an overflow is reported as
//! [`EvalError::Overflow`] so the caller can retry with floats. Mixing a
//! fraction with a float yields a float, anything mixed with a decimal yields
//! a decimal, and anything mixed with a complex number yields a complex number.

use super::{EvalError, EvalResult, Evaluator};
use crate::literal::Literal;
use bigdecimal::BigDecimal;
use num_complex::Complex64;
use num_rational::Rational64;
use num_traits::{CheckedAdd, CheckedDiv, CheckedMul, CheckedSub, One, Signed, Zero};
use std::collections::{HashMap, HashSet};
use std::str::FromStr;

/// Builtin function type
pub type BuiltinFn = fn(&[Literal]) -> EvalResult<Literal>;

/// Largest integer exponent computed by repeated exact multiplication
const MAX_EXACT_EXPONENT: u64 = 1024;

/// The default evaluator
pub struct MathLibrary {
    builtins: HashMap<&'static str, BuiltinFn>,
    raw_args: HashSet<String>,
}

impl MathLibrary {
    pub fn new() -> Self {
        let mut library = MathLibrary {
            builtins: HashMap::new(),
            raw_args: HashSet::new(),
        };
        library.register_builtins();
        library
    }

    fn register_builtins(&mut self) {
        self.register("add", builtin_add);
        self.register("subtract", builtin_subtract);
        self.register("multiply", builtin_multiply);
        self.register("divide", builtin_divide);
        self.register("mod", builtin_mod);
        self.register("pow", builtin_pow);
        self.register("unaryMinus", builtin_unary_minus);
        self.register("unaryPlus", builtin_unary_plus);
        self.register("abs", builtin_abs);
        self.register("sqrt", builtin_sqrt);
        self.register("cos", builtin_cos);
        self.register("sin", builtin_sin);
        self.register("tan", builtin_tan);
        self.register("exp", builtin_exp);
        self.register("log", builtin_log);
        self.register("size", builtin_size);
        self.register("concat", builtin_concat);
    }

    /// Register or replace a function
    pub fn register(&mut self, name: &'static str, func: BuiltinFn) {
        self.builtins.insert(name, func);
    }

    /// Mark functions that must receive unevaluated arguments
    pub fn with_raw_args<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.raw_args.extend(names.into_iter().map(Into::into));
        self
    }
}

impl Default for MathLibrary {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator for MathLibrary {
    fn evaluate(&self, name: &str, args: &[Literal]) -> EvalResult<Literal> {
        match self.builtins.get(name) {
            Some(builtin) => builtin(args),
            None => Err(EvalError::UndefinedFunction(name.to_string())),
        }
    }

    fn is_raw_args(&self, name: &str) -> bool {
        self.raw_args.contains(name)
    }
}

// ============================================================================
// Argument helpers
// ============================================================================

fn one<'a>(name: &str, args: &'a [Literal]) -> EvalResult<&'a Literal> {
    match args {
        [x] => Ok(x),
        _ => Err(EvalError::arity(name, 1, args.len())),
    }
}

fn two<'a>(name: &str, args: &'a [Literal]) -> EvalResult<(&'a Literal, &'a Literal)> {
    match args {
        [x, y] => Ok((x, y)),
        _ => Err(EvalError::arity(name, 2, args.len())),
    }
}

fn to_decimal(name: &str, value: &Literal) -> EvalResult<BigDecimal> {
    match value {
        Literal::Decimal(d) => Ok(d.clone()),
        Literal::Fraction(r) => Ok(BigDecimal::from(*r.numer()) / BigDecimal::from(*r.denom())),
        Literal::Number(n) if n.is_finite() => {
            BigDecimal::from_str(&n.to_string()).map_err(|_| EvalError::type_mismatch(name, value))
        }
        _ => Err(EvalError::type_mismatch(name, value)),
    }
}

fn real(name: &str, value: &Literal) -> EvalResult<f64> {
    value.to_f64().ok_or_else(|| EvalError::type_mismatch(name, value))
}

fn complex(name: &str, value: &Literal) -> EvalResult<Complex64> {
    value.to_complex().ok_or_else(|| EvalError::type_mismatch(name, value))
}

// ============================================================================
// Binary arithmetic
// ============================================================================

/// One arithmetic operation, per representation
struct Arith {
    name: &'static str,
    fraction: fn(&Rational64, &Rational64) -> EvalResult<Rational64>,
    number: fn(f64, f64) -> f64,
    decimal: fn(&BigDecimal, &BigDecimal) -> EvalResult<BigDecimal>,
    complex: fn(Complex64, Complex64) -> Complex64,
}

const ADD: Arith = Arith {
    name: "add",
    fraction: fraction_add,
    number: number_add,
    decimal: decimal_add,
    complex: complex_add,
};

const SUBTRACT: Arith = Arith {
    name: "subtract",
    fraction: fraction_subtract,
    number: number_subtract,
    decimal: decimal_subtract,
    complex: complex_subtract,
};

const MULTIPLY: Arith = Arith {
    name: "multiply",
    fraction: fraction_multiply,
    number: number_multiply,
    decimal: decimal_multiply,
    complex: complex_multiply,
};

const DIVIDE: Arith = Arith {
    name: "divide",
    fraction: fraction_divide,
    number: number_divide,
    decimal: decimal_divide,
    complex: complex_divide,
};

fn fraction_add(a: &Rational64, b: &Rational64) -> EvalResult<Rational64> {
    a.checked_add(b).ok_or_else(|| EvalError::overflow("add"))
}

fn fraction_subtract(a: &Rational64, b: &Rational64) -> EvalResult<Rational64> {
    a.checked_sub(b).ok_or_else(|| EvalError::overflow("subtract"))
}

fn fraction_multiply(a: &Rational64, b: &Rational64) -> EvalResult<Rational64> {
    a.checked_mul(b).ok_or_else(|| EvalError::overflow("multiply"))
}

fn fraction_divide(a: &Rational64, b: &Rational64) -> EvalResult<Rational64> {
    if b.is_zero() {
        return Err(EvalError::DivisionByZero);
    }
    a.checked_div(b).ok_or_else(|| EvalError::overflow("divide"))
}

fn number_add(a: f64, b: f64) -> f64 {
    a + b
}

fn number_subtract(a: f64, b: f64) -> f64 {
    a - b
}

fn number_multiply(a: f64, b: f64) -> f64 {
    a * b
}

fn number_divide(a: f64, b: f64) -> f64 {
    a / b
}

fn decimal_add(a: &BigDecimal, b: &BigDecimal) -> EvalResult<BigDecimal> {
    Ok(a + b)
}

fn decimal_subtract(a: &BigDecimal, b: &BigDecimal) -> EvalResult<BigDecimal> {
    Ok(a - b)
}

fn decimal_multiply(a: &BigDecimal, b: &BigDecimal) -> EvalResult<BigDecimal> {
    Ok(a * b)
}

fn decimal_divide(a: &BigDecimal, b: &BigDecimal) -> EvalResult<BigDecimal> {
    if b.is_zero() {
        return Err(EvalError::DivisionByZero);
    }
    Ok(a / b)
}

fn complex_add(a: Complex64, b: Complex64) -> Complex64 {
    a + b
}

fn complex_subtract(a: Complex64, b: Complex64) -> Complex64 {
    a - b
}

fn complex_multiply(a: Complex64, b: Complex64) -> Complex64 {
    a * b
}

fn complex_divide(a: Complex64, b: Complex64) -> Complex64 {
    a / b
}

/// Apply an operation to two scalars, promoting to the wider representation
fn scalar(op: &Arith, a: &Literal, b: &Literal) -> EvalResult<Literal> {
    match (a, b) {
        (Literal::Text(_) | Literal::Matrix(_), _) => Err(EvalError::type_mismatch(op.name, a)),
        (_, Literal::Text(_) | Literal::Matrix(_)) => Err(EvalError::type_mismatch(op.name, b)),
        (Literal::Fraction(x), Literal::Fraction(y)) => (op.fraction)(x, y).map(Literal::Fraction),
        (Literal::Complex(_), _) | (_, Literal::Complex(_)) => {
            let (x, y) = (complex(op.name, a)?, complex(op.name, b)?);
            Ok(Literal::Complex((op.complex)(x, y)))
        }
        (Literal::Decimal(_), _) | (_, Literal::Decimal(_)) => {
            let (x, y) = (to_decimal(op.name, a)?, to_decimal(op.name, b)?);
            (op.decimal)(&x, &y).map(Literal::Decimal)
        }
        _ => {
            let (x, y) = (real(op.name, a)?, real(op.name, b)?);
            Ok(Literal::Number((op.number)(x, y)))
        }
    }
}

/// Apply an operation element by element, broadcasting scalars over matrices
fn elementwise(op: &Arith, a: &Literal, b: &Literal) -> EvalResult<Literal> {
    match (a, b) {
        (Literal::Matrix(xs), Literal::Matrix(ys)) => {
            if xs.len() != ys.len() {
                return Err(EvalError::dimensions(
                    op.name,
                    format!("{} != {}", xs.len(), ys.len()),
                ));
            }
            xs.iter()
                .zip(ys)
                .map(|(x, y)| elementwise(op, x, y))
                .collect::<EvalResult<Vec<_>>>()
                .map(Literal::Matrix)
        }
        (Literal::Matrix(xs), y) => xs
            .iter()
            .map(|x| elementwise(op, x, y))
            .collect::<EvalResult<Vec<_>>>()
            .map(Literal::Matrix),
        (x, Literal::Matrix(ys)) => ys
            .iter()
            .map(|y| elementwise(op, x, y))
            .collect::<EvalResult<Vec<_>>>()
            .map(Literal::Matrix),
        _ => scalar(op, a, b),
    }
}

fn fold_variadic(
    name: &str,
    args: &[Literal],
    pair: fn(&Literal, &Literal) -> EvalResult<Literal>,
) -> EvalResult<Literal> {
    let [first, second, rest @ ..] = args else {
        return Err(EvalError::arity(name, 2, args.len()));
    };
    let mut acc = pair(first, second)?;
    for arg in rest {
        acc = pair(&acc, arg)?;
    }
    Ok(acc)
}

fn add_pair(a: &Literal, b: &Literal) -> EvalResult<Literal> {
    elementwise(&ADD, a, b)
}

fn multiply_pair(a: &Literal, b: &Literal) -> EvalResult<Literal> {
    match (a, b) {
        (Literal::Matrix(xs), Literal::Matrix(ys)) => matrix_product(xs, ys),
        _ => elementwise(&MULTIPLY, a, b),
    }
}

fn rows<'a>(m: &'a [Literal]) -> Option<Vec<&'a [Literal]>> {
    m.iter()
        .map(|row| match row {
            Literal::Matrix(items) => Some(items.as_slice()),
            _ => None,
        })
        .collect()
}

fn dot(xs: &[Literal], ys: &[Literal]) -> EvalResult<Literal> {
    if xs.is_empty() || xs.len() != ys.len() {
        return Err(EvalError::dimensions(
            "multiply",
            format!("vectors of length {} and {}", xs.len(), ys.len()),
        ));
    }
    let mut acc = scalar(&MULTIPLY, &xs[0], &ys[0])?;
    for (x, y) in xs.iter().zip(ys).skip(1) {
        let term = scalar(&MULTIPLY, x, y)?;
        acc = scalar(&ADD, &acc, &term)?;
    }
    Ok(acc)
}

fn matrix_product(a: &[Literal], b: &[Literal]) -> EvalResult<Literal> {
    let (lhs, rhs) = match (rows(a), rows(b)) {
        (Some(lhs), Some(rhs)) if !lhs.is_empty() && !rhs.is_empty() => (lhs, rhs),
        (None, None) => return dot(a, b),
        _ => {
            return Err(EvalError::dimensions(
                "multiply",
                "expected two-dimensional matrices",
            ));
        }
    };
    let cols = rhs[0].len();
    if lhs.iter().any(|row| row.len() != rhs.len()) || rhs.iter().any(|row| row.len() != cols) {
        return Err(EvalError::dimensions("multiply", "inner dimensions differ"));
    }
    let column = |j: usize| rhs.iter().map(|row| row[j].clone()).collect::<Vec<_>>();
    let columns: Vec<Vec<Literal>> = (0..cols).map(column).collect();
    lhs.iter()
        .map(|row| {
            columns
                .iter()
                .map(|col| dot(row, col))
                .collect::<EvalResult<Vec<_>>>()
                .map(Literal::Matrix)
        })
        .collect::<EvalResult<Vec<_>>>()
        .map(Literal::Matrix)
}

fn builtin_add(args: &[Literal]) -> EvalResult<Literal> {
    fold_variadic("add", args, add_pair)
}

fn builtin_multiply(args: &[Literal]) -> EvalResult<Literal> {
    fold_variadic("multiply", args, multiply_pair)
}

fn builtin_subtract(args: &[Literal]) -> EvalResult<Literal> {
    let (a, b) = two("subtract", args)?;
    elementwise(&SUBTRACT, a, b)
}

fn builtin_divide(args: &[Literal]) -> EvalResult<Literal> {
    let (a, b) = two("divide", args)?;
    if matches!(b, Literal::Matrix(_)) {
        return Err(EvalError::type_mismatch("divide", b));
    }
    elementwise(&DIVIDE, a, b)
}

fn builtin_mod(args: &[Literal]) -> EvalResult<Literal> {
    let (a, b) = two("mod", args)?;
    match (a, b) {
        (Literal::Fraction(x), Literal::Fraction(y)) => {
            if y.is_zero() {
                return Ok(a.clone());
            }
            let quotient = fraction_divide(x, y)?.floor();
            let product = fraction_multiply(&quotient, y)?;
            fraction_subtract(x, &product).map(Literal::Fraction)
        }
        (Literal::Decimal(_), _) | (_, Literal::Decimal(_)) if a.is_real() && b.is_real() => {
            let (x, y) = (to_decimal("mod", a)?, to_decimal("mod", b)?);
            if y.is_zero() {
                return Ok(Literal::Decimal(x));
            }
            let r = x % y.clone();
            let floored = if !r.is_zero() && r.is_negative() != y.is_negative() {
                r + y
            } else {
                r
            };
            Ok(Literal::Decimal(floored))
        }
        _ if a.is_real() && b.is_real() => {
            let (x, y) = (real("mod", a)?, real("mod", b)?);
            if y == 0.0 {
                return Ok(Literal::Number(x));
            }
            Ok(Literal::Number(x - y * (x / y).floor()))
        }
        _ if a.is_real() => Err(EvalError::type_mismatch("mod", b)),
        _ => Err(EvalError::type_mismatch("mod", a)),
    }
}

// ============================================================================
// Powers
// ============================================================================

fn fraction_pow(base: &Rational64, exponent: i64) -> EvalResult<Rational64> {
    if exponent.unsigned_abs() > MAX_EXACT_EXPONENT {
        return Err(EvalError::overflow("pow"));
    }
    let mut result = Rational64::one();
    for _ in 0..exponent.unsigned_abs() {
        result = fraction_multiply(&result, base).map_err(|_| EvalError::overflow("pow"))?;
    }
    if exponent < 0 {
        if result.is_zero() {
            return Err(EvalError::DivisionByZero);
        }
        result = result.recip();
    }
    Ok(result)
}

fn builtin_pow(args: &[Literal]) -> EvalResult<Literal> {
    let (base, exponent) = two("pow", args)?;
    match (base, exponent) {
        (Literal::Fraction(b), Literal::Fraction(e)) if e.is_integer() => {
            fraction_pow(b, *e.numer()).map(Literal::Fraction)
        }
        (Literal::Complex(_), _) | (_, Literal::Complex(_)) => {
            let (b, e) = (complex("pow", base)?, complex("pow", exponent)?);
            Ok(Literal::Complex(b.powc(e)))
        }
        (Literal::Decimal(b), e) if e.is_real() => {
            let e = real("pow", e)?;
            if e.fract() == 0.0 && e >= 0.0 && e <= MAX_EXACT_EXPONENT as f64 {
                let mut result = BigDecimal::one();
                for _ in 0..e as u64 {
                    result = &result * b;
                }
                return Ok(Literal::Decimal(result));
            }
            real_pow(real("pow", base)?, e)
        }
        _ => real_pow(real("pow", base)?, real("pow", exponent)?),
    }
}

fn real_pow(base: f64, exponent: f64) -> EvalResult<Literal> {
    if base < 0.0 && exponent.fract() != 0.0 {
        let c = Complex64::new(base, 0.0).powc(Complex64::new(exponent, 0.0));
        return Ok(Literal::Complex(c));
    }
    Ok(Literal::Number(base.powf(exponent)))
}

// ============================================================================
// Unary functions
// ============================================================================

fn map_elements(
    name: &str,
    value: &Literal,
    f: fn(&str, &Literal) -> EvalResult<Literal>,
) -> EvalResult<Literal> {
    match value {
        Literal::Matrix(items) => items
            .iter()
            .map(|item| map_elements(name, item, f))
            .collect::<EvalResult<Vec<_>>>()
            .map(Literal::Matrix),
        other => f(name, other),
    }
}

fn negate(name: &str, value: &Literal) -> EvalResult<Literal> {
    match value {
        Literal::Fraction(r) => {
            let numer = r.numer().checked_neg().ok_or_else(|| EvalError::overflow(name))?;
            Ok(Literal::Fraction(Rational64::new_raw(numer, *r.denom())))
        }
        Literal::Number(n) => Ok(Literal::Number(-n)),
        Literal::Complex(c) => Ok(Literal::Complex(-c)),
        Literal::Decimal(d) => Ok(Literal::Decimal(-d.clone())),
        other => Err(EvalError::type_mismatch(name, other)),
    }
}

fn identity(name: &str, value: &Literal) -> EvalResult<Literal> {
    match value {
        Literal::Text(_) => Err(EvalError::type_mismatch(name, value)),
        other => Ok(other.clone()),
    }
}

fn absolute(name: &str, value: &Literal) -> EvalResult<Literal> {
    match value {
        Literal::Fraction(r) => {
            let numer = r.numer().checked_abs().ok_or_else(|| EvalError::overflow(name))?;
            Ok(Literal::Fraction(Rational64::new_raw(numer, *r.denom())))
        }
        Literal::Number(n) => Ok(Literal::Number(n.abs())),
        Literal::Complex(c) => Ok(Literal::Number(c.norm())),
        Literal::Decimal(d) => Ok(Literal::Decimal(d.abs())),
        other => Err(EvalError::type_mismatch(name, other)),
    }
}

fn builtin_unary_minus(args: &[Literal]) -> EvalResult<Literal> {
    map_elements("unaryMinus", one("unaryMinus", args)?, negate)
}

fn builtin_unary_plus(args: &[Literal]) -> EvalResult<Literal> {
    map_elements("unaryPlus", one("unaryPlus", args)?, identity)
}

fn builtin_abs(args: &[Literal]) -> EvalResult<Literal> {
    map_elements("abs", one("abs", args)?, absolute)
}

fn builtin_sqrt(args: &[Literal]) -> EvalResult<Literal> {
    let x = one("sqrt", args)?;
    match x {
        Literal::Complex(c) => Ok(Literal::Complex(c.sqrt())),
        Literal::Decimal(d) if !d.is_negative() => d
            .sqrt()
            .map(Literal::Decimal)
            .ok_or_else(|| EvalError::type_mismatch("sqrt", x)),
        _ => {
            let v = real("sqrt", x)?;
            if v < 0.0 {
                Ok(Literal::Complex(Complex64::new(0.0, (-v).sqrt())))
            } else {
                Ok(Literal::Number(v.sqrt()))
            }
        }
    }
}

/// Real function with a complex extension
fn transcendental(
    name: &str,
    args: &[Literal],
    on_real: fn(f64) -> f64,
    on_complex: fn(Complex64) -> Complex64,
) -> EvalResult<Literal> {
    match one(name, args)? {
        Literal::Complex(c) => Ok(Literal::Complex(on_complex(*c))),
        x => Ok(Literal::Number(on_real(real(name, x)?))),
    }
}

fn builtin_cos(args: &[Literal]) -> EvalResult<Literal> {
    transcendental("cos", args, f64::cos, Complex64::cos)
}

fn builtin_sin(args: &[Literal]) -> EvalResult<Literal> {
    transcendental("sin", args, f64::sin, Complex64::sin)
}

fn builtin_tan(args: &[Literal]) -> EvalResult<Literal> {
    transcendental("tan", args, f64::tan, Complex64::tan)
}

fn builtin_exp(args: &[Literal]) -> EvalResult<Literal> {
    transcendental("exp", args, f64::exp, Complex64::exp)
}

fn builtin_log(args: &[Literal]) -> EvalResult<Literal> {
    let x = one("log", args)?;
    if x.is_real() && real("log", x)? < 0.0 {
        return Ok(Literal::Complex(complex("log", x)?.ln()));
    }
    transcendental("log", args, f64::ln, Complex64::ln)
}

// ============================================================================
// Structural functions
// ============================================================================

fn builtin_size(args: &[Literal]) -> EvalResult<Literal> {
    let dims = match one("size", args)? {
        Literal::Text(s) => vec![s.chars().count()],
        other => other.shape(),
    };
    Ok(Literal::Matrix(
        dims.into_iter().map(|d| Literal::Number(d as f64)).collect(),
    ))
}

fn builtin_concat(args: &[Literal]) -> EvalResult<Literal> {
    if args.is_empty() {
        return Err(EvalError::arity("concat", 1, 0));
    }
    if args.iter().all(|a| matches!(a, Literal::Text(_))) {
        let joined: String = args
            .iter()
            .filter_map(|a| match a {
                Literal::Text(s) => Some(s.as_str()),
                _ => None,
            })
            .collect();
        return Ok(Literal::Text(joined));
    }
    let mut items = Vec::new();
    for arg in args {
        match arg {
            Literal::Matrix(xs) => items.extend(xs.iter().cloned()),
            other => return Err(EvalError::type_mismatch("concat", other)),
        }
    }
    Ok(Literal::Matrix(items))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frac(n: i64, d: i64) -> Literal {
        Literal::Fraction(Rational64::new(n, d))
    }

    fn dec(s: &str) -> Literal {
        Literal::Decimal(BigDecimal::from_str(s).unwrap())
    }

    fn eval(name: &str, args: &[Literal]) -> EvalResult<Literal> {
        MathLibrary::new().evaluate(name, args)
    }

    #[test]
    fn test_fraction_arithmetic_is_exact() {
        assert_eq!(eval("add", &[frac(1, 3), frac(1, 6)]), Ok(frac(1, 2)));
        assert_eq!(eval("multiply", &[frac(4, 1), frac(3, 1)]), Ok(frac(12, 1)));
        assert_eq!(eval("divide", &[frac(12, 1), frac(6, 1)]), Ok(frac(2, 1)));
        assert_eq!(eval("subtract", &[frac(1, 2), frac(3, 4)]), Ok(frac(-1, 4)));
    }

    #[test]
    fn test_variadic_add() {
        assert_eq!(eval("add", &[frac(1, 1), frac(2, 1), frac(3, 1)]), Ok(frac(6, 1)));
        assert_eq!(
            eval("add", &[frac(1, 1)]),
            Err(EvalError::arity("add", 2, 1))
        );
    }

    #[test]
    fn test_fraction_overflow_is_reported() {
        let big = Literal::Fraction(Rational64::from_integer(i64::MAX));
        assert_eq!(
            eval("multiply", &[big.clone(), big]),
            Err(EvalError::overflow("multiply"))
        );
    }

    #[test]
    fn test_fraction_division_by_zero() {
        assert_eq!(
            eval("divide", &[frac(1, 1), frac(0, 1)]),
            Err(EvalError::DivisionByZero)
        );
        assert_eq!(
            eval("divide", &[Literal::Number(1.0), Literal::Number(0.0)]),
            Ok(Literal::Number(f64::INFINITY))
        );
    }

    #[test]
    fn test_mixed_representations_promote() {
        assert_eq!(
            eval("add", &[frac(1, 2), Literal::Number(0.25)]),
            Ok(Literal::Number(0.75))
        );
        assert_eq!(eval("add", &[dec("1.5"), frac(1, 2)]), Ok(dec("2")));
        assert_eq!(
            eval("multiply", &[Literal::Complex(Complex64::new(0.0, 1.0)), frac(2, 1)]),
            Ok(Literal::Complex(Complex64::new(0.0, 2.0)))
        );
    }

    #[test]
    fn test_strings_are_rejected_by_arithmetic() {
        let err = eval("add", &[Literal::Text("a".into()), frac(1, 1)]).unwrap_err();
        assert!(matches!(err, EvalError::TypeMismatch { .. }));
        assert_eq!(
            eval("concat", &[Literal::Text("ab".into()), Literal::Text("c".into())]),
            Ok(Literal::Text("abc".into()))
        );
    }

    #[test]
    fn test_pow() {
        assert_eq!(eval("pow", &[frac(2, 3), frac(2, 1)]), Ok(frac(4, 9)));
        assert_eq!(eval("pow", &[frac(2, 1), frac(-2, 1)]), Ok(frac(1, 4)));
        assert_eq!(eval("pow", &[dec("1.5"), frac(2, 1)]), Ok(dec("2.25")));
        let Ok(Literal::Complex(c)) = eval("pow", &[frac(-8, 1), Literal::Number(0.5)]) else {
            panic!("Expected complex result");
        };
        assert!(c.re.abs() < 1e-12);
    }

    #[test]
    fn test_mod_is_floored() {
        assert_eq!(eval("mod", &[frac(-7, 1), frac(3, 1)]), Ok(frac(2, 1)));
        assert_eq!(
            eval("mod", &[Literal::Number(7.5), Literal::Number(2.0)]),
            Ok(Literal::Number(1.5))
        );
        assert_eq!(eval("mod", &[frac(5, 1), frac(0, 1)]), Ok(frac(5, 1)));
    }

    #[test]
    fn test_sqrt_of_negative_is_complex() {
        assert_eq!(
            eval("sqrt", &[frac(-4, 1)]),
            Ok(Literal::Complex(Complex64::new(0.0, 2.0)))
        );
        assert_eq!(eval("sqrt", &[frac(9, 4)]), Ok(Literal::Number(1.5)));
    }

    #[test]
    fn test_unary_functions() {
        assert_eq!(eval("cos", &[frac(0, 1)]), Ok(Literal::Number(1.0)));
        assert_eq!(eval("unaryMinus", &[frac(3, 4)]), Ok(frac(-3, 4)));
        assert_eq!(eval("abs", &[frac(-3, 4)]), Ok(frac(3, 4)));
        assert_eq!(
            eval("unaryMinus", &[Literal::matrix(vec![frac(1, 1), Literal::Number(2.0)])]),
            Ok(Literal::matrix(vec![frac(-1, 1), Literal::Number(-2.0)]))
        );
        assert!(matches!(
            eval("log", &[frac(-1, 1)]),
            Ok(Literal::Complex(_))
        ));
    }

    #[test]
    fn test_matrix_operations() {
        let row = |a, b| Literal::matrix(vec![frac(a, 1), frac(b, 1)]);
        let m = Literal::matrix(vec![row(1, 2), row(3, 4)]);
        assert_eq!(
            eval("add", &[m.clone(), frac(1, 1)]),
            Ok(Literal::matrix(vec![row(2, 3), row(4, 5)]))
        );
        assert_eq!(
            eval("multiply", &[m.clone(), m.clone()]),
            Ok(Literal::matrix(vec![row(7, 10), row(15, 22)]))
        );
        assert_eq!(
            eval("multiply", &[row(1, 2), row(3, 4)]),
            Ok(frac(11, 1))
        );
        let triple = Literal::matrix(vec![frac(1, 1), frac(2, 1), frac(3, 1)]);
        assert!(matches!(
            eval("add", &[m, triple]),
            Err(EvalError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_size() {
        let row = |a, b| Literal::matrix(vec![frac(a, 1), frac(b, 1)]);
        let m = Literal::matrix(vec![row(1, 2), row(3, 4), row(5, 6)]);
        assert_eq!(
            eval("size", &[m]),
            Ok(Literal::matrix(vec![Literal::Number(3.0), Literal::Number(2.0)]))
        );
        assert_eq!(eval("size", &[frac(1, 1)]), Ok(Literal::matrix(vec![])));
    }

    #[test]
    fn test_unknown_function_and_raw_args() {
        let library = MathLibrary::new().with_raw_args(["derivative"]);
        assert_eq!(
            library.evaluate("frobnicate", &[]),
            Err(EvalError::UndefinedFunction("frobnicate".into()))
        );
        assert!(library.is_raw_args("derivative"));
        assert!(!library.is_raw_args("cos"));
        assert!(library.evaluate("cos", &[frac(0, 1)]).is_ok());
    }
}
