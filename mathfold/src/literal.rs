//! Literal values produced while folding

use bigdecimal::BigDecimal;
use num_complex::Complex64;
use num_rational::Rational64;
use num_traits::ToPrimitive;
use std::fmt;

/// A folded literal value
///
/// Exactly one representation is the current best value of a constant
/// subtree; which one is decided by [`crate::simplify::coerce`].
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// Exact rational in lowest terms
    Fraction(Rational64),
    /// Double-precision number
    Number(f64),
    /// Complex number
    Complex(Complex64),
    /// Arbitrary-precision decimal
    Decimal(BigDecimal),
    /// Nested array of literals, one level per dimension
    Matrix(Vec<Literal>),
    /// String
    Text(String),
}

impl Literal {
    /// Build a matrix from nested rows
    pub fn matrix(items: Vec<Literal>) -> Self {
        Literal::Matrix(items)
    }

    /// Get type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Literal::Fraction(_) => "Fraction",
            Literal::Number(_) => "number",
            Literal::Complex(_) => "Complex",
            Literal::Decimal(_) => "BigNumber",
            Literal::Matrix(_) => "Matrix",
            Literal::Text(_) => "string",
        }
    }

    /// Whether the value is a real scalar
    pub fn is_real(&self) -> bool {
        matches!(self, Literal::Fraction(_) | Literal::Number(_) | Literal::Decimal(_))
    }

    /// Real scalar as f64
    pub fn to_f64(&self) -> Option<f64> {
        match self {
            Literal::Fraction(r) => Some(fraction_to_f64(r)),
            Literal::Number(n) => Some(*n),
            Literal::Decimal(d) => d.to_f64(),
            Literal::Complex(_) | Literal::Matrix(_) | Literal::Text(_) => None,
        }
    }

    /// Any numeric scalar as a complex number
    pub fn to_complex(&self) -> Option<Complex64> {
        match self {
            Literal::Complex(c) => Some(*c),
            other => other.to_f64().map(|re| Complex64::new(re, 0.0)),
        }
    }

    /// Whether an exact rational occurs anywhere in the value
    pub fn contains_fraction(&self) -> bool {
        match self {
            Literal::Fraction(_) => true,
            Literal::Matrix(items) => items.iter().any(Literal::contains_fraction),
            _ => false,
        }
    }

    /// Replace every exact rational by its float value
    pub fn without_fractions(self) -> Self {
        match self {
            Literal::Fraction(r) => Literal::Number(fraction_to_f64(&r)),
            Literal::Matrix(items) => {
                Literal::Matrix(items.into_iter().map(Literal::without_fractions).collect())
            }
            other => other,
        }
    }

    /// Dimensions of a nested matrix, following the first element of each level
    ///
    /// Scalars have an empty shape.
    pub fn shape(&self) -> Vec<usize> {
        let mut shape = Vec::new();
        let mut section = self;
        while let Literal::Matrix(items) = section {
            shape.push(items.len());
            match items.first() {
                Some(first) => section = first,
                None => break,
            }
        }
        shape
    }
}

/// Float value of an exact rational
pub fn fraction_to_f64(r: &Rational64) -> f64 {
    *r.numer() as f64 / *r.denom() as f64
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Fraction(r) => write!(f, "{r}"),
            Literal::Number(n) => write!(f, "{n}"),
            Literal::Complex(c) => {
                if c.im < 0.0 {
                    write!(f, "{} - {}i", c.re, -c.im)
                } else {
                    write!(f, "{} + {}i", c.re, c.im)
                }
            }
            Literal::Decimal(d) => write!(f, "{d}"),
            Literal::Matrix(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Literal::Text(s) => write!(f, "{s:?}"),
        }
    }
}
