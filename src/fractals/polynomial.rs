use num::complex::Complex64;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::core::error::FractalError;

use super::newtons_method_core::ComplexFunctionWithSlope;

/**
 * Integer-coefficient polynomial. Coefficients are stored lowest power first:
 * `[a0, a1, ..., an]` represents `a0 + a1*z + ... + an*z^n`.
 */
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(try_from = "Vec<i64>", into = "Vec<i64>")]
pub struct Polynomial {
    coefficients: Vec<i64>,
}

impl Polynomial {
    pub fn new(coefficients: Vec<i64>) -> Result<Polynomial, FractalError> {
        if coefficients.is_empty() {
            return Err(FractalError::EmptyPolynomial);
        }
        Ok(Polynomial { coefficients })
    }

    pub fn coefficients(&self) -> &[i64] {
        &self.coefficients
    }

    /// Number of coefficients minus one. Zero leading coefficients are counted.
    pub fn degree(&self) -> usize {
        self.coefficients.len() - 1
    }

    /// Horner evaluation.
    pub fn evaluate(&self, z: Complex64) -> Complex64 {
        self.coefficients
            .iter()
            .rev()
            .fold(Complex64::new(0.0, 0.0), |acc, &a| acc * z + (a as f64))
    }

    /// `[a0, a1, ..., an]` becomes `[a1, 2*a2, ..., n*an]`.
    pub fn differentiate(&self) -> Result<Polynomial, FractalError> {
        if self.coefficients.len() < 2 {
            return Err(FractalError::DegreeZeroPolynomial(self.coefficients.clone()));
        }
        let coefficients = self
            .coefficients
            .iter()
            .enumerate()
            .skip(1)
            .map(|(power, &a)| (power as i64).saturating_mul(a))
            .collect();
        Ok(Polynomial { coefficients })
    }
}

impl TryFrom<Vec<i64>> for Polynomial {
    type Error = FractalError;

    fn try_from(coefficients: Vec<i64>) -> Result<Self, Self::Error> {
        Polynomial::new(coefficients)
    }
}

impl From<Polynomial> for Vec<i64> {
    fn from(polynomial: Polynomial) -> Self {
        polynomial.coefficients
    }
}

/// Parses whitespace-separated integer coefficients, lowest power first: `"2 -2 0 1"`.
impl FromStr for Polynomial {
    type Err = FractalError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let coefficients = text
            .split_whitespace()
            .map(|token| {
                token
                    .parse::<i64>()
                    .map_err(|_| FractalError::InvalidCoefficient(token.to_owned()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Polynomial::new(coefficients)
    }
}

impl fmt::Display for Polynomial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut wrote_term = false;
        for (power, &a) in self.coefficients.iter().enumerate().rev() {
            if a == 0 {
                continue;
            }
            let sign = if a < 0 { "-" } else { "+" };
            if wrote_term {
                write!(f, " {} ", sign)?;
            } else if a < 0 {
                write!(f, "-")?;
            }
            let magnitude = a.unsigned_abs();
            match (power, magnitude) {
                (0, m) => write!(f, "{}", m)?,
                (1, 1) => write!(f, "z")?,
                (1, m) => write!(f, "{}z", m)?,
                (p, 1) => write!(f, "z^{}", p)?,
                (p, m) => write!(f, "{}z^{}", m, p)?,
            }
            wrote_term = true;
        }
        if !wrote_term {
            write!(f, "0")?;
        }
        Ok(())
    }
}

/**
 * A polynomial bundled with its derivative, computed once so that every
 * Newton step of a render reuses it.
 */
#[derive(Debug, Clone)]
pub struct DifferentiablePolynomial {
    polynomial: Polynomial,
    derivative: Polynomial,
}

impl DifferentiablePolynomial {
    pub fn new(polynomial: Polynomial) -> Result<DifferentiablePolynomial, FractalError> {
        let derivative = polynomial.differentiate()?;
        Ok(DifferentiablePolynomial {
            polynomial,
            derivative,
        })
    }

    pub fn polynomial(&self) -> &Polynomial {
        &self.polynomial
    }

    pub fn derivative(&self) -> &Polynomial {
        &self.derivative
    }
}

impl ComplexFunctionWithSlope for DifferentiablePolynomial {
    #[inline]
    fn value(&self, z: Complex64) -> Complex64 {
        self.polynomial.evaluate(z)
    }

    #[inline]
    fn slope(&self, z: Complex64) -> Complex64 {
        self.derivative.evaluate(z)
    }
}
