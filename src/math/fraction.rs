//! Exact fraction algebra over integers.
//!
//! Pure functions, no floating point in the comparisons — everything that
//! matters is done with integer cross-multiplication. Denominators of zero
//! are a typed error, never a panic.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A fraction with the sign on the numerator and a positive denominator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fraction {
    pub numerator: i64,
    pub denominator: i64,
}

impl Fraction {
    /// Build a fraction, normalizing the sign onto the numerator. Does not
    /// reduce; use [`simplify_fraction`] for that.
    pub fn new(numerator: i64, denominator: i64) -> Result<Self> {
        if denominator == 0 {
            return Err(Error::DivisionByZero);
        }
        if denominator < 0 {
            Ok(Self {
                numerator: -numerator,
                denominator: -denominator,
            })
        } else {
            Ok(Self {
                numerator,
                denominator,
            })
        }
    }

    /// The fraction as an IEEE double.
    pub fn value(&self) -> f64 {
        self.numerator as f64 / self.denominator as f64
    }

    /// Reduce by the gcd.
    pub fn simplified(&self) -> Self {
        // new() already guaranteed a nonzero denominator
        simplify_fraction(self.numerator, self.denominator).expect("denominator is nonzero")
    }
}

impl fmt::Display for Fraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

/// Greatest common divisor, Euclid over absolute values.
pub fn gcd(a: i64, b: i64) -> i64 {
    let (mut a, mut b) = (a.abs(), b.abs());
    while b != 0 {
        let t = b;
        b = a % b;
        a = t;
    }
    a
}

/// Least common multiple over absolute values; `lcm(0, n) == 0`.
pub fn lcm(a: i64, b: i64) -> i64 {
    let (a, b) = (a.abs(), b.abs());
    if a == 0 || b == 0 {
        return 0;
    }
    a / gcd(a, b) * b
}

/// Reduce `num/den` by the gcd, keeping the denominator positive.
pub fn simplify_fraction(num: i64, den: i64) -> Result<Fraction> {
    if den == 0 {
        return Err(Error::DivisionByZero);
    }
    let divisor = gcd(num, den);
    let (mut num, mut den) = if divisor == 0 {
        (0, den)
    } else {
        (num / divisor, den / divisor)
    };
    if den < 0 {
        num = -num;
        den = -den;
    }
    Ok(Fraction {
        numerator: num,
        denominator: den,
    })
}

/// Compare `num_a/den_a` against `num_b/den_b` by cross-multiplication,
/// returning −1, 0, or 1. Widens to i128 so large operands cannot wrap.
pub fn compare_fractions(num_a: i64, den_a: i64, num_b: i64, den_b: i64) -> i32 {
    let lhs = num_a as i128 * den_b as i128;
    let rhs = num_b as i128 * den_a as i128;
    // Cross-multiplying by a negative denominator flips the ordering.
    let flip = (den_a as i128 * den_b as i128) < 0;
    let ord = lhs.cmp(&rhs);
    let ord = if flip { ord.reverse() } else { ord };
    match ord {
        std::cmp::Ordering::Less => -1,
        std::cmp::Ordering::Equal => 0,
        std::cmp::Ordering::Greater => 1,
    }
}

/// Add via the lcm of the denominators, then simplify.
pub fn add_fractions(a: Fraction, b: Fraction) -> Result<Fraction> {
    let den = lcm(a.denominator, b.denominator);
    let num = a.numerator * (den / a.denominator) + b.numerator * (den / b.denominator);
    simplify_fraction(num, den)
}

/// Subtract via the lcm of the denominators, then simplify.
pub fn subtract_fractions(a: Fraction, b: Fraction) -> Result<Fraction> {
    let den = lcm(a.denominator, b.denominator);
    let num = a.numerator * (den / a.denominator) - b.numerator * (den / b.denominator);
    simplify_fraction(num, den)
}

/// Multiply numerators and denominators directly, then simplify.
pub fn multiply_fractions(a: Fraction, b: Fraction) -> Result<Fraction> {
    simplify_fraction(a.numerator * b.numerator, a.denominator * b.denominator)
}

/// Divide by inverting the divisor; a divisor with numerator 0 is a
/// division by zero.
pub fn divide_fractions(a: Fraction, b: Fraction) -> Result<Fraction> {
    if b.numerator == 0 {
        return Err(Error::DivisionByZero);
    }
    simplify_fraction(a.numerator * b.denominator, a.denominator * b.numerator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_gcd_lcm() {
        assert_eq!(gcd(12, 18), 6);
        assert_eq!(gcd(-12, 18), 6);
        assert_eq!(gcd(7, 0), 7);
        assert_eq!(lcm(4, 6), 12);
        assert_eq!(lcm(-4, 6), 12);
        assert_eq!(lcm(0, 5), 0);
    }

    #[test]
    fn test_simplify() {
        let f = simplify_fraction(6, 8).unwrap();
        assert_eq!((f.numerator, f.denominator), (3, 4));

        let f = simplify_fraction(3, -6).unwrap();
        assert_eq!((f.numerator, f.denominator), (-1, 2));

        let f = simplify_fraction(0, 5).unwrap();
        assert_eq!((f.numerator, f.denominator), (0, 1));
    }

    #[test]
    fn test_simplify_zero_denominator() {
        assert!(matches!(
            simplify_fraction(1, 0),
            Err(crate::Error::DivisionByZero)
        ));
    }

    #[test]
    fn test_simplify_idempotent() {
        let once = simplify_fraction(40, 64).unwrap();
        let twice = simplify_fraction(once.numerator, once.denominator).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_compare() {
        assert_eq!(compare_fractions(1, 2, 2, 4), 0);
        assert_eq!(compare_fractions(1, 3, 1, 2), -1);
        assert_eq!(compare_fractions(3, 4, 1, 2), 1);
        // mixed-sign denominators
        assert_eq!(compare_fractions(1, -2, 1, 2), -1);
        assert_eq!(compare_fractions(-1, -2, 1, 2), 0);
    }

    #[test]
    fn test_arithmetic() {
        let half = Fraction::new(1, 2).unwrap();
        let third = Fraction::new(1, 3).unwrap();

        let sum = add_fractions(half, third).unwrap();
        assert_eq!((sum.numerator, sum.denominator), (5, 6));

        let diff = subtract_fractions(half, third).unwrap();
        assert_eq!((diff.numerator, diff.denominator), (1, 6));

        let product = multiply_fractions(half, third).unwrap();
        assert_eq!((product.numerator, product.denominator), (1, 6));

        let quotient = divide_fractions(half, third).unwrap();
        assert_eq!((quotient.numerator, quotient.denominator), (3, 2));
    }

    #[test]
    fn test_divide_by_zero_fraction() {
        let half = Fraction::new(1, 2).unwrap();
        let zero = Fraction::new(0, 5).unwrap();
        assert!(matches!(
            divide_fractions(half, zero),
            Err(crate::Error::DivisionByZero)
        ));
    }

    #[test]
    fn test_display() {
        assert_eq!(Fraction::new(3, 4).unwrap().to_string(), "3/4");
        assert_eq!(Fraction::new(1, -2).unwrap().to_string(), "-1/2");
    }

    proptest! {
        #[test]
        fn prop_simplify_preserves_value(num in -10_000i64..10_000, den in 1i64..10_000) {
            let f = simplify_fraction(num, den).unwrap();
            prop_assert!(f.denominator > 0);
            prop_assert!((f.value() - num as f64 / den as f64).abs() < 1e-9);
        }

        #[test]
        fn prop_simplify_scale_invariant(
            num in -1_000i64..1_000,
            den in 1i64..1_000,
            k in prop_oneof![-50i64..-1, 1i64..50],
        ) {
            let a = simplify_fraction(num, den).unwrap();
            let b = simplify_fraction(k * num, k * den).unwrap();
            prop_assert_eq!(a, b);
        }

        #[test]
        fn prop_compare_matches_float_sign(
            a in -500i64..500, b in prop_oneof![-500i64..-1, 1i64..500],
            c in -500i64..500, d in prop_oneof![-500i64..-1, 1i64..500],
        ) {
            let cmp = compare_fractions(a, b, c, d);
            let diff = a as f64 / b as f64 - c as f64 / d as f64;
            if diff.abs() > 1e-9 {
                prop_assert_eq!(cmp, if diff < 0.0 { -1 } else { 1 });
            } else {
                prop_assert_eq!(cmp, 0);
            }
        }
    }
}
