//! Sandboxed arithmetic evaluator.
//!
//! Deliberately a small calculator, not an expression interpreter: after
//! normalization and sanitization the input may contain only digits,
//! `+ - * /`, `**`, `.` and parentheses. Anything else is rejected with
//! `None`. No identifiers, no function calls, no side effects.

use std::sync::LazyLock;

use regex::Regex;

use super::normalize::normalize;

// Exponent surface forms, rewritten to `**` with operands reduced to their
// digit/decimal characters (residual markup inside exponent braces is
// discarded).
static POW_BOTH_BRACED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([^{}]*)\}\^\{([^{}]*)\}").unwrap());
static POW_RIGHT_BRACED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9.]+)\^\{([^{}]*)\}").unwrap());
static POW_LEFT_BRACED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([^{}]*)\}\^([0-9.]+)").unwrap());
static POW_PLAIN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9.]+)\^([0-9.]+)").unwrap());

/// Whole-string validation: digits, arithmetic operators, parentheses.
/// `**` passes as two `*` characters.
static VALID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9+\-*/().]+$").unwrap());

/// Evaluate exercise markup as arithmetic. Returns `None` for anything
/// that is not a pure, finite arithmetic expression.
pub fn evaluate(expr: &str) -> Option<f64> {
    evaluate_clean(&normalize(expr))
}

/// Evaluate an already-normalized expression. Used by the equation solver's
/// brute-force stage, which substitutes candidates into pre-normalized text.
pub(crate) fn evaluate_clean(expr: &str) -> Option<f64> {
    let mut s = expr.to_string();
    // Chained exponents leave a `^` behind after one pass; repeat until the
    // rewrite reaches a fixed point.
    while s.contains('^') {
        let mut next = s.clone();
        for re in [&POW_BOTH_BRACED, &POW_RIGHT_BRACED, &POW_LEFT_BRACED, &POW_PLAIN] {
            next = re
                .replace_all(&next, |caps: &regex::Captures| {
                    format!("{}**{}", digits_only(&caps[1]), digits_only(&caps[2]))
                })
                .into_owned();
        }
        if next == s {
            break;
        }
        s = next;
    }
    s.retain(|c| c != '{' && c != '}');
    let s: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || "+-*/.()".contains(*c))
        .collect();

    if s.is_empty() || s == "()" || !VALID.is_match(&s) {
        return None;
    }

    let value = Parser::new(&s).parse()?;
    value.is_finite().then_some(value)
}

fn digits_only(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect()
}

/// Precedence-climbing parser over the sanitized byte string.
struct Parser<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input: input.as_bytes(),
            pos: 0,
        }
    }

    fn parse(mut self) -> Option<f64> {
        let value = self.expression(0)?;
        (self.pos == self.input.len()).then_some(value)
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn expression(&mut self, min_bp: u8) -> Option<f64> {
        let mut lhs = self.atom()?;
        loop {
            let (op, bp, rhs_bp) = match self.peek() {
                Some(b'+') => (b'+', 1, 2),
                Some(b'-') => (b'-', 1, 2),
                Some(b'*') if self.input.get(self.pos + 1) == Some(&b'*') => (b'p', 5, 5),
                Some(b'*') => (b'*', 3, 4),
                Some(b'/') => (b'/', 3, 4),
                _ => break,
            };
            if bp < min_bp {
                break;
            }
            self.pos += if op == b'p' { 2 } else { 1 };
            let rhs = self.expression(rhs_bp)?;
            lhs = match op {
                b'+' => lhs + rhs,
                b'-' => lhs - rhs,
                b'*' => lhs * rhs,
                b'/' => lhs / rhs,
                b'p' => lhs.powf(rhs),
                _ => unreachable!(),
            };
        }
        Some(lhs)
    }

    fn atom(&mut self) -> Option<f64> {
        let mut negative = false;
        while let Some(c) = self.peek() {
            match c {
                b'-' => {
                    negative = !negative;
                    self.pos += 1;
                }
                b'+' => self.pos += 1,
                _ => break,
            }
        }

        let value = match self.peek()? {
            b'(' => {
                self.pos += 1;
                let inner = self.expression(0)?;
                if self.peek() != Some(b')') {
                    return None;
                }
                self.pos += 1;
                inner
            }
            c if c.is_ascii_digit() || c == b'.' => self.number()?,
            _ => return None,
        };

        Some(if negative { -value } else { value })
    }

    fn number(&mut self) -> Option<f64> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() || c == b'.' {
                self.pos += 1;
            } else {
                break;
            }
        }
        std::str::from_utf8(&self.input[start..self.pos])
            .ok()?
            .parse()
            .ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::approx_eq;

    #[test]
    fn test_basic_arithmetic() {
        assert_eq!(evaluate("2+3"), Some(5.0));
        assert_eq!(evaluate("10*5"), Some(50.0));
        assert_eq!(evaluate("7-10"), Some(-3.0));
        assert_eq!(evaluate("9/2"), Some(4.5));
    }

    #[test]
    fn test_fraction_markup() {
        assert_eq!(evaluate("(1/2)+(1/2)"), Some(1.0));
        assert_eq!(evaluate("\\frac{1}{2}+\\frac{1}{2}"), Some(1.0));
    }

    #[test]
    fn test_precedence_and_parens() {
        assert_eq!(evaluate("2+3*4"), Some(14.0));
        assert_eq!(evaluate("(2+3)*4"), Some(20.0));
        assert_eq!(evaluate("-(2+3)"), Some(-5.0));
    }

    #[test]
    fn test_exponent_forms() {
        assert_eq!(evaluate("2^3"), Some(8.0));
        assert_eq!(evaluate("2^{3}"), Some(8.0));
        assert_eq!(evaluate("{2}^{3}"), Some(8.0));
        assert_eq!(evaluate("{2}^3"), Some(8.0));
    }

    #[test]
    fn test_exponent_right_associative() {
        assert_eq!(evaluate("2^3^2"), Some(512.0));
    }

    #[test]
    fn test_rejections() {
        assert_eq!(evaluate(""), None);
        assert_eq!(evaluate("()"), None);
        assert_eq!(evaluate("abc"), None);
        assert_eq!(evaluate("2+"), None);
        assert_eq!(evaluate("(1+2"), None);
    }

    #[test]
    fn test_division_by_zero_not_finite() {
        assert_eq!(evaluate("1/0"), None);
    }

    #[test]
    fn test_stray_markup_stripped() {
        assert!(approx_eq(evaluate("\\mathbf{6}\\times 7").unwrap(), 42.0));
        assert_eq!(evaluate("3 + 4"), Some(7.0));
    }

    #[test]
    fn test_decimals() {
        assert!(approx_eq(evaluate("1.5*2").unwrap(), 3.0));
        assert!(approx_eq(evaluate("0.1+0.2").unwrap(), 0.3));
    }
}
