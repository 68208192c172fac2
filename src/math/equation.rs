//! Equation-with-blank solver.
//!
//! Exercises render the unknown as a blank placeholder command inside an
//! otherwise ordinary equation. Solving replaces the placeholder with a
//! single-letter unknown, splits on `=`, and isolates the unknown either
//! analytically (an ordered list of shape patterns) or by bounded brute
//! force — integers first, then a 0.01-step decimal sweep.

use std::sync::LazyLock;

use regex::Regex;

use super::eval::evaluate_clean;
use super::normalize::{brace_argument, find_command, normalize};
use super::{approx_eq, EPSILON};

/// Placeholder command the vendor uses for the blank.
const BLANK_COMMAND: &str = "\\duoblank";

/// Unknown token substituted for the blank.
const UNKNOWN: char = 'X';

/// Brute-force integer range; the decimal sweep re-scans the same range at
/// 0.01 steps.
const BRUTE_FORCE_RANGE: i64 = 10_000;

/// Analytic shapes tried in order; the unknown may be parenthesized.
static SHAPES: LazyLock<Vec<(Regex, Shape)>> = LazyLock::new(|| {
    const X: &str = r"\(?X\)?";
    // Coefficients may arrive parenthesized, e.g. `X+(-1.95)`.
    const N: &str = r"\(?(-?\d+(?:\.\d+)?)\)?";
    let re = |pattern: String| Regex::new(&pattern).unwrap();
    vec![
        (re(format!("^{X}$")), Shape::Alone),
        (re(format!(r"^{X}\+{N}$")), Shape::PlusCoef),
        (re(format!(r"^{X}-{N}$")), Shape::MinusCoef),
        (re(format!(r"^{N}\+{X}$")), Shape::CoefPlus),
        (re(format!(r"^{N}-{X}$")), Shape::CoefMinus),
        (re(format!(r"^{X}\*{N}$")), Shape::TimesCoef),
        (re(format!(r"^{N}\*{X}$")), Shape::TimesCoef),
        (re(format!(r"^{X}/{N}$")), Shape::OverCoef),
        (re(format!(r"^{N}/{X}$")), Shape::CoefOver),
    ]
});

#[derive(Debug, Clone, Copy)]
enum Shape {
    Alone,
    PlusCoef,
    MinusCoef,
    CoefPlus,
    CoefMinus,
    TimesCoef,
    OverCoef,
    CoefOver,
}

/// Solve an equation containing one blank placeholder for the blank's
/// value. `None` means "this is not an equation this solver handles".
pub fn solve_blank(equation: &str) -> Option<f64> {
    let cleaned = replace_blank(&normalize(equation));
    let (lhs, rhs) = cleaned.split_once('=')?;

    // Fast path: the unknown stands alone on one side.
    if lhs == UNKNOWN.to_string() {
        return evaluate_clean(rhs);
    }
    if rhs == UNKNOWN.to_string() {
        return evaluate_clean(lhs);
    }

    let (unknown_side, known_side) = if lhs.contains(UNKNOWN) {
        (lhs, rhs)
    } else if rhs.contains(UNKNOWN) {
        (rhs, lhs)
    } else {
        return None;
    };
    let target = evaluate_clean(known_side)?;
    solve_for_unknown(unknown_side, target)
}

/// Isolate the unknown in `expr` so that `expr == target`.
fn solve_for_unknown(expr: &str, target: f64) -> Option<f64> {
    for (regex, shape) in SHAPES.iter() {
        let Some(caps) = regex.captures(expr) else {
            continue;
        };
        let coef: f64 = match caps.get(1) {
            Some(m) => m.as_str().parse().ok()?,
            None => 0.0,
        };
        let solved = match shape {
            Shape::Alone => Some(target),
            Shape::PlusCoef => Some(target - coef),
            Shape::MinusCoef => Some(target + coef),
            Shape::CoefPlus => Some(target - coef),
            Shape::CoefMinus => Some(coef - target),
            Shape::TimesCoef => (coef != 0.0).then(|| target / coef),
            Shape::OverCoef => (coef != 0.0).then(|| target * coef),
            Shape::CoefOver => (target.abs() > EPSILON).then(|| coef / target),
        };
        if let Some(v) = solved {
            return Some(v);
        }
    }
    brute_force(expr, target)
}

/// Substitute candidates into the unknown-bearing expression. Integer
/// candidates first, then the same range at 0.01 steps with each candidate
/// rounded to 2 decimals to avoid float drift. Bounded, so termination is
/// guaranteed.
fn brute_force(expr: &str, target: f64) -> Option<f64> {
    for v in -BRUTE_FORCE_RANGE..=BRUTE_FORCE_RANGE {
        if let Some(result) = substitute_eval(expr, v as f64) {
            if approx_eq(result, target) {
                return Some(v as f64);
            }
        }
    }
    for i in -(BRUTE_FORCE_RANGE * 100)..=(BRUTE_FORCE_RANGE * 100) {
        let v = ((i as f64 / 100.0) * 100.0).round() / 100.0;
        if let Some(result) = substitute_eval(expr, v) {
            if approx_eq(result, target) {
                return Some(v);
            }
        }
    }
    None
}

fn substitute_eval(expr: &str, value: f64) -> Option<f64> {
    let substituted = expr.replace(UNKNOWN, &format!("({})", value));
    evaluate_clean(&substituted)
}

/// Solve an inequality with a blank on one side for the tightest integer
/// numerator satisfying it, rendered as `"k"` or `"k/b"` over the known
/// side's denominator. Clamped to at least 1.
pub fn solve_inequality_blank(equation: &str) -> Option<String> {
    let cleaned = replace_blank(&normalize(equation));

    // Two-character operators first so ">=" never splits as ">".
    let (direction, inclusive, pos, len) = if let Some(pos) = cleaned.find(">=") {
        ('>', true, pos, 2)
    } else if let Some(pos) = cleaned.find("<=") {
        ('<', true, pos, 2)
    } else if let Some(pos) = cleaned.find('>') {
        ('>', false, pos, 1)
    } else if let Some(pos) = cleaned.find('<') {
        ('<', false, pos, 1)
    } else {
        return None;
    };

    let lhs = &cleaned[..pos];
    let rhs = &cleaned[pos + len..];
    let (unknown_on_left, known) = if lhs.contains(UNKNOWN) {
        (true, rhs)
    } else if rhs.contains(UNKNOWN) {
        (false, lhs)
    } else {
        return None;
    };

    let (num, den) = parse_known_side(known)?;

    // Direction the unknown must move, seen from the unknown's side.
    let wants_greater = if unknown_on_left {
        direction == '>'
    } else {
        direction == '<'
    };
    let k = match (wants_greater, inclusive) {
        (true, true) => num,
        (true, false) => num + 1,
        (false, true) => num,
        (false, false) => num - 1,
    };
    let k = k.max(1);

    Some(if den == 1 {
        k.to_string()
    } else {
        format!("{}/{}", k, den)
    })
}

/// The known side is an integer or a normalized fraction `(a/b)`.
fn parse_known_side(side: &str) -> Option<(i64, i64)> {
    static FRACTION: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^\(?(-?\d+)/(\d+)\)?$").unwrap());
    if let Some(caps) = FRACTION.captures(side) {
        let num = caps[1].parse().ok()?;
        let den = caps[2].parse().ok()?;
        return Some((num, den));
    }
    side.parse::<i64>().ok().map(|n| (n, 1))
}

/// Replace every blank placeholder (with or without a brace argument) with
/// the unknown token.
pub(crate) fn replace_blank(s: &str) -> String {
    let mut out = s.to_string();
    while let Some(pos) = find_command(&out, BLANK_COMMAND) {
        let after = pos + BLANK_COMMAND.len();
        let end = match brace_argument(&out, after) {
            Some((_, end)) => end,
            None => after,
        };
        out.replace_range(pos..end, &UNKNOWN.to_string());
    }
    out
}

/// Whether markup contains the blank placeholder.
pub(crate) fn has_blank(s: &str) -> bool {
    find_command(s, BLANK_COMMAND).is_some()
}
